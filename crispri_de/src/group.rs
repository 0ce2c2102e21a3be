/// SampleGroup
///
/// A condition and the indices of the sample columns that are its replicates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleGroup {
    name: String,
    columns: Vec<usize>,
}

impl SampleGroup {
    /// Collect all samples whose name starts with prefix
    fn from_prefix(samples: &[String], prefix: &str) -> anyhow::Result<Self> {
        if prefix.is_empty() {
            return Err(anyhow!("Empty group prefix"));
        }
        let columns: Vec<_> = samples
            .iter()
            .enumerate()
            .filter(|(_, s)| s.starts_with(prefix))
            .map(|(ix, _)| ix)
            .collect();
        if columns.is_empty() {
            Err(anyhow!("No samples found for group {}", prefix))
        } else {
            Ok(Self {
                name: prefix.to_owned(),
                columns,
            })
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[usize] {
        &self.columns
    }
}

/// The control group and the treatment groups that are compared against it
#[derive(Debug)]
pub struct GroupSet {
    control: SampleGroup,
    treatments: Vec<SampleGroup>,
}

impl GroupSet {
    /// Set up groups from the sample names of the count table.
    ///
    /// Each group must match at least one sample and no sample may belong to more
    /// than one group.
    pub fn from_prefixes(
        samples: &[String],
        control: &str,
        treatments: &[String],
    ) -> anyhow::Result<Self> {
        if treatments.is_empty() {
            return Err(anyhow!("No treatment groups specified"));
        }
        let control = SampleGroup::from_prefix(samples, control)?;
        let treatments = treatments
            .iter()
            .map(|p| SampleGroup::from_prefix(samples, p))
            .collect::<anyhow::Result<Vec<_>>>()?;

        let mut owner: Vec<Option<&str>> = vec![None; samples.len()];
        for g in std::iter::once(&control).chain(treatments.iter()) {
            for ix in g.columns.iter() {
                if let Some(other) = owner[*ix] {
                    return Err(anyhow!(
                        "Sample {} matches both group {} and group {}",
                        samples[*ix],
                        other,
                        g.name
                    ));
                }
                owner[*ix] = Some(&g.name);
            }
        }

        for g in std::iter::once(&control).chain(treatments.iter()) {
            let names: Vec<_> = g.columns.iter().map(|ix| samples[*ix].as_str()).collect();
            debug!("Group {}: {}", g.name, names.join(", "));
            if g.columns.len() < 2 {
                warn!(
                    "Group {} has fewer than 2 replicates; p-values will be NA",
                    g.name
                )
            }
        }

        Ok(Self {
            control,
            treatments,
        })
    }

    pub fn control(&self) -> &SampleGroup {
        &self.control
    }

    pub fn treatments(&self) -> &[SampleGroup] {
        &self.treatments
    }
}
