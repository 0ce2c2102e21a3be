use std::path::{Path, PathBuf};

use anyhow::Context;
use regex::Regex;

/// Per sample count file.  The sample name comes from the file name
#[derive(Debug)]
pub struct CountFile {
    sample: String,
    path: PathBuf,
}

impl CountFile {
    pub fn sample(&self) -> &str {
        &self.sample
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Collect count files from input directory.
/// Files should be named <sample>_counts.tsv, optionally followed by a compression suffix.
/// The file `exclude` (normally the output file) is skipped if present.
/// The returned list is sorted on sample name.
pub fn get_count_files(
    dir: Option<&PathBuf>,
    exclude: Option<&Path>,
) -> anyhow::Result<Vec<CountFile>> {
    let in_dir = dir.map(|p| p.to_owned()).unwrap_or_else(|| PathBuf::from("."));
    let reg = Regex::new(r"^(.+)_counts[.]tsv(?:[.][[:alnum:]]+)?$")?;
    let exclude = exclude.and_then(|p| p.canonicalize().ok());

    let mut v = Vec::new();
    for f in in_dir
        .read_dir()
        .with_context(|| format!("Error checking input directory {}", in_dir.display()))?
    {
        let entry =
            f.with_context(|| format!("Could not get directory entry from {}", in_dir.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Ok(name) = entry.file_name().into_string() else {
            warn!("Skipping file with illegal name {}", path.display());
            continue;
        };
        if let Some(c) = reg.captures(name.as_str()) {
            if exclude.is_some() && path.canonicalize().ok() == exclude {
                debug!("Skipping output file {}", path.display());
                continue;
            }
            let sample = c[1].to_owned();
            trace!("Adding file {} for sample {}", path.display(), sample);
            v.push(CountFile { sample, path });
        }
    }

    v.sort_unstable_by(|a, b| a.sample.cmp(&b.sample));
    if let Some(w) = v.windows(2).find(|w| w[0].sample == w[1].sample) {
        return Err(anyhow!(
            "Multiple count files for sample {}: {} and {}",
            w[0].sample,
            w[0].path.display(),
            w[1].path.display()
        ));
    }

    if v.is_empty() {
        Err(anyhow!("No count files found in {}", in_dir.display()))
    } else {
        debug!("{} count files found in {}", v.len(), in_dir.display());
        Ok(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn find_count_files() {
        let dir = tempfile::tempdir().unwrap();
        for f in ["B_counts.tsv", "A_rep1_counts.tsv.gz", "notes.txt", "counts.tsv", "merged_counts.tsv"] {
            fs::write(dir.path().join(f), "").unwrap();
        }
        fs::create_dir(dir.path().join("C_counts.tsv")).unwrap();

        let d = dir.path().to_owned();
        let out = d.join("merged_counts.tsv");
        let v = get_count_files(Some(&d), Some(&out)).unwrap();
        let names: Vec<_> = v.iter().map(|f| f.sample()).collect();
        assert_eq!(names, vec!["A_rep1", "B"]);

        let v = get_count_files(Some(&d), None).unwrap();
        assert_eq!(v.len(), 3);
    }

    #[test]
    fn duplicate_samples() {
        let dir = tempfile::tempdir().unwrap();
        for f in ["A_counts.tsv", "A_counts.tsv.gz"] {
            fs::write(dir.path().join(f), "").unwrap();
        }
        let d = dir.path().to_owned();
        assert!(get_count_files(Some(&d), None).is_err());
    }

    #[test]
    fn empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let d = dir.path().to_owned();
        assert!(get_count_files(Some(&d), None).is_err());
    }
}
