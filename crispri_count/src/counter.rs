use utils::CountTable;

use crate::design::GuideSet;

/// One alignment of a read to a guide
#[derive(Debug, Clone, Copy)]
pub struct CountRecord<'a> {
    pub guide: &'a str,
    pub identity: f64,
}

impl<'a> CountRecord<'a> {
    /// Parse record from the tab separated fields of an alignment line.
    /// The guide identifier is in the second column and the percent identity in the third.
    pub fn from_fields(fields: &[&'a str]) -> anyhow::Result<Self> {
        if fields.len() < 3 {
            return Err(anyhow!(
                "Short alignment line: expected at least 3 columns, found {}",
                fields.len()
            ));
        }
        let identity = fields[2]
            .parse::<f64>()
            .ok()
            .filter(|x| x.is_finite())
            .ok_or_else(|| anyhow!("Error reading percent identity '{}'", fields[2]))?;
        Ok(Self {
            guide: fields[1],
            identity,
        })
    }
}

pub struct CountSummary {
    pub table: CountTable,
    pub wash_count: usize,
    pub records: usize,
    pub passed: usize,
}

/// Accumulates per guide counts of alignments that pass the identity filter
pub struct CountBuilder<'a> {
    guides: &'a GuideSet,
    counts: Vec<u64>,
    id_filter: f64,
    wash_control: Option<&'a str>,
    wash_count: usize,
    records: usize,
    passed: usize,
}

impl<'a> CountBuilder<'a> {
    pub fn new(guides: &'a GuideSet, id_filter: f64, wash_control: Option<&'a str>) -> Self {
        Self {
            guides,
            counts: vec![0; guides.len()],
            id_filter,
            wash_control,
            wash_count: 0,
            records: 0,
            passed: 0,
        }
    }

    pub fn is_wash_control(&self, guide: &str) -> bool {
        self.wash_control.map(|w| w == guide).unwrap_or(false)
    }

    /// Add an alignment record.
    ///
    /// Records for the wash control are always tallied, regardless of identity.
    /// A guide that is not in the design library is an error unless it is the wash control.
    pub fn add_record(&mut self, rec: &CountRecord) -> anyhow::Result<()> {
        self.records += 1;
        let wash = self.is_wash_control(rec.guide);
        if wash {
            self.wash_count += 1
        }
        match self.guides.guide_idx(rec.guide) {
            Some(i) => {
                if rec.identity >= self.id_filter {
                    self.counts[i] += 1;
                    self.passed += 1;
                }
            }
            None if wash => (),
            None => {
                return Err(anyhow!(
                    "Guide {} not found in design library",
                    rec.guide
                ))
            }
        }
        Ok(())
    }

    /// Generate single column count table, one row per guide in the design library
    pub fn finish(self) -> anyhow::Result<CountSummary> {
        let mut table = CountTable::new(vec![String::from("counts")])?;
        for (g, ct) in self.guides.guides().iter().zip(self.counts.iter()) {
            table.add_row(g, vec![*ct as f64])?
        }
        Ok(CountSummary {
            table,
            wash_count: self.wash_count,
            records: self.records,
            passed: self.passed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guides() -> GuideSet {
        let mut gs = GuideSet::default();
        for g in ["g1", "g2", "g3"] {
            gs.insert(g);
        }
        gs
    }

    fn rec(guide: &str, identity: f64) -> CountRecord<'_> {
        CountRecord { guide, identity }
    }

    #[test]
    fn parse_fields() {
        let r = CountRecord::from_fields(&["read1", "g1", "99.5", "20"]).unwrap();
        assert_eq!(r.guide, "g1");
        assert_eq!(r.identity, 99.5);
        assert!(CountRecord::from_fields(&["read1", "g1"]).is_err());
        assert!(CountRecord::from_fields(&["read1", "g1", "high"]).is_err());
        assert!(CountRecord::from_fields(&["read1", "g1", "nan"]).is_err());
    }

    #[test]
    fn identity_threshold_inclusive() {
        let gs = guides();
        let mut b = CountBuilder::new(&gs, 97.0, None);
        b.add_record(&rec("g1", 97.0)).unwrap();
        b.add_record(&rec("g1", 96.9)).unwrap();
        b.add_record(&rec("g2", 100.0)).unwrap();
        let s = b.finish().unwrap();
        assert_eq!(s.table.get("g1", "counts"), Some(1.0));
        assert_eq!(s.table.get("g2", "counts"), Some(1.0));
        assert_eq!(s.table.get("g3", "counts"), Some(0.0));
        assert_eq!(s.records, 3);
        assert_eq!(s.passed, 2);
    }

    #[test]
    fn unknown_guide_is_fatal() {
        let gs = guides();
        let mut b = CountBuilder::new(&gs, 100.0, None);
        assert!(b.add_record(&rec("g4", 100.0)).is_err());
        // Regardless of identity
        assert!(b.add_record(&rec("g4", 50.0)).is_err());
    }

    #[test]
    fn wash_control_counted_independently() {
        let gs = guides();
        let mut b = CountBuilder::new(&gs, 100.0, Some("wash"));
        b.add_record(&rec("wash", 100.0)).unwrap();
        b.add_record(&rec("wash", 80.0)).unwrap();
        b.add_record(&rec("g1", 100.0)).unwrap();
        let s = b.finish().unwrap();
        assert_eq!(s.wash_count, 2);
        assert_eq!(s.table.n_rows(), 3);
        assert!(s.table.get("wash", "counts").is_none());

        // Wash control in design library is counted as a normal guide as well
        let gs = guides();
        let mut b = CountBuilder::new(&gs, 100.0, Some("g3"));
        b.add_record(&rec("g3", 100.0)).unwrap();
        b.add_record(&rec("g3", 90.0)).unwrap();
        let s = b.finish().unwrap();
        assert_eq!(s.wash_count, 2);
        assert_eq!(s.table.get("g3", "counts"), Some(1.0));
    }

    #[test]
    fn empty_input() {
        let gs = guides();
        let b = CountBuilder::new(&gs, 100.0, None);
        let s = b.finish().unwrap();
        assert_eq!(s.table.n_rows(), 3);
        assert!(s.table.column(0).all(|x| x == 0.0));
        assert_eq!(s.wash_count, 0);
    }
}
