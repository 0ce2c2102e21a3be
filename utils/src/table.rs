use std::{
    collections::{hash_map::Entry, HashMap},
    io::Write,
    path::Path,
    sync::Arc,
};

use anyhow::Context;
use compress_io::compress::CompressIo;

use crate::{fmt_value, get_next_line};

/// Guide design identifier.  Treated as an opaque string
pub type Guide = Arc<str>;

/// CountTable
///
/// Matrix of non-negative counts with one row per guide and one column per sample.
/// Rows and columns are kept in order of first appearance; a guide or
/// sample name can only appear once.
///
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountTable {
    guides: Vec<Guide>,
    index: HashMap<Guide, usize>,
    samples: Vec<String>,
    counts: Vec<Vec<f64>>,
}

impl CountTable {
    /// Make an empty table with the given sample columns
    pub fn new(samples: Vec<String>) -> anyhow::Result<Self> {
        for (i, s) in samples.iter().enumerate() {
            if samples[..i].contains(s) {
                return Err(anyhow!("Duplicate sample column {}", s));
            }
        }
        Ok(Self {
            samples,
            ..Default::default()
        })
    }

    /// Append a row for a new guide
    pub fn add_row<S: AsRef<str>>(&mut self, guide: S, values: Vec<f64>) -> anyhow::Result<()> {
        let guide = guide.as_ref();
        if values.len() != self.samples.len() {
            return Err(anyhow!(
                "Wrong number of values for guide {}: expected {}, found {}",
                guide,
                self.samples.len(),
                values.len()
            ));
        }
        if let Some(x) = values.iter().find(|x| !(x.is_finite() && **x >= 0.0)) {
            return Err(anyhow!("Illegal count {} for guide {}", x, guide));
        }
        match self.index.entry(Arc::from(guide)) {
            Entry::Occupied(_) => Err(anyhow!("Duplicate entry for guide {}", guide)),
            Entry::Vacant(e) => {
                self.guides.push(e.key().clone());
                e.insert(self.counts.len());
                self.counts.push(values);
                Ok(())
            }
        }
    }

    pub fn guides(&self) -> &[Guide] {
        &self.guides
    }

    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    pub fn n_rows(&self) -> usize {
        self.guides.len()
    }

    pub fn n_samples(&self) -> usize {
        self.samples.len()
    }

    pub fn row(&self, ix: usize) -> &[f64] {
        &self.counts[ix]
    }

    pub fn rows(&self) -> impl Iterator<Item = (&Guide, &[f64])> {
        self.guides
            .iter()
            .zip(self.counts.iter().map(|v| v.as_slice()))
    }

    pub fn column(&self, ix: usize) -> impl Iterator<Item = f64> + '_ {
        self.counts.iter().map(move |v| v[ix])
    }

    pub fn guide_idx(&self, guide: &str) -> Option<usize> {
        self.index.get(guide).copied()
    }

    pub fn sample_idx(&self, sample: &str) -> Option<usize> {
        self.samples.iter().position(|s| s == sample)
    }

    pub fn get(&self, guide: &str, sample: &str) -> Option<f64> {
        let i = self.guide_idx(guide)?;
        let j = self.sample_idx(sample)?;
        Some(self.counts[i][j])
    }

    pub fn rename_sample(&mut self, ix: usize, name: &str) -> anyhow::Result<()> {
        if self.samples.iter().enumerate().any(|(j, s)| j != ix && s == name) {
            Err(anyhow!("Duplicate sample column {}", name))
        } else {
            self.samples[ix] = name.to_owned();
            Ok(())
        }
    }

    /// Full outer join on guide.
    ///
    /// The row set and column set of the result are the unions of the inputs.
    /// Samples present in both tables share a column; cells without a value
    /// in either input are 0.  A cell present in both inputs with different
    /// values is an error.
    pub fn merge(&self, other: &CountTable) -> anyhow::Result<CountTable> {
        let mut samples = self.samples.clone();
        let mut col_map = Vec::with_capacity(other.n_samples());
        for s in other.samples.iter() {
            let j = match samples.iter().position(|t| t == s) {
                Some(j) => j,
                None => {
                    samples.push(s.clone());
                    samples.len() - 1
                }
            };
            col_map.push(j);
        }
        let ns = samples.len();
        let n_old = self.samples.len();

        let mut tab = CountTable {
            guides: self.guides.clone(),
            index: self.index.clone(),
            samples,
            counts: self
                .counts
                .iter()
                .map(|v| {
                    let mut v = v.clone();
                    v.resize(ns, 0.0);
                    v
                })
                .collect(),
        };

        for (g, row) in other.rows() {
            let (i, existing) = match tab.index.get(g) {
                Some(i) => (*i, true),
                None => {
                    let i = tab.counts.len();
                    tab.guides.push(g.clone());
                    tab.index.insert(g.clone(), i);
                    tab.counts.push(vec![0.0; ns]);
                    (i, false)
                }
            };
            for (x, j) in row.iter().zip(col_map.iter()) {
                let c = &mut tab.counts[i][*j];
                if existing && *j < n_old && *c != *x {
                    return Err(anyhow!(
                        "Conflicting counts for guide {} in sample {} ({} and {})",
                        g,
                        tab.samples[*j],
                        c,
                        x
                    ));
                }
                *c = *x;
            }
        }
        trace!(
            "Merged table: {} guides, {} samples",
            tab.n_rows(),
            tab.n_samples()
        );
        Ok(tab)
    }

    /// Write table as tab separated text with a `design` header column
    pub fn write_tsv<W: Write>(&self, wrt: &mut W) -> anyhow::Result<()> {
        write!(wrt, "design")?;
        for s in self.samples.iter() {
            write!(wrt, "\t{}", s)?;
        }
        writeln!(wrt)?;
        for (g, row) in self.rows() {
            write!(wrt, "{}", g)?;
            for x in row.iter() {
                write!(wrt, "\t{}", fmt_value(*x))?;
            }
            writeln!(wrt)?;
        }
        Ok(())
    }
}

/// Read a count table from a tab separated file.
///
/// The first line is a header with `design` as the first column followed by
/// the sample names.  Subsequent lines have the guide identifier followed by
/// one count per sample.  Empty lines are ignored.
pub fn read_count_table<P: AsRef<Path>>(fname: P) -> anyhow::Result<CountTable> {
    let fname = fname.as_ref();
    debug!("Reading count table from {}", fname.display());
    let mut rdr = CompressIo::new()
        .path(fname)
        .bufreader()
        .with_context(|| format!("Could not open {} for input", fname.display()))?;

    let mut buf = String::new();
    let mut line = 0;
    let mut table: Option<CountTable> = None;

    while let Some(fields) = get_next_line(&mut rdr, &mut buf)
        .with_context(|| format!("Error after reading {} lines from {}", line, fname.display()))?
    {
        line += 1;
        if fields.len() == 1 && fields[0].is_empty() {
            continue;
        }
        match table.as_mut() {
            None => {
                if fields[0] != "design" {
                    return Err(anyhow!(
                        "{}:{} Expected header line starting with 'design'",
                        fname.display(),
                        line
                    ));
                }
                let samples = fields[1..].iter().map(|s| s.to_string()).collect();
                table = Some(
                    CountTable::new(samples)
                        .with_context(|| format!("{}:{} Bad header", fname.display(), line))?,
                );
            }
            Some(t) => {
                if fields.len() != t.n_samples() + 1 {
                    return Err(anyhow!(
                        "{}:{} Expected {} columns, found {}",
                        fname.display(),
                        line,
                        t.n_samples() + 1,
                        fields.len()
                    ));
                }
                let values = fields[1..]
                    .iter()
                    .map(|s| s.parse::<f64>())
                    .collect::<Result<Vec<_>, _>>()
                    .with_context(|| {
                        format!("{}:{} Error reading counts", fname.display(), line)
                    })?;
                t.add_row(fields[0], values)
                    .with_context(|| format!("{}:{}", fname.display(), line))?;
            }
        }
    }

    let table = table.ok_or_else(|| anyhow!("Empty count file {}", fname.display()))?;
    debug!(
        "Read {} guides and {} samples from {}",
        table.n_rows(),
        table.n_samples(),
        fname.display()
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn single(sample: &str, rows: &[(&str, f64)]) -> CountTable {
        let mut t = CountTable::new(vec![sample.to_owned()]).unwrap();
        for (g, x) in rows {
            t.add_row(g, vec![*x]).unwrap();
        }
        t
    }

    #[test]
    fn rejects_bad_rows() {
        let mut t = CountTable::new(vec!["a".to_owned(), "b".to_owned()]).unwrap();
        t.add_row("g1", vec![1.0, 2.0]).unwrap();
        assert!(t.add_row("g1", vec![1.0, 2.0]).is_err());
        assert!(t.add_row("g2", vec![1.0]).is_err());
        assert!(t.add_row("g3", vec![-1.0, 2.0]).is_err());
        assert!(t.add_row("g4", vec![f64::NAN, 2.0]).is_err());
        assert!(CountTable::new(vec!["a".to_owned(), "a".to_owned()]).is_err());
    }

    #[test]
    fn merge_is_outer_join() {
        let a = single("A", &[("g1", 10.0), ("g2", 3.0)]);
        let b = single("B", &[("g2", 4.0), ("g3", 7.0)]);
        let m = a.merge(&b).unwrap();
        assert_eq!(m.n_rows(), 3);
        assert_eq!(m.samples(), &["A".to_owned(), "B".to_owned()]);
        assert_eq!(m.get("g1", "A"), Some(10.0));
        assert_eq!(m.get("g1", "B"), Some(0.0));
        assert_eq!(m.get("g2", "B"), Some(4.0));
        assert_eq!(m.get("g3", "A"), Some(0.0));
        assert_eq!(m.get("g3", "B"), Some(7.0));

        // Every guide from any input is present
        for t in [&a, &b] {
            for g in t.guides() {
                assert!(m.guide_idx(g).is_some());
            }
        }
    }

    #[test]
    fn merge_order_independent() {
        let a = single("A", &[("g1", 10.0), ("g2", 3.0)]);
        let b = single("B", &[("g2", 4.0), ("g3", 7.0)]);
        let ab = a.merge(&b).unwrap();
        let ba = b.merge(&a).unwrap();
        for g in ab.guides() {
            for s in ["A", "B"] {
                assert_eq!(ab.get(g, s), ba.get(g, s));
            }
        }
    }

    #[test]
    fn merge_idempotent() {
        let a = single("A", &[("g1", 10.0), ("g2", 3.0)]);
        let b = single("B", &[("g2", 4.0), ("g3", 7.0)]);
        let m = a.merge(&b).unwrap();
        assert_eq!(m.merge(&m).unwrap(), m);
        assert_eq!(a.merge(&a).unwrap(), a);
    }

    #[test]
    fn merge_conflict() {
        let a = single("A", &[("g1", 10.0)]);
        let b = single("A", &[("g1", 11.0)]);
        assert!(a.merge(&b).is_err());
    }

    #[test]
    fn merge_into_empty() {
        let a = single("A", &[("g1", 10.0)]);
        let m = CountTable::default().merge(&a).unwrap();
        assert_eq!(m, a);
    }

    #[test]
    fn read_and_write() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "design\tA\tB\ng1\t10\t0.0\n\ng2\t3\t4\n").unwrap();
        f.flush().unwrap();
        let t = read_count_table(f.path()).unwrap();
        assert_eq!(t.n_rows(), 2);
        assert_eq!(t.get("g1", "A"), Some(10.0));
        assert_eq!(t.get("g2", "B"), Some(4.0));

        let mut out = Vec::new();
        t.write_tsv(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "design\tA\tB\ng1\t10\t0\ng2\t3\t4\n"
        );
    }

    #[test]
    fn read_errors() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "guide\tA\ng1\t10\n").unwrap();
        f.flush().unwrap();
        assert!(read_count_table(f.path()).is_err());

        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "design\tA\ng1\tten\n").unwrap();
        f.flush().unwrap();
        assert!(read_count_table(f.path()).is_err());

        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "design\tA\tB\ng1\t10\n").unwrap();
        f.flush().unwrap();
        assert!(read_count_table(f.path()).is_err());
    }
}
