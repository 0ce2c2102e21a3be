use std::{fmt, str::FromStr};

use utils::CountTable;

/// Method used to scale counts so that they are comparable between samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormMethod {
    /// Divide by the size factor of the sample (median ratio method of
    /// Anders & Huber (2010), as used by DESeq).  Corrects for sequencing
    /// depth and composition; use this for comparisons between conditions
    MedianRatio,
    /// Divide by the total counts of the sample.  Corrects for sequencing
    /// depth only
    TotalCount,
}

impl FromStr for NormMethod {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "median-ratio" | "median" | "m" => Ok(Self::MedianRatio),
            "total-count" | "total" | "t" => Ok(Self::TotalCount),
            _ => Err("no match (expected median-ratio or total-count)"),
        }
    }
}

impl fmt::Display for NormMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::MedianRatio => write!(f, "median-ratio"),
            Self::TotalCount => write!(f, "total-count"),
        }
    }
}

impl NormMethod {
    /// Per sample scaling factors.  If a sample has no counts its factor is NaN
    pub fn scale_factors(&self, counts: &CountTable) -> Vec<f64> {
        match self {
            Self::MedianRatio => size_factors(counts),
            Self::TotalCount => total_counts(counts),
        }
    }

    pub fn normalize<'a>(&self, counts: &'a CountTable) -> NormalizedCounts<'a> {
        let scale = self.scale_factors(counts);
        for (s, x) in counts.samples().iter().zip(scale.iter()) {
            if x.is_finite() && *x > 0.0 {
                debug!("Scale factor for {} ({}): {}", s, self, x)
            } else {
                warn!(
                    "Scale factor for sample {} is undefined; normalized counts will be NA",
                    s
                )
            }
        }
        let values = counts
            .rows()
            .map(|(_, row)| row.iter().zip(scale.iter()).map(|(x, z)| x / z).collect())
            .collect();
        NormalizedCounts {
            raw: counts,
            method: *self,
            scale,
            values,
        }
    }
}

/// Raw count table with normalized values for every sample
pub struct NormalizedCounts<'a> {
    raw: &'a CountTable,
    method: NormMethod,
    scale: Vec<f64>,
    values: Vec<Vec<f64>>,
}

impl<'a> NormalizedCounts<'a> {
    pub fn raw(&self) -> &'a CountTable {
        self.raw
    }

    pub fn method(&self) -> NormMethod {
        self.method
    }

    pub fn scale(&self) -> &[f64] {
        &self.scale
    }

    pub fn n_rows(&self) -> usize {
        self.values.len()
    }

    /// Normalized values for a guide
    pub fn row(&self, ix: usize) -> &[f64] {
        &self.values[ix]
    }
}

/// Geometric mean of the non-zero values; 1 if all values are zero
pub fn geometric_mean(v: &[f64]) -> f64 {
    let (n, s) = v
        .iter()
        .filter(|x| **x != 0.0)
        .fold((0, 0.0), |(n, s), x| (n + 1, s + x.ln()));
    if n == 0 {
        1.0
    } else {
        (s / (n as f64)).exp()
    }
}

/// Median of values; NaN if v is empty
fn median(v: &mut [f64]) -> f64 {
    let l = v.len();
    if l == 0 {
        return f64::NAN;
    }
    v.sort_unstable_by(|a, b| a.total_cmp(b));
    if l & 1 == 1 {
        v[l >> 1]
    } else {
        0.5 * (v[(l >> 1) - 1] + v[l >> 1])
    }
}

/// Size factors using the median ratio method
///
/// For each guide the geometric mean of the non-zero counts across samples is found,
/// and the counts for the guide are divided by this to give ratios.  The size factor for a
/// sample is the median of the non-zero ratios for that sample.
pub fn size_factors(counts: &CountTable) -> Vec<f64> {
    let ns = counts.n_samples();
    let mut ratios: Vec<Vec<f64>> = vec![Vec::with_capacity(counts.n_rows()); ns];
    let mut zero_rows = 0;
    for (_, row) in counts.rows() {
        let gm = geometric_mean(row);
        if row.iter().all(|x| *x == 0.0) {
            zero_rows += 1;
            continue;
        }
        for (r, x) in ratios.iter_mut().zip(row.iter()) {
            let z = x / gm;
            if z != 0.0 {
                r.push(z)
            }
        }
    }
    if zero_rows > 0 {
        warn!("{} guides have zero counts in all samples", zero_rows)
    }
    ratios.iter_mut().map(|r| median(r)).collect()
}

/// Total counts per sample; NaN if a sample has no counts
pub fn total_counts(counts: &CountTable) -> Vec<f64> {
    (0..counts.n_samples())
        .map(|j| {
            let s: f64 = counts.column(j).sum();
            if s > 0.0 {
                s
            } else {
                f64::NAN
            }
        })
        .collect()
}
