use std::path::{Path, PathBuf};

use crate::design::GuideSet;

/// Config
///
/// Configuration info for the program
/// This is generated from the command line arguments
/// Once set it is read only
///
/// guides - guide identifiers from the design library
/// alignment - path to tab separated alignment file
/// sample - sample name, used to generate the output file name
/// id_filter - minimum percent identity for an alignment to be counted
/// wash_control - optional identifier of the wash control
/// diagnostics - optional file to write wash control alignments to
/// output_dir - output directory
///
pub struct Config {
    guides: GuideSet,
    alignment: PathBuf,
    sample: String,
    id_filter: f64,
    wash_control: Option<String>,
    diagnostics: Option<PathBuf>,
    output_dir: Option<PathBuf>,
}

impl Config {
    pub fn new(guides: GuideSet, alignment: PathBuf, sample: String) -> Self {
        Self {
            guides,
            alignment,
            sample,
            id_filter: 100.0,
            wash_control: None,
            diagnostics: None,
            output_dir: None,
        }
    }

    pub fn set_id_filter(&mut self, x: f64) -> anyhow::Result<()> {
        if (0.0..=100.0).contains(&x) {
            self.id_filter = x;
            Ok(())
        } else {
            Err(anyhow!("Identity filter {} is not between 0 and 100", x))
        }
    }

    pub fn set_wash_control(&mut self, s: String) {
        self.wash_control = Some(s)
    }

    pub fn set_diagnostics(&mut self, p: PathBuf) {
        self.diagnostics = Some(p)
    }

    pub fn set_output_dir(&mut self, d: PathBuf) {
        self.output_dir = Some(d)
    }

    pub fn guides(&self) -> &GuideSet {
        &self.guides
    }

    pub fn alignment(&self) -> &Path {
        &self.alignment
    }

    pub fn sample(&self) -> &str {
        &self.sample
    }

    pub fn id_filter(&self) -> f64 {
        self.id_filter
    }

    pub fn wash_control(&self) -> Option<&str> {
        self.wash_control.as_deref()
    }

    pub fn diagnostics(&self) -> Option<&Path> {
        self.diagnostics.as_deref()
    }

    /// Output file is <output_dir>/<sample>_counts.tsv
    pub fn output_path(&self) -> PathBuf {
        let mut p = self
            .output_dir
            .as_ref()
            .map(|p| p.to_owned())
            .unwrap_or_else(PathBuf::new);
        p.push(format!("{}_counts.tsv", self.sample));
        p
    }
}

/// Default sample name from alignment file name, removing any extensions
pub fn sample_from_path(p: &Path) -> Option<String> {
    p.file_name()
        .and_then(|s| s.to_str())
        .and_then(|s| s.split('.').next())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_names() {
        assert_eq!(
            sample_from_path(Path::new("align/S1_rep2.tsv.gz")).as_deref(),
            Some("S1_rep2")
        );
        assert_eq!(
            sample_from_path(Path::new("S1")).as_deref(),
            Some("S1")
        );
        assert!(sample_from_path(Path::new(".hidden")).is_none());
    }

    #[test]
    fn output_path() {
        let mut cfg = Config::new(GuideSet::default(), PathBuf::from("x.tsv"), "S1".to_owned());
        assert_eq!(cfg.output_path(), PathBuf::from("S1_counts.tsv"));
        cfg.set_output_dir(PathBuf::from("out"));
        assert_eq!(cfg.output_path(), PathBuf::from("out/S1_counts.tsv"));
        assert!(cfg.set_id_filter(101.0).is_err());
        assert!(cfg.set_id_filter(97.5).is_ok());
        assert_eq!(cfg.id_filter(), 97.5);
    }
}
