use std::path::{Path, PathBuf};

use utils::CountTable;

use crate::{group::GroupSet, normalize::NormMethod};

/// Config
///
/// Configuration info for the program
/// This is generated from the command line arguments
/// Once set it is read only
///
/// counts - merged count table
/// method - normalization method
/// groups - control and treatment groups (if differential statistics are wanted)
/// output_file - output file (stdout if not set)
/// threads - number of threads for the statistics calculation
///
pub struct Config {
    counts: CountTable,
    method: NormMethod,
    groups: Option<GroupSet>,
    output_file: Option<PathBuf>,
    threads: usize,
}

impl Config {
    pub fn new(counts: CountTable, method: NormMethod) -> Self {
        Self {
            counts,
            method,
            groups: None,
            output_file: None,
            threads: 1,
        }
    }

    pub fn set_groups(&mut self, groups: GroupSet) {
        self.groups = Some(groups)
    }

    pub fn set_output_file(&mut self, p: PathBuf) {
        self.output_file = Some(p)
    }

    pub fn set_threads(&mut self, nt: usize) {
        self.threads = nt
    }

    pub fn counts(&self) -> &CountTable {
        &self.counts
    }

    pub fn method(&self) -> NormMethod {
        self.method
    }

    pub fn groups(&self) -> Option<&GroupSet> {
        self.groups.as_ref()
    }

    pub fn output_file(&self) -> Option<&Path> {
        self.output_file.as_deref()
    }

    pub fn threads(&self) -> usize {
        self.threads
    }
}
