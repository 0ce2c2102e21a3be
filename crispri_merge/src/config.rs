use std::path::{Path, PathBuf};

use crate::sample::CountFile;

pub struct Config {
    count_files: Vec<CountFile>,
    output_file: Option<PathBuf>,
}

impl Config {
    pub fn new(count_files: Vec<CountFile>, output_file: Option<PathBuf>) -> Self {
        Self {
            count_files,
            output_file,
        }
    }

    pub fn count_files(&self) -> &[CountFile] {
        &self.count_files
    }

    pub fn output_file(&self) -> Option<&Path> {
        self.output_file.as_deref()
    }
}
