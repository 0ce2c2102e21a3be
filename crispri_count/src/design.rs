use std::{collections::HashMap, path::Path, sync::Arc};

use anyhow::Context;
use bio::io::fasta;
use compress_io::compress::CompressIo;
use utils::Guide;

/// GuideSet
///
/// Set of guide identifiers from the design library, kept in the order
/// they appear in the library file
#[derive(Debug, Default)]
pub struct GuideSet {
    guides: Vec<Guide>,
    index: HashMap<Guide, usize>,
}

impl GuideSet {
    /// Add guide to set.  Returns false if the guide was already present
    pub fn insert(&mut self, id: &str) -> bool {
        if self.index.contains_key(id) {
            false
        } else {
            let g: Guide = Arc::from(id);
            self.index.insert(g.clone(), self.guides.len());
            self.guides.push(g);
            true
        }
    }

    pub fn guide_idx(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn guides(&self) -> &[Guide] {
        &self.guides
    }

    pub fn len(&self) -> usize {
        self.guides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guides.is_empty()
    }
}

/// Read guide identifiers from design library (FASTA format)
pub fn read_design_file<P: AsRef<Path>>(fname: P) -> anyhow::Result<GuideSet> {
    let fname = fname.as_ref();
    debug!("Reading in design library from {}", fname.display());

    trace!("Opening design file for reading");
    let rdr = CompressIo::new()
        .path(fname)
        .bufreader()
        .with_context(|| format!("Could not open design file {}", fname.display()))?;

    let mut guides = GuideSet::default();
    for (ix, rec) in fasta::Reader::new(rdr).records().enumerate() {
        let rec = rec.with_context(|| {
            format!(
                "Error reading record {} from design file {}",
                ix + 1,
                fname.display()
            )
        })?;
        rec.check().map_err(|e| {
            anyhow!(
                "Malformed record {} in design file {}: {}",
                ix + 1,
                fname.display(),
                e
            )
        })?;
        if !guides.insert(rec.id()) {
            warn!(
                "Duplicate guide {} in design file {}",
                rec.id(),
                fname.display()
            )
        }
    }

    if guides.is_empty() {
        Err(anyhow!("No guides found in design file {}", fname.display()))
    } else {
        debug!("Found {} guides in design library", guides.len());
        Ok(guides)
    }
}
