use anyhow::Context;
use compress_io::compress::CompressIo;
use utils::{read_count_table, CountTable};

use crate::{config::Config, sample::CountFile};

/// Read a per sample count file and label its count column with the sample name
fn read_sample_counts(f: &CountFile) -> anyhow::Result<CountTable> {
    let mut t = read_count_table(f.path())?;
    if t.n_samples() != 1 {
        return Err(anyhow!(
            "Expected a single count column in {}, found {}",
            f.path().display(),
            t.n_samples()
        ));
    }
    t.rename_sample(0, f.sample())?;
    Ok(t)
}

/// Outer join of the count tables of all samples
pub fn merge_count_files(files: &[CountFile]) -> anyhow::Result<CountTable> {
    let mut merged = CountTable::default();
    for f in files {
        debug!("Merging counts for sample {}", f.sample());
        let t = read_sample_counts(f)
            .with_context(|| format!("Error reading counts for sample {}", f.sample()))?;
        merged = merged
            .merge(&t)
            .with_context(|| format!("Error merging counts for sample {}", f.sample()))?;
    }
    Ok(merged)
}

pub fn merge_samples(cfg: &Config) -> anyhow::Result<()> {
    debug!("Starting processing");
    let merged = merge_count_files(cfg.count_files())?;
    info!(
        "Merged counts for {} guides from {} samples",
        merged.n_rows(),
        merged.n_samples()
    );

    let mut wrt = CompressIo::new()
        .opt_path(cfg.output_file())
        .bufwriter()
        .with_context(|| "Failed to open output file")?;
    merged
        .write_tsv(&mut wrt)
        .with_context(|| "Error writing merged counts")
}
