use std::{fs, io::Write};

use anyhow::Context;
use compress_io::compress::CompressIo;
use utils::get_next_line;

use crate::{
    config::Config,
    counter::{CountBuilder, CountRecord},
};

const PROGRESS_LINES: usize = 100_000;

/// Strategy
///
/// Go through the alignment file a line at a time, adding each record to the counts
/// Only when the input has been completely read without errors is the output written
pub fn count_reads(cfg: &Config) -> anyhow::Result<()> {
    debug!("Starting processing");
    let p = cfg.alignment();
    let mut rdr = CompressIo::new()
        .path(p)
        .bufreader()
        .with_context(|| format!("Could not open alignment file {}", p.display()))?;

    let mut diag = match cfg.diagnostics() {
        Some(d) => Some(
            CompressIo::new()
                .path(d)
                .bufwriter()
                .with_context(|| format!("Could not open diagnostics file {}", d.display()))?,
        ),
        None => None,
    };

    let mut builder = CountBuilder::new(cfg.guides(), cfg.id_filter(), cfg.wash_control());
    let mut buf = String::new();
    let mut line = 0;

    while let Some(fields) = get_next_line(&mut rdr, &mut buf)
        .with_context(|| format!("Error after reading {} lines from {}", line, p.display()))?
    {
        line += 1;
        // Skip empty lines
        if fields.len() == 1 && fields[0].is_empty() {
            continue;
        }
        let rec = CountRecord::from_fields(&fields)
            .with_context(|| format!("{}:{} Parse error", p.display(), line))?;
        if let Some(w) = diag.as_mut() {
            if builder.is_wash_control(rec.guide) {
                writeln!(w, "{}", fields.join("\t"))
                    .with_context(|| "Error writing to diagnostics file")?
            }
        }
        builder
            .add_record(&rec)
            .with_context(|| format!("{}:{}", p.display(), line))?;
        if line % PROGRESS_LINES == 0 {
            debug!("{} lines processed", line)
        }
    }

    let summary = builder.finish()?;
    info!(
        "{}: {} alignments read, {} passed identity filter",
        cfg.sample(),
        summary.records,
        summary.passed
    );
    if summary.wash_count > 0 {
        warn!(
            "Wash control present - count: {} in {}",
            summary.wash_count,
            p.display()
        )
    }

    let opath = cfg.output_path();
    if let Some(d) = opath.parent().filter(|d| !d.as_os_str().is_empty()) {
        if !d.exists() {
            fs::create_dir_all(d)
                .with_context(|| format!("Error creating output directory {}", d.display()))?;
        }
    }
    debug!("Writing counts to {}", opath.display());
    let mut wrt = CompressIo::new()
        .path(&opath)
        .bufwriter()
        .with_context(|| format!("Could not open output file {}", opath.display()))?;
    summary
        .table
        .write_tsv(&mut wrt)
        .with_context(|| format!("Error writing counts to {}", opath.display()))
}
