use std::io::Write;

use utils::fmt_value;

use crate::{de::GroupStats, normalize::NormalizedCounts};

/// Write raw counts, normalized counts and (optionally) differential statistics for each guide.
///
/// Columns are `design`, the raw sample columns, then `<sample>_normalized` for every sample,
/// followed by `<group>_log2FC` and `<group>_pval` for each treatment group
pub fn write_results<W: Write>(
    wrt: &mut W,
    norm: &NormalizedCounts,
    stats: &[GroupStats],
) -> anyhow::Result<()> {
    let raw = norm.raw();
    write!(wrt, "design")?;
    for s in raw.samples() {
        write!(wrt, "\t{}", s)?;
    }
    for s in raw.samples() {
        write!(wrt, "\t{}_normalized", s)?;
    }
    for g in stats {
        write!(wrt, "\t{}_log2FC\t{}_pval", g.name(), g.name())?;
    }
    writeln!(wrt)?;

    for (i, (guide, row)) in raw.rows().enumerate() {
        write!(wrt, "{}", guide)?;
        for x in row.iter().chain(norm.row(i).iter()) {
            write!(wrt, "\t{}", fmt_value(*x))?;
        }
        for g in stats {
            let s = &g.stats()[i];
            write!(wrt, "\t{}\t{}", fmt_value(s.log2fc), fmt_value(s.pval))?;
        }
        writeln!(wrt)?;
    }
    Ok(())
}
