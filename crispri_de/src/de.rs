use std::{ops::Range, thread};

use crossbeam_channel::bounded;
use utils::{mean, welch_t_test};

use crate::{
    group::{GroupSet, SampleGroup},
    normalize::NormalizedCounts,
};

/// Log2 fold change and p-value for one guide and one treatment group
#[derive(Debug, Clone, Copy)]
pub struct GuideStat {
    pub log2fc: f64,
    pub pval: f64,
}

/// Results for all guides for one treatment group
pub struct GroupStats {
    name: String,
    stats: Vec<GuideStat>,
}

impl GroupStats {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stats(&self) -> &[GuideStat] {
        &self.stats
    }
}

fn group_values(row: &[f64], g: &SampleGroup) -> Vec<f64> {
    g.columns().iter().map(|ix| row[*ix]).collect()
}

/// Compare the normalized values of a guide between a treatment group and the control group.
///
/// log2fc is log2(mean(treatment) / mean(control)), so is infinite or NaN if either mean is 0.
/// pval is from a two sided Welch t-test, and is NaN if either group has fewer than 2 replicates
/// or if neither group has any variation.
pub fn guide_stat(row: &[f64], control: &SampleGroup, treatment: &SampleGroup) -> GuideStat {
    let c = group_values(row, control);
    let t = group_values(row, treatment);
    GuideStat {
        log2fc: (mean(&t) / mean(&c)).log2(),
        pval: welch_t_test(&t, &c).p,
    }
}

// Stats for a block of rows.  Each element of the result has one entry per treatment group
fn block_stats(
    norm: &NormalizedCounts,
    groups: &GroupSet,
    rows: Range<usize>,
) -> Vec<Vec<GuideStat>> {
    rows.map(|i| {
        let row = norm.row(i);
        groups
            .treatments()
            .iter()
            .map(|g| guide_stat(row, groups.control(), g))
            .collect()
    })
    .collect()
}

/// Strategy
///
/// The rows are independent so they are split into contiguous blocks, one per thread.
/// Each thread sends back the results for its block with the block index, and the
/// blocks are then put back together in the original row order.
pub fn differential_stats(
    norm: &NormalizedCounts,
    groups: &GroupSet,
    threads: usize,
) -> anyhow::Result<Vec<GroupStats>> {
    let n = norm.n_rows();
    let nt = threads.max(1).min(n.max(1));
    let block_size = ((n + nt - 1) / nt).max(1);
    let n_blocks = (n + block_size - 1) / block_size;
    debug!(
        "Calculating statistics for {} guides using {} threads",
        n, n_blocks
    );

    let mut blocks: Vec<Option<Vec<Vec<GuideStat>>>> = vec![None; n_blocks];

    thread::scope(|sc| -> anyhow::Result<()> {
        let (snd, rcv) = bounded(n_blocks.max(1));
        let handles: Vec<_> = (0..n_blocks)
            .map(|ix| {
                let snd = snd.clone();
                let rows = ix * block_size..((ix + 1) * block_size).min(n);
                sc.spawn(move || -> anyhow::Result<()> {
                    trace!("Task {} processing rows {:?}", ix, rows);
                    snd.send((ix, block_stats(norm, groups, rows)))?;
                    Ok(())
                })
            })
            .collect();
        drop(snd);

        for (ix, v) in rcv.iter() {
            blocks[ix] = Some(v)
        }
        for h in handles {
            h.join()
                .map_err(|_| anyhow!("Error joining statistics thread"))??
        }
        Ok(())
    })?;

    let mut res: Vec<_> = groups
        .treatments()
        .iter()
        .map(|g| GroupStats {
            name: g.name().to_owned(),
            stats: Vec::with_capacity(n),
        })
        .collect();

    for b in blocks {
        let b = b.ok_or_else(|| anyhow!("Missing results from statistics thread"))?;
        for row in b {
            for (r, s) in res.iter_mut().zip(row) {
                r.stats.push(s)
            }
        }
    }
    Ok(res)
}
