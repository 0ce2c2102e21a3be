use anyhow::Context;
use compress_io::compress::CompressIo;

use crate::{config::Config, de::differential_stats, io::write_results};

/// Strategy
///
/// Normalize the count table using the chosen method, then (if groups were given)
/// compare each treatment group against the control for every guide.
/// Finally write out the raw and normalized counts with the statistics
pub fn process_counts(cfg: &Config) -> anyhow::Result<()> {
    debug!("Starting processing");
    let counts = cfg.counts();
    info!(
        "Normalizing counts for {} guides and {} samples using {} method",
        counts.n_rows(),
        counts.n_samples(),
        cfg.method()
    );
    let norm = cfg.method().normalize(counts);
    debug!("{} scale factors: {:?}", norm.method(), norm.scale());

    let stats = match cfg.groups() {
        Some(g) => differential_stats(&norm, g, cfg.threads())?,
        None => {
            info!("No groups specified; skipping differential statistics");
            Vec::new()
        }
    };

    let mut wrt = CompressIo::new()
        .opt_path(cfg.output_file())
        .bufwriter()
        .with_context(|| "Failed to open output file")?;

    write_results(&mut wrt, &norm, &stats).with_context(|| "Error writing results")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{group::GroupSet, normalize::NormMethod};
    use std::fs;
    use utils::read_count_table;

    #[test]
    fn end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("merged_counts.tsv");
        fs::write(
            &input,
            "design\tctrl_1\tctrl_2\tko_1\tko_2\n\
             g1\t10\t12\t40\t44\n\
             g2\t20\t22\t21\t19\n\
             g3\t0\t0\t0\t0\n\
             g4\t30\t28\t31\t33\n",
        )
        .unwrap();
        let out = dir.path().join("results.tsv");

        let counts = read_count_table(&input).unwrap();
        let groups = GroupSet::from_prefixes(counts.samples(), "ctrl", &["ko".into()]).unwrap();
        let mut cfg = Config::new(counts, NormMethod::MedianRatio);
        cfg.set_groups(groups);
        cfg.set_output_file(out.clone());
        cfg.set_threads(2);
        process_counts(&cfg).unwrap();

        let s = fs::read_to_string(&out).unwrap();
        let lines: Vec<Vec<&str>> = s.lines().map(|l| l.split('\t').collect()).collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0].len(), 11);
        assert_eq!(lines[0][5], "ctrl_1_normalized");
        assert_eq!(lines[0][9], "ko_log2FC");
        assert_eq!(lines[0][10], "ko_pval");

        // Strongly enriched guide
        assert_eq!(lines[1][0], "g1");
        let fc: f64 = lines[1][9].parse().unwrap();
        let p: f64 = lines[1][10].parse().unwrap();
        assert!(fc > 1.0);
        assert!(p > 0.0 && p < 0.05);

        // All zero guide
        assert_eq!(&lines[3][1..], &["0", "0", "0", "0", "0", "0", "0", "0", "NA", "NA"]);
    }
}
