use std::{num::NonZeroUsize, path::PathBuf};

use clap::{
    crate_authors, crate_description, crate_name, crate_version, value_parser, Arg, ArgAction,
    Command,
};

use anyhow::Context;

use utils::{init_log, read_count_table, LogLevel};

use crate::{config::*, group::GroupSet, normalize::NormMethod};

/// Set up definition of command options for clap
fn cli_model() -> Command {
    Command::new(crate_name!())
        .about(crate_description!())
        .version(crate_version!())
        .author(crate_authors!())
        .arg(
            Arg::new("timestamp")
                .short('X')
                .long("timestamp")
                .value_parser(value_parser!(stderrlog::Timestamp))
                .value_name("GRANULARITY")
                .default_value("none")
                .help("Prepend log entries with a timestamp"),
        )
        .arg(
            Arg::new("loglevel")
                .short('l')
                .long("loglevel")
                .value_name("LOGLEVEL")
                .value_parser(value_parser!(LogLevel))
                .ignore_case(true)
                .default_value("warn")
                .help("Set log level"),
        )
        .arg(
            Arg::new("quiet")
                .action(ArgAction::SetTrue)
                .long("quiet")
                .conflicts_with("loglevel")
                .help("Silence all output"),
        )
        .arg(
            Arg::new("threads")
                .short('t')
                .long("threads")
                .value_parser(value_parser!(NonZeroUsize))
                .value_name("INT")
                .help("Set number of calculation threads [default: available cores]"),
        )
        .arg(
            Arg::new("method")
                .short('n')
                .long("normalization")
                .value_parser(value_parser!(NormMethod))
                .value_name("METHOD")
                .default_value("median-ratio")
                .help("Normalization method (median-ratio or total-count)"),
        )
        .arg(
            Arg::new("control")
                .short('c')
                .long("control")
                .value_parser(value_parser!(String))
                .value_name("PREFIX")
                .requires("treatments")
                .help("Prefix of sample names from the control condition"),
        )
        .arg(
            Arg::new("treatments")
                .short('s')
                .long("treatments")
                .value_parser(value_parser!(String))
                .value_name("PREFIX")
                .action(ArgAction::Append)
                .value_delimiter(',')
                .requires("control")
                .help("Prefixes of sample names for the conditions to compare against the control (comma separated)"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output-file")
                .value_parser(value_parser!(PathBuf))
                .value_name("PATH")
                .help("Set output file [default: <stdout>]"),
        )
        .arg(
            Arg::new("counts")
                .value_parser(value_parser!(PathBuf))
                .value_name("COUNTS_FILE")
                .required(true)
                .help("Merged count file (design column followed by one column per sample)"),
        )
}

/// Handle command line options.  Set up Config structure
pub fn handle_cli() -> anyhow::Result<Config> {
    // Get matches from command line
    let m = cli_model().get_matches();

    // Setup logging
    init_log(&m)?;

    debug!("Processing command line options");

    let nt = m
        .get_one::<NonZeroUsize>("threads")
        .map(|x| usize::from(*x))
        .unwrap_or_else(num_cpus::get);

    let method = *m
        .get_one::<NormMethod>("method")
        .expect("Missing default normalization method");

    let counts = read_count_table(m.get_one::<PathBuf>("counts").expect("Missing count file"))
        .with_context(|| "Could not read count file")?;

    // Set up sample groups, checking that they are valid for this table
    let groups = match m.get_one::<String>("control") {
        Some(ctrl) => {
            let treatments: Vec<String> = m
                .get_many::<String>("treatments")
                .expect("Missing treatment groups")
                .cloned()
                .collect();
            Some(
                GroupSet::from_prefixes(counts.samples(), ctrl, &treatments)
                    .with_context(|| "Error setting up sample groups")?,
            )
        }
        None => None,
    };

    let mut cfg = Config::new(counts, method);
    if let Some(g) = groups {
        cfg.set_groups(g)
    }
    if let Some(p) = m.get_one::<PathBuf>("output") {
        cfg.set_output_file(p.to_owned())
    }
    cfg.set_threads(nt);

    Ok(cfg)
}
