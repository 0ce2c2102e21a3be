use std::path::PathBuf;

use clap::{
    crate_authors, crate_description, crate_name, crate_version, value_parser, Arg, ArgAction,
    Command,
};

use anyhow::Context;

use utils::{init_log, LogLevel};

use crate::{config::*, design::read_design_file};

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
            Arg::new("design")
                .short('d')
                .long("design")
                .value_parser(value_parser!(PathBuf))
                .value_name("PATH")
                .required(true)
                .help("Guide design library (FASTA format)"),
        )
        .arg(
            Arg::new("id_filter")
                .short('i')
                .long("id-filter")
                .value_parser(value_parser!(f64))
                .value_name("FLOAT")
                .default_value("100.0")
                .help("Minimum alignment percent identity to include in count"),
        )
        .arg(
            Arg::new("wash_control")
                .short('w')
                .long("wash-control")
                .value_parser(value_parser!(String))
                .value_name("STRING")
                .help("Identifier of wash control (diagnostic only)"),
        )
        .arg(
            Arg::new("diagnostics")
                .short('W')
                .long("diagnostics")
                .value_parser(value_parser!(PathBuf))
                .value_name("PATH")
                .requires("wash_control")
                .help("Write alignment lines for the wash control to file"),
        )
        .arg(
            Arg::new("sample")
                .short('s')
                .long("sample")
                .value_parser(value_parser!(String))
                .value_name("STRING")
                .help("Sample name [default: alignment file name without extensions]"),
        )
        .arg(
            Arg::new("output_dir")
                .short('o')
                .long("output-dir")
                .value_parser(value_parser!(PathBuf))
                .value_name("PATH")
                .help("Set output directory [default: current directory]"),
        )
        .arg(
            Arg::new("alignment")
                .value_parser(value_parser!(PathBuf))
                .value_name("ALIGNMENT_FILE")
                .required(true)
                .help("Tab separated alignment file (query, guide, percent identity, ...)"),
        )
}

/// Handle command line options.  Set up Config structure
pub fn handle_cli() -> anyhow::Result<Config> {
    // Get matches from command line
    let m = cli_model().get_matches();

    // Setup logging
    init_log(&m)?;

    debug!("Processing command line options");

    let guides = read_design_file(m.get_one::<PathBuf>("design").expect("Missing design file"))
        .with_context(|| "Could not read design library")?;

    let alignment = m
        .get_one::<PathBuf>("alignment")
        .expect("Missing alignment file")
        .to_owned();

    let sample = match m.get_one::<String>("sample") {
        Some(s) => s.to_owned(),
        None => sample_from_path(&alignment).ok_or_else(|| {
            anyhow!(
                "Could not get sample name from {}; use --sample",
                alignment.display()
            )
        })?,
    };
    debug!("Sample name: {}", sample);

    let mut cfg = Config::new(guides, alignment, sample);

    cfg.set_id_filter(*m.get_one::<f64>("id_filter").expect("Missing default id filter"))?;

    if let Some(w) = m.get_one::<String>("wash_control") {
        cfg.set_wash_control(w.to_owned())
    }

    if let Some(p) = m.get_one::<PathBuf>("diagnostics") {
        cfg.set_diagnostics(p.to_owned())
    }

    if let Some(p) = m.get_one::<PathBuf>("output_dir") {
        cfg.set_output_dir(p.to_owned())
    }

    Ok(cfg)
}
