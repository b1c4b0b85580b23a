use anyhow::Result;
use clap::{value_parser, Arg, ArgAction, Command};
use std::path::PathBuf;

use resmon::commands;

fn main() -> Result<()> {
    resmon::init_logging();

    let matches = Command::new("resmon")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Background CPU, memory and disk monitor with a severity-filtered log")
        .long_about(
            "Samples CPU, memory and disk usage every interval, classifies each reading \
             (info, warning, error) and appends it to a log file.\n\n\
             Once started, type commands on stdin:\n    \
             start <cpu|memory|disk|all> [level]\n    \
             stop\n    \
             change <level>\n    \
             status\n    \
             exit",
        )
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("PATH")
                .help("Log file to append readings to (prompted for if missing)")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("level")
                .short('l')
                .long("level")
                .value_name("LEVEL")
                .help("Initial log level: info, warning or error (prompted for if missing)"),
        )
        .arg(
            Arg::new("mode")
                .short('m')
                .long("mode")
                .value_name("MODE")
                .help("Start monitoring right away: cpu, memory, disk or all"),
        )
        .arg(
            Arg::new("highlight")
                .long("highlight")
                .value_name("PATH")
                .help("File receiving readings within the session level's band [default: output_app.txt]")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("no-highlight")
                .long("no-highlight")
                .help("Disable the highlighted output file")
                .action(ArgAction::SetTrue)
                .conflicts_with("highlight"),
        )
        .arg(
            Arg::new("interval-ms")
                .long("interval-ms")
                .value_name("MILLIS")
                .help("Sampling interval in milliseconds [default: 2000]")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("source")
                .long("source")
                .value_name("SOURCE")
                .help("Metric backend")
                .value_parser(["auto", "procfs", "sysinfo"]),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .help("Read settings from this JSON file instead of the per-user config")
                .value_parser(value_parser!(PathBuf)),
        )
        .get_matches();

    commands::monitor(&matches)
}
