// Monitor command - resolves the startup configuration, wires the logger,
// metric source and manager together, then runs the operator session loop
// on stdin until `exit`, end of input or Ctrl+C.

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::ArgMatches;

use crate::commands::session::{Reply, SessionCommand, SessionController};
use crate::core::system_monitor::{
    CpuLoadTracker, FileHighlightSink, HighlightSink, MonitorManager, NullHighlightSink,
};
use crate::core::{FileLogger, MonitorConfig, SourceChoice};
use crate::ui;

pub fn execute(matches: &ArgMatches) -> Result<()> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => MonitorConfig::load_from(path)?,
        None => MonitorConfig::load()?,
    };
    apply_flags(&mut config, matches)?;
    prompt_missing(&mut config)?;

    config.validate().context("Invalid startup configuration")?;

    let controller = Arc::new(build_controller(&config)?);

    let handler_controller = controller.clone();
    ctrlc::set_handler(move || {
        println!();
        ui::warn("Interrupted, stopping monitoring...");
        handler_controller.shutdown();
        std::process::exit(130);
    })
    .map_err(|e| anyhow::anyhow!("Failed to set Ctrl+C handler: {}", e))?;

    let logger = controller.manager().logger();
    ui::info(&format!(
        "Logging to {} (level {})",
        logger.path().display(),
        logger.minimum_severity()
    ));
    ui::dimmed("Type 'help' for the list of commands");

    if let Some(mode) = config.mode.clone() {
        let outcome = controller.execute(SessionCommand::Start { mode, level: None });
        if let Err(e) = handle(outcome) {
            controller.shutdown();
            return Err(e);
        }
    }

    let result = run_session(&controller);
    controller.shutdown();
    result?;

    ui::success("Monitoring stopped, log file closed");
    Ok(())
}

/// Command-line flags override whatever the config file said.
fn apply_flags(config: &mut MonitorConfig, matches: &ArgMatches) -> Result<()> {
    if let Some(file) = matches.get_one::<PathBuf>("file") {
        config.log_file = Some(file.clone());
    }
    if let Some(level) = matches.get_one::<String>("level") {
        config.level = Some(level.clone());
    }
    if let Some(mode) = matches.get_one::<String>("mode") {
        config.mode = Some(mode.clone());
    }
    if let Some(path) = matches.get_one::<PathBuf>("highlight") {
        config.highlight_file = Some(path.clone());
    }
    if matches.get_flag("no-highlight") {
        config.highlight_file = None;
    }
    if let Some(&interval_ms) = matches.get_one::<u64>("interval-ms") {
        config.interval_ms = interval_ms;
    }
    if let Some(source) = matches.get_one::<String>("source") {
        config.source = source.parse::<SourceChoice>()?;
    }
    Ok(())
}

fn prompt_missing(config: &mut MonitorConfig) -> Result<()> {
    if config.log_file.is_none() {
        config.log_file = Some(PathBuf::from(ui::prompt_required("Log file name")?));
    }
    if config.level.is_none() {
        config.level = Some(ui::prompt_required(
            "Initial log level (info, warning, error)",
        )?);
    }
    Ok(())
}

/// Expects a configuration that passed [`MonitorConfig::validate`].
fn build_controller(config: &MonitorConfig) -> Result<SessionController> {
    let level = config.startup_level();
    let log_file = config
        .log_file
        .as_ref()
        .context("A log file name is required")?;

    let logger = Arc::new(FileLogger::open(log_file, level)?);
    let source = config.source.build(Arc::new(CpuLoadTracker::new()))?;

    let highlight: Arc<dyn HighlightSink> = match &config.highlight_file {
        Some(path) => Arc::new(FileHighlightSink::new(path.clone())),
        None => Arc::new(NullHighlightSink),
    };

    let manager = MonitorManager::new(source, logger)
        .with_highlight(highlight)
        .with_interval(config.interval());

    Ok(SessionController::new(Arc::new(manager), level))
}

fn run_session(controller: &SessionController) -> Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        ui::command_prompt()?;

        let Some(line) = lines.next() else {
            // End of input behaves like `exit`
            println!();
            return Ok(());
        };
        let line = line.context("Failed to read command")?;

        if line.trim().is_empty() {
            continue;
        }

        if handle(controller.execute_line(&line))? == Flow::Exit {
            return Ok(());
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// Print the outcome of one command. Usage errors are reported and the
/// session continues; anything else ends it.
fn handle(outcome: crate::Result<Reply>) -> Result<Flow> {
    let reply = match outcome {
        Ok(reply) => reply,
        Err(e) if e.is_usage() => {
            ui::error(&e.to_string());
            return Ok(Flow::Continue);
        }
        Err(e) => return Err(e.into()),
    };

    let message = reply.to_string();
    match reply {
        Reply::Started { .. } | Reply::Stopped { .. } => ui::success(&message),
        Reply::AlreadyRunning { .. } | Reply::NotRunning => ui::warn(&message),
        Reply::LevelChanged(_) | Reply::Status { .. } => ui::info(&message),
        Reply::Help => println!("{}", message),
        Reply::Exit => return Ok(Flow::Exit),
    }

    Ok(Flow::Continue)
}
