//! Operator command surface for a running monitor.
//!
//! Lines such as `start cpu warning`, `change error` or `stop` are parsed
//! into [`SessionCommand`]s and applied to a [`MonitorManager`] and its
//! logger by [`SessionController`].

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::core::logger::FileLogger;
use crate::core::severity::{translate_level, Severity};
use crate::core::system_monitor::{
    MonitorManager, ResourceKind, SessionInfo, StartOutcome, StopOutcome,
};
use crate::error::{MonitorError, Result};

pub const USAGE: &str = "\
Commands:
  start <cpu|memory|disk|all> [level]  start monitoring (level: info, warning, error)
  stop                                 stop the running session
  change <level>                       change the log file level
  status                               show the current session
  help                                 show this help
  exit                                 stop monitoring and quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Start { mode: String, level: Option<String> },
    Stop,
    Change { level: String },
    Status,
    Help,
    Exit,
}

impl FromStr for SessionCommand {
    type Err = MonitorError;

    fn from_str(line: &str) -> Result<Self> {
        let mut tokens = line.split_whitespace();
        let keyword = tokens
            .next()
            .ok_or_else(|| MonitorError::invalid_command("empty command"))?
            .to_ascii_lowercase();
        let args: Vec<&str> = tokens.collect();

        let command = match (keyword.as_str(), args.as_slice()) {
            ("start", [mode]) => SessionCommand::Start {
                mode: mode.to_string(),
                level: None,
            },
            ("start", [mode, level]) => SessionCommand::Start {
                mode: mode.to_string(),
                level: Some(level.to_string()),
            },
            ("start", _) => {
                return Err(MonitorError::invalid_command(
                    "usage: start <cpu|memory|disk|all> [level]",
                ))
            }
            ("stop", []) => SessionCommand::Stop,
            ("change", [level]) => SessionCommand::Change {
                level: level.to_string(),
            },
            ("change", _) => return Err(MonitorError::invalid_command("usage: change <level>")),
            ("status", []) => SessionCommand::Status,
            ("help", _) => SessionCommand::Help,
            ("exit" | "quit", []) => SessionCommand::Exit,
            ("stop" | "status" | "exit" | "quit", _) => {
                return Err(MonitorError::invalid_command(format!(
                    "'{}' takes no arguments",
                    keyword
                )))
            }
            (other, _) => {
                return Err(MonitorError::invalid_command(format!(
                    "unknown command '{}' (type 'help' for the list of commands)",
                    other
                )))
            }
        };

        Ok(command)
    }
}

/// What a command did, for the caller to report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Started {
        mode: ResourceKind,
        samplers: usize,
        level: Severity,
    },
    AlreadyRunning {
        mode: ResourceKind,
    },
    Stopped {
        joined: usize,
    },
    NotRunning,
    LevelChanged(Severity),
    Status {
        session: SessionInfo,
        /// Sampler threads still alive
        live: usize,
        log_level: Severity,
    },
    Help,
    Exit,
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Started {
                mode,
                samplers,
                level,
            } => write!(
                f,
                "Monitoring {} started ({} sampler{}, highlighting {} readings)",
                mode,
                samplers,
                if *samplers == 1 { "" } else { "s" },
                level
            ),
            Reply::AlreadyRunning { mode } => {
                write!(f, "Monitoring already running ({}); stop it first", mode)
            }
            Reply::Stopped { joined } => write!(f, "Monitoring stopped ({} joined)", joined),
            Reply::NotRunning => f.write_str("No monitoring processes to stop"),
            Reply::LevelChanged(level) => write!(f, "Log level set to {}", level),
            Reply::Status {
                session,
                live,
                log_level,
            } => match session.mode {
                Some(mode) => write!(
                    f,
                    "Session {}: {} ({}/{} samplers alive), log level {}",
                    session.state, mode, live, session.samplers, log_level
                ),
                None => write!(f, "Session {}, log level {}", session.state, log_level),
            },
            Reply::Help => f.write_str(USAGE),
            Reply::Exit => f.write_str("Bye"),
        }
    }
}

/// Applies operator commands to one manager and its logger.
pub struct SessionController {
    manager: Arc<MonitorManager>,
    logger: Arc<FileLogger>,
    default_level: Severity,
}

impl SessionController {
    /// `default_level` is used by `start` when no level is given.
    pub fn new(manager: Arc<MonitorManager>, default_level: Severity) -> Self {
        let logger = manager.logger().clone();
        Self {
            manager,
            logger,
            default_level,
        }
    }

    pub fn manager(&self) -> &Arc<MonitorManager> {
        &self.manager
    }

    pub fn execute_line(&self, line: &str) -> Result<Reply> {
        self.execute(line.parse()?)
    }

    pub fn execute(&self, command: SessionCommand) -> Result<Reply> {
        match command {
            SessionCommand::Start { mode, level } => {
                let level = match level {
                    Some(token) => parse_session_level(&token)?,
                    None => self.default_level,
                };

                match self.manager.start(&mode, level)? {
                    StartOutcome::Started { mode, samplers } => Ok(Reply::Started {
                        mode,
                        samplers,
                        level,
                    }),
                    StartOutcome::AlreadyRunning { mode } => Ok(Reply::AlreadyRunning { mode }),
                }
            }
            SessionCommand::Stop => Ok(match self.manager.stop() {
                StopOutcome::Stopped { joined } => Reply::Stopped { joined },
                StopOutcome::NotRunning => Reply::NotRunning,
            }),
            SessionCommand::Change { level } => {
                // Unknown is a legal filter: it lets every record through
                let level = translate_level(&level);
                self.logger.set_minimum_severity(level);
                Ok(Reply::LevelChanged(level))
            }
            SessionCommand::Status => Ok(Reply::Status {
                session: self.manager.info(),
                live: self.manager.active_samplers(),
                log_level: self.logger.minimum_severity(),
            }),
            SessionCommand::Help => Ok(Reply::Help),
            SessionCommand::Exit => Ok(Reply::Exit),
        }
    }

    /// Stop the session and close the log file.
    pub fn shutdown(&self) {
        self.manager.stop();
        self.logger.shutdown();
    }
}

/// Session levels must name a real tier.
fn parse_session_level(token: &str) -> Result<Severity> {
    match translate_level(token) {
        Severity::Unknown => Err(MonitorError::invalid_level(token)),
        level => Ok(level),
    }
}
