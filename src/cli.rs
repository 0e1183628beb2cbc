/*
 * This file is part of Octofan.
 *
 * Copyright (C) 2025 Octofan contributors
 *
 * Octofan is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Octofan is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Octofan. If not, see <https://www.gnu.org/licenses/>.
 */

//! Command line handling for `octofan`

use std::path::PathBuf;

use anyhow::Context;
use thiserror::Error;

use of_core::constants::{device, paths};
use of_core::StatusDocument;

use crate::capture;
use crate::render;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CliError {
    #[error("missing command")]
    MissingCommand,
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("unknown argument: {0}")]
    UnknownArgument(String),
    #[error("{0} requires a value")]
    MissingValue(&'static str),
    #[error("invalid number for {flag}: {value}")]
    InvalidNumber { flag: &'static str, value: String },
    #[error("no status report in {0}")]
    NoReports(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Decode {
        capture: PathBuf,
        json: bool,
        report_len: usize,
    },
    Labels,
    Status {
        path: PathBuf,
        json: bool,
    },
    Help,
    Version,
}

/// Parse arguments after the program name
pub fn parse_args<I>(args: I) -> Result<Command, CliError>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let command = args.next().ok_or(CliError::MissingCommand)?;

    match command.as_str() {
        "-h" | "--help" | "help" => Ok(Command::Help),
        "-v" | "--version" => Ok(Command::Version),
        "labels" => match args.next() {
            None => Ok(Command::Labels),
            Some(extra) => Err(CliError::UnknownArgument(extra)),
        },
        "decode" => {
            let mut capture = None;
            let mut json = false;
            let mut report_len = device::MIN_REPORT_LEN;
            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "--json" => json = true,
                    "--report-len" => {
                        let value = args.next().ok_or(CliError::MissingValue("--report-len"))?;
                        report_len = value.parse().map_err(|_| CliError::InvalidNumber {
                            flag: "--report-len",
                            value,
                        })?;
                    }
                    _ if arg.starts_with('-') => return Err(CliError::UnknownArgument(arg)),
                    _ if capture.is_none() => capture = Some(PathBuf::from(arg)),
                    _ => return Err(CliError::UnknownArgument(arg)),
                }
            }
            let capture = capture.ok_or(CliError::MissingValue("decode"))?;
            Ok(Command::Decode {
                capture,
                json,
                report_len,
            })
        }
        "status" => {
            let mut path = None;
            let mut json = false;
            for arg in args {
                match arg.as_str() {
                    "--json" => json = true,
                    _ if arg.starts_with('-') => return Err(CliError::UnknownArgument(arg)),
                    _ if path.is_none() => path = Some(PathBuf::from(arg)),
                    _ => return Err(CliError::UnknownArgument(arg)),
                }
            }
            Ok(Command::Status {
                path: path.unwrap_or_else(|| PathBuf::from(paths::STATUS_FILE)),
                json,
            })
        }
        other => Err(CliError::UnknownCommand(other.to_string())),
    }
}

pub fn usage() -> String {
    format!(
        "octofan {} - Aquacomputer Octo telemetry\n\
         \n\
         USAGE:\n    \
             octofan decode <capture> [--json] [--report-len N]\n    \
             octofan labels\n    \
             octofan status [path] [--json]\n\
         \n\
         COMMANDS:\n    \
             decode    Decode a capture of raw reports and show the last one\n    \
             labels    Show the field layout of the status report\n    \
             status    Show the daemon's status document (default: {})\n\
         \n\
         ENVIRONMENT:\n    \
             OCTOFAN_LOG   Log filter (default: warn)\n",
        env!("CARGO_PKG_VERSION"),
        paths::STATUS_FILE
    )
}

/// Run a command and return what it prints on stdout
pub fn run(command: &Command) -> anyhow::Result<String> {
    match command {
        Command::Help => Ok(usage()),
        Command::Version => Ok(format!("octofan {}\n", env!("CARGO_PKG_VERSION"))),
        Command::Labels => Ok(render::render_labels()),
        Command::Decode {
            capture: path,
            json,
            report_len,
        } => {
            let summary = capture::decode_file(path, *report_len)
                .with_context(|| format!("Failed to decode {}", path.display()))?;
            if *json {
                let doc = summary
                    .status
                    .as_ref()
                    .ok_or_else(|| CliError::NoReports(path.clone()))?;
                Ok(format!("{}\n", doc.to_json()?))
            } else {
                Ok(render::render_capture(&summary))
            }
        }
        Command::Status { path, json } => {
            let doc = StatusDocument::load_current(path)
                .with_context(|| format!("Failed to read status from {}", path.display()))?;
            if *json {
                Ok(format!("{}\n", doc.to_json()?))
            } else {
                Ok(render::render_status(&doc))
            }
        }
    }
}
