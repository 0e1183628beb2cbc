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

use std::io::Write;

use octofan::cli::{self, CliError};
use octofan::logger;

fn main() -> anyhow::Result<()> {
    logger::init_logging();

    let command = match cli::parse_args(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(CliError::MissingCommand) => {
            eprint!("{}", cli::usage());
            std::process::exit(2);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Run 'octofan --help' for usage.");
            std::process::exit(2);
        }
    };

    let output = cli::run(&command)?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
