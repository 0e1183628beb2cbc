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

use tracing_subscriber::EnvFilter;

use of_core::constants::env;

/// Level used when `OCTOFAN_LOG` is not set
pub const DEFAULT_FILTER: &str = "warn";

/// Filter directive for the CLI: `OCTOFAN_LOG` if set and non-empty, else `warn`
pub fn log_filter() -> String {
    match std::env::var(env::LOG) {
        Ok(v) if !v.trim().is_empty() => v,
        _ => DEFAULT_FILTER.to_string(),
    }
}

/// Log to stderr so command output on stdout stays clean
pub fn init_logging() {
    let filter = EnvFilter::try_new(log_filter()).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(filter)
        .try_init();
}
