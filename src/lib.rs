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

//! Octofan - telemetry decoder and CLI for the Aquacomputer Octo
//!
//! The library half of the `octofan` binary: capture decoding, command line
//! parsing and text rendering. Decoding and caching live in `of-core`.

pub mod capture;
pub mod cli;
pub mod logger;
pub mod render;
