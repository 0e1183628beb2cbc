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

//! Offline decoding of captured reports
//!
//! A capture is a file of consecutive fixed-size records, each one raw status
//! report as read from the hidraw node. Records are fed through the same
//! device path the daemon uses, so the result is the last good report.

use std::path::Path;
use std::time::Duration;

use tracing::{debug, warn};

use of_core::constants::device::MAX_REPORT_LEN;
use of_core::{
    pump, validate_report_len, CaptureReader, FrameOutcome, FrameSource, OctoDevice, OctoError,
    StatusDocument,
};

/// Result of replaying a capture
#[derive(Debug)]
pub struct CaptureSummary {
    pub records: usize,
    pub applied: usize,
    pub ignored: usize,
    pub malformed: usize,
    /// State after the last applied report; `None` if nothing decoded
    pub status: Option<StatusDocument>,
}

/// Replay every frame `source` yields
pub fn decode_source<S>(source: &mut S) -> of_core::Result<CaptureSummary>
where
    S: FrameSource + ?Sized,
{
    // Replay is instantaneous, so any window keeps the last report fresh
    let device = OctoDevice::new(Duration::MAX)?;
    let mut buf = vec![0u8; MAX_REPORT_LEN];
    let mut summary = CaptureSummary {
        records: 0,
        applied: 0,
        ignored: 0,
        malformed: 0,
        status: None,
    };

    loop {
        match pump(source, &device, &mut buf) {
            Ok(None) => break,
            Ok(Some(FrameOutcome::Updated)) => summary.applied += 1,
            Ok(Some(FrameOutcome::Ignored { report_id })) => {
                debug!(record = summary.records, report_id, "Skipping non-status record");
                summary.ignored += 1;
            }
            Err(OctoError::MalformedFrame { len, required }) => {
                warn!(record = summary.records, len, required, "Skipping malformed record");
                summary.malformed += 1;
            }
            Err(e) => return Err(e),
        }
        summary.records += 1;
    }

    if summary.applied > 0 {
        summary.status = Some(StatusDocument::capture(&device));
    }
    Ok(summary)
}

/// Replay a capture file of `report_len`-byte records
pub fn decode_file(path: &Path, report_len: usize) -> of_core::Result<CaptureSummary> {
    validate_report_len(report_len)?;
    let mut reader = CaptureReader::open(path, report_len)?;
    decode_source(&mut reader)
}
