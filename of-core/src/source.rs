//! Frame sources
//!
//! A frame source yields one raw report per call. On Linux a hidraw node does
//! exactly that: every `read` returns a single input report, report id first.
//! Capture files are consecutive fixed-size records of the same bytes.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tracing::debug;

use crate::device::{FrameOutcome, OctoDevice};
use crate::error::{OctoError, Result};

/// Anything that produces raw reports
#[cfg_attr(test, mockall::automock)]
pub trait FrameSource {
    /// Read one frame into `buf`, returning its length. 0 means end of stream.
    fn read_frame(&mut self, buf: &mut [u8]) -> Result<usize>;
}

/// Reads one report per `read` call, as hidraw delivers them
pub struct ReportReader<R> {
    inner: R,
}

impl<R: Read> ReportReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl ReportReader<File> {
    /// Open a hidraw node read-only
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => OctoError::DeviceNotFound(path.to_path_buf()),
            _ => OctoError::FileRead {
                path: path.to_path_buf(),
                source: e,
            },
        })?;
        debug!(path = %path.display(), "Opened report source");
        Ok(Self::new(file))
    }
}

impl<R: Read> FrameSource for ReportReader<R> {
    fn read_frame(&mut self, buf: &mut [u8]) -> Result<usize> {
        loop {
            match self.inner.read(buf) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// Reads fixed-size records from a capture
pub struct CaptureReader<R> {
    inner: R,
    record_len: usize,
}

impl<R: Read> CaptureReader<R> {
    pub fn new(inner: R, record_len: usize) -> Self {
        Self { inner, record_len }
    }
}

impl CaptureReader<io::BufReader<File>> {
    pub fn open(path: &Path, record_len: usize) -> Result<Self> {
        let file = File::open(path).map_err(|e| OctoError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self::new(io::BufReader::new(file), record_len))
    }
}

impl<R: Read> FrameSource for CaptureReader<R> {
    /// A truncated final record is returned as-is; the decoder rejects it.
    fn read_frame(&mut self, buf: &mut [u8]) -> Result<usize> {
        if buf.len() < self.record_len {
            return Err(OctoError::config(format!(
                "read buffer of {} bytes cannot hold {}-byte records",
                buf.len(),
                self.record_len
            )));
        }

        let record = &mut buf[..self.record_len];
        let mut filled = 0;
        while filled < record.len() {
            match self.inner.read(&mut record[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(filled)
    }
}

/// Move one frame from `source` into `device`
///
/// Returns `None` at end of stream.
pub fn pump<S>(source: &mut S, device: &OctoDevice, buf: &mut [u8]) -> Result<Option<FrameOutcome>>
where
    S: FrameSource + ?Sized,
{
    let n = source.read_frame(buf)?;
    if n == 0 {
        return Ok(None);
    }
    device.handle_frame(&buf[..n]).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::device::{MAX_REPORT_LEN, MIN_REPORT_LEN, STATUS_REPORT_ID};
    use crate::data::SensorType;
    use std::io::Cursor;
    use std::time::Duration;

    fn status_frame(fan1: u16) -> Vec<u8> {
        let mut frame = vec![0u8; MIN_REPORT_LEN];
        frame[0] = STATUS_REPORT_ID;
        frame[133..135].copy_from_slice(&fan1.to_be_bytes());
        frame
    }

    fn fill(buf: &mut [u8], frame: &[u8]) -> usize {
        buf[..frame.len()].copy_from_slice(frame);
        frame.len()
    }

    #[test]
    fn test_pump_applies_status_report() {
        let dev = OctoDevice::new(Duration::from_secs(2)).unwrap();
        let mut source = MockFrameSource::new();
        source
            .expect_read_frame()
            .times(1)
            .returning(|buf| Ok(fill(buf, &status_frame(1200))));

        let mut buf = [0u8; MAX_REPORT_LEN];
        let outcome = pump(&mut source, &dev, &mut buf).unwrap();
        assert_eq!(outcome, Some(FrameOutcome::Updated));
        assert_eq!(dev.get_value(SensorType::Speed, 1).unwrap(), 1200);
    }

    #[test]
    fn test_pump_ignored_report_keeps_cache_stale() {
        let dev = OctoDevice::new(Duration::from_secs(2)).unwrap();
        let mut source = MockFrameSource::new();
        source
            .expect_read_frame()
            .returning(|buf| Ok(fill(buf, &[0x02, 0x10, 0x20])));

        let mut buf = [0u8; MAX_REPORT_LEN];
        let outcome = pump(&mut source, &dev, &mut buf).unwrap();
        assert_eq!(outcome, Some(FrameOutcome::Ignored { report_id: 0x02 }));
        assert!(dev.cache().last_updated().is_none());
    }

    #[test]
    fn test_pump_end_of_stream() {
        let dev = OctoDevice::new(Duration::from_secs(2)).unwrap();
        let mut source = MockFrameSource::new();
        source.expect_read_frame().returning(|_| Ok(0));

        let mut buf = [0u8; MAX_REPORT_LEN];
        assert_eq!(pump(&mut source, &dev, &mut buf).unwrap(), None);
    }

    #[test]
    fn test_pump_propagates_source_errors() {
        let dev = OctoDevice::new(Duration::from_secs(2)).unwrap();
        let mut source = MockFrameSource::new();
        source
            .expect_read_frame()
            .returning(|_| Err(io::Error::new(io::ErrorKind::BrokenPipe, "unplugged").into()));

        let mut buf = [0u8; MAX_REPORT_LEN];
        assert!(matches!(pump(&mut source, &dev, &mut buf), Err(OctoError::Io(_))));
    }

    #[test]
    fn test_capture_reader_records() {
        let mut bytes = status_frame(1000);
        bytes.extend(status_frame(2000));
        bytes.extend(&status_frame(3000)[..50]);

        let mut reader = CaptureReader::new(Cursor::new(bytes), MIN_REPORT_LEN);
        let mut buf = [0u8; MAX_REPORT_LEN];
        assert_eq!(reader.read_frame(&mut buf).unwrap(), MIN_REPORT_LEN);
        assert_eq!(reader.read_frame(&mut buf).unwrap(), MIN_REPORT_LEN);
        assert_eq!(&buf[133..135], &2000u16.to_be_bytes());
        assert_eq!(reader.read_frame(&mut buf).unwrap(), 50);
        assert_eq!(reader.read_frame(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_capture_reader_small_buffer() {
        let mut reader = CaptureReader::new(Cursor::new(vec![0u8; 300]), MIN_REPORT_LEN);
        let mut buf = [0u8; 64];
        assert!(reader.read_frame(&mut buf).is_err());
    }

    #[test]
    fn test_report_reader_open_missing_device() {
        let err = ReportReader::open(Path::new("/nonexistent/hidraw99")).err().unwrap();
        assert!(matches!(err, OctoError::DeviceNotFound(_)));
    }
}
