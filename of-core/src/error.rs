//! Error types, re-exported from `of-error` so callers only need `of_core`.

pub use of_error::{OctoError, Result};
