//! Execution harness for renderer parameter sweeps.
//!
//! Runs every invocation of a sweep matrix against an external renderer and
//! then fans out an external image comparator over the produced images.

pub mod compare;
pub mod runner;
pub mod sweep;

pub use compare::{ComparisonResult, ComparisonSweep};
pub use runner::{RunResult, Runner};
pub use sweep::{Sweep, SweepReport};

use std::path::{Path, PathBuf};

use image::ImageFormat;
use pbrt_sweep_core::SweepError;
use thiserror::Error;

/// Errors that abort a sweep or a comparison pass.
#[derive(Error, Debug)]
pub enum HarnessError {
    /// Catalog or output-directory failure from the core crate.
    #[error("Sweep error: {0}")]
    Core(#[from] SweepError),
    /// Reading a directory or writing a log failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The renderer or comparator could not be started.
    #[error("Failed to launch {program}: {source}")]
    Launch {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The renderer path does not resolve to an existing file.
    #[error("Executable not found: {path} ({source})")]
    Executable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, HarnessError>;

/// Comparison pass configuration.
#[derive(Debug, Clone)]
pub struct CompareConfig {
    /// Comparator program, looked up on `PATH` when not a path.
    pub comparator: PathBuf,
    /// Directory holding the reference images.
    pub reference_dir: PathBuf,
    /// Output formats that are compared; other files are ignored.
    pub formats: Vec<ImageFormat>,
    /// Display/metric flags passed to every comparator call.
    pub flags: Vec<String>,
}

impl CompareConfig {
    /// Defaults with the reference directory under `work_dir`.
    pub fn for_work_dir(work_dir: &Path) -> Self {
        Self {
            reference_dir: work_dir.join(DEFAULT_REFERENCE_PROFILE),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_comparator(mut self, comparator: impl Into<PathBuf>) -> Self {
        self.comparator = comparator.into();
        self
    }

    #[must_use]
    pub fn with_reference_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.reference_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_formats(mut self, formats: impl IntoIterator<Item = ImageFormat>) -> Self {
        self.formats = formats.into_iter().collect();
        self
    }
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            comparator: PathBuf::from("flip"),
            reference_dir: PathBuf::from(DEFAULT_REFERENCE_PROFILE),
            formats: vec![ImageFormat::OpenExr],
            flags: vec!["-nexm".to_string()],
        }
    }
}

/// Profile whose output directory serves as the comparison reference.
pub const DEFAULT_REFERENCE_PROFILE: &str = "reference";
