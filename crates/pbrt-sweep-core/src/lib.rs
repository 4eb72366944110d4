//! Test-matrix construction for renderer parameter sweeps.
//!
//! This crate provides everything needed to turn a catalog of base test
//! cases and named configuration profiles into concrete renderer invocations:
//! - Test cases and the case catalog
//! - Profiles, suppression sets and the profile catalog
//! - Ordered flag sets with layered overrides
//! - The matrix merge and invocation builder
//! - JSON catalog loading

pub mod case;
pub mod catalog;
pub mod error;
pub mod flags;
pub mod invocation;
pub mod profile;

pub use case::{CaseCatalog, TestCase};
pub use catalog::Catalog;
pub use error::{Result, SweepError};
pub use flags::{FlagSet, FlagValue};
pub use invocation::{merge, Invocation, Matrix, MergedConfig, RunMode, SweepLayout};
pub use profile::{Profile, ProfileCatalog, SAMPLE_DEPENDENT_CASES, UNLIMITED};

/// Renderer flag names the harness produces itself.
pub mod constants {
    /// Input point cloud path
    pub const INPUT_FLAG: &str = "-i";
    /// Camera description path
    pub const CAMERA_FLAG: &str = "--cam";
    /// Illumination export path
    pub const EXPORT_FLAG: &str = "--exportIllumination";
    /// Frame count
    pub const FRAMES_FLAG: &str = "-f";
    /// Samples per pixel
    pub const SAMPLES_FLAG: &str = "--spp";
    /// Path flags resolved from case bookkeeping; profiles may not set them.
    pub const RESERVED_FLAGS: [&str; 3] = [INPUT_FLAG, CAMERA_FLAG, EXPORT_FLAG];
}
