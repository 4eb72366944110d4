//! Case and profile catalogs, built in or loaded from JSON.
//!
//! A catalog file mirrors the built-in catalog's structure: one shared base
//! record, per-case overrides on top of it, and an ordered list of profiles.
//!
//! ```json
//! {
//!   "base": { "data": 1940, "frames": 1, "samples": 1, "camera": 1 },
//!   "cases": [ { "export": "t0" }, { "samples": 128, "export": "t1" } ],
//!   "profiles": [
//!     { "name": "fast", "flags": { "--denoiser": "asvgf", "--vptLimit": 1024 } },
//!     { "name": "limit512", "flags": { "--vptLimit": 512 }, "samples": 256 }
//!   ]
//! }
//! ```
//!
//! Flag values may be strings, numbers, or booleans; each is forwarded as its
//! textual form. A profile's `samples` entry suppresses the built-in
//! sample-dependent case indices that exist in the file; explicit `suppress`
//! indices must all exist.

use std::path::Path;

use serde::Deserialize;

use crate::case::{CaseCatalog, TestCase};
use crate::error::{Result, SweepError};
use crate::flags::FlagSet;
use crate::invocation::Matrix;
use crate::profile::{Profile, ProfileCatalog};

/// The full set of cases and profiles a sweep runs over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    pub cases: CaseCatalog,
    pub profiles: ProfileCatalog,
}

impl Catalog {
    pub fn builtin() -> Self {
        Self {
            cases: CaseCatalog::builtin(),
            profiles: ProfileCatalog::builtin(),
        }
    }

    /// Load and validate a catalog file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SweepError::CatalogRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Parse and validate a catalog from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(text)?;

        let cases = file
            .cases
            .iter()
            .enumerate()
            .map(|(index, fields)| fields.resolve(&file.base, index))
            .collect::<Result<Vec<_>>>()?;
        let cases = CaseCatalog::new(cases);

        let mut profiles = ProfileCatalog::new();
        for entry in file.profiles {
            profiles.push(entry.into_profile(cases.len()))?;
        }
        profiles.validate(cases.len())?;

        Ok(Self { cases, profiles })
    }

    /// Restrict the catalog to the named profiles; an empty list keeps all.
    pub fn select_profiles<S: AsRef<str>>(&mut self, names: &[S]) -> Result<()> {
        if names.is_empty() {
            return Ok(());
        }
        self.profiles.retain_named(names)
    }

    pub fn matrix(&self) -> Matrix<'_> {
        Matrix::new(&self.cases, &self.profiles)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    #[serde(default)]
    base: CaseFields,
    cases: Vec<CaseFields>,
    profiles: Vec<ProfileEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct CaseFields {
    data: Option<u32>,
    camera: Option<u32>,
    frames: Option<u32>,
    samples: Option<u32>,
    export: Option<String>,
}

impl CaseFields {
    fn resolve(&self, base: &Self, index: usize) -> Result<TestCase> {
        fn pick<T: Clone>(
            own: Option<&T>,
            base: Option<&T>,
            index: usize,
            field: &'static str,
        ) -> Result<T> {
            own.or(base)
                .cloned()
                .ok_or(SweepError::IncompleteCase { index, field })
        }

        Ok(TestCase {
            data_id: pick(self.data.as_ref(), base.data.as_ref(), index, "data")?,
            camera_id: pick(self.camera.as_ref(), base.camera.as_ref(), index, "camera")?,
            frames: pick(self.frames.as_ref(), base.frames.as_ref(), index, "frames")?,
            samples: pick(self.samples.as_ref(), base.samples.as_ref(), index, "samples")?,
            export_name: pick(self.export.as_ref(), base.export.as_ref(), index, "export")?,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProfileEntry {
    name: String,
    #[serde(default)]
    flags: FlagSet,
    /// Pinned sample count; also suppresses the sample-dependent cases.
    samples: Option<u32>,
    #[serde(default)]
    suppress: Vec<usize>,
}

impl ProfileEntry {
    fn into_profile(self, case_count: usize) -> Profile {
        let mut profile = Profile::new(self.name, self.flags);
        if let Some(samples) = self.samples {
            profile = profile.with_samples(samples);
            profile.suppressed.retain(|&index| index < case_count);
        }
        profile.suppressing(self.suppress)
    }
}
