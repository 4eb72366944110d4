//! Named configuration profiles layered on top of test cases.

use std::collections::BTreeSet;

use crate::constants::{RESERVED_FLAGS, SAMPLES_FLAG};
use crate::error::{Result, SweepError};
use crate::flags::FlagSet;

/// Cases whose only purpose is to vary the sample count or convergence.
///
/// A profile that pins `--spp` makes these duplicates of the remaining cases.
pub const SAMPLE_DEPENDENT_CASES: [usize; 3] = [1, 3, 4];

/// Effectively unlimited volumetric path-tracing limit.
pub const UNLIMITED: i64 = (1 << 31) - 1;

/// A named override layer applied across every compatible case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    /// Flags overriding the case's own flags.
    pub flags: FlagSet,
    /// Case indices this profile is not run for.
    pub suppressed: BTreeSet<usize>,
}

impl Profile {
    pub fn new(name: impl Into<String>, flags: FlagSet) -> Self {
        Self {
            name: name.into(),
            flags,
            suppressed: BTreeSet::new(),
        }
    }

    /// Pin the sample count and suppress the cases that only vary it.
    #[must_use]
    pub fn with_samples(mut self, samples: u32) -> Self {
        self.flags.set(SAMPLES_FLAG, samples);
        self.suppressed.extend(SAMPLE_DEPENDENT_CASES);
        self
    }

    /// Suppress additional case indices.
    #[must_use]
    pub fn suppressing(mut self, indices: impl IntoIterator<Item = usize>) -> Self {
        self.suppressed.extend(indices);
        self
    }

    pub fn is_suppressed(&self, case_index: usize) -> bool {
        self.suppressed.contains(&case_index)
    }

    /// Check the profile against a catalog of `case_count` cases.
    pub fn validate(&self, case_count: usize) -> Result<()> {
        if self.name.is_empty() {
            return Err(SweepError::EmptyProfileName);
        }

        for flag in self.flags.names() {
            if !flag.starts_with('-') {
                return Err(SweepError::InvalidFlag {
                    profile: self.name.clone(),
                    flag: flag.to_string(),
                });
            }
            if RESERVED_FLAGS.contains(&flag) {
                return Err(SweepError::ReservedFlag {
                    profile: self.name.clone(),
                    flag: flag.to_string(),
                });
            }
        }

        if let Some(&index) = self.suppressed.iter().find(|&&i| i >= case_count) {
            return Err(SweepError::CaseOutOfRange {
                profile: self.name.clone(),
                index,
                cases: case_count,
            });
        }

        Ok(())
    }
}

/// Ordered mapping from profile name to profile.
///
/// Insertion order is execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileCatalog {
    profiles: Vec<Profile>,
}

impl ProfileCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a profile, rejecting duplicate names.
    pub fn push(&mut self, profile: Profile) -> Result<()> {
        if self.get(&profile.name).is_some() {
            return Err(SweepError::DuplicateProfile(profile.name));
        }
        self.profiles.push(profile);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Profile> {
        self.profiles.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.iter().map(|p| p.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Keep only the named profiles, in catalog order.
    ///
    /// Fails without modifying the catalog if any name is unknown.
    pub fn retain_named<S: AsRef<str>>(&mut self, names: &[S]) -> Result<()> {
        if let Some(unknown) = names.iter().find(|n| self.get(n.as_ref()).is_none()) {
            return Err(SweepError::UnknownProfile(unknown.as_ref().to_string()));
        }
        self.profiles
            .retain(|p| names.iter().any(|n| n.as_ref() == p.name));
        Ok(())
    }

    /// Validate every profile against a catalog of `case_count` cases.
    pub fn validate(&self, case_count: usize) -> Result<()> {
        self.profiles.iter().try_for_each(|p| p.validate(case_count))
    }

    /// The profiles the harness ships with.
    pub fn builtin() -> Self {
        Self {
            profiles: builtin_profiles(),
        }
    }
}

fn asvgf() -> FlagSet {
    FlagSet::new().with("--denoiser", "asvgf")
}

fn builtin_profiles() -> Vec<Profile> {
    let mut profiles = vec![
        Profile::new(
            "reference",
            FlagSet::new()
                .with("--vptLimit", UNLIMITED)
                .with("--spp", 1024),
        ),
        Profile::new(
            "fast",
            asvgf()
                .with("--vptLimit", 1024)
                .with("--cloudReproPoints", 1)
                .with("--cloudStatSteps", 64)
                .with("--vptBundle", 1)
                .with("--atrousIters", 3)
                .with("--tempAlpha", "0.01"),
        ),
        Profile::new("balanced", asvgf()),
        Profile::new(
            "quality",
            asvgf()
                .with("--vptLimit", UNLIMITED)
                .with("--cloudReproPoints", 1)
                .with("--cloudStatSteps", 256)
                .with("--vptBundle", 2)
                .with("--atrousIters", 5)
                .with("--tempAlpha", "0.01"),
        ),
    ];

    for bundle in [2, 3, 4] {
        profiles.push(Profile::new(
            format!("bundle{bundle}"),
            asvgf().with("--vptBundle", bundle),
        ));
    }
    for bundle in [2, 4] {
        profiles.push(Profile::new(
            format!("bundle{bundle}fast"),
            asvgf().with("--vptLimit", 1024).with("--vptBundle", bundle),
        ));
    }

    for limit in [512, 768, 1024, 1536, 2048] {
        profiles.push(
            Profile::new(
                format!("limit{limit}"),
                FlagSet::new().with("--vptLimit", limit),
            )
            .with_samples(256),
        );
    }
    for limit in [768, 1024, 1536, 2048] {
        profiles.push(Profile::new(
            format!("limit{limit}d"),
            asvgf().with("--vptLimit", limit),
        ));
    }

    for steps in [16, 32, 64, 96, 128, 192, 256, 384] {
        profiles.push(Profile::new(
            format!("statsteps{steps}"),
            asvgf().with("--cloudStatSteps", steps),
        ));
    }

    for points in [1, 3, 5] {
        profiles.push(Profile::new(
            format!("repro{points}"),
            asvgf().with("--cloudReproPoints", points),
        ));
    }

    for (suffix, alpha) in [
        ("1e-1", "0.1"),
        ("5e-2", "0.05"),
        ("1e-2", "0.01"),
        ("5e-3", "0.005"),
    ] {
        profiles.push(Profile::new(
            format!("alpha{suffix}"),
            asvgf().with("--atrousIters", 0).with("--tempAlpha", alpha),
        ));
    }

    for iters in 0..=6 {
        profiles.push(Profile::new(
            format!("iters{iters}"),
            asvgf().with("--atrousIters", iters),
        ));
    }

    // renderer filter ids: 0 gauss5, 1 box3, 2 box5, 3..=5 subsampled
    for (name, filter) in [
        ("box3", 1),
        ("gauss5", 0),
        ("box5", 2),
        ("sub", 3),
        ("sub3", 4),
        ("sub5", 5),
    ] {
        profiles.push(Profile::new(
            format!("filter_{name}"),
            asvgf().with("--atrousFilter", filter),
        ));
    }

    profiles
}
