//! Matrix merge and invocation building.
//!
//! Every (profile, case) pair that the profile does not suppress becomes one
//! [`Invocation`]: a flat argument vector plus the paths the run writes to.
//! Building is pure; only [`SweepLayout::absolute`] and
//! [`SweepLayout::prepare_output_dir`] consult the process or the filesystem.

use std::path::{Path, PathBuf};

use crate::case::{CaseCatalog, TestCase};
use crate::constants::{CAMERA_FLAG, EXPORT_FLAG, INPUT_FLAG};
use crate::error::Result;
use crate::flags::FlagSet;
use crate::profile::{Profile, ProfileCatalog};

/// What a sweep measures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RunMode {
    /// Export illumination images and capture the renderer's log.
    #[default]
    Quality,
    /// Capture the renderer's per-frame timing CSV; no images are exported.
    Performance,
}

impl RunMode {
    /// Name of the per-case stdout capture file.
    pub fn log_file_name(self, case_index: usize) -> String {
        match self {
            Self::Quality => format!("out_{case_index}.txt"),
            Self::Performance => format!("perf_{case_index}.csv"),
        }
    }

    pub fn exports_images(self) -> bool {
        matches!(self, Self::Quality)
    }
}

/// Filesystem roots every invocation is resolved against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepLayout {
    /// Holds the camera files and receives one directory per profile.
    pub work_dir: PathBuf,
    /// Holds the `.xyz` point clouds.
    pub data_dir: PathBuf,
    pub mode: RunMode,
}

impl SweepLayout {
    pub fn new(work_dir: impl Into<PathBuf>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            data_dir: data_dir.into(),
            mode: RunMode::default(),
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }

    /// Resolve relative roots against `base`; an empty root is `base` itself.
    #[must_use]
    pub fn anchored_at(mut self, base: &Path) -> Self {
        self.work_dir = anchor(base, self.work_dir);
        self.data_dir = anchor(base, self.data_dir);
        self
    }

    /// Resolve relative roots against the current working directory.
    ///
    /// The renderer runs from its own directory, so every path it receives
    /// must be absolute.
    pub fn absolute(self) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        Ok(self.anchored_at(&cwd))
    }

    pub fn is_absolute(&self) -> bool {
        self.work_dir.is_absolute() && self.data_dir.is_absolute()
    }

    pub fn output_dir(&self, profile: &str) -> PathBuf {
        self.work_dir.join(profile)
    }

    pub fn log_path(&self, profile: &str, case_index: usize) -> PathBuf {
        self.output_dir(profile)
            .join(self.mode.log_file_name(case_index))
    }

    pub fn input_path(&self, case: &TestCase) -> PathBuf {
        self.data_dir.join(case.input_file_name())
    }

    pub fn camera_path(&self, case: &TestCase) -> PathBuf {
        self.work_dir.join(case.camera_file_name())
    }

    pub fn export_path(&self, profile: &str, case: &TestCase) -> PathBuf {
        self.output_dir(profile).join(case.export_file_name())
    }

    /// Create the profile's output directory; existing directories are fine.
    pub fn prepare_output_dir(&self, profile: &str) -> Result<PathBuf> {
        let dir = self.output_dir(profile);
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

fn anchor(base: &Path, path: PathBuf) -> PathBuf {
    if path.as_os_str().is_empty() {
        base.to_path_buf()
    } else if path.is_relative() {
        base.join(path)
    } else {
        path
    }
}

/// A case with a profile's flags applied on top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedConfig<'a> {
    pub case: &'a TestCase,
    /// Case flags overlaid by profile flags.
    pub flags: FlagSet,
}

/// Overlay `profile` onto `case`; the profile wins on collision.
pub fn merge<'a>(case: &'a TestCase, profile: &Profile) -> MergedConfig<'a> {
    let mut flags = case.flags();
    flags.overlay(&profile.flags);
    MergedConfig { case, flags }
}

/// A concrete renderer run for one (profile, case) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub profile: String,
    pub case_index: usize,
    /// Arguments passed to the renderer, excluding the program itself.
    pub args: Vec<String>,
    /// Illumination export target, absent in performance mode.
    pub export_path: Option<PathBuf>,
    pub log_path: PathBuf,
    pub output_dir: PathBuf,
}

impl Invocation {
    /// Build the invocation for `case` (at `case_index`) under `profile`.
    pub fn build(
        layout: &SweepLayout,
        profile: &Profile,
        case_index: usize,
        case: &TestCase,
    ) -> Self {
        let merged = merge(case, profile);

        let mut args = vec![
            INPUT_FLAG.to_string(),
            path_arg(&layout.input_path(case)),
            CAMERA_FLAG.to_string(),
            path_arg(&layout.camera_path(case)),
        ];

        let export_path = layout
            .mode
            .exports_images()
            .then(|| layout.export_path(&profile.name, case));
        if let Some(path) = &export_path {
            args.push(EXPORT_FLAG.to_string());
            args.push(path_arg(path));
        }

        merged.flags.push_args(&mut args);

        Self {
            profile: profile.name.clone(),
            case_index,
            args,
            export_path,
            log_path: layout.log_path(&profile.name, case_index),
            output_dir: layout.output_dir(&profile.name),
        }
    }

    /// Space-joined argument vector, as written to the head of the log.
    pub fn command_line(&self) -> String {
        self.args.join(" ")
    }
}

fn path_arg(path: &Path) -> String {
    path.display().to_string()
}

/// The {profile × case} matrix with suppressed pairs removed.
#[derive(Debug, Clone, Copy)]
pub struct Matrix<'a> {
    cases: &'a CaseCatalog,
    profiles: &'a ProfileCatalog,
}

impl<'a> Matrix<'a> {
    pub fn new(cases: &'a CaseCatalog, profiles: &'a ProfileCatalog) -> Self {
        Self { cases, profiles }
    }

    /// Every runnable `(profile, case_index, case)` in profile-then-case order.
    pub fn pairs(&self) -> impl Iterator<Item = (&'a Profile, usize, &'a TestCase)> + 'a {
        let cases = self.cases;
        let profiles = self.profiles;
        profiles.iter().flat_map(move |profile| {
            cases
                .iter()
                .filter(move |(index, _)| !profile.is_suppressed(*index))
                .map(move |(index, case)| (profile, index, case))
        })
    }

    /// Invocations for every runnable pair.
    pub fn invocations(&self, layout: &SweepLayout) -> Vec<Invocation> {
        self.pairs()
            .map(|(profile, index, case)| Invocation::build(layout, profile, index, case))
            .collect()
    }

    /// Number of runnable pairs.
    pub fn len(&self) -> usize {
        self.pairs().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of pairs removed by suppression sets.
    pub fn suppressed(&self) -> usize {
        self.profiles.len() * self.cases.len() - self.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::FlagValue;

    fn fast() -> Profile {
        Profile::new(
            "fast",
            FlagSet::new()
                .with("--denoiser", "asvgf")
                .with("--vptLimit", 1024),
        )
    }

    fn flag_pairs(args: &[String]) -> Vec<(&str, &str)> {
        args.chunks(2)
            .map(|pair| (pair[0].as_str(), pair[1].as_str()))
            .collect()
    }

    #[test]
    fn merge_profile_wins() {
        let case = TestCase::new(1940, 1, 1, 1, "t0");
        let profile = Profile::new("reference", FlagSet::new().with("--spp", 1024));
        let merged = merge(&case, &profile);
        assert_eq!(merged.flags.get("--spp"), Some(&FlagValue::Int(1024)));
        assert_eq!(merged.flags.get("-f"), Some(&FlagValue::Int(1)));
        assert_eq!(merged.case, &case);
    }

    #[test]
    fn fast_profile_on_first_case() {
        let layout = SweepLayout::new("/work", "/data");
        let case = TestCase::new(1940, 1, 1, 1, "t0");
        let invocation = Invocation::build(&layout, &fast(), 0, &case);

        let pairs = flag_pairs(&invocation.args);
        assert!(pairs.contains(&("--denoiser", "asvgf")));
        assert!(pairs.contains(&("--vptLimit", "1024")));

        let export = Path::new("/work").join("fast").join("t0.exr");
        assert_eq!(invocation.export_path.as_deref(), Some(export.as_path()));
        assert_eq!(
            invocation.log_path,
            Path::new("/work").join("fast").join("out_0.txt")
        );
    }

    #[cfg(unix)]
    #[test]
    fn argument_vector_layout() {
        let layout = SweepLayout::new("/work", "/data/");
        let case = TestCase::new(1940, 1, 2, 32, "t3_%d");
        let invocation = Invocation::build(&layout, &fast(), 3, &case);
        insta::assert_debug_snapshot!(invocation.args, @r#"
        [
            "-i",
            "/data/cloud-1940.xyz",
            "--cam",
            "/work/test1.json",
            "--exportIllumination",
            "/work/fast/t3_%d.exr",
            "-f",
            "2",
            "--spp",
            "32",
            "--denoiser",
            "asvgf",
            "--vptLimit",
            "1024",
        ]
        "#);
    }

    #[test]
    fn path_flags_appear_once() {
        let layout = SweepLayout::new("/work", "/data");
        let cases = CaseCatalog::builtin();
        let profiles = ProfileCatalog::builtin();

        for invocation in Matrix::new(&cases, &profiles).invocations(&layout) {
            let pairs = flag_pairs(&invocation.args);
            for flag in [INPUT_FLAG, CAMERA_FLAG, EXPORT_FLAG] {
                let count = pairs.iter().filter(|(name, _)| *name == flag).count();
                assert_eq!(count, 1, "{flag} in {}", invocation.command_line());
            }

            let profile = profiles.get(&invocation.profile).unwrap();
            let case = cases.get(invocation.case_index).unwrap();
            let expected = merge(case, profile).flags;
            let emitted: Vec<_> = pairs[3..].to_vec();
            let wanted: Vec<_> = expected
                .iter()
                .map(|(name, value)| (name, value.to_string()))
                .collect();
            assert_eq!(emitted.len(), wanted.len());
            for ((name, value), (want_name, want_value)) in emitted.iter().zip(&wanted) {
                assert_eq!(name, want_name);
                assert_eq!(*value, want_value.as_str());
            }
        }
    }

    #[test]
    fn suppressed_pairs_produce_nothing() {
        let cases = CaseCatalog::builtin();
        let mut profiles = ProfileCatalog::new();
        profiles
            .push(Profile::new("limit512", FlagSet::new().with("--vptLimit", 512)).with_samples(256))
            .unwrap();

        let matrix = Matrix::new(&cases, &profiles);
        let indices: Vec<_> = matrix.pairs().map(|(_, index, _)| index).collect();
        assert_eq!(indices, [0, 2, 5]);
        assert_eq!(matrix.suppressed(), 3);
    }

    #[test]
    fn builtin_matrix_size() {
        let cases = CaseCatalog::builtin();
        let profiles = ProfileCatalog::builtin();
        let matrix = Matrix::new(&cases, &profiles);
        // 46 profiles × 6 cases, minus 5 limit profiles × 3 suppressed cases
        assert_eq!(matrix.len(), 46 * 6 - 15);
        assert_eq!(matrix.suppressed(), 15);
    }

    #[test]
    fn building_is_deterministic() {
        let layout = SweepLayout::new("/work", "/data");
        let case = TestCase::new(1198, 3, 10, 1, "t5_%d");
        let profile = fast();
        assert_eq!(
            Invocation::build(&layout, &profile, 5, &case),
            Invocation::build(&layout, &profile, 5, &case)
        );
    }

    #[test]
    fn performance_mode_drops_export() {
        let layout = SweepLayout::new("/work", "/data").with_mode(RunMode::Performance);
        let case = TestCase::new(1940, 1, 1, 1, "t0");
        let invocation = Invocation::build(&layout, &fast(), 0, &case);

        assert!(invocation.export_path.is_none());
        assert!(!invocation.args.iter().any(|arg| arg == EXPORT_FLAG));
        assert_eq!(
            invocation.log_path,
            Path::new("/work").join("fast").join("perf_0.csv")
        );
    }

    #[cfg(unix)]
    #[test]
    fn relative_roots_are_anchored() {
        let layout = SweepLayout::new("work", "/data").anchored_at(Path::new("/home/me"));
        assert_eq!(layout.work_dir, Path::new("/home/me/work"));
        assert_eq!(layout.data_dir, Path::new("/data"));
        assert!(layout.is_absolute());

        let default = SweepLayout::new("", "data").anchored_at(Path::new("/home/me"));
        assert_eq!(default.work_dir, Path::new("/home/me"));
        assert_eq!(default.data_dir, Path::new("/home/me/data"));

        let case = TestCase::new(1940, 1, 1, 1, "t0");
        let invocation = Invocation::build(&layout, &fast(), 0, &case);
        assert_eq!(
            invocation.args[..4],
            ["-i", "/data/cloud-1940.xyz", "--cam", "/home/me/work/test1.json"]
        );
        assert_eq!(invocation.args[5], "/home/me/work/fast/t0.exr");
    }

    #[test]
    fn absolute_layout_is_absolute() {
        let layout = SweepLayout::new("work", "data").absolute().unwrap();
        assert!(layout.is_absolute());
        assert!(layout.work_dir.ends_with("work"));
        assert!(layout.data_dir.ends_with("data"));
    }

    #[test]
    fn prepare_output_dir_is_idempotent() {
        let work = tempfile::tempdir().unwrap();
        let layout = SweepLayout::new(work.path(), "/data");
        let first = layout.prepare_output_dir("fast").unwrap();
        let second = layout.prepare_output_dir("fast").unwrap();
        assert_eq!(first, second);
        assert!(first.is_dir());
    }
}
