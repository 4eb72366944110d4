//! Comparison pass over the images a sweep produced.
//!
//! For every image in a profile's output directory the comparator is called
//! with the identically named reference image. The comparator writes its own
//! report next to the image; the harness only records how each call exited.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use image::ImageFormat;
use pbrt_sweep_core::SweepLayout;
use tracing::{debug, info, warn};

use crate::{CompareConfig, HarnessError, Result};

/// Outcome of one comparator call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonResult {
    pub profile: String,
    pub target: PathBuf,
    pub reference: PathBuf,
    /// Report the comparator was asked to write.
    pub report: PathBuf,
    pub exit_code: Option<i32>,
}

impl ComparisonResult {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Fans out comparator calls over profile output directories.
#[derive(Debug, Clone)]
pub struct ComparisonSweep {
    config: CompareConfig,
}

impl ComparisonSweep {
    pub fn new(config: CompareConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompareConfig {
        &self.config
    }

    /// Report path for `target`: same stem, `.flip.csv` suffix.
    pub fn report_path(target: &Path) -> PathBuf {
        target.with_extension("flip.csv")
    }

    /// Image files in `dir` with one of the configured formats, sorted by name.
    pub fn list_images(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut images = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && self.is_compared(&path) {
                images.push(path);
            }
        }
        images.sort();
        Ok(images)
    }

    fn is_compared(&self, path: &Path) -> bool {
        ImageFormat::from_path(path).is_ok_and(|format| self.config.formats.contains(&format))
    }

    /// Comparator arguments for one image.
    pub fn comparator_args(
        &self,
        reference: &Path,
        target: &Path,
        output_dir: &Path,
        report: &Path,
    ) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-r".into(),
            reference.into(),
            "-t".into(),
            target.into(),
            "-d".into(),
            output_dir.into(),
        ];
        args.extend(self.config.flags.iter().map(OsString::from));
        args.push("-c".into());
        args.push(report.into());
        args
    }

    /// Compare one produced image against its reference.
    pub fn compare(
        &self,
        profile: &str,
        target: &Path,
        output_dir: &Path,
    ) -> Result<ComparisonResult> {
        let file_name = target.file_name().unwrap_or(target.as_os_str());
        let reference = self.config.reference_dir.join(file_name);
        if !reference.is_file() {
            debug!(reference = %reference.display(), "Reference image missing");
        }
        let report = Self::report_path(target);

        let status = Command::new(&self.config.comparator)
            .args(self.comparator_args(&reference, target, output_dir, &report))
            .status()
            .map_err(|source| HarnessError::Launch {
                program: self.config.comparator.clone(),
                source,
            })?;

        let result = ComparisonResult {
            profile: profile.to_string(),
            target: target.to_path_buf(),
            reference,
            report,
            exit_code: status.code(),
        };
        if !result.success() {
            warn!(
                profile,
                target = %result.target.display(),
                ?status,
                "Comparator failed"
            );
        }
        Ok(result)
    }

    /// Compare every produced image of every named profile.
    ///
    /// Performance sweeps export no images, so nothing is compared for them.
    pub fn run<'p>(
        &self,
        layout: &SweepLayout,
        profiles: impl IntoIterator<Item = &'p str>,
    ) -> Result<Vec<ComparisonResult>> {
        if !layout.mode.exports_images() {
            info!("Skipping comparison for a performance sweep");
            return Ok(Vec::new());
        }

        let mut results = Vec::new();
        for profile in profiles {
            let output_dir = layout.output_dir(profile);
            if !output_dir.is_dir() {
                debug!(profile, "No output directory, skipping");
                continue;
            }

            let images = self.list_images(&output_dir)?;
            info!(profile, images = images.len(), "Comparing against reference");
            for target in images {
                results.push(self.compare(profile, &target, &output_dir)?);
            }
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_path_replaces_extension() {
        assert_eq!(
            ComparisonSweep::report_path(Path::new("fast/t2_0.exr")),
            PathBuf::from("fast/t2_0.flip.csv")
        );
    }

    #[test]
    fn only_configured_formats_are_listed() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["t1.exr", "t0.exr", "out_0.txt", "t0.flip.csv", "diff.png"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.exr")).unwrap();

        let sweep = ComparisonSweep::new(CompareConfig::default());
        let images = sweep.list_images(dir.path()).unwrap();
        assert_eq!(
            images,
            [dir.path().join("t0.exr"), dir.path().join("t1.exr")]
        );

        let sweep = ComparisonSweep::new(
            CompareConfig::default().with_formats([ImageFormat::OpenExr, ImageFormat::Png]),
        );
        assert_eq!(sweep.list_images(dir.path()).unwrap().len(), 3);
    }

    #[test]
    fn comparator_argument_order() {
        let sweep = ComparisonSweep::new(CompareConfig::default());
        let args = sweep.comparator_args(
            Path::new("reference/t0.exr"),
            Path::new("fast/t0.exr"),
            Path::new("fast"),
            Path::new("fast/t0.flip.csv"),
        );
        let args: Vec<_> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(
            args,
            [
                "-r",
                "reference/t0.exr",
                "-t",
                "fast/t0.exr",
                "-d",
                "fast",
                "-nexm",
                "-c",
                "fast/t0.flip.csv"
            ]
        );
    }

    #[test]
    fn performance_sweeps_are_not_compared() {
        let layout = SweepLayout::new("/nonexistent", "/data")
            .with_mode(pbrt_sweep_core::RunMode::Performance);
        let sweep = ComparisonSweep::new(CompareConfig::default().with_comparator("/no/such/tool"));
        let results = sweep.run(&layout, ["fast"]).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn missing_output_dirs_are_skipped() {
        let work = tempfile::tempdir().unwrap();
        let layout = SweepLayout::new(work.path(), "/data");
        let sweep = ComparisonSweep::new(CompareConfig::default().with_comparator("/no/such/tool"));
        let results = sweep.run(&layout, ["fast", "quality"]).unwrap();
        assert!(results.is_empty());
    }
}
