//! A sweep over relative work/data directories.
//!
//! Kept in its own test binary: it changes the process working directory.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use pbrt_sweep_core::{
    CaseCatalog, Catalog, FlagSet, Profile, ProfileCatalog, SweepLayout, TestCase,
};
use pbrt_sweep_test::{Runner, Sweep};

/// Exits with 7 unless the input and camera files exist, then touches the
/// export path. It runs from its own directory, so only absolute paths work.
const CHECKING_RENDERER: &str = r#"#!/bin/sh
while [ $# -gt 0 ]; do
    case "$1" in
        -i|--cam) shift; [ -f "$1" ] || exit 7 ;;
        --exportIllumination) shift; : > "$1" || exit 8 ;;
    esac
    shift
done
"#;

#[test]
fn relative_roots_reach_the_renderer_as_absolute_paths() {
    let root = tempfile::tempdir().unwrap();
    let root_path = std::fs::canonicalize(root.path()).unwrap();
    let bin = root_path.join("bin");
    for dir in ["bin", "work", "data"] {
        std::fs::create_dir_all(root_path.join(dir)).unwrap();
    }
    std::fs::write(root_path.join("work").join("test1.json"), b"{}").unwrap();
    std::fs::write(root_path.join("data").join("cloud-1940.xyz"), b"").unwrap();

    let renderer = bin.join("renderer");
    std::fs::write(&renderer, CHECKING_RENDERER).unwrap();
    std::fs::set_permissions(&renderer, std::fs::Permissions::from_mode(0o755)).unwrap();

    let mut profiles = ProfileCatalog::new();
    profiles
        .push(Profile::new("fast", FlagSet::new().with("--denoiser", "asvgf")))
        .unwrap();
    let catalog = Catalog {
        cases: CaseCatalog::new(vec![TestCase::new(1940, 1, 1, 1, "t0")]),
        profiles,
    };

    std::env::set_current_dir(&root_path).unwrap();
    let runner = Runner::new(Path::new("bin").join("renderer")).unwrap();
    let layout = SweepLayout::new("work", "data");
    let report = Sweep::new(&catalog, &layout, &runner).run().unwrap();

    assert_eq!(report.total(), 1);
    let result = &report.results[0];
    assert_eq!(result.exit_code, Some(0), "{}", result.command_line());
    assert_eq!(
        result.args[..6],
        [
            "-i".to_string(),
            root_path.join("data/cloud-1940.xyz").display().to_string(),
            "--cam".to_string(),
            root_path.join("work/test1.json").display().to_string(),
            "--exportIllumination".to_string(),
            root_path.join("work/fast/t0.exr").display().to_string(),
        ]
    );
    assert_eq!(result.log_path, root_path.join("work/fast/out_0.txt"));
    assert!(root_path.join("work/fast/t0.exr").is_file());
}
