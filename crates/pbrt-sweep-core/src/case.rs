//! Base test cases and the ordered catalog that holds them.

use crate::constants::{FRAMES_FLAG, SAMPLES_FLAG};
use crate::flags::FlagSet;

/// One base rendering scenario.
///
/// Identity is the case's position in its [`CaseCatalog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    /// Point-cloud identifier, resolved to `cloud-<id>.xyz` in the data directory.
    pub data_id: u32,
    /// Camera identifier, resolved to `test<id>.json` in the working directory.
    pub camera_id: u32,
    /// Number of frames to render (`-f`).
    pub frames: u32,
    /// Samples per pixel (`--spp`).
    pub samples: u32,
    /// Export name template; a `%d` is expanded per frame by the renderer.
    pub export_name: String,
}

impl TestCase {
    pub fn new(
        data_id: u32,
        camera_id: u32,
        frames: u32,
        samples: u32,
        export_name: impl Into<String>,
    ) -> Self {
        Self {
            data_id,
            camera_id,
            frames,
            samples,
            export_name: export_name.into(),
        }
    }

    #[must_use]
    pub fn with_data(mut self, data_id: u32) -> Self {
        self.data_id = data_id;
        self
    }

    #[must_use]
    pub fn with_camera(mut self, camera_id: u32) -> Self {
        self.camera_id = camera_id;
        self
    }

    #[must_use]
    pub fn with_frames(mut self, frames: u32) -> Self {
        self.frames = frames;
        self
    }

    #[must_use]
    pub fn with_samples(mut self, samples: u32) -> Self {
        self.samples = samples;
        self
    }

    #[must_use]
    pub fn with_export(mut self, export_name: impl Into<String>) -> Self {
        self.export_name = export_name.into();
        self
    }

    /// Flags this case forwards to the renderer, before any profile is applied.
    pub fn flags(&self) -> FlagSet {
        FlagSet::new()
            .with(FRAMES_FLAG, self.frames)
            .with(SAMPLES_FLAG, self.samples)
    }

    pub fn input_file_name(&self) -> String {
        format!("cloud-{}.xyz", self.data_id)
    }

    pub fn camera_file_name(&self) -> String {
        format!("test{}.json", self.camera_id)
    }

    /// File name of the exported illumination, placeholder left intact.
    pub fn export_file_name(&self) -> String {
        format!("{}.exr", self.export_name)
    }
}

/// Ordered, indexable sequence of test cases.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaseCatalog {
    cases: Vec<TestCase>,
}

impl CaseCatalog {
    pub fn new(cases: Vec<TestCase>) -> Self {
        Self { cases }
    }

    /// The cases the harness ships with.
    pub fn builtin() -> Self {
        let base = TestCase::new(1940, 1, 1, 1, "");

        Self::new(vec![
            // basic spatial denoise
            base.clone().with_export("t0"),
            // convergence
            base.clone().with_samples(128).with_export("t1"),
            // moving denoise at 1 spp
            base.clone().with_frames(2).with_export("t2_%d"),
            // movement halfway through
            base.clone()
                .with_frames(2)
                .with_samples(32)
                .with_export("t3_%d"),
            // converged first frame, then movement
            base.with_frames(129).with_camera(2).with_export("t4_%d"),
            // camera path over a smaller cloud
            TestCase::new(1198, 3, 10, 1, "t5_%d"),
        ])
    }

    pub fn get(&self, index: usize) -> Option<&TestCase> {
        self.cases.get(index)
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn push(&mut self, case: TestCase) -> usize {
        self.cases.push(case);
        self.cases.len() - 1
    }

    /// Iterate `(index, case)` pairs in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &TestCase)> {
        self.cases.iter().enumerate()
    }
}
