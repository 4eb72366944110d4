//! Driving a whole sweep matrix through the runner.

use pbrt_sweep_core::{Catalog, Invocation, SweepLayout};
use tracing::{info, warn};

use crate::runner::{RunResult, Runner};
use crate::Result;

/// Results of every run of a sweep, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub results: Vec<RunResult>,
    /// Pairs skipped through profile suppression sets.
    pub suppressed: usize,
}

impl SweepReport {
    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn failures(&self) -> impl Iterator<Item = &RunResult> {
        self.results.iter().filter(|r| !r.success())
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }
}

/// Sequential sweep over a catalog's matrix.
#[derive(Debug, Clone, Copy)]
pub struct Sweep<'a> {
    catalog: &'a Catalog,
    layout: &'a SweepLayout,
    runner: &'a Runner,
}

impl<'a> Sweep<'a> {
    pub fn new(catalog: &'a Catalog, layout: &'a SweepLayout, runner: &'a Runner) -> Self {
        Self {
            catalog,
            layout,
            runner,
        }
    }

    /// Invocations in execution order, without running anything.
    pub fn plan(&self) -> Vec<Invocation> {
        self.catalog.matrix().invocations(self.layout)
    }

    /// Run every non-suppressed (profile, case) pair.
    ///
    /// Relative layout roots are resolved against the current directory
    /// first. A failing renderer run is logged and recorded; the sweep moves
    /// on to the next pair. Filesystem errors abort the sweep.
    pub fn run(&self) -> Result<SweepReport> {
        let layout = self.layout.clone().absolute()?;
        let matrix = self.catalog.matrix();
        let mut report = SweepReport {
            results: Vec::with_capacity(matrix.len()),
            suppressed: matrix.suppressed(),
        };

        info!(
            runs = matrix.len(),
            suppressed = report.suppressed,
            "Starting sweep"
        );

        for invocation in matrix.invocations(&layout) {
            layout.prepare_output_dir(&invocation.profile)?;
            let result = self.runner.run(&invocation)?;
            if !result.success() {
                warn!(
                    profile = %result.profile,
                    case = result.case_index,
                    exit = %result.exit_description(),
                    "Renderer failed: {}",
                    result.command_line()
                );
            }
            report.results.push(result);
        }

        info!(
            runs = report.total(),
            failed = report.failure_count(),
            "Sweep finished"
        );
        Ok(report)
    }
}
