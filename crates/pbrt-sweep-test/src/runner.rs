//! Launching the renderer for a single invocation.
//!
//! The renderer runs with its own directory as working directory so that it
//! can resolve its shader and resource paths. Its stdout goes to the
//! invocation's log file, right after a header line holding the arguments.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use pbrt_sweep_core::Invocation;
use tracing::{debug, info};

use crate::{HarnessError, Result};

/// Outcome of one renderer run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    pub profile: String,
    pub case_index: usize,
    /// Exit code, `None` if the renderer was terminated by a signal.
    pub exit_code: Option<i32>,
    pub args: Vec<String>,
    pub log_path: PathBuf,
}

impl RunResult {
    fn new(invocation: &Invocation, status: ExitStatus) -> Self {
        Self {
            profile: invocation.profile.clone(),
            case_index: invocation.case_index,
            exit_code: status.code(),
            args: invocation.args.clone(),
            log_path: invocation.log_path.clone(),
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Exit code in hex, the form crash codes are usually looked up in.
    pub fn exit_description(&self) -> String {
        match self.exit_code {
            Some(code) => format!("{code:#x}"),
            None => "terminated by signal".to_string(),
        }
    }

    pub fn command_line(&self) -> String {
        self.args.join(" ")
    }
}

/// Runs invocations against one renderer executable, one at a time.
#[derive(Debug, Clone)]
pub struct Runner {
    executable: PathBuf,
    working_dir: PathBuf,
}

impl Runner {
    /// Create a runner for the renderer at `executable`.
    ///
    /// The path is resolved up front because the renderer is launched from
    /// its own directory.
    pub fn new(executable: impl AsRef<Path>) -> Result<Self> {
        let path = executable.as_ref();
        let executable = std::fs::canonicalize(path).map_err(|source| HarnessError::Executable {
            path: path.to_path_buf(),
            source,
        })?;
        let working_dir = executable
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

        Ok(Self {
            executable,
            working_dir,
        })
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Run one invocation to completion.
    ///
    /// A non-zero exit is part of the returned result, not an error. Errors
    /// are reserved for log file I/O and launch failures.
    pub fn run(&self, invocation: &Invocation) -> Result<RunResult> {
        info!(
            profile = %invocation.profile,
            case = invocation.case_index,
            "Running renderer"
        );

        let mut log = File::create(&invocation.log_path)?;
        writeln!(log, "{}", invocation.command_line())?;
        log.flush()?;

        let status = Command::new(&self.executable)
            .args(&invocation.args)
            .current_dir(&self.working_dir)
            .stdout(Stdio::from(log))
            .status()
            .map_err(|source| HarnessError::Launch {
                program: self.executable.clone(),
                source,
            })?;

        debug!(
            profile = %invocation.profile,
            case = invocation.case_index,
            ?status,
            "Renderer finished"
        );

        Ok(RunResult::new(invocation, status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_executable_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = Runner::new(dir.path().join("no-such-renderer")).unwrap_err();
        assert!(matches!(err, HarnessError::Executable { .. }));
    }

    #[test]
    fn exit_description_is_hex() {
        let mut result = RunResult {
            profile: "fast".to_string(),
            case_index: 2,
            exit_code: Some(255),
            args: vec!["-i".to_string(), "cloud.xyz".to_string()],
            log_path: PathBuf::from("fast/out_2.txt"),
        };
        assert!(!result.success());
        assert_eq!(result.exit_description(), "0xff");
        assert_eq!(result.command_line(), "-i cloud.xyz");

        result.exit_code = None;
        assert_eq!(result.exit_description(), "terminated by signal");

        result.exit_code = Some(0);
        assert!(result.success());
    }
}
