//! `GitDriver`: implements [`semerge_core::vcs::VcsDriver`] by shelling out
//! to the `git` binary, with a deadline enforced via an OS-level wait
//! (kill-and-reap on timeout, no polling).

use semerge_core::error::SemergeError;
use semerge_core::vcs::{Deadline, Stage, VcsDriver};
use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use wait_timeout::ChildExt;

/// Drives one local `git` repository via its CLI.
pub struct GitDriver {
    workspace_root: PathBuf,
}

impl GitDriver {
    pub fn new(workspace_root: PathBuf) -> Self {
        GitDriver { workspace_root }
    }

    fn run(&self, args: &[&str], deadline: Deadline) -> Result<std::process::Output, SemergeError> {
        let mut child = Command::new("git")
            .args(args)
            .current_dir(&self.workspace_root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SemergeError::VcsFailure { message: format!("spawn git {args:?}: {e}") })?;

        match child.wait_timeout(deadline.remaining()).map_err(|e| SemergeError::VcsFailure { message: e.to_string() })? {
            Some(status) => {
                let mut stdout = Vec::new();
                let mut stderr = Vec::new();
                if let Some(mut s) = child.stdout.take() {
                    let _ = s.read_to_end(&mut stdout);
                }
                if let Some(mut s) = child.stderr.take() {
                    let _ = s.read_to_end(&mut stderr);
                }
                Ok(std::process::Output { status, stdout, stderr })
            }
            None => {
                let _ = child.kill();
                let _ = child.wait();
                Err(SemergeError::Timeout { elapsed_ms: deadline.remaining().as_millis() as u64 })
            }
        }
    }
}

impl VcsDriver for GitDriver {
    fn is_repository(&self, deadline: Deadline) -> Result<bool, SemergeError> {
        let output = self.run(&["rev-parse", "--is-inside-work-tree"], deadline)?;
        Ok(output.status.success())
    }

    fn conflicted_files(&self, deadline: Deadline) -> Result<Vec<String>, SemergeError> {
        let output = self.run(&["diff", "--name-only", "--diff-filter=U"], deadline)?;
        if !output.status.success() {
            return Err(SemergeError::VcsFailure { message: String::from_utf8_lossy(&output.stderr).into_owned() });
        }
        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect())
    }

    fn read_stage(&self, path: &str, stage: Stage, deadline: Deadline) -> Result<Option<Vec<u8>>, SemergeError> {
        let spec = format!(":{}:{}", stage.index(), path);
        let output = self.run(&["show", &spec], deadline)?;
        if !output.status.success() {
            // git show exits non-zero both for "no such stage" (file absent
            // on that side) and for transport errors; git's own message
            // prefix distinguishes "does not exist" from everything else.
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("does not exist") || stderr.contains("exists on disk, but not in") {
                return Ok(None);
            }
            return Err(SemergeError::VcsFailure { message: stderr.into_owned() });
        }
        Ok(Some(output.stdout))
    }

    fn stage_file(&self, path: &str, deadline: Deadline) -> Result<(), SemergeError> {
        let output = self.run(&["add", "--", path], deadline)?;
        if !output.status.success() {
            return Err(SemergeError::VcsFailure { message: String::from_utf8_lossy(&output.stderr).into_owned() });
        }
        Ok(())
    }
}
