//! `git-semerge` argument parsing. Operates on the whole working tree:
//! it lists `git`'s currently-conflicted files (or a caller-supplied
//! subset), pulls each one's three stages, and runs the merge pipeline.
//! The `.semerge.toml` knobs are exposed as overridable flags.

use clap::Parser;
use std::path::PathBuf;

/// git-semerge: semantic three-way merge for the files `git merge` left
/// conflicted
#[derive(Parser, Debug)]
#[command(name = "git-semerge")]
#[command(version)]
#[command(about = "Semantic three-way merge for version-control integration")]
pub struct Cli {
    /// Specific conflicted files to resolve. Defaults to every file `git`
    /// reports as unmerged.
    pub files: Vec<PathBuf>,

    /// Root of the working tree, for `.semerge.toml` discovery and the
    /// import rewriter's repository scan. Defaults to the current directory.
    #[arg(long)]
    pub workspace_root: Option<PathBuf>,

    /// Classify and synthesize in memory; write and stage nothing.
    #[arg(long)]
    pub dry_run: bool,

    /// Skip writing `.orig` backup sidecars even if the config enables them.
    #[arg(long)]
    pub no_backup: bool,

    /// Emit per-step progress to the log.
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit the machine-readable result record as JSON on stdout instead of
    /// the human-readable summary.
    #[arg(long)]
    pub json: bool,

    /// Deadline, in seconds, for each VCS call.
    #[arg(long)]
    pub git_timeout_secs: Option<u64>,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn resolved_workspace_root(&self) -> PathBuf {
        self.workspace_root.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}
