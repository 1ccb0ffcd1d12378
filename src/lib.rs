//! `semerge`: semantic three-way merge for version-control integration.
//!
//! The pipeline itself (extraction, classification, move detection,
//! synthesis) lives in `semerge-core`/`semerge-extract`/`semerge-imports`
//! and is VCS-agnostic. This crate wires it to a concrete VCS
//! (`vcs_git`), the atomic file write contract (`write`), the
//! machine-readable result record (`output`), and the `git-semerge` CLI.

// Core pipeline, re-exported for convenience at the `semerge::` path.
pub use semerge_core::{classifier, config, error, extractor, intermove, moves, orchestrator, registry, similarity, synth, types, vcs};

// Front door
pub mod cli;

// VCS and filesystem
pub mod output;
pub mod vcs_git;
pub mod write;
