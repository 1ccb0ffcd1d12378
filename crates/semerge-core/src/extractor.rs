//! The extraction seam: `semerge-extract` implements this trait once per
//! supported [`Language`](crate::registry::Language) behind a tagged-union
//! dispatcher, so the rest of the pipeline never references a grammar type.

use crate::registry::Language;
use crate::types::FileAnalysis;

/// Turns one version's source bytes into an ordered [`FileAnalysis`].
///
/// Implementations never panic on malformed input: a parse failure is
/// reported via `FileAnalysis::parse_error`, per the propagation policy
/// that extraction downgrades rather than aborts the invocation.
pub trait Extractor {
    /// Which language this extractor handles. Used by the dispatcher to
    /// route, and by tests to assert each registry language has exactly one
    /// implementation.
    fn language(&self) -> Language;

    /// Parse `source` and return its top-level (and nested-method) definitions.
    fn extract(&self, source: &[u8]) -> FileAnalysis;
}
