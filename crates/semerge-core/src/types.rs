//! Data model shared across the semantic-merge pipeline.
//!
//! Everything here is immutable after construction except
//! [`Conflict::user_resolution`], which is the one field the manual-resolution
//! collaborator (outside this crate) is allowed to mutate.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Half-open byte range `[start, end)` into a single version's source bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "ByteRange start ({start}) > end ({end})");
        ByteRange { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Two ranges overlap if they share any byte position. Touching at a
    /// boundary does not count as overlap.
    pub fn overlaps(&self, other: &ByteRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// `self` fully contains `other` (nesting, not partial overlap).
    pub fn contains(&self, other: &ByteRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// The kind of named definition extracted from source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionKind {
    Function,
    Method,
    Class,
    Struct,
    Interface,
    Trait,
    Enum,
    Impl,
    Type,
    Const,
    Static,
    Variable,
    Getter,
    Setter,
    /// A top-level key in a mapping-keyed format (YAML/JSON).
    Key,
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DefinitionKind::Function => "Function",
            DefinitionKind::Method => "Method",
            DefinitionKind::Class => "Class",
            DefinitionKind::Struct => "Struct",
            DefinitionKind::Interface => "Interface",
            DefinitionKind::Trait => "Trait",
            DefinitionKind::Enum => "Enum",
            DefinitionKind::Impl => "Impl",
            DefinitionKind::Type => "Type",
            DefinitionKind::Const => "Const",
            DefinitionKind::Static => "Static",
            DefinitionKind::Variable => "Variable",
            DefinitionKind::Getter => "Getter",
            DefinitionKind::Setter => "Setter",
            DefinitionKind::Key => "Key",
        };
        write!(f, "{s}")
    }
}

/// A named top-level declaration from one version of one file.
///
/// `name` carries the dotted form (`ClassName.methodName`) for methods and
/// similar nested members; insertion order in source is preserved wherever
/// definitions of one version are collected into a `Vec`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    pub name: String,
    pub kind: DefinitionKind,
    /// Human-readable declarator, for display only. Never used for matching.
    pub signature: String,
    /// Full byte slice of the declaration, including the declarator line.
    pub body: Vec<u8>,
    pub start_byte: usize,
    pub end_byte: usize,
    /// 0-indexed, for diagnostics only.
    pub start_line: u32,
    /// 0-indexed, for diagnostics only.
    pub end_line: u32,
}

impl Definition {
    pub fn range(&self) -> ByteRange {
        ByteRange::new(self.start_byte, self.end_byte)
    }

    pub fn body_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Parse output for one version of one file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileAnalysis {
    /// Insertion order as encountered in source; non-decreasing `start_byte`.
    pub definitions: Vec<Definition>,
    pub parse_error: Option<String>,
}

impl FileAnalysis {
    pub fn empty() -> Self {
        FileAnalysis::default()
    }

    /// Last occurrence wins for duplicate names (documented open question,
    /// resolved as last-wins — see SPEC_FULL.md §9).
    pub fn by_name(&self) -> std::collections::HashMap<&str, &Definition> {
        let mut map = std::collections::HashMap::new();
        for def in &self.definitions {
            map.insert(def.name.as_str(), def);
        }
        map
    }
}

/// Outcome of applying `user_resolution`, or of the automatic classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictStatus {
    CanAutoMerge,
    NeedsResolution,
}

/// Manual resolution choice, set only by the external resolution collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserResolution {
    #[default]
    None,
    KeepLocal,
    KeepRemote,
    KeepBoth,
    KeepBase,
    Skip,
}

/// A per-name three-way decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conflict {
    pub file: String,
    pub name: String,
    pub kind: DefinitionKind,
    pub conflict_type: String,
    pub status: ConflictStatus,
    pub base: Option<Definition>,
    pub local: Option<Definition>,
    pub remote: Option<Definition>,
    #[serde(default)]
    pub user_resolution: UserResolution,
}

impl Conflict {
    /// An orphan delete: present in base, absent from both local and remote.
    pub fn is_orphan_delete(&self) -> bool {
        self.base.is_some() && self.local.is_none() && self.remote.is_none()
    }

    /// An orphan add: absent from base, present in local and/or remote.
    pub fn is_orphan_add(&self) -> bool {
        self.base.is_none() && (self.local.is_some() || self.remote.is_some())
    }

    /// The byte range this conflict occupies on the LOCAL canvas, if any.
    pub fn local_range(&self) -> Option<ByteRange> {
        self.local.as_ref().map(Definition::range)
    }
}

/// Inputs and outputs for merging one file.
#[derive(Debug, Clone)]
pub struct FileMergeJob {
    pub path: String,
    pub language: crate::registry::Language,
    pub base: Vec<u8>,
    pub local: Vec<u8>,
    pub remote: Vec<u8>,
    pub conflicts: Vec<Conflict>,
}

/// How a delete/add pair was paired into a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Exact,
    Fuzzy,
}

/// A move whose source and destination files differ.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterFileMove {
    pub source_file: String,
    pub destination_file: String,
    pub name: String,
    pub destination_name: String,
    pub kind: DefinitionKind,
    pub match_type: MatchType,
    pub similarity: f64,
}

/// A proposed rewrite of a module-qualified import line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportUpdate {
    pub file: String,
    pub original_line: String,
    /// May span multiple lines (one `from`-import per destination module).
    pub replacement: String,
    /// 1-based.
    pub line_number: u32,
    pub source_module: String,
    pub destination_module: String,
    pub moved_names: Vec<String>,
}
