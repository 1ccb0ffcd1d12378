//! Drives the pipeline for one merge invocation: extract, classify,
//! intra-file moves, inter-file moves, collision resolution, synthesis.
//! Import rewriting (§4.8, `semerge-imports`) runs after this, since it
//! needs the final file set on disk.

use crate::classifier::classify;
use crate::config::MergeConfig;
use crate::extractor::Extractor;
use crate::intermove::{apply_moves, detect_inter_file_moves};
use crate::moves::{detect_intra_file_moves, MoveConfig};
use crate::registry::{looks_binary, Language};
use crate::synth::{resolve_collisions, synthesize, SynthResult};
use crate::types::{Conflict, ConflictStatus, Definition, DefinitionKind, InterFileMove, UserResolution};
use std::collections::HashMap;

/// One file's three byte streams, as handed to the orchestrator by the VCS
/// driver (already read; the orchestrator does no I/O of its own).
pub struct RawFileJob {
    pub path: String,
    pub language: Language,
    pub base: Option<Vec<u8>>,
    pub local: Option<Vec<u8>>,
    pub remote: Option<Vec<u8>>,
}

/// Extractors keyed by language, supplied by `semerge-extract`. `Unknown`
/// never has an entry; it always takes the raw-text fallback path.
pub type ExtractorRegistry = HashMap<Language, Box<dyn Extractor>>;

/// Per-file pipeline output, ready for the caller to write to disk.
pub struct FileOutcome {
    pub path: String,
    pub conflicts: Vec<Conflict>,
    pub synth: SynthResult,
}

fn whole_file_definition(bytes: &[u8]) -> Definition {
    Definition {
        name: "<file>".to_string(),
        kind: DefinitionKind::Variable,
        signature: "<file>".to_string(),
        body: bytes.to_vec(),
        start_byte: 0,
        end_byte: bytes.len(),
        start_line: 0,
        end_line: bytes.iter().filter(|&&b| b == b'\n').count() as u32,
    }
}

fn single_conflict(path: &str, conflict_type: &str, base: Option<&[u8]>, local: Option<&[u8]>, remote: Option<&[u8]>) -> Conflict {
    Conflict {
        file: path.to_string(),
        name: "<file>".to_string(),
        kind: DefinitionKind::Variable,
        conflict_type: conflict_type.to_string(),
        status: ConflictStatus::NeedsResolution,
        base: base.map(whole_file_definition),
        local: local.map(whole_file_definition),
        remote: remote.map(whole_file_definition),
        user_resolution: UserResolution::None,
    }
}

/// Stage-1 per-file analysis: binary/size gate, language gate, extraction,
/// classification, intra-file move consolidation. Files gated out short
/// circuit to a single whole-file conflict and never reach the extractor.
fn analyze_one(job: &RawFileJob, extractors: &ExtractorRegistry, config: &MergeConfig) -> Vec<Conflict> {
    let base = job.base.as_deref().unwrap_or(&[]);
    let local = job.local.as_deref().unwrap_or(&[]);
    let remote = job.remote.as_deref().unwrap_or(&[]);

    for side in [base, local, remote] {
        if looks_binary(side) {
            return vec![single_conflict(&job.path, "Binary Conflict", job.base.as_deref(), job.local.as_deref(), job.remote.as_deref())];
        }
        if side.len() > config.max_file_size {
            return vec![single_conflict(&job.path, "File Too Large", job.base.as_deref(), job.local.as_deref(), job.remote.as_deref())];
        }
    }

    if job.language == Language::Unknown {
        if base == local && local == remote {
            return Vec::new();
        }
        return vec![single_conflict(&job.path, "Text Conflict", job.base.as_deref(), job.local.as_deref(), job.remote.as_deref())];
    }

    let Some(extractor) = extractors.get(&job.language) else {
        return vec![single_conflict(&job.path, "Text Conflict", job.base.as_deref(), job.local.as_deref(), job.remote.as_deref())];
    };

    let base_analysis = extractor.extract(base);
    let local_analysis = extractor.extract(local);
    let remote_analysis = extractor.extract(remote);

    for analysis in [&base_analysis, &local_analysis, &remote_analysis] {
        if let Some(message) = &analysis.parse_error {
            return vec![Conflict {
                file: job.path.clone(),
                name: "<file>".to_string(),
                kind: DefinitionKind::Variable,
                conflict_type: format!("Parse Error: {message}"),
                status: ConflictStatus::NeedsResolution,
                base: Some(whole_file_definition(base)),
                local: Some(whole_file_definition(local)),
                remote: Some(whole_file_definition(remote)),
                user_resolution: UserResolution::None,
            }];
        }
    }

    let move_config: MoveConfig = config.move_config.into();
    let conflicts = classify(&job.path, job.language, &base_analysis, &local_analysis, &remote_analysis);
    detect_intra_file_moves(conflicts, &move_config)
}

/// Run the full per-invocation pipeline over every job, ending with
/// collision-resolved, byte-synthesized output ready to write. Files whose
/// analysis failed to extract never participate in inter-file move
/// detection (they have no definitions to pair).
pub fn run_merge(jobs: Vec<RawFileJob>, extractors: &ExtractorRegistry, config: &MergeConfig) -> (Vec<FileOutcome>, Vec<InterFileMove>) {
    let mut per_file: HashMap<String, Vec<Conflict>> = HashMap::new();
    let mut canvases: HashMap<String, Vec<u8>> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for job in &jobs {
        let conflicts = analyze_one(job, extractors, config);
        canvases.insert(job.path.clone(), job.local.clone().unwrap_or_default());
        per_file.insert(job.path.clone(), conflicts);
        order.push(job.path.clone());
    }

    let move_config: MoveConfig = config.move_config.into();
    let moves = detect_inter_file_moves(&per_file, &move_config);
    apply_moves(&mut per_file, &moves);

    let mut outcomes = Vec::with_capacity(order.len());
    for path in order {
        let conflicts = resolve_collisions(per_file.remove(&path).unwrap_or_default());
        let canvas = canvases.remove(&path).unwrap_or_default();
        let synth = synthesize(&canvas, &conflicts);
        outcomes.push(FileOutcome { path, conflicts, synth });
    }
    (outcomes, moves)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoopExtractor;
    impl Extractor for NoopExtractor {
        fn language(&self) -> Language {
            Language::Python
        }
        fn extract(&self, source: &[u8]) -> FileAnalysis {
            // Minimal stand-in: treat the whole file as one `function`
            // named "f" when non-empty, matching the fixtures used in
            // classifier/synth unit tests elsewhere in this crate.
            if source.is_empty() {
                return FileAnalysis::empty();
            }
            FileAnalysis {
                definitions: vec![Definition {
                    name: "f".to_string(),
                    kind: DefinitionKind::Function,
                    signature: "f".to_string(),
                    body: source.to_vec(),
                    start_byte: 0,
                    end_byte: source.len(),
                    start_line: 0,
                    end_line: 0,
                }],
                parse_error: None,
            }
        }
    }

    #[test]
    fn identical_sides_produce_no_conflicts_and_round_trips() {
        let mut extractors: ExtractorRegistry = HashMap::new();
        extractors.insert(Language::Python, Box::new(NoopExtractor));
        let job = RawFileJob {
            path: "a.py".into(),
            language: Language::Python,
            base: Some(b"def f(): pass\n".to_vec()),
            local: Some(b"def f(): pass\n".to_vec()),
            remote: Some(b"def f(): pass\n".to_vec()),
        };
        let (outcomes, moves) = run_merge(vec![job], &extractors, &MergeConfig::default());
        assert!(moves.is_empty());
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].synth.bytes, b"def f(): pass\n");
        assert_eq!(outcomes[0].synth.total_conflicts, 0);
    }

    #[test]
    fn binary_content_short_circuits_extraction() {
        let extractors: ExtractorRegistry = HashMap::new();
        let job = RawFileJob {
            path: "bin.dat".into(),
            language: Language::Unknown,
            base: Some(vec![0u8, 1, 2]),
            local: Some(vec![0u8, 1, 2]),
            remote: Some(vec![0u8, 1, 3]),
        };
        let (outcomes, _) = run_merge(vec![job], &extractors, &MergeConfig::default());
        assert_eq!(outcomes[0].conflicts.len(), 1);
        assert_eq!(outcomes[0].conflicts[0].conflict_type, "Binary Conflict");
    }

    #[test]
    fn unknown_language_identical_sides_yield_no_conflict() {
        let extractors: ExtractorRegistry = HashMap::new();
        let job = RawFileJob {
            path: "notes.txt".into(),
            language: Language::Unknown,
            base: Some(b"hello\n".to_vec()),
            local: Some(b"hello\n".to_vec()),
            remote: Some(b"hello\n".to_vec()),
        };
        let (outcomes, _) = run_merge(vec![job], &extractors, &MergeConfig::default());
        assert!(outcomes[0].conflicts.is_empty());
    }

    #[test]
    fn unknown_language_divergent_sides_yield_text_conflict() {
        let extractors: ExtractorRegistry = HashMap::new();
        let job = RawFileJob {
            path: "notes.txt".into(),
            language: Language::Unknown,
            base: Some(b"hello\n".to_vec()),
            local: Some(b"hello local\n".to_vec()),
            remote: Some(b"hello remote\n".to_vec()),
        };
        let (outcomes, _) = run_merge(vec![job], &extractors, &MergeConfig::default());
        assert_eq!(outcomes[0].conflicts[0].conflict_type, "Text Conflict");
    }
}
