//! Inter-file move detection: pair orphan deletes and adds across the
//! current merge's file set, excluding same-file pairs (those belong to
//! [`crate::moves`]).

use crate::moves::MoveConfig;
use crate::similarity::{jaccard, move_identity_hash, tokenize};
use crate::types::{Conflict, ConflictStatus, InterFileMove, MatchType};
use std::collections::HashMap;

struct Orphan {
    file: String,
    conflict_index: usize,
    tokens: Vec<String>,
}

fn body_of(conflict: &Conflict) -> String {
    conflict
        .base
        .as_ref()
        .or(conflict.local.as_ref())
        .or(conflict.remote.as_ref())
        .map(|d| d.body_str().into_owned())
        .unwrap_or_default()
}

/// Detect moves across `files` (file path -> that file's conflict list,
/// after intra-file move detection has already run). Every file's orphans
/// must be visible before any move is emitted, so this takes the whole set
/// at once rather than streaming per file.
///
/// Returns the detected moves; does not mutate `files` (the caller applies
/// [`apply_moves`] once it has decided to commit to the result, matching
/// the orchestrator's explicit ownership of side effects).
pub fn detect_inter_file_moves(files: &HashMap<String, Vec<Conflict>>, config: &MoveConfig) -> Vec<InterFileMove> {
    // Deterministic order: iterate files sorted by path, conflicts in
    // their given order.
    let mut file_paths: Vec<&String> = files.keys().collect();
    file_paths.sort();

    let mut deletes: Vec<Orphan> = Vec::new();
    let mut adds: Vec<Orphan> = Vec::new();
    for path in &file_paths {
        let conflicts = &files[*path];
        for (i, c) in conflicts.iter().enumerate() {
            if c.is_orphan_delete() {
                deletes.push(Orphan { file: (*path).clone(), conflict_index: i, tokens: tokenize(&body_of(c)) });
            } else if c.is_orphan_add() {
                adds.push(Orphan { file: (*path).clone(), conflict_index: i, tokens: tokenize(&body_of(c)) });
            }
        }
    }

    let mut claimed: std::collections::HashSet<usize> = std::collections::HashSet::new();
    let mut moves: Vec<InterFileMove> = Vec::new();
    let mut unmatched_deletes: Vec<usize> = Vec::new();

    let conflict_at = |files: &HashMap<String, Vec<Conflict>>, file: &str, idx: usize| -> Conflict {
        files[file][idx].clone()
    };

    if config.exact_enabled {
        let mut hash_index: HashMap<String, Vec<usize>> = HashMap::new();
        for (slot, add) in adds.iter().enumerate() {
            let c = conflict_at(files, &add.file, add.conflict_index);
            hash_index.entry(move_identity_hash(&c.name, &body_of(&c))).or_default().push(slot);
        }
        for (del_idx, del) in deletes.iter().enumerate() {
            let del_conflict = conflict_at(files, &del.file, del.conflict_index);
            let h = move_identity_hash(&del_conflict.name, &body_of(&del_conflict));
            let mut matched = false;
            if let Some(candidates) = hash_index.get(&h) {
                for &slot in candidates {
                    if claimed.contains(&slot) {
                        continue;
                    }
                    let add = &adds[slot];
                    if add.file == del.file {
                        continue; // same-file pairs belong to the intra-file detector
                    }
                    let add_conflict = conflict_at(files, &add.file, add.conflict_index);
                    if add_conflict.kind != del_conflict.kind {
                        continue;
                    }
                    claimed.insert(slot);
                    moves.push(InterFileMove {
                        source_file: del.file.clone(),
                        destination_file: add.file.clone(),
                        name: del_conflict.name.clone(),
                        destination_name: add_conflict.name.clone(),
                        kind: del_conflict.kind,
                        match_type: MatchType::Exact,
                        similarity: 1.0,
                    });
                    matched = true;
                    break;
                }
            }
            if !matched {
                unmatched_deletes.push(del_idx);
            }
        }
    } else {
        unmatched_deletes.extend(0..deletes.len());
    }

    if config.fuzzy_enabled {
        for &del_idx in &unmatched_deletes {
            let del = &deletes[del_idx];
            if del.tokens.len() < config.min_token_count {
                continue;
            }
            let del_conflict = conflict_at(files, &del.file, del.conflict_index);
            let mut best: Option<(usize, f64)> = None;
            for (slot, add) in adds.iter().enumerate() {
                if claimed.contains(&slot) || add.file == del.file {
                    continue;
                }
                if add.tokens.len() < config.min_token_count {
                    continue;
                }
                let add_conflict = conflict_at(files, &add.file, add.conflict_index);
                if add_conflict.kind != del_conflict.kind {
                    continue;
                }
                let sim = jaccard(&del.tokens, &add.tokens);
                let smaller = del.tokens.len().min(add.tokens.len());
                if sim >= config.threshold(smaller) && best.map(|(_, b)| sim > b).unwrap_or(true) {
                    best = Some((slot, sim));
                }
            }
            if let Some((slot, sim)) = best {
                claimed.insert(slot);
                let add = &adds[slot];
                let add_conflict = conflict_at(files, &add.file, add.conflict_index);
                moves.push(InterFileMove {
                    source_file: del.file.clone(),
                    destination_file: add.file.clone(),
                    name: del_conflict.name.clone(),
                    destination_name: add_conflict.name.clone(),
                    kind: del_conflict.kind,
                    match_type: MatchType::Fuzzy,
                    similarity: sim,
                });
            }
        }
    }

    moves
}

/// Apply each detected move to the owning per-file conflict lists: the
/// source's orphan delete and the destination's orphan add both become
/// `CanAutoMerge` with a conflict-type label naming the other side (§4.6).
pub fn apply_moves(files: &mut HashMap<String, Vec<Conflict>>, moves: &[InterFileMove]) {
    for mv in moves {
        let match_label = match mv.match_type {
            MatchType::Exact => "Exact Match",
            MatchType::Fuzzy => "Fuzzy Match",
        };
        if let Some(list) = files.get_mut(&mv.source_file) {
            if let Some(c) = list.iter_mut().find(|c| c.is_orphan_delete() && c.name == mv.name) {
                c.conflict_type = format!("{} '{}' Moved to {} ({})", mv.kind, mv.name, mv.destination_file, match_label);
                c.status = ConflictStatus::CanAutoMerge;
            }
        }
        if let Some(list) = files.get_mut(&mv.destination_file) {
            if let Some(c) = list.iter_mut().find(|c| c.is_orphan_add() && c.name == mv.destination_name) {
                c.conflict_type = format!("Moved from {} ({})", mv.source_file, match_label);
                c.status = ConflictStatus::CanAutoMerge;
            }
        }
    }
}
