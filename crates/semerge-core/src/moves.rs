//! Intra-file move detection: pair orphan deletes with orphan adds in the
//! same file via exact hashing, then fuzzy Jaccard similarity.

use crate::similarity::{jaccard, move_identity_hash, tokenize};
use crate::types::{Conflict, ConflictStatus};
use std::collections::HashMap;

/// Tunables for both the intra-file and inter-file move detectors.
#[derive(Debug, Clone, Copy)]
pub struct MoveConfig {
    pub exact_enabled: bool,
    pub fuzzy_enabled: bool,
    pub min_token_count: usize,
    pub small_body_tokens: usize,
    pub small_body_threshold: f64,
    pub large_body_tokens: usize,
    pub large_body_threshold: f64,
    pub fuzzy_threshold: f64,
}

impl Default for MoveConfig {
    fn default() -> Self {
        MoveConfig {
            exact_enabled: true,
            fuzzy_enabled: true,
            min_token_count: 10,
            small_body_tokens: 20,
            small_body_threshold: 0.85,
            large_body_tokens: 100,
            large_body_threshold: 0.65,
            fuzzy_threshold: 0.75,
        }
    }
}

impl MoveConfig {
    /// Similarity threshold as a function of the smaller of the two token
    /// counts (§4.5).
    pub fn threshold(&self, smaller_token_count: usize) -> f64 {
        if smaller_token_count < self.small_body_tokens {
            self.small_body_threshold
        } else if smaller_token_count > self.large_body_tokens {
            self.large_body_threshold
        } else {
            self.fuzzy_threshold
        }
    }
}

/// One body's worth of precomputed matching data.
struct Candidate<'a> {
    index: usize,
    conflict: &'a Conflict,
    tokens: Vec<String>,
}

fn body_of(conflict: &Conflict) -> String {
    // Orphan delete: body lives on base. Orphan add: body lives on local
    // (preferred) or remote.
    conflict
        .base
        .as_ref()
        .or(conflict.local.as_ref())
        .or(conflict.remote.as_ref())
        .map(|d| d.body_str().into_owned())
        .unwrap_or_default()
}

/// Consolidate orphan delete/add pairs within one file's conflict list into
/// `Moved`/`Renamed+Moved` conflicts. Conflicts that are not orphans pass
/// through untouched. Deterministic: iterates in the order conflicts were
/// given.
pub fn detect_intra_file_moves(conflicts: Vec<Conflict>, config: &MoveConfig) -> Vec<Conflict> {
    let mut deletes: Vec<Candidate> = Vec::new();
    let mut adds: Vec<Candidate> = Vec::new();
    let mut passthrough: Vec<(usize, Conflict)> = Vec::new();

    for (i, c) in conflicts.iter().enumerate() {
        if c.is_orphan_delete() {
            deletes.push(Candidate { index: i, conflict: c, tokens: tokenize(&body_of(c)) });
        } else if c.is_orphan_add() {
            adds.push(Candidate { index: i, conflict: c, tokens: tokenize(&body_of(c)) });
        }
    }
    for (i, c) in conflicts.iter().enumerate() {
        if !c.is_orphan_delete() && !c.is_orphan_add() {
            passthrough.push((i, c.clone()));
        }
    }

    let mut claimed_adds: std::collections::HashSet<usize> = std::collections::HashSet::new();
    let mut merged: Vec<(usize, Conflict)> = Vec::new();
    let mut unmatched_deletes: Vec<&Candidate> = Vec::new();

    // Pass 1: exact match via hash index over orphan-add bodies.
    if config.exact_enabled {
        let mut hash_index: HashMap<String, Vec<usize>> = HashMap::new();
        for (slot, add) in adds.iter().enumerate() {
            hash_index
                .entry(move_identity_hash(&add.conflict.name, &body_of(add.conflict)))
                .or_default()
                .push(slot);
        }
        for del in &deletes {
            let h = move_identity_hash(&del.conflict.name, &body_of(del.conflict));
            let mut matched = false;
            if let Some(candidates) = hash_index.get(&h) {
                for &slot in candidates {
                    if claimed_adds.contains(&slot) {
                        continue;
                    }
                    let add = &adds[slot];
                    if add.conflict.kind != del.conflict.kind {
                        continue;
                    }
                    claimed_adds.insert(slot);
                    merged.push((del.index.min(add.index), make_exact_move(del.conflict, add.conflict)));
                    matched = true;
                    break;
                }
            }
            if !matched {
                unmatched_deletes.push(del);
            }
        }
    } else {
        unmatched_deletes.extend(deletes.iter());
    }

    // Pass 2: fuzzy match via plain Jaccard, tiered threshold.
    if config.fuzzy_enabled {
        for del in unmatched_deletes {
            if del.tokens.len() < config.min_token_count {
                continue;
            }
            let mut best: Option<(usize, f64)> = None;
            for (slot, add) in adds.iter().enumerate() {
                if claimed_adds.contains(&slot) {
                    continue;
                }
                if add.conflict.kind != del.conflict.kind {
                    continue;
                }
                if add.tokens.len() < config.min_token_count {
                    continue;
                }
                let sim = jaccard(&del.tokens, &add.tokens);
                let smaller = del.tokens.len().min(add.tokens.len());
                if sim >= config.threshold(smaller) {
                    if best.map(|(_, best_sim)| sim > best_sim).unwrap_or(true) {
                        best = Some((slot, sim));
                    }
                }
            }
            if let Some((slot, sim)) = best {
                claimed_adds.insert(slot);
                let add = &adds[slot];
                merged.push((del.index.min(add.index), make_fuzzy_move(del.conflict, add.conflict, sim)));
            }
        }
    }

    // Anything left over (unclaimed orphans) passes through as-is.
    for (i, c) in conflicts.iter().enumerate() {
        if c.is_orphan_delete() {
            if !merged.iter().any(|(_, m)| same_source(m, c)) {
                passthrough.push((i, c.clone()));
            }
        } else if c.is_orphan_add() {
            let slot = adds.iter().position(|a| a.index == i);
            if let Some(slot) = slot {
                if !claimed_adds.contains(&slot) {
                    passthrough.push((i, c.clone()));
                }
            }
        }
    }

    let mut all: Vec<(usize, Conflict)> = merged.into_iter().chain(passthrough).collect();
    all.sort_by_key(|(i, _)| *i);
    all.into_iter().map(|(_, c)| c).collect()
}

fn same_source(merged: &Conflict, delete: &Conflict) -> bool {
    merged.base.as_ref().map(|d| &d.body) == delete.base.as_ref().map(|d| &d.body) && merged.file == delete.file
}

fn make_exact_move(delete: &Conflict, add: &Conflict) -> Conflict {
    let label = if delete.name == add.name { "Moved" } else { "Renamed+Moved" };
    Conflict {
        file: delete.file.clone(),
        name: delete.name.clone(),
        kind: delete.kind,
        conflict_type: format!(
            "{} '{}' {}{} (Exact Match)",
            delete.kind,
            delete.name,
            label,
            if delete.name == add.name { String::new() } else { format!(" to '{}'", add.name) }
        ),
        status: ConflictStatus::CanAutoMerge,
        base: delete.base.clone(),
        local: add.local.clone(),
        remote: add.remote.clone(),
        user_resolution: crate::types::UserResolution::None,
    }
}

fn make_fuzzy_move(delete: &Conflict, add: &Conflict, similarity: f64) -> Conflict {
    let pct = (similarity * 100.0).round() as i64;
    Conflict {
        file: delete.file.clone(),
        name: delete.name.clone(),
        kind: delete.kind,
        conflict_type: format!("{} '{}' Moved ({}% Match)", delete.kind, delete.name, pct),
        status: ConflictStatus::CanAutoMerge,
        base: delete.base.clone(),
        local: add.local.clone(),
        remote: add.remote.clone(),
        user_resolution: crate::types::UserResolution::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Definition, DefinitionKind};

    fn def(name: &str, body: &str) -> Definition {
        Definition {
            name: name.to_string(),
            kind: DefinitionKind::Function,
            signature: name.to_string(),
            body: body.as_bytes().to_vec(),
            start_byte: 0,
            end_byte: body.len(),
            start_line: 0,
            end_line: 0,
        }
    }

    fn orphan_delete(name: &str, body: &str) -> Conflict {
        Conflict {
            file: "a.py".into(),
            name: name.into(),
            kind: DefinitionKind::Function,
            conflict_type: "Deleted".into(),
            status: ConflictStatus::NeedsResolution,
            base: Some(def(name, body)),
            local: None,
            remote: None,
            user_resolution: crate::types::UserResolution::None,
        }
    }

    fn orphan_add(name: &str, body: &str) -> Conflict {
        Conflict {
            file: "a.py".into(),
            name: name.into(),
            kind: DefinitionKind::Function,
            conflict_type: "Added (remote)".into(),
            status: ConflictStatus::NeedsResolution,
            base: None,
            local: None,
            remote: Some(def(name, body)),
            user_resolution: crate::types::UserResolution::None,
        }
    }

    #[test]
    fn exact_match_renames_and_moves() {
        let body = "def calc_total(items):\n    return sum(items)\n";
        let renamed = "def calculate_order_total(items):\n    return sum(items)\n";
        let conflicts = vec![orphan_delete("calc_total", body), orphan_add("calculate_order_total", renamed)];
        let result = detect_intra_file_moves(conflicts, &MoveConfig::default());
        assert_eq!(result.len(), 1);
        assert!(result[0].conflict_type.contains("Renamed+Moved"));
        assert_eq!(result[0].status, ConflictStatus::CanAutoMerge);
    }

    #[test]
    fn below_min_token_count_never_matches() {
        // Genuinely different logic (not just a rename), so neither the
        // name-invariant exact pass nor the fuzzy pass (below MinTokenCount)
        // should pair these.
        let conflicts = vec![orphan_delete("f", "def f(): return 1\n"), orphan_add("g", "def g(): return 2\n")];
        let result = detect_intra_file_moves(conflicts, &MoveConfig::default());
        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|c| matches!(c.status, ConflictStatus::NeedsResolution)));
    }

    #[test]
    fn toggles_are_independent() {
        let body = "def calc_total(items):\n    return sum(items)\n";
        let conflicts = vec![orphan_delete("calc_total", body), orphan_add("calc_total", body)];
        let mut cfg = MoveConfig::default();
        cfg.exact_enabled = false;
        cfg.fuzzy_enabled = false;
        let result = detect_intra_file_moves(conflicts, &cfg);
        assert_eq!(result.len(), 2, "with both passes off, orphans pass through unmerged");
    }

    #[test]
    fn fuzzy_match_above_threshold() {
        let a = "def process(items):\n    total = 0\n    for item in items:\n        total += item.value\n    return total\n";
        let b = "def process(items):\n    total = 0\n    for item in items:\n        total += item.value\n    return total + 1\n";
        let conflicts = vec![orphan_delete("process", a), orphan_add("process", b)];
        let result = detect_intra_file_moves(conflicts, &MoveConfig::default());
        assert_eq!(result.len(), 1);
        assert!(result[0].conflict_type.contains("Moved"));
    }
}
