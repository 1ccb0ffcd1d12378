//! Three-way classification of each name's fate across BASE/LOCAL/REMOTE.
//!
//! Implements the case table in SPEC_FULL.md §4.3 exactly: each name present
//! in the union of the three definition dictionaries gets classified into
//! one conflict type with an auto-merge/needs-resolution status, or is
//! dropped entirely when all three sides agree.

use crate::comments::comment_stripped_norm;
use crate::registry::Language;
use crate::similarity::norm;
use crate::types::{Conflict, ConflictStatus, Definition, DefinitionKind, FileAnalysis, UserResolution};

/// Classify one file's three versions into an ordered conflict list.
///
/// Names with no conflict (all three sides equal under `norm`) are omitted.
pub fn classify(file: &str, language: Language, base: &FileAnalysis, local: &FileAnalysis, remote: &FileAnalysis) -> Vec<Conflict> {
    let base_map = base.by_name();
    let local_map = local.by_name();
    let remote_map = remote.by_name();

    let mut names: Vec<&str> = Vec::new();
    let mut seen = std::collections::HashSet::new();
    for def in base.definitions.iter().chain(&local.definitions).chain(&remote.definitions) {
        if seen.insert(def.name.as_str()) {
            names.push(def.name.as_str());
        }
    }

    let mut out = Vec::new();
    for name in names {
        let b = base_map.get(name).copied();
        let l = local_map.get(name).copied();
        let r = remote_map.get(name).copied();
        if let Some(conflict) = classify_one(file, language, name, b, l, r) {
            out.push(conflict);
        }
    }
    out
}

fn kind_of(b: Option<&Definition>, l: Option<&Definition>, r: Option<&Definition>) -> DefinitionKind {
    l.or(r).or(b).map(|d| d.kind).expect("at least one side present")
}

fn norm_eq(a: &Definition, b: &Definition) -> bool {
    norm(&a.body_str()) == norm(&b.body_str())
}

#[allow(clippy::too_many_arguments)]
fn classify_one(
    file: &str,
    language: Language,
    name: &str,
    b: Option<&Definition>,
    l: Option<&Definition>,
    r: Option<&Definition>,
) -> Option<Conflict> {
    let kind = kind_of(b, l, r);
    let mk = |conflict_type: &str, status: ConflictStatus| Conflict {
        file: file.to_string(),
        name: name.to_string(),
        kind,
        conflict_type: conflict_type.to_string(),
        status,
        base: b.cloned(),
        local: l.cloned(),
        remote: r.cloned(),
        user_resolution: UserResolution::None,
    };

    match (b, l, r) {
        // B∅ ∧ L ∧ R
        (None, Some(l_def), Some(r_def)) => {
            if norm_eq(l_def, r_def) {
                Some(mk("Added (identical)", ConflictStatus::CanAutoMerge))
            } else {
                Some(mk("Added (differs)", ConflictStatus::NeedsResolution))
            }
        }
        // B∅ ∧ L ∧ R∅
        (None, Some(_), None) => Some(mk("Added (local)", ConflictStatus::NeedsResolution)),
        // B∅ ∧ L∅ ∧ R
        (None, None, Some(_)) => Some(mk("Added (remote)", ConflictStatus::NeedsResolution)),
        // B ∧ L∅ ∧ R∅: both sides independently agree to delete.
        (Some(_), None, None) => Some(mk("Deleted", ConflictStatus::CanAutoMerge)),
        // B ∧ L∅ ∧ R
        (Some(b_def), None, Some(r_def)) => {
            if norm_eq(r_def, b_def) {
                Some(mk("Deleted (local)", ConflictStatus::CanAutoMerge))
            } else {
                Some(mk("Delete/Modify", ConflictStatus::NeedsResolution))
            }
        }
        // B ∧ L ∧ R∅
        (Some(b_def), Some(l_def), None) => {
            if norm_eq(l_def, b_def) {
                Some(mk("Deleted (remote)", ConflictStatus::CanAutoMerge))
            } else {
                Some(mk("Modify/Delete", ConflictStatus::NeedsResolution))
            }
        }
        // B ∧ L ∧ R
        (Some(b_def), Some(l_def), Some(r_def)) => {
            if l_def.body == b_def.body && r_def.body == b_def.body {
                return None;
            }
            let l_eq_b = norm_eq(l_def, b_def);
            let r_eq_b = norm_eq(r_def, b_def);
            if l_eq_b && r_eq_b {
                // Both sides are whitespace-equivalent to base but at least
                // one differs at the byte level: pick remote's formatting.
                Some(mk("Formatted Change", ConflictStatus::CanAutoMerge))
            } else if l_eq_b && !r_eq_b {
                Some(mk("Updated (remote)", ConflictStatus::CanAutoMerge))
            } else if r_eq_b && !l_eq_b {
                Some(mk("Updated (local)", ConflictStatus::CanAutoMerge))
            } else if l_def.body == r_def.body {
                Some(mk("Modified (same)", ConflictStatus::CanAutoMerge))
            } else if norm_eq(l_def, r_def) {
                Some(mk("Formatted Change", ConflictStatus::CanAutoMerge))
            } else if comment_stripped_norm(language, &l_def.body_str()) == comment_stripped_norm(language, &r_def.body_str()) {
                Some(mk("Comment Change", ConflictStatus::CanAutoMerge))
            } else {
                Some(mk(&format!("{kind} '{name}' Modified"), ConflictStatus::NeedsResolution))
            }
        }
        (None, None, None) => unreachable!("name must be present on at least one side"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DefinitionKind;

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

    fn analysis(defs: Vec<Definition>) -> FileAnalysis {
        FileAnalysis { definitions: defs, parse_error: None }
    }

    #[test]
    fn added_identical_auto_merges() {
        let base = analysis(vec![]);
        let local = analysis(vec![def("f", "def f(): return 1\n")]);
        let remote = analysis(vec![def("f", "def f(): return 1\n")]);
        let conflicts = classify("a.py", Language::Python, &base, &local, &remote);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].conflict_type, "Added (identical)");
        assert_eq!(conflicts[0].status, ConflictStatus::CanAutoMerge);
    }

    #[test]
    fn added_differs_needs_resolution() {
        let base = analysis(vec![]);
        let local = analysis(vec![def("f", "def f(): return 1\n")]);
        let remote = analysis(vec![def("f", "def f(): return 2\n")]);
        let conflicts = classify("a.py", Language::Python, &base, &local, &remote);
        assert_eq!(conflicts[0].conflict_type, "Added (differs)");
        assert_eq!(conflicts[0].status, ConflictStatus::NeedsResolution);
    }

    #[test]
    fn both_delete_auto_merges() {
        let base = analysis(vec![def("keep", "def keep(): pass\n"), def("remove", "def remove(): pass\n")]);
        let local = analysis(vec![def("keep", "def keep(): pass\n")]);
        let remote = analysis(vec![def("keep", "def keep(): pass\n")]);
        let conflicts = classify("a.py", Language::Python, &base, &local, &remote);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].name, "remove");
        assert_eq!(conflicts[0].conflict_type, "Deleted");
        assert_eq!(conflicts[0].status, ConflictStatus::CanAutoMerge);
    }

    #[test]
    fn divergent_edit_needs_resolution() {
        let base = analysis(vec![def("f", "def f(x): return x\n")]);
        let local = analysis(vec![def("f", "def f(x): return x*2\n")]);
        let remote = analysis(vec![def("f", "def f(x): return x-1\n")]);
        let conflicts = classify("a.py", Language::Python, &base, &local, &remote);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].status, ConflictStatus::NeedsResolution);
        assert!(conflicts[0].conflict_type.contains("Modified"));
    }

    #[test]
    fn formatted_agreement_auto_merges() {
        let base = analysis(vec![def("g", "def g(): return 1\n")]);
        let local = analysis(vec![def("g", "def g():  return  1\n")]);
        let remote = analysis(vec![def("g", "def g(): return 1\n")]);
        let conflicts = classify("a.py", Language::Python, &base, &local, &remote);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].conflict_type, "Formatted Change");
        assert_eq!(conflicts[0].status, ConflictStatus::CanAutoMerge);
    }

    #[test]
    fn no_conflict_when_all_sides_equal() {
        let base = analysis(vec![def("f", "def f(): pass\n")]);
        let local = analysis(vec![def("f", "def f(): pass\n")]);
        let remote = analysis(vec![def("f", "def f(): pass\n")]);
        assert!(classify("a.py", Language::Python, &base, &local, &remote).is_empty());
    }

    #[test]
    fn updated_remote_and_local_classify_correctly() {
        let base = analysis(vec![def("f", "def f(): return 0\n")]);
        let local_unchanged = analysis(vec![def("f", "def f(): return 0\n")]);
        let remote_changed = analysis(vec![def("f", "def f(): return 1\n")]);
        let c = classify("a.py", Language::Python, &base, &local_unchanged, &remote_changed);
        assert_eq!(c[0].conflict_type, "Updated (remote)");

        let local_changed = analysis(vec![def("f", "def f(): return 1\n")]);
        let remote_unchanged = analysis(vec![def("f", "def f(): return 0\n")]);
        let c = classify("a.py", Language::Python, &base, &local_changed, &remote_unchanged);
        assert_eq!(c[0].conflict_type, "Updated (local)");
    }

    #[test]
    fn comment_only_change_auto_merges() {
        let base = analysis(vec![def("f", "def f():\n    return 1\n")]);
        let local = analysis(vec![def("f", "def f():\n    return 1  # local note\n")]);
        let remote = analysis(vec![def("f", "def f():\n    return 1  # remote note\n")]);
        let c = classify("a.py", Language::Python, &base, &local, &remote);
        assert_eq!(c[0].conflict_type, "Comment Change");
        assert_eq!(c[0].status, ConflictStatus::CanAutoMerge);
    }
}
