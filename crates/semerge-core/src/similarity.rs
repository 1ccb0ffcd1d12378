//! Normalization, hashing, tokenization, and Jaccard similarity.
//!
//! This is the shared kernel the classifier (exact equality after
//! normalization), the intra-file move detector (exact hash + fuzzy
//! Jaccard), and the inter-file move detector all build on.

use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Collapse all Unicode whitespace runs to a single ASCII space and trim.
/// This is the canonical form the classifier compares bodies under.
pub fn norm(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_ws = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            in_ws = true;
        } else {
            if in_ws && !out.is_empty() {
                out.push(' ');
            }
            in_ws = false;
            out.push(ch);
        }
    }
    out
}

/// SHA-256 of `norm(body)`, lowercased hex. Used as an identity key for
/// exact-match pairing in the move detectors.
pub fn hash_body(body: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(norm(body).as_bytes());
    hex::encode(hasher.finalize())
}

/// Exact-match identity key for move pairing (§4.5 Pass 1): the
/// declaration's own (unqualified) name is masked out of its body before
/// hashing, so a pure rename with otherwise byte-identical logic still
/// pairs as an `Exact Match` rather than falling through to the fuzzy pass.
pub fn move_identity_hash(name: &str, body: &str) -> String {
    let leaf = name.rsplit('.').next().unwrap_or(name);
    if leaf.is_empty() {
        return hash_body(body);
    }
    hash_body(&body.replacen(leaf, "\u{0}", 1))
}

/// A maximal run of `{letter, digit, '_'}`, Unicode-aware.
pub fn tokenize(s: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    for ch in s.chars() {
        if ch.is_alphanumeric() || ch == '_' {
            current.push(ch);
        } else if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn counts(tokens: &[String]) -> HashMap<&str, usize> {
    let mut m = HashMap::new();
    for t in tokens {
        *m.entry(t.as_str()).or_insert(0) += 1;
    }
    m
}

/// Plain Jaccard over set-of-tokens. Both empty -> 1.0; exactly one empty ->
/// 0.0.
pub fn jaccard(a: &[String], b: &[String]) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let sa: std::collections::HashSet<&str> = a.iter().map(String::as_str).collect();
    let sb: std::collections::HashSet<&str> = b.iter().map(String::as_str).collect();
    let inter = sa.intersection(&sb).count();
    let union = sa.union(&sb).count();
    inter as f64 / union as f64
}

/// Per-token weight used by [`weighted_jaccard`]: 0.2 for single-character
/// tokens, 0.3 for a member of [`KEYWORDS`], else 1.0.
pub fn token_weight(token: &str) -> f64 {
    if token.chars().count() == 1 {
        0.2
    } else if KEYWORDS.contains(&token) {
        0.3
    } else {
        1.0
    }
}

/// Weighted Jaccard: numerator `Σ weight * min(freq_a, freq_b)`, denominator
/// `Σ weight * max(freq_a, freq_b)`, over the union of distinct tokens.
/// Used where rare tokens should dominate the score.
pub fn weighted_jaccard(a: &[String], b: &[String]) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let ca = counts(a);
    let cb = counts(b);
    let mut numerator = 0.0;
    let mut denominator = 0.0;
    let all_tokens: std::collections::HashSet<&str> = ca.keys().chain(cb.keys()).copied().collect();
    for token in all_tokens {
        let fa = *ca.get(token).unwrap_or(&0);
        let fb = *cb.get(token).unwrap_or(&0);
        let w = token_weight(token);
        numerator += w * fa.min(fb) as f64;
        denominator += w * fa.max(fb) as f64;
    }
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Fixed keyword table for [`weighted_jaccard`]: control-flow, declarator,
/// and type-literal keywords across the target languages, plus a handful of
/// very common short identifiers. Committed as data (per Design Note §9),
/// not derived from any one language's reserved-word list.
pub const KEYWORDS: &[&str] = &[
    // control flow
    "if", "else", "elif", "for", "while", "return", "break", "continue", "match", "switch",
    "case", "default", "try", "except", "catch", "finally", "raise", "throw", "yield", "async",
    "await", "loop", "do",
    // declarators
    "def", "function", "fn", "class", "struct", "interface", "trait", "enum", "impl", "type",
    "const", "static", "let", "var", "pub", "private", "public", "protected", "func", "package",
    "import", "export", "from", "use", "mod", "module",
    // type literals
    "int", "str", "string", "bool", "boolean", "float", "None", "null", "nil", "true", "false",
    "self", "this", "void", "any", "object",
    // very common identifiers
    "i", "j", "k", "n", "x", "y", "err", "ok", "e", "v", "id",
];

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(s: &str) -> Vec<String> {
        tokenize(s)
    }

    #[test]
    fn norm_collapses_whitespace() {
        assert_eq!(norm("def  f():\n    return  1"), "def f(): return 1");
        assert_eq!(norm("  hi  "), "hi");
    }

    #[test]
    fn tokenize_empty_input() {
        assert_eq!(tokenize(""), Vec::<String>::new());
        assert_eq!(tokenize("   \n\t "), Vec::<String>::new());
    }

    #[test]
    fn tokenize_maximal_runs() {
        assert_eq!(toks("foo_bar(baz, 42)"), vec!["foo_bar", "baz", "42"]);
    }

    #[test]
    fn jaccard_boundaries() {
        assert_eq!(jaccard(&[], &[]), 1.0);
        assert_eq!(jaccard(&toks("a b"), &[]), 0.0);
        assert_eq!(jaccard(&[], &toks("a b")), 0.0);
        assert_eq!(jaccard(&toks("a b c"), &toks("a b c")), 1.0);
    }

    #[test]
    fn jaccard_partial_overlap() {
        let a = toks("a b c");
        let b = toks("b c d");
        // intersection {b,c} = 2, union {a,b,c,d} = 4
        assert!((jaccard(&a, &b) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn weighted_jaccard_boundaries() {
        assert_eq!(weighted_jaccard(&[], &[]), 1.0);
        assert_eq!(weighted_jaccard(&toks("a"), &[]), 0.0);
    }

    #[test]
    fn keyword_table_contains_exemplars() {
        for kw in ["if", "for", "while", "def", "class", "return", "i", "err", "ok"] {
            assert!(KEYWORDS.contains(&kw), "expected {kw} in keyword table");
        }
    }

    #[test]
    fn hash_is_stable_under_whitespace_changes() {
        assert_eq!(hash_body("def f():\n  return 1"), hash_body("def f(): return 1"));
        assert_ne!(hash_body("def f(): return 1"), hash_body("def f(): return 2"));
    }

    #[test]
    fn move_identity_hash_ignores_a_pure_rename() {
        let old = move_identity_hash("calc_total", "def calc_total(items):\n    return sum(items)\n");
        let new = move_identity_hash("calculate_order_total", "def calculate_order_total(items):\n    return sum(items)\n");
        assert_eq!(old, new);
    }

    #[test]
    fn move_identity_hash_still_detects_a_real_change() {
        let old = move_identity_hash("f", "def f(): return 1\n");
        let new = move_identity_hash("g", "def g(): return 2\n");
        assert_ne!(old, new);
    }

    #[test]
    fn move_identity_hash_uses_leaf_name_for_dotted_methods() {
        let old = move_identity_hash("Calc.add", "def add(self, a, b):\n    return a + b\n");
        let new = move_identity_hash("Calc.sum", "def sum(self, a, b):\n    return a + b\n");
        assert_eq!(old, new);
    }
}
