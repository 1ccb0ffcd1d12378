//! YAML/JSON extraction: each top-level mapping pair becomes a `Key`
//! Definition. Nested keys are not descended into (an open question
//! resolved in SPEC_FULL.md §9: only the outermost mapping level is
//! addressable). Multi-document YAML streams are flattened into one
//! sequence of top-level keys across all documents.

use crate::cst::{has_error, make_definition, node_text, parse};
use semerge_core::extractor::Extractor;
use semerge_core::registry::Language;
use semerge_core::types::{Definition, DefinitionKind, FileAnalysis};
use tree_sitter::Node;

pub struct YamlExtractor;

impl Extractor for YamlExtractor {
    fn language(&self) -> Language {
        Language::Yaml
    }

    fn extract(&self, source: &[u8]) -> FileAnalysis {
        let Some(tree) = parse(source, tree_sitter_yaml::language()) else {
            return FileAnalysis { definitions: Vec::new(), parse_error: Some("failed to initialize yaml grammar".to_string()) };
        };
        let mut defs = Vec::new();
        let root = tree.root_node();
        let mut cursor = root.walk();
        for doc in root.children(&mut cursor) {
            if doc.kind() != "document" {
                continue;
            }
            let mut doc_cursor = doc.walk();
            for child in doc.children(&mut doc_cursor) {
                collect_yaml_mapping(child, source, &mut defs);
            }
        }
        FileAnalysis { definitions: defs, parse_error: has_error(&tree).then(|| "syntax error".to_string()) }
    }
}

fn collect_yaml_mapping(node: Node, source: &[u8], defs: &mut Vec<Definition>) {
    match node.kind() {
        "block_node" | "flow_node" => {
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                collect_yaml_mapping(child, source, defs);
            }
        }
        "block_mapping" | "flow_mapping" => {
            let mut cursor = node.walk();
            for pair in node.children(&mut cursor) {
                if !matches!(pair.kind(), "block_mapping_pair" | "flow_pair") {
                    continue;
                }
                let Some(key_node) = pair.child_by_field_name("key") else { continue };
                let name = yaml_key_text(key_node, source);
                defs.push(make_definition(name, DefinitionKind::Key, pair, None, source));
            }
        }
        _ => {}
    }
}

fn yaml_key_text(key_node: Node, source: &[u8]) -> String {
    strip_quotes(node_text(key_node, source))
}

pub struct JsonExtractor;

impl Extractor for JsonExtractor {
    fn language(&self) -> Language {
        Language::Json
    }

    fn extract(&self, source: &[u8]) -> FileAnalysis {
        let Some(tree) = parse(source, tree_sitter_json::LANGUAGE.into()) else {
            return FileAnalysis { definitions: Vec::new(), parse_error: Some("failed to initialize json grammar".to_string()) };
        };
        let mut defs = Vec::new();
        let root = tree.root_node();
        if let Some(doc) = root.named_child(0) {
            if doc.kind() == "object" {
                let mut cursor = doc.walk();
                for pair in doc.children(&mut cursor) {
                    if pair.kind() != "pair" {
                        continue;
                    }
                    let Some(key_node) = pair.child_by_field_name("key") else { continue };
                    let name = strip_quotes(node_text(key_node, source));
                    defs.push(make_definition(name, DefinitionKind::Key, pair, None, source));
                }
            }
        }
        FileAnalysis { definitions: defs, parse_error: has_error(&tree).then(|| "syntax error".to_string()) }
    }
}

fn strip_quotes(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.len() >= 2 {
        let bytes = trimmed.as_bytes();
        let first = bytes[0];
        let last = bytes[bytes.len() - 1];
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return trimmed[1..trimmed.len() - 1].to_string();
        }
    }
    trimmed.to_string()
}
