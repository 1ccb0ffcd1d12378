//! TypeScript extraction: everything [`crate::javascript`] extracts plus
//! `interface_declaration` and `type_alias_declaration`.

use crate::cst::{has_error, make_definition, node_text, parse};
use semerge_core::extractor::Extractor;
use semerge_core::registry::Language;
use semerge_core::types::{Definition, DefinitionKind, FileAnalysis};
use tree_sitter::Node;

pub struct TypeScriptExtractor;

impl Extractor for TypeScriptExtractor {
    fn language(&self) -> Language {
        Language::TypeScript
    }

    fn extract(&self, source: &[u8]) -> FileAnalysis {
        let Some(tree) = parse(source, tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()) else {
            return FileAnalysis { definitions: Vec::new(), parse_error: Some("failed to initialize typescript grammar".to_string()) };
        };
        let mut defs = Vec::new();
        let root = tree.root_node();
        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            collect_top_level(child, source, &mut defs);
        }
        FileAnalysis { definitions: defs, parse_error: has_error(&tree).then(|| "syntax error".to_string()) }
    }
}

fn collect_top_level(node: Node, source: &[u8], defs: &mut Vec<Definition>) {
    match node.kind() {
        "interface_declaration" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                let name = node_text(name_node, source).to_string();
                let block_start = node.child_by_field_name("body").map(|b| b.start_byte());
                defs.push(make_definition(name, DefinitionKind::Interface, node, block_start, source));
            }
        }
        "type_alias_declaration" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                let name = node_text(name_node, source).to_string();
                defs.push(make_definition(name, DefinitionKind::Type, node, None, source));
            }
        }
        "export_statement" => {
            if let Some(inner) = node.child_by_field_name("declaration") {
                collect_top_level(inner, source, defs);
            }
        }
        _ => crate::javascript::collect_top_level(node, source, defs),
    }
}
