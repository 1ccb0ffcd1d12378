//! Rust extraction: `function_item`, `impl_item` (named `Trait for Type`
//! when a trait bound is present, else just `Type`), `struct_item`,
//! `enum_item`, `trait_item`, `type_item`, `const_item`, `static_item`.
//! Top-level items only; methods inside an `impl` block are not descended
//! into separately (the whole `impl_item` is one Definition).

use crate::cst::{has_error, make_definition, node_text, parse};
use semerge_core::extractor::Extractor;
use semerge_core::registry::Language;
use semerge_core::types::{Definition, DefinitionKind, FileAnalysis};
use tree_sitter::Node;

pub struct RustExtractor;

impl Extractor for RustExtractor {
    fn language(&self) -> Language {
        Language::Rust
    }

    fn extract(&self, source: &[u8]) -> FileAnalysis {
        let Some(tree) = parse(source, tree_sitter_rust::LANGUAGE.into()) else {
            return FileAnalysis { definitions: Vec::new(), parse_error: Some("failed to initialize rust grammar".to_string()) };
        };
        let mut defs = Vec::new();
        let root = tree.root_node();
        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            collect_item(child, source, &mut defs);
        }
        FileAnalysis { definitions: defs, parse_error: has_error(&tree).then(|| "syntax error".to_string()) }
    }
}

fn collect_item(node: Node, source: &[u8], defs: &mut Vec<Definition>) {
    match node.kind() {
        "function_item" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                let name = node_text(name_node, source).to_string();
                let block_start = node.child_by_field_name("body").map(|b| b.start_byte());
                defs.push(make_definition(name, DefinitionKind::Function, node, block_start, source));
            }
        }
        "struct_item" => push_named(node, DefinitionKind::Struct, source, defs),
        "enum_item" => push_named(node, DefinitionKind::Enum, source, defs),
        "trait_item" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                let name = node_text(name_node, source).to_string();
                let block_start = node.child_by_field_name("body").map(|b| b.start_byte());
                defs.push(make_definition(name, DefinitionKind::Trait, node, block_start, source));
            }
        }
        "type_item" => push_named(node, DefinitionKind::Type, source, defs),
        "const_item" => push_named(node, DefinitionKind::Const, source, defs),
        "static_item" => push_named(node, DefinitionKind::Static, source, defs),
        "impl_item" => {
            let type_node = node.child_by_field_name("type");
            let trait_node = node.child_by_field_name("trait");
            let name = match (trait_node, type_node) {
                (Some(t), Some(ty)) => format!("{} for {}", node_text(t, source), node_text(ty, source)),
                (None, Some(ty)) => node_text(ty, source).to_string(),
                _ => return,
            };
            let block_start = node.child_by_field_name("body").map(|b| b.start_byte());
            defs.push(make_definition(name, DefinitionKind::Impl, node, block_start, source));
        }
        "mod_item" => {
            // Inline modules (`mod foo { ... }`) are walked so their items
            // still surface; `mod foo;` (no body) is a no-op here.
            if let Some(body) = node.child_by_field_name("body") {
                let mut cursor = body.walk();
                for child in body.children(&mut cursor) {
                    collect_item(child, source, defs);
                }
            }
        }
        _ => {}
    }
}

fn push_named(node: Node, kind: DefinitionKind, source: &[u8], defs: &mut Vec<Definition>) {
    let Some(name_node) = node.child_by_field_name("name") else { return };
    let name = node_text(name_node, source).to_string();
    let block_start = node.child_by_field_name("body").map(|b| b.start_byte());
    defs.push(make_definition(name, kind, node, block_start, source));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_function_struct_enum() {
        let src = b"fn add(a: i32, b: i32) -> i32 {\n    a + b\n}\n\nstruct Point {\n    x: i32,\n}\n\nenum Color {\n    Red,\n}\n";
        let analysis = RustExtractor.extract(src);
        let names: Vec<&str> = analysis.definitions.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["add", "Point", "Color"]);
    }

    #[test]
    fn impl_item_names_trait_for_type() {
        let src = b"struct Foo;\n\nimpl Display for Foo {\n    fn fmt(&self) {}\n}\n";
        let analysis = RustExtractor.extract(src);
        let impl_def = analysis.definitions.iter().find(|d| d.kind == DefinitionKind::Impl).unwrap();
        assert_eq!(impl_def.name, "Display for Foo");
    }

    #[test]
    fn inherent_impl_names_just_the_type() {
        let src = b"struct Foo;\n\nimpl Foo {\n    fn new() -> Self { Foo }\n}\n";
        let analysis = RustExtractor.extract(src);
        let impl_def = analysis.definitions.iter().find(|d| d.kind == DefinitionKind::Impl).unwrap();
        assert_eq!(impl_def.name, "Foo");
    }
}
