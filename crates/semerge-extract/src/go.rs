//! Go extraction: `function_declaration`, `method_declaration` (receiver
//! folded into the display signature), `type_declaration` (struct/
//! interface/type depending on the underlying type node), and one
//! Definition per identifier in `const_declaration`/`var_declaration`.

use crate::cst::{has_error, make_definition, node_text, parse};
use semerge_core::extractor::Extractor;
use semerge_core::registry::Language;
use semerge_core::types::{Definition, DefinitionKind, FileAnalysis};
use tree_sitter::Node;

pub struct GoExtractor;

impl Extractor for GoExtractor {
    fn language(&self) -> Language {
        Language::Go
    }

    fn extract(&self, source: &[u8]) -> FileAnalysis {
        let Some(tree) = parse(source, tree_sitter_go::LANGUAGE.into()) else {
            return FileAnalysis { definitions: Vec::new(), parse_error: Some("failed to initialize go grammar".to_string()) };
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
        "function_declaration" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                let name = node_text(name_node, source).to_string();
                let block_start = node.child_by_field_name("body").map(|b| b.start_byte());
                defs.push(make_definition(name, DefinitionKind::Function, node, block_start, source));
            }
        }
        "method_declaration" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                let name = node_text(name_node, source).to_string();
                let block_start = node.child_by_field_name("body").map(|b| b.start_byte());
                defs.push(make_definition(name, DefinitionKind::Method, node, block_start, source));
            }
        }
        "type_declaration" => {
            let mut cursor = node.walk();
            for spec in node.named_children(&mut cursor) {
                if spec.kind() != "type_spec" {
                    continue;
                }
                let Some(name_node) = spec.child_by_field_name("name") else { continue };
                let name = node_text(name_node, source).to_string();
                let kind = match spec.child_by_field_name("type").map(|t| t.kind()) {
                    Some("struct_type") => DefinitionKind::Struct,
                    Some("interface_type") => DefinitionKind::Interface,
                    _ => DefinitionKind::Type,
                };
                defs.push(make_definition(name, kind, node, None, source));
            }
        }
        "const_declaration" => collect_spec_names(node, DefinitionKind::Const, source, defs),
        "var_declaration" => collect_spec_names(node, DefinitionKind::Variable, source, defs),
        _ => {}
    }
}

fn collect_spec_names(decl: Node, kind: DefinitionKind, source: &[u8], defs: &mut Vec<Definition>) {
    let mut cursor = decl.walk();
    for spec in decl.named_children(&mut cursor) {
        if !matches!(spec.kind(), "const_spec" | "var_spec") {
            continue;
        }
        let mut name_cursor = spec.walk();
        for name_node in spec.children_by_field_name("name", &mut name_cursor) {
            let name = node_text(name_node, source).to_string();
            defs.push(make_definition(name, kind, decl, None, source));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_function_and_method() {
        let src = b"package main\n\nfunc Add(a, b int) int {\n\treturn a + b\n}\n\nfunc (s *Server) Start() error {\n\treturn nil\n}\n";
        let analysis = GoExtractor.extract(src);
        let names: Vec<&str> = analysis.definitions.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Add", "Start"]);
        assert_eq!(analysis.definitions[1].kind, DefinitionKind::Method);
    }

    #[test]
    fn extracts_struct_and_interface_types() {
        let src = b"package main\n\ntype Point struct {\n\tX int\n\tY int\n}\n\ntype Shape interface {\n\tArea() float64\n}\n";
        let analysis = GoExtractor.extract(src);
        assert_eq!(analysis.definitions.len(), 2);
        assert_eq!(analysis.definitions[0].kind, DefinitionKind::Struct);
        assert_eq!(analysis.definitions[1].kind, DefinitionKind::Interface);
    }

    #[test]
    fn const_declaration_emits_one_per_identifier() {
        let src = b"package main\n\nconst (\n\tOK = 0\n\tErr = 1\n)\n";
        let analysis = GoExtractor.extract(src);
        let names: Vec<&str> = analysis.definitions.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["OK", "Err"]);
    }
}
