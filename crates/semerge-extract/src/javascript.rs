//! JavaScript (and, via [`crate::typescript`], TypeScript) extraction:
//! top-level `function_declaration`, `class_declaration`, `const`/`let`/`var`
//! bound to a function or arrow expression, and methods/getters/setters/
//! constructor/arrow-function class fields inside classes.

use crate::cst::{has_error, make_definition, node_text, parse};
use semerge_core::extractor::Extractor;
use semerge_core::registry::Language;
use semerge_core::types::{Definition, DefinitionKind, FileAnalysis};
use tree_sitter::Node;

pub struct JavaScriptExtractor;

impl Extractor for JavaScriptExtractor {
    fn language(&self) -> Language {
        Language::JavaScript
    }

    fn extract(&self, source: &[u8]) -> FileAnalysis {
        extract_with(source, tree_sitter_javascript::LANGUAGE.into(), "failed to initialize javascript grammar")
    }
}

pub(crate) fn extract_with(source: &[u8], language: tree_sitter::Language, init_error: &str) -> FileAnalysis {
    let Some(tree) = parse(source, language) else {
        return FileAnalysis { definitions: Vec::new(), parse_error: Some(init_error.to_string()) };
    };
    let mut defs = Vec::new();
    let root = tree.root_node();
    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        collect_top_level(child, source, &mut defs);
    }
    FileAnalysis { definitions: defs, parse_error: has_error(&tree).then(|| "syntax error".to_string()) }
}

pub(crate) fn collect_top_level(node: Node, source: &[u8], defs: &mut Vec<Definition>) {
    match node.kind() {
        "function_declaration" => {
            if let Some(def) = named_function(node, node, source) {
                defs.push(def);
            }
        }
        "class_declaration" => push_class(node, node, source, defs),
        "lexical_declaration" | "variable_declaration" => {
            let mut cursor = node.walk();
            for decl in node.children_by_field_name("declarator", &mut cursor) {
                if let Some(def) = variable_bound_function(decl, node, source) {
                    defs.push(def);
                }
            }
        }
        "export_statement" => {
            if let Some(inner) = node.child_by_field_name("declaration") {
                collect_top_level(inner, source, defs);
            }
        }
        _ => {}
    }
}

fn named_function(fn_node: Node, span_node: Node, source: &[u8]) -> Option<Definition> {
    let name_node = fn_node.child_by_field_name("name")?;
    let name = node_text(name_node, source).to_string();
    let block_start = fn_node.child_by_field_name("body").map(|b| b.start_byte());
    Some(make_definition(name, DefinitionKind::Function, span_node, block_start, source))
}

fn variable_bound_function(declarator: Node, span_node: Node, source: &[u8]) -> Option<Definition> {
    let name_node = declarator.child_by_field_name("name")?;
    let value = declarator.child_by_field_name("value")?;
    if !matches!(value.kind(), "arrow_function" | "function_expression" | "function") {
        return None;
    }
    let name = node_text(name_node, source).to_string();
    let block_start = value.child_by_field_name("body").map(|b| b.start_byte());
    Some(make_definition(name, DefinitionKind::Function, span_node, block_start, source))
}

pub(crate) fn push_class(class_node: Node, span_node: Node, source: &[u8], defs: &mut Vec<Definition>) {
    let Some(name_node) = class_node.child_by_field_name("name") else { return };
    let name = node_text(name_node, source).to_string();
    let block_start = class_node.child_by_field_name("body").map(|b| b.start_byte());
    defs.push(make_definition(name.clone(), DefinitionKind::Class, span_node, block_start, source));
    if let Some(body) = class_node.child_by_field_name("body") {
        collect_members(body, &name, source, defs);
    }
}

fn collect_members(class_body: Node, class_name: &str, source: &[u8], defs: &mut Vec<Definition>) {
    let mut cursor = class_body.walk();
    for child in class_body.children(&mut cursor) {
        match child.kind() {
            "method_definition" => {
                let Some(name_node) = child.child_by_field_name("name") else { continue };
                let prop = node_text(name_node, source);
                let dotted = format!("{class_name}.{prop}");
                let kind = if prop == "constructor" {
                    DefinitionKind::Method
                } else if starts_with_keyword(child, source, "get") {
                    DefinitionKind::Getter
                } else if starts_with_keyword(child, source, "set") {
                    DefinitionKind::Setter
                } else {
                    DefinitionKind::Method
                };
                let block_start = child.child_by_field_name("body").map(|b| b.start_byte());
                defs.push(make_definition(dotted, kind, child, block_start, source));
            }
            "field_definition" | "public_field_definition" => {
                let Some(prop_node) = child.child_by_field_name("property") else { continue };
                let Some(value) = child.child_by_field_name("value") else { continue };
                if !matches!(value.kind(), "arrow_function" | "function_expression" | "function") {
                    continue;
                }
                let dotted = format!("{class_name}.{}", node_text(prop_node, source));
                let block_start = value.child_by_field_name("body").map(|b| b.start_byte());
                defs.push(make_definition(dotted, DefinitionKind::Method, child, block_start, source));
            }
            _ => {}
        }
    }
}

fn starts_with_keyword(method_node: Node, source: &[u8], keyword: &str) -> bool {
    let mut cursor = method_node.walk();
    for child in method_node.children(&mut cursor) {
        if child.kind() == "property_identifier" {
            break;
        }
        if node_text(child, source) == keyword {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_top_level_function_declaration() {
        let src = b"function add(a, b) {\n  return a + b;\n}\n";
        let analysis = JavaScriptExtractor.extract(src);
        assert_eq!(analysis.definitions.len(), 1);
        assert_eq!(analysis.definitions[0].name, "add");
    }

    #[test]
    fn extracts_const_arrow_function() {
        let src = b"const add = (a, b) => {\n  return a + b;\n};\n";
        let analysis = JavaScriptExtractor.extract(src);
        assert_eq!(analysis.definitions.len(), 1);
        assert_eq!(analysis.definitions[0].name, "add");
        assert_eq!(analysis.definitions[0].kind, DefinitionKind::Function);
    }

    #[test]
    fn extracts_class_with_constructor_and_getter() {
        let src = b"class Box {\n  constructor(v) {\n    this.v = v;\n  }\n\n  get value() {\n    return this.v;\n  }\n}\n";
        let analysis = JavaScriptExtractor.extract(src);
        let names: Vec<&str> = analysis.definitions.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Box", "Box.constructor", "Box.value"]);
        assert_eq!(analysis.definitions[2].kind, DefinitionKind::Getter);
    }
}
