//! Python extraction: top-level `function_definition`/`class_definition`,
//! methods inside classes (dotted names), decorated variants of both.

use crate::cst::{has_error, make_definition, node_text, parse};
use semerge_core::extractor::Extractor;
use semerge_core::registry::Language;
use semerge_core::types::{Definition, DefinitionKind, FileAnalysis};
use tree_sitter::Node;

pub struct PythonExtractor;

impl Extractor for PythonExtractor {
    fn language(&self) -> Language {
        Language::Python
    }

    fn extract(&self, source: &[u8]) -> FileAnalysis {
        let Some(tree) = parse(source, tree_sitter_python::LANGUAGE.into()) else {
            return FileAnalysis { definitions: Vec::new(), parse_error: Some("failed to initialize python grammar".into()) };
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
        "function_definition" => {
            if let Some(def) = function_def(node, node, source) {
                defs.push(def);
            }
        }
        "class_definition" => push_class(node, node, source, defs),
        "decorated_definition" => {
            if let Some(inner) = node.child_by_field_name("definition") {
                match inner.kind() {
                    "function_definition" => {
                        if let Some(def) = function_def(inner, node, source) {
                            defs.push(def);
                        }
                    }
                    "class_definition" => push_class(inner, node, source, defs),
                    _ => {}
                }
            }
        }
        _ => {}
    }
}

fn push_class(class_node: Node, span_node: Node, source: &[u8], defs: &mut Vec<Definition>) {
    let Some(name_node) = class_node.child_by_field_name("name") else { return };
    let name = node_text(name_node, source).to_string();
    let block_start = class_node.child_by_field_name("body").map(|b| b.start_byte());
    defs.push(make_definition(name.clone(), DefinitionKind::Class, span_node, block_start, source));
    if let Some(body) = class_node.child_by_field_name("body") {
        collect_methods(body, &name, source, defs);
    }
}

fn function_def(fn_node: Node, span_node: Node, source: &[u8]) -> Option<Definition> {
    let name_node = fn_node.child_by_field_name("name")?;
    let name = node_text(name_node, source).to_string();
    let block_start = fn_node.child_by_field_name("body").map(|b| b.start_byte());
    Some(make_definition(name, DefinitionKind::Function, span_node, block_start, source))
}

fn collect_methods(class_body: Node, class_name: &str, source: &[u8], defs: &mut Vec<Definition>) {
    let mut cursor = class_body.walk();
    for child in class_body.children(&mut cursor) {
        match child.kind() {
            "function_definition" => {
                if let Some(name_node) = child.child_by_field_name("name") {
                    let dotted = format!("{class_name}.{}", node_text(name_node, source));
                    let block_start = child.child_by_field_name("body").map(|b| b.start_byte());
                    defs.push(make_definition(dotted, DefinitionKind::Method, child, block_start, source));
                }
            }
            "decorated_definition" => {
                if let Some(inner) = child.child_by_field_name("definition") {
                    if inner.kind() == "function_definition" {
                        if let Some(name_node) = inner.child_by_field_name("name") {
                            let dotted = format!("{class_name}.{}", node_text(name_node, source));
                            let block_start = inner.child_by_field_name("body").map(|b| b.start_byte());
                            defs.push(make_definition(dotted, DefinitionKind::Method, child, block_start, source));
                        }
                    }
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_top_level_function() {
        let src = b"def calc_total(items):\n    return sum(items)\n";
        let analysis = PythonExtractor.extract(src);
        assert_eq!(analysis.definitions.len(), 1);
        assert_eq!(analysis.definitions[0].name, "calc_total");
        assert_eq!(analysis.definitions[0].kind, DefinitionKind::Function);
        assert_eq!(&analysis.definitions[0].body[..], &src[..]);
    }

    #[test]
    fn extracts_class_and_dotted_methods() {
        let src = b"class Calc:\n    def add(self, a, b):\n        return a + b\n\n    def sub(self, a, b):\n        return a - b\n";
        let analysis = PythonExtractor.extract(src);
        let names: Vec<&str> = analysis.definitions.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Calc", "Calc.add", "Calc.sub"]);
        assert_eq!(analysis.definitions[1].kind, DefinitionKind::Method);
    }

    #[test]
    fn decorated_function_body_includes_decorator() {
        let src = b"@cache\ndef f():\n    return 1\n";
        let analysis = PythonExtractor.extract(src);
        assert_eq!(analysis.definitions.len(), 1);
        assert!(analysis.definitions[0].body_str().starts_with("@cache"));
    }

    #[test]
    fn definitions_have_non_decreasing_start_byte() {
        let src = b"def a(): pass\n\ndef b(): pass\n\nclass C:\n    def m(self): pass\n";
        let analysis = PythonExtractor.extract(src);
        let mut last = 0usize;
        for def in &analysis.definitions {
            assert!(def.start_byte >= last);
            last = def.start_byte;
        }
    }
}
