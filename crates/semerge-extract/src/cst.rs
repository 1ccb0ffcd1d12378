//! Shared tree-sitter plumbing used by every per-language extractor.

use semerge_core::types::{Definition, DefinitionKind};
use tree_sitter::{Node, Parser, Tree};

pub fn parse(source: &[u8], language: tree_sitter::Language) -> Option<Tree> {
    let mut parser = Parser::new();
    parser.set_language(&language).ok()?;
    parser.parse(source, None)
}

pub fn node_text<'a>(node: Node, source: &'a [u8]) -> &'a str {
    std::str::from_utf8(&source[node.byte_range()]).unwrap_or("")
}

pub fn byte_to_line(source: &[u8], byte: usize) -> u32 {
    source[..byte.min(source.len())].iter().filter(|&&b| b == b'\n').count() as u32
}

/// Build a `Definition` whose body is `body_node`'s full span and whose
/// display signature is the text from `body_node`'s start up to
/// `block_start` (the line(s) before the block/body child), or the whole
/// node text when there is no distinct block child (§4.2 body-slicing rule).
pub fn make_definition(name: String, kind: DefinitionKind, body_node: Node, block_start: Option<usize>, source: &[u8]) -> Definition {
    let start_byte = body_node.start_byte();
    let end_byte = body_node.end_byte();
    let signature_end = block_start.unwrap_or(end_byte);
    let signature = std::str::from_utf8(&source[start_byte..signature_end.min(end_byte)]).unwrap_or("").trim().to_string();
    Definition {
        name,
        kind,
        signature,
        body: source[start_byte..end_byte].to_vec(),
        start_byte,
        end_byte,
        start_line: byte_to_line(source, start_byte),
        end_line: byte_to_line(source, end_byte),
    }
}

/// Whether `tree` reports any syntax error, used to populate
/// `FileAnalysis::parse_error` per the propagation policy (§7): a parse
/// error downgrades the file to one conflict rather than aborting.
pub fn has_error(tree: &Tree) -> bool {
    tree.root_node().has_error()
}
