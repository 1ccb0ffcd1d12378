//! Tree-sitter-backed [`Extractor`](semerge_core::extractor::Extractor)
//! implementations, one per language recognized by [`semerge_core::registry::Language`].

mod cst;
pub mod go;
pub mod javascript;
pub mod mapping;
pub mod python;
pub mod rust_lang;
pub mod typescript;

pub use go::GoExtractor;
pub use javascript::JavaScriptExtractor;
pub use mapping::{JsonExtractor, YamlExtractor};
pub use python::PythonExtractor;
pub use rust_lang::RustExtractor;
pub use typescript::TypeScriptExtractor;

use semerge_core::extractor::Extractor;
use semerge_core::orchestrator::ExtractorRegistry;

/// Build a registry with every language-specific extractor wired in.
/// `Language::Unknown` has no entry; the orchestrator falls back to the
/// whole-file-as-one-Definition treatment for it.
pub fn build_registry() -> ExtractorRegistry {
    let extractors: Vec<Box<dyn Extractor>> = vec![
        Box::new(PythonExtractor),
        Box::new(JavaScriptExtractor),
        Box::new(TypeScriptExtractor),
        Box::new(GoExtractor),
        Box::new(RustExtractor),
        Box::new(YamlExtractor),
        Box::new(JsonExtractor),
    ];
    extractors.into_iter().map(|e| (e.language(), e)).collect()
}
