//! Declaration extraction for C headers
//!
//! This module provides two parsing modes:
//! - Strict mode: Fails on syntax errors (default, for clean headers)
//! - Tolerant mode: Extracts what it can even with errors (for real-world headers)

use apimon_decl::{HeaderIR, ParserConfig, ParserError};
use std::path::Path;
use tree_sitter::{Node, Parser};

use crate::preprocessor::CPreprocessor;
use crate::visitor::DeclVisitor;

/// Result of extraction with additional metadata
#[derive(Debug)]
pub struct ExtractionResult {
    pub ir: HeaderIR,
    /// Number of syntax errors encountered (0 = clean parse)
    pub error_count: usize,
    /// Whether the file was fully parsed or partially
    pub is_partial: bool,
}

/// Extract function declarations from C header source
pub fn extract(
    source: &str,
    file_path: &Path,
    config: &ParserConfig,
) -> Result<ExtractionResult, ParserError> {
    let processed_source = if config.preprocess {
        CPreprocessor::new().preprocess(source)
    } else {
        source.to_string()
    };
    log::debug!(
        "{}: {} byte(s), preprocess={}",
        file_path.display(),
        source.len(),
        config.preprocess
    );

    let mut parser = Parser::new();
    let language = tree_sitter_c::language();
    parser
        .set_language(&language)
        .map_err(|e| ParserError::ParseError(file_path.to_path_buf(), e.to_string()))?;

    let tree = parser.parse(&processed_source, None).ok_or_else(|| {
        ParserError::ParseError(file_path.to_path_buf(), "Failed to parse".to_string())
    })?;

    let root_node = tree.root_node();
    let has_error = root_node.has_error();
    let error_count = if has_error {
        count_errors(root_node)
    } else {
        0
    };

    // In strict mode, fail on the first error
    if has_error && !config.tolerant {
        let (line, column) = first_error(root_node)
            .map(|n| (n.start_position().row + 1, n.start_position().column + 1))
            .unwrap_or((0, 0));
        return Err(ParserError::SyntaxError(
            file_path.to_path_buf(),
            line,
            column,
            format!("Syntax error ({error_count} error nodes)"),
        ));
    }

    let mut ir = HeaderIR::new(file_path.to_path_buf());

    // Visit the AST - the visitor will skip ERROR nodes gracefully
    let mut visitor = DeclVisitor::new(processed_source.as_bytes());
    visitor.visit_node(root_node);

    ir.functions = visitor.functions;
    ir.error_count = error_count;

    log::debug!(
        "{}: extracted {} function declaration(s)",
        file_path.display(),
        ir.functions.len()
    );

    Ok(ExtractionResult {
        ir,
        error_count,
        is_partial: has_error,
    })
}

/// Count ERROR nodes in the syntax tree
fn count_errors(node: Node) -> usize {
    let mut count = 0;

    if node.is_error() || node.is_missing() {
        count += 1;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        count += count_errors(child);
    }

    count
}

/// First ERROR or MISSING node in document order
fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }

    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}
