//! Tree-sitter front-end for TypeScript source units.
//!
//! Parses `.ts`/`.tsx` text into a [`ParsedUnit`]. Units whose tree contains
//! syntax errors are rejected with [`UnitError::Parse`] and never reach the
//! extractor.

use tree_sitter::{Language, Node, Parser, Tree};

use super::UnitError;

/// Grammar variant for a source unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageVariant {
    /// `.ts`, `.mts`, `.cts`, `.d.ts`
    TypeScript,
    /// `.tsx`
    Tsx,
}

impl LanguageVariant {
    /// Pick the grammar from a unit id's extension. Unknown extensions parse
    /// as plain TypeScript.
    #[must_use]
    pub fn from_unit_id(unit_id: &str) -> Self {
        let ext = std::path::Path::new(unit_id)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("tsx") => Self::Tsx,
            _ => Self::TypeScript,
        }
    }

    fn language(self) -> Language {
        match self {
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Self::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }
}

/// A successfully parsed source unit.
#[derive(Debug)]
pub struct ParsedUnit {
    /// Unit identifier (usually the path)
    pub id: String,
    /// Full source text
    pub source: String,
    /// Syntax tree over `source`
    pub tree: Tree,
}

impl ParsedUnit {
    /// Source text covered by `node`.
    #[must_use]
    pub fn text(&self, node: &Node<'_>) -> &str {
        &self.source[node.byte_range()]
    }
}

/// Parse a source unit.
///
/// # Errors
///
/// Returns [`UnitError::Parse`] if the grammar cannot be loaded, the parser
/// produces no tree, or the tree contains an error or missing node.
///
/// # Example
///
/// ```
/// use typedupe::scanner::parse_unit;
///
/// let unit = parse_unit("a.ts", "type A = string;".to_string()).unwrap();
/// assert_eq!(unit.id, "a.ts");
///
/// assert!(parse_unit("b.ts", "interface {".to_string()).is_err());
/// ```
pub fn parse_unit(unit_id: impl Into<String>, source: String) -> Result<ParsedUnit, UnitError> {
    let unit_id = unit_id.into();
    let variant = LanguageVariant::from_unit_id(&unit_id);

    let mut parser = Parser::new();
    if let Err(e) = parser.set_language(&variant.language()) {
        log::error!("Failed to load {:?} grammar for {}: {}", variant, unit_id, e);
        return Err(UnitError::Parse {
            unit_id,
            line: 1,
            column: 1,
        });
    }

    // No tree at all is reported at the start of the unit.
    let Some(tree) = parser.parse(&source, None) else {
        return Err(UnitError::Parse {
            unit_id,
            line: 1,
            column: 1,
        });
    };

    if let Some(bad) = first_error_node(tree.root_node()) {
        let pos = bad.start_position();
        return Err(UnitError::Parse {
            unit_id,
            line: pos.row + 1,
            column: pos.column + 1,
        });
    }

    Ok(ParsedUnit {
        id: unit_id,
        source,
        tree,
    })
}

/// First ERROR or MISSING node in document order, if any.
fn first_error_node(root: Node<'_>) -> Option<Node<'_>> {
    if !root.has_error() {
        return None;
    }
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        if !node.has_error() {
            continue;
        }
        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
    None
}
