//! Declaration extraction from a parsed unit.
//!
//! # Overview
//!
//! [`extract`] walks a [`ParsedUnit`]'s syntax tree and emits one
//! [`DeclarationRecord`] per recognized declaration:
//!
//! - `interface` declarations
//! - `type` alias declarations
//! - `enum` / `const enum` declarations (unless disabled)
//! - every name listed in a top-level `export { ... } from "..."`
//!
//! Re-export records come first, then declarations in document order.
//! Declarations nested in namespaces, `declare module` blocks or function
//! bodies are found as well.

use tree_sitter::Node;

use super::{DeclarationKind, DeclarationRecord, Location};
use crate::scanner::{parse_unit, ParsedUnit, UnitError};

/// Extraction switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Emit records for enum declarations.
    pub include_enums: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            include_enums: true,
        }
    }
}

/// Extract all declaration records from a parsed unit.
#[must_use]
pub fn extract(unit: &ParsedUnit, options: &ExtractOptions) -> Vec<DeclarationRecord> {
    let root = unit.tree.root_node();
    let mut records = Vec::new();

    collect_reexports(unit, root, &mut records);
    collect_declarations(unit, root, options, &mut records);

    log::trace!("{}: extracted {} records", unit.id, records.len());
    records
}

/// Parse `source` and extract its records in one step.
///
/// # Errors
///
/// Returns [`UnitError::Parse`] when the source does not parse cleanly.
///
/// # Example
///
/// ```
/// use typedupe::declarations::{extract_source, DeclarationKind, ExtractOptions};
///
/// let records = extract_source(
///     "index.ts",
///     r#"export { Foo, Bar as Baz } from "./m";"#,
///     &ExtractOptions::default(),
/// )
/// .unwrap();
///
/// let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
/// assert_eq!(names, vec!["Foo", "Baz"]);
/// assert!(records.iter().all(|r| r.kind == DeclarationKind::Reexport));
/// ```
pub fn extract_source(
    unit_id: &str,
    source: &str,
    options: &ExtractOptions,
) -> Result<Vec<DeclarationRecord>, UnitError> {
    let unit = parse_unit(unit_id, source.to_string())?;
    Ok(extract(&unit, options))
}

fn classify(node: &Node<'_>, options: &ExtractOptions) -> Option<DeclarationKind> {
    match node.kind() {
        "interface_declaration" => Some(DeclarationKind::Interface),
        "type_alias_declaration" => Some(DeclarationKind::TypeAlias),
        "enum_declaration" if options.include_enums => Some(DeclarationKind::Enum),
        _ => None,
    }
}

fn collect_declarations(
    unit: &ParsedUnit,
    root: Node<'_>,
    options: &ExtractOptions,
    records: &mut Vec<DeclarationRecord>,
) {
    // Explicit stack; deeply nested namespaces must not overflow.
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if let Some(kind) = classify(&node, options) {
            if let Some(record) = build_record(unit, node, kind) {
                records.push(record);
            }
        }

        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
}

fn build_record(unit: &ParsedUnit, node: Node<'_>, kind: DeclarationKind) -> Option<DeclarationRecord> {
    let name_node = node.child_by_field_name("name")?;
    let name = unit.text(&name_node).to_string();

    let span = widen_to_wrappers(node);
    let location = Location::new(unit.id.as_str(), span.start_position().row + 1);

    let property_names = match kind {
        DeclarationKind::Interface => node
            .child_by_field_name("body")
            .map(|body| member_names(unit, body))
            .unwrap_or_default(),
        DeclarationKind::TypeAlias => node
            .child_by_field_name("value")
            .filter(|value| value.kind() == "object_type")
            .map(|value| member_names(unit, value))
            .unwrap_or_default(),
        DeclarationKind::Enum => node
            .child_by_field_name("body")
            .map(|body| enum_member_names(unit, body))
            .unwrap_or_default(),
        DeclarationKind::Reexport => Vec::new(),
    };

    Some(DeclarationRecord::declared(
        name,
        kind,
        location,
        unit.text(&span),
        property_names,
    ))
}

/// Climb through `export` / `declare` wrappers so the span covers the
/// declaration's modifiers.
fn widen_to_wrappers(node: Node<'_>) -> Node<'_> {
    let mut outer = node;
    while let Some(parent) = outer.parent() {
        match parent.kind() {
            "export_statement" | "ambient_declaration" => outer = parent,
            _ => break,
        }
    }
    outer
}

/// Names of property and method signatures in an interface body or object type.
fn member_names(unit: &ParsedUnit, body: Node<'_>) -> Vec<String> {
    let mut cursor = body.walk();
    body.named_children(&mut cursor)
        .filter(|member| matches!(member.kind(), "property_signature" | "method_signature"))
        .filter_map(|member| member.child_by_field_name("name"))
        .map(|name| unquote(unit.text(&name)).to_string())
        .collect()
}

fn enum_member_names(unit: &ParsedUnit, body: Node<'_>) -> Vec<String> {
    let mut cursor = body.walk();
    body.named_children(&mut cursor)
        .filter_map(|member| match member.kind() {
            "property_identifier" | "string" => Some(member),
            "enum_assignment" => member
                .child_by_field_name("name")
                .or_else(|| member.named_child(0)),
            _ => None,
        })
        .map(|name| unquote(unit.text(&name)).to_string())
        .collect()
}

/// Top-level `export { ... } from "..."` statements. Wildcard and namespace
/// re-exports carry no names and are skipped.
fn collect_reexports(unit: &ParsedUnit, root: Node<'_>, records: &mut Vec<DeclarationRecord>) {
    let mut cursor = root.walk();
    for statement in root.named_children(&mut cursor) {
        if statement.kind() != "export_statement"
            || statement.child_by_field_name("source").is_none()
        {
            continue;
        }

        let mut stmt_cursor = statement.walk();
        let Some(clause) = statement
            .named_children(&mut stmt_cursor)
            .find(|child| child.kind() == "export_clause")
        else {
            continue;
        };

        let line = statement.start_position().row + 1;
        let text = unit.text(&statement);

        let mut clause_cursor = clause.walk();
        for specifier in clause.named_children(&mut clause_cursor) {
            if specifier.kind() != "export_specifier" {
                continue;
            }
            let Some(name_node) = specifier
                .child_by_field_name("alias")
                .or_else(|| specifier.child_by_field_name("name"))
            else {
                continue;
            };
            records.push(DeclarationRecord::reexport(
                unquote(unit.text(&name_node)),
                Location::new(unit.id.as_str(), line),
                text,
            ));
        }
    }
}

fn unquote(text: &str) -> &str {
    text.trim_matches(|c| c == '"' || c == '\'' || c == '`')
}
