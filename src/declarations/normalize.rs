//! Textual shape normalization.
//!
//! # Overview
//!
//! [`normalize`] turns the raw text of a declaration into a fingerprint that
//! can be compared across files. The rewrites are applied in a fixed order:
//!
//! 1. Remove block comments and line comments, leaving string and template
//!    literals intact
//! 2. Collapse whitespace runs to a single space and trim
//! 3. Replace whole-word occurrences of the declaration name with [`NAME_PLACEHOLDER`]
//! 4. Rewrite a leading `interface __NAME__ {` to `type __NAME__ = {`
//! 5. Strip one leading `export` keyword
//! 6. Rewrite `const enum` to `enum`
//! 7. Strip one trailing semicolon
//!
//! The sequence is a versioned contract ([`FINGERPRINT_VERSION`]): inserting a
//! rewrite anywhere changes which declarations compare equal. New rewrites go
//! at the end and bump the version.
//!
//! This is canonicalization of text, not of types. Member order and
//! equivalent spellings of a type stay significant.
//!
//! # Example
//!
//! ```
//! use typedupe::declarations::normalize;
//!
//! let a = normalize("interface Foo { bar: string; }", "Foo");
//! let b = normalize("type Foo = { bar: string; }", "Foo");
//! assert_eq!(a, b);
//! assert_eq!(a, "type __NAME__ = { bar: string; }");
//! ```

use std::sync::LazyLock;

use regex::Regex;

/// Token substituted for the declaration's own name.
pub const NAME_PLACEHOLDER: &str = "__NAME__";

/// Version of the rewrite sequence. Bump whenever a rewrite is added or moved.
pub const FINGERPRINT_VERSION: u32 = 1;

/// String and template literals are matched first so that `//` or `/*`
/// inside them is never taken for a comment.
static COMMENT_OR_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)'(?:[^'\\\n]|\\.)*'|"(?:[^"\\\n]|\\.)*"|`(?:[^`\\]|\\.)*`|/\*.*?\*/|//[^\n]*"#,
    )
    .expect("comment pattern is valid")
});

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

static CONST_ENUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bconst enum\b").expect("const enum pattern is valid"));

/// Compute the shape fingerprint of a declaration.
///
/// Pure and deterministic. An empty or whitespace-only snippet yields an
/// empty string, which the grouping engine never uses as a key.
///
/// # Arguments
///
/// * `raw_snippet` - Exact source text of the declaration
/// * `name` - The declaration's name; matched as a whole word only
///
/// # Example
///
/// ```
/// use typedupe::declarations::normalize;
///
/// let fp = normalize("interface TreeNode { children: TreeNode[]; }", "TreeNode");
/// assert_eq!(fp, "type __NAME__ = { children: __NAME__[]; }");
/// ```
#[must_use]
pub fn normalize(raw_snippet: &str, name: &str) -> String {
    // 1. comments
    let text = COMMENT_OR_LITERAL.replace_all(raw_snippet, |caps: &regex::Captures<'_>| {
        let matched = &caps[0];
        if matched.starts_with('/') {
            String::new()
        } else {
            matched.to_string()
        }
    });

    // 2. whitespace
    let text = WHITESPACE.replace_all(&text, " ");
    let mut text = text.trim().to_string();
    if text.is_empty() {
        return text;
    }

    // 3. self references
    text = substitute_name(&text, name);

    // 4. interface -> type alias
    let interface_head = format!("interface {NAME_PLACEHOLDER} {{");
    if let Some(rest) = text.strip_prefix(&interface_head) {
        text = format!("type {NAME_PLACEHOLDER} = {{{rest}");
    }

    // 5. export keyword
    if let Some(rest) = text.strip_prefix("export ") {
        text = rest.to_string();
    }

    // 6. const enum
    text = CONST_ENUM.replacen(&text, 1, "enum").into_owned();

    // 7. trailing semicolon
    if let Some(rest) = text.strip_suffix(';') {
        text.truncate(rest.len());
    }

    text
}

/// Replace every whole-word occurrence of `name` with [`NAME_PLACEHOLDER`].
///
/// The name is escaped before it becomes a pattern, so names carrying regex
/// metacharacters (`$Props`) are matched literally. A match only counts when
/// neither neighbour is an identifier character; `\b` alone would miss names
/// that start or end with `$`.
fn substitute_name(text: &str, name: &str) -> String {
    if name.is_empty() {
        return text.to_string();
    }
    let re = match Regex::new(&regex::escape(name)) {
        Ok(re) => re,
        Err(e) => {
            log::warn!("Could not build name pattern for '{}': {}", name, e);
            return text.to_string();
        }
    };

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for m in re.find_iter(text) {
        let before = text[..m.start()].chars().next_back();
        let after = text[m.end()..].chars().next();
        if before.is_some_and(is_ident_char) || after.is_some_and(is_ident_char) {
            continue;
        }
        out.push_str(&text[last..m.start()]);
        out.push_str(NAME_PLACEHOLDER);
        last = m.end();
    }
    out.push_str(&text[last..]);
    out
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}
