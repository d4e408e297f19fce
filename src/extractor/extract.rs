//! Heuristic extraction of table and column references from query text
//!
//! This is a text heuristic, not a parse: it recovers the references a
//! well-formed analytics query makes, best-effort. Subqueries, CTEs, and
//! exotic syntax are out of scope by design.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};

/// Tables and columns a query references
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct References {
    pub tables: BTreeSet<String>,
    pub columns: BTreeSet<String>,
}

/// Table names after a from/join keyword
static TABLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:from|join)\s+([a-z_][a-z0-9_]*)").unwrap());

/// An alias directly following a table name. Checked against the text
/// after each table match rather than folded into TABLE_RE, so a
/// following keyword is never consumed by the table scan.
static ALIAS_AFTER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s+(?:as\s+)?([a-z_][a-z0-9_]*)").unwrap());

/// `prefix.column` tokens anywhere in the text
static QUALIFIED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([a-z_][a-z0-9_]*)\.([a-z_][a-z0-9_]*)\b").unwrap());

/// The select list between SELECT and FROM
static SELECT_LIST_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)select\s+(.*?)\s+from\b").unwrap());

/// One level of aggregate-function syntax: `func(x)`, `func(distinct x)`
static FUNC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z_][a-z0-9_]*\s*\(\s*(?:distinct\s+)?(.*?)\s*\)$").unwrap());

/// Trailing `AS alias` on a select item
static TRAILING_ALIAS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+as\s+[a-z_][a-z0-9_]*$").unwrap());

/// Unqualified tokens adjacent to a comparison operator
static COMPARISON_ADJ_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([a-z_][a-z0-9_]*)\s*(?:=|!=|<>|<=|>=|<|>)").unwrap());

/// Unqualified tokens adjacent to a membership/pattern operator
static MEMBERSHIP_ADJ_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([a-z_][a-z0-9_]*)\s+(?:in|like|between)\b").unwrap());

/// Group/order clause column lists
static GROUP_ORDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:group|order)\s+by\s+([a-z0-9_.\s,]+)").unwrap());

/// Quoted string literals, blanked out before scanning
static STRING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"'[^']*'").unwrap());

const KEYWORDS: &[&str] = &[
    "all", "and", "as", "asc", "between", "by", "case", "cross", "desc", "distinct", "else",
    "end", "exists", "from", "full", "group", "having", "in", "inner", "is", "join", "left",
    "like", "limit", "not", "null", "offset", "on", "or", "order", "outer", "right", "select",
    "then", "union", "when", "where",
];

fn is_keyword(token: &str) -> bool {
    KEYWORDS.contains(&token)
}

fn is_identifier(token: &str) -> bool {
    let mut chars = token.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase() || c == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Extract the tables and columns a query references
///
/// Case-insensitive; results are lowercased. Table aliases declared after
/// from/join are tracked and resolved, never reported as tables.
pub fn extract_references(query: &str) -> References {
    let text = query.to_lowercase();
    let text = STRING_RE.replace_all(&text, "''");

    let mut refs = References::default();
    let mut aliases: BTreeMap<String, String> = BTreeMap::new();

    // Tables after from/join, plus their aliases
    for cap in TABLE_RE.captures_iter(&text) {
        let (Some(whole), Some(table)) = (cap.get(0), cap.get(1)) else {
            continue;
        };
        let table = table.as_str().to_string();
        if is_keyword(&table) {
            continue;
        }
        refs.tables.insert(table.clone());

        if let Some(alias_cap) = ALIAS_AFTER_RE.captures(&text[whole.end()..]) {
            let alias = &alias_cap[1];
            if !is_keyword(alias) && alias != table {
                aliases.insert(alias.to_string(), table);
            }
        }
    }

    // Qualified tokens: prefix is a table (or a declared alias)
    for cap in QUALIFIED_RE.captures_iter(&text) {
        let prefix = &cap[1];
        let column = &cap[2];
        if is_keyword(prefix) || is_keyword(column) {
            continue;
        }
        let table = aliases
            .get(prefix)
            .cloned()
            .unwrap_or_else(|| prefix.to_string());
        refs.tables.insert(table);
        refs.columns.insert(column.to_string());
    }

    // Select-list columns
    if let Some(cap) = SELECT_LIST_RE.captures(&text) {
        for raw in cap[1].split(',') {
            let item = TRAILING_ALIAS_RE.replace(raw.trim(), "");
            let item = item.trim();
            if item == "*" {
                continue;
            }
            // Unwrap one level of aggregate syntax; count(*) has no column
            let inner = match FUNC_RE.captures(item) {
                Some(f) => f[1].to_string(),
                None => item.to_string(),
            };
            if inner == "*" || inner.is_empty() {
                continue;
            }
            if inner.contains('.') {
                continue; // already covered by the qualified scan
            }
            if is_identifier(&inner) && !is_keyword(&inner) {
                refs.columns.insert(inner);
            }
        }
    }

    // Unqualified tokens next to comparison/membership operators
    for re in [&*COMPARISON_ADJ_RE, &*MEMBERSHIP_ADJ_RE] {
        for cap in re.captures_iter(&text) {
            let token = &cap[1];
            if !is_keyword(token) && !refs.tables.contains(token) && !aliases.contains_key(token) {
                refs.columns.insert(token.to_string());
            }
        }
    }

    // Group/order column lists
    for cap in GROUP_ORDER_RE.captures_iter(&text) {
        for part in cap[1].split(',') {
            let Some(token) = part.split_whitespace().next() else {
                continue;
            };
            if token.contains('.') {
                continue; // already covered by the qualified scan
            }
            if is_identifier(token) && !is_keyword(token) {
                refs.columns.insert(token.to_string());
            }
        }
    }

    refs
}
