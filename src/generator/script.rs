//! Helpers for emitting runner scripts
//!
//! The sandboxed runner executes Python with `run_query(sql)` returning a
//! pandas DataFrame, and `pd`/`np` in scope. Scripts bind their outcome
//! to the conventional `result` variable.

/// Escape text for embedding in a double-quoted Python string literal
pub fn py_dquote(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// A single-quoted Python string literal
pub fn py_str(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// A Python `{'error': ...}` literal
pub fn error_result(message: &str) -> String {
    format!("{{'error': {}}}", py_str(message))
}

/// Indent every line of a block by `levels` four-space steps
pub fn indent(block: &str, levels: usize) -> String {
    let pad = "    ".repeat(levels);
    block
        .lines()
        .map(|line| {
            if line.is_empty() {
                line.to_string()
            } else {
                format!("{}{}", pad, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The standard fetch-and-guard scaffold: run the query, short-circuit to
/// `empty_result` on zero rows, otherwise run `body`
pub fn fetch_block(query: &str, empty_result: &str, body: &str) -> String {
    format!(
        "df = run_query(\"{}\")\nif df.empty:\n    result = {}\nelse:\n{}\n",
        py_dquote(query),
        empty_result,
        indent(body, 1),
    )
}

/// A Python list literal of single-quoted strings
pub fn py_str_list(items: &[&str]) -> String {
    let quoted: Vec<String> = items.iter().map(|s| py_str(s)).collect();
    format!("[{}]", quoted.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_py_str_escaping() {
        assert_eq!(py_str("plain"), "'plain'");
        assert_eq!(py_str("it's"), "'it\\'s'");
        assert_eq!(py_str("a\\b"), "'a\\\\b'");
    }

    #[test]
    fn test_py_dquote_escaping() {
        assert_eq!(py_dquote("SELECT 'M'"), "SELECT 'M'");
        assert_eq!(py_dquote("say \"hi\""), "say \\\"hi\\\"");
    }

    #[test]
    fn test_error_result() {
        assert_eq!(error_result("No data"), "{'error': 'No data'}");
    }

    #[test]
    fn test_fetch_block_shape() {
        let code = fetch_block("SELECT 1", "None", "result = 1");
        assert_eq!(
            code,
            "df = run_query(\"SELECT 1\")\nif df.empty:\n    result = None\nelse:\n    result = 1\n"
        );
    }

    #[test]
    fn test_indent_skips_empty_lines() {
        assert_eq!(indent("a\n\nb", 1), "    a\n\n    b");
    }

    #[test]
    fn test_py_str_list() {
        assert_eq!(py_str_list(&["weight", "bmi"]), "['weight', 'bmi']");
    }
}
