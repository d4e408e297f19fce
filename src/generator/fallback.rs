//! Fallback variant for requests no other variant can handle

use crate::artifact::Artifact;
use crate::intent::Intent;
use super::script::error_result;

/// Generate the fallback artifact: no query, a script whose comments
/// embed the original request text verbatim and a best-effort
/// serialization of the parsed intent, and a structured result stating
/// that no analysis code could be produced
///
/// Always succeeds; this is the terminal arm of the dispatcher.
pub fn generate(intent: &Intent) -> Artifact {
    let mut code = String::from("# Unable to generate analysis code for this request.\n");

    if let Some(request) = &intent.request_text {
        code.push_str("#\n# Request:\n");
        for line in request.lines() {
            code.push_str("#   ");
            code.push_str(line);
            code.push('\n');
        }
    }

    let serialized = serde_json::to_string_pretty(intent)
        .unwrap_or_else(|_| "(unserializable intent)".to_string());
    code.push_str("#\n# Parsed intent:\n");
    for line in serialized.lines() {
        code.push_str("#   ");
        code.push_str(line);
        code.push('\n');
    }

    code.push_str(&format!(
        "result = {}\n",
        error_result(&format!("Unsupported analysis kind: {}", intent.kind)),
    ));

    Artifact::new(intent.kind.clone(), String::new(), code)
}
