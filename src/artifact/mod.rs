//! Generated artifacts (noun module)
//!
//! The output of the dispatcher: a resolved query plus an analysis script
//! for the external sandboxed runner. The runner executes Python and
//! exposes `run_query(sql)` returning a pandas DataFrame, with `pd`
//! (pandas) and `np` (numpy) available for grouping and aggregation. By
//! convention the script binds its output to the `result` variable.

use crate::intent::AnalysisKind;

/// The query + analysis code bundle produced for one intent
///
/// Always well-formed and directly executable; generation-time problems
/// are absorbed into the script as structured `{'error': ...}` results,
/// never left as a partially built artifact.
#[derive(Debug, Clone)]
pub struct Artifact {
    /// Which variant produced this artifact
    pub kind: AnalysisKind,
    /// The resolved query the script executes; empty when the variant
    /// needs no data (fallback, missing required inputs)
    pub query: String,
    /// The analysis script, with `result` bound to the outcome
    pub code: String,
}

impl Artifact {
    pub fn new(kind: AnalysisKind, query: impl Into<String>, code: impl Into<String>) -> Self {
        Artifact {
            kind,
            query: query.into(),
            code: code.into(),
        }
    }
}
