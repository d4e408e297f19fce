//! Analysis intent (noun module)
//!
//! The structured request supplied by the external NL→intent parser:
//! what to analyze, over which metric, grouped and filtered how.

mod kind;
mod request;

pub use kind::AnalysisKind;
pub use request::{Condition, DateRange, Filter, Intent, NumericRange, TimeRange, TimeValue};
