//! Domain layer: intake form and triage classification types.
//!
//! Plain serializable types with validation; no I/O.

mod intake;
mod triage;

pub use intake::{
    Consciousness, IntakeDraft, IntakeField, IntakeForm, Sex, SymptomFlag, Symptoms,
    ValidationFailure, SATURATION_RANGE, TEMPERATURE_RANGE,
};
pub use triage::{
    format_risk, RankingEntry, RankingSnapshot, TriageLevel, TriageResult, TriageStats,
};
