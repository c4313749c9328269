//! Merge steps that fold the advice of several sources into one list each.
//!
//! All of them are pure: immutable inputs in, new vectors out.

pub mod dedup;
pub mod prevention;
pub mod symptoms;
pub mod treatments;

pub use dedup::{TextDedupSet, dedup_tagged, dedup_text};
pub use prevention::{MAX_PREVENTION_TIPS, merge_prevention};
pub use symptoms::{MAX_SYMPTOMS, merge_symptoms};
pub use treatments::{
    MAX_TREATMENT_STEPS, PLACEHOLDER_PHRASES, Provenance, TreatmentSources, TreatmentStep,
    URGENT_KEYWORDS, merge_treatments,
};
