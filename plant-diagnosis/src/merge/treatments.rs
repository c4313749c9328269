//! Treatment plan assembly.
//!
//! Steps from the language model, the detection model and the knowledge base are
//! merged in that provenance order, deduplicated, reordered so urgent
//! actions come first, trimmed to [`MAX_TREATMENT_STEPS`] and stripped of
//! "nothing found" placeholders before being numbered for display.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::dedup::dedup_tagged;
use crate::confidence::Percent;

pub const MAX_TREATMENT_STEPS: usize = 8;

/// Keywords marking a step as urgent
pub const URGENT_KEYWORDS: [&str; 10] = [
    "remove",
    "isolate",
    "prune",
    "dispose",
    "quarantine",
    "spray",
    "apply",
    "sterilize",
    "avoid",
    "stop",
];

/// Phrases an upstream source uses when it had nothing to recommend
pub const PLACEHOLDER_PHRASES: [&str; 5] = [
    "no specific treatment",
    "not available",
    "information not found",
    "no information available",
    "unable to find",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provenance {
    #[serde(rename = "LLM")]
    Llm,
    Model,
    #[serde(rename = "KB")]
    Kb,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Llm => write!(f, "LLM"),
            Self::Model => write!(f, "Model"),
            Self::Kb => write!(f, "KB"),
        }
    }
}

/// One numbered step of the final plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreatmentStep {
    pub step: usize,
    pub text: String,
    pub source: Provenance,
    /// Knowledge-base step backed by a non-zero match confidence
    pub verified: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TreatmentSources<'a> {
    pub llm: &'a [String],
    pub model: &'a [String],
    pub knowledge_base: &'a [String],
    /// Steps delivered without a provenance tag; treated as model output
    pub untagged: &'a [String],
    pub kb_confidence: Percent,
}

pub fn merge_treatments(sources: TreatmentSources<'_>) -> Vec<TreatmentStep> {
    let tagged = sources
        .llm
        .iter()
        .map(|step| (step, Provenance::Llm))
        .chain(sources.model.iter().map(|step| (step, Provenance::Model)))
        .chain(sources.knowledge_base.iter().map(|step| (step, Provenance::Kb)))
        .chain(sources.untagged.iter().map(|step| (step, Provenance::Model)));

    let kb_verified = !sources.kb_confidence.is_zero();

    prioritize(dedup_tagged(tagged))
        .into_iter()
        .take(MAX_TREATMENT_STEPS)
        .filter(|(text, _)| !is_placeholder(text))
        .enumerate()
        .map(|(index, (text, source))| TreatmentStep {
            step: index + 1,
            text,
            verified: source == Provenance::Kb && kb_verified,
            source,
        })
        .collect()
}

pub fn is_urgent(step: &str) -> bool {
    let lower = step.to_lowercase();
    URGENT_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

pub fn is_placeholder(step: &str) -> bool {
    let lower = step.to_lowercase();
    PLACEHOLDER_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

/// Urgent steps first. Both groups keep merge order.
fn prioritize(steps: Vec<(String, Provenance)>) -> Vec<(String, Provenance)> {
    let (urgent, routine): (Vec<_>, Vec<_>) =
        steps.into_iter().partition(|(text, _)| is_urgent(text));
    urgent.into_iter().chain(routine).collect()
}
