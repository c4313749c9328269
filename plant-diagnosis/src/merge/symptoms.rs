use super::dedup::dedup_text;

pub const MAX_SYMPTOMS: usize = 8;

/// Detector symptoms first, then language-model symptoms, then knowledge-base symptoms.
pub fn merge_symptoms(
    detector: &[String],
    llm: &[String],
    knowledge_base: &[String],
) -> Vec<String> {
    let mut merged = dedup_text(detector.iter().chain(llm).chain(knowledge_base));
    merged.truncate(MAX_SYMPTOMS);
    merged
}
