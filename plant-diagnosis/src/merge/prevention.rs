use super::dedup::dedup_text;

pub const MAX_PREVENTION_TIPS: usize = 6;

/// Knowledge-base tips first, then language-model tips, then tips the detector supplied directly.
pub fn merge_prevention(
    knowledge_base: &[String],
    llm: &[String],
    direct: &[String],
) -> Vec<String> {
    let mut merged = dedup_text(knowledge_base.iter().chain(llm).chain(direct));
    merged.truncate(MAX_PREVENTION_TIPS);
    merged
}
