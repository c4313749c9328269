use async_trait::async_trait;
use plant_diagnosis::{AdviceBlock, DiagnosisError, KnowledgeBase, Result, null_as_default};
use serde::Deserialize;
use std::path::Path;

/// Plant value matching every plant
pub const ANY_PLANT: &str = "*";

#[derive(Debug, Clone, Deserialize)]
pub struct KnowledgeEntry {
    pub plant: String,
    pub disease: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub symptoms: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub treatments: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub prevention_tips: Vec<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

impl KnowledgeEntry {
    fn advice(&self) -> AdviceBlock {
        AdviceBlock {
            symptoms: self.symptoms.clone(),
            treatments: self.treatments.clone(),
            prevention_tips: self.prevention_tips.clone(),
            confidence: self.confidence,
        }
    }
}

#[derive(Debug, Deserialize)]
struct KnowledgeFile {
    entries: Vec<KnowledgeEntry>,
}

/// Curated advice loaded from a YAML file at start-up
#[derive(Debug, Clone, Default)]
pub struct StaticKnowledgeBase {
    entries: Vec<KnowledgeEntry>,
}

impl StaticKnowledgeBase {
    pub fn new(entries: Vec<KnowledgeEntry>) -> Self {
        Self { entries }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let file: KnowledgeFile = serde_yaml::from_str(yaml)
            .map_err(|e| DiagnosisError::KnowledgeBase(format!("invalid knowledge base: {}", e)))?;
        Ok(Self::new(file.entries))
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Ok(Self::from_yaml_str(&yaml)?)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for the disease, preferring one written for this plant over a `*` entry.
    pub fn find(&self, plant_name: &str, disease_name: &str) -> Option<&KnowledgeEntry> {
        let plant_name = plant_name.trim();
        let disease_name = disease_name.trim();

        let mut fallback = None;
        for entry in &self.entries {
            if !entry.disease.trim().eq_ignore_ascii_case(disease_name) {
                continue;
            }
            let plant = entry.plant.trim();
            if plant.eq_ignore_ascii_case(plant_name) {
                return Some(entry);
            }
            if plant == ANY_PLANT && fallback.is_none() {
                fallback = Some(entry);
            }
        }
        fallback
    }
}

#[async_trait]
impl KnowledgeBase for StaticKnowledgeBase {
    fn id(&self) -> &str {
        "static_yaml"
    }

    async fn lookup(&self, plant_name: &str, disease_name: &str) -> Result<AdviceBlock> {
        Ok(self
            .find(plant_name, disease_name)
            .map(KnowledgeEntry::advice)
            .unwrap_or_default())
    }
}
