use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{
    error::Result,
    types::{AdviceBlock, ClassificationResult, DiseaseReport},
};

/// The upstream collaborators a diagnosis depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Classification,
    DiseaseDetection,
    KnowledgeBase,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Classification => write!(f, "classification source"),
            Self::DiseaseDetection => write!(f, "disease detection source"),
            Self::KnowledgeBase => write!(f, "knowledge base"),
        }
    }
}

/// Identifies the plant species in a photo
#[async_trait]
pub trait ClassificationSource: Send + Sync {
    /// Identifier used in logs
    fn id(&self) -> &str {
        std::any::type_name::<Self>()
    }

    async fn classify(&self, image: &[u8]) -> Result<ClassificationResult>;
}

/// Detects disease and produces free-text and structured advice for a photo
#[async_trait]
pub trait DiseaseSource: Send + Sync {
    fn id(&self) -> &str {
        std::any::type_name::<Self>()
    }

    async fn diagnose(&self, image: &[u8]) -> Result<DiseaseReport>;
}

/// Curated care advice keyed by plant and disease.
///
/// A lookup without a match returns an empty [`AdviceBlock`], not an error.
#[async_trait]
pub trait KnowledgeBase: Send + Sync {
    fn id(&self) -> &str {
        std::any::type_name::<Self>()
    }

    async fn lookup(&self, plant_name: &str, disease_name: &str) -> Result<AdviceBlock>;
}

/// Knowledge base that never knows anything
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyKnowledgeBase;

#[async_trait]
impl KnowledgeBase for EmptyKnowledgeBase {
    fn id(&self) -> &str {
        "empty"
    }

    async fn lookup(&self, _plant_name: &str, _disease_name: &str) -> Result<AdviceBlock> {
        Ok(AdviceBlock::default())
    }
}
