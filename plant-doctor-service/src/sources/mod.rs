//! Concrete upstream sources: the hosted classifier, the disease service and the
//! YAML knowledge base.

pub mod classifier;
pub mod disease;
pub mod knowledge_base;

pub use classifier::RoboflowClassifier;
pub use disease::DiseaseServiceClient;
pub use knowledge_base::{KnowledgeEntry, StaticKnowledgeBase};
