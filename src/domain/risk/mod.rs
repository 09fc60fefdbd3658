//! Risk classification

pub mod classifier;
pub mod tier;

pub use classifier::{ClassificationContext, ClassifierConfig, RiskAssessment, RiskClassifier};
pub use tier::RiskTier;
