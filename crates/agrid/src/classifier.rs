//! Seam for the external image classifier.
//!
//! Model loading and inference live outside this crate. A classifier turns
//! image bytes into one probability per class, in the configured class-label
//! order; the daemon does the rest.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("image could not be decoded: {0}")]
    InvalidImage(String),
    #[error("inference failed: {0}")]
    Inference(String),
}

pub trait Classifier: Send + Sync {
    /// Model name reported by /health
    fn name(&self) -> &str;

    /// Class probabilities for one image. Runs on a blocking thread.
    fn classify(&self, image: &[u8]) -> Result<Vec<f32>, ClassifierError>;
}

/// Classifier returning the same probabilities for every image.
#[derive(Debug, Clone)]
pub struct FixedClassifier {
    name: String,
    probabilities: Vec<f32>,
}

impl FixedClassifier {
    pub fn new(name: impl Into<String>, probabilities: Vec<f32>) -> Self {
        Self {
            name: name.into(),
            probabilities,
        }
    }
}

impl Classifier for FixedClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn classify(&self, image: &[u8]) -> Result<Vec<f32>, ClassifierError> {
        if image.is_empty() {
            return Err(ClassifierError::InvalidImage("empty upload".to_string()));
        }
        Ok(self.probabilities.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_classifier() {
        let c = FixedClassifier::new("fixed", vec![0.1, 0.9]);
        assert_eq!(c.name(), "fixed");
        assert_eq!(c.classify(b"img").unwrap(), vec![0.1, 0.9]);
        assert!(matches!(
            c.classify(b""),
            Err(ClassifierError::InvalidImage(_))
        ));
    }
}
