//! Prompting programs for case classification
//!
//! A program is the instruction text plus optional labelled demonstrations,
//! stored as JSON so a tuned program can be swapped in without rebuilding.

use crate::error::ExtractorError;
use dossier_domain::Violation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

const DEFAULT_INSTRUCTIONS: &str = "Extract boolean information regarding the contents of a medical board case. Respond -1 for any output that is unclear.";

/// One labelled example shown to the model before the real document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Demo {
    /// Example case text
    pub case_document: String,

    /// Expected answer per violation key
    pub answers: BTreeMap<String, i8>,
}

/// Instructions and demonstrations for the classification prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationProgram {
    /// Task statement placed at the top of the prompt
    pub instructions: String,

    /// Few-shot demonstrations, in order
    #[serde(default)]
    pub demos: Vec<Demo>,
}

impl Default for ClassificationProgram {
    fn default() -> Self {
        Self {
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
            demos: Vec::new(),
        }
    }
}

impl ClassificationProgram {
    /// Parse a program from JSON text
    pub fn from_json(json: &str) -> Result<Self, ExtractorError> {
        let program: Self = serde_json::from_str(json)?;
        program.validate()?;
        Ok(program)
    }

    /// Load a program from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ExtractorError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Reject empty instructions and demo answers with unknown keys or values
    pub fn validate(&self) -> Result<(), ExtractorError> {
        if self.instructions.trim().is_empty() {
            return Err(ExtractorError::Config(
                "instructions must not be empty".to_string(),
            ));
        }
        for (idx, demo) in self.demos.iter().enumerate() {
            for (key, value) in &demo.answers {
                if Violation::parse(key).is_none() {
                    return Err(ExtractorError::Config(format!(
                        "demo {} has unknown key '{}'",
                        idx, key
                    )));
                }
                if !(-1..=1).contains(value) {
                    return Err(ExtractorError::Config(format!(
                        "demo {} answer for '{}' must be -1, 0 or 1",
                        idx, key
                    )));
                }
            }
        }
        Ok(())
    }
}
