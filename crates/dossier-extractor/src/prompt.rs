//! Prompt construction
//!
//! Every builder is pure string formatting: identical inputs give
//! byte-identical prompts.

use crate::program::ClassificationProgram;
use dossier_domain::{EntityRecord, Violation};

/// Marker placed directly before the context in a biography prompt
const CONTEXT_OPENER: &str = "from the following text: ";

/// Marker placed directly after the context in a biography prompt
const CONTEXT_CLOSER: &str = ". If any desired information";

/// Builds the biography extraction request for one candidate
#[derive(Debug, Clone, Copy, Default)]
pub struct BiographyPromptBuilder;

impl BiographyPromptBuilder {
    /// Create a builder
    pub fn new() -> Self {
        Self
    }

    /// Render the request for an entity and its assembled context
    pub fn build(&self, entity: &EntityRecord) -> String {
        let name = entity.candidate.title_name();
        let state = &entity.candidate.state;
        let year = &entity.candidate.min_year;
        format!(
            "Extract ONLY the College Major, Undergraduate Institution, Highest Degree and \
             Institution, and Work History of {name}, a state representative candidate from \
             {state}, {CONTEXT_OPENER}{context}{CONTEXT_CLOSER} is not present in the given \
             text, write N/A instead. Determine your confidence that the information you \
             previously extracted correctly describes {name}, a {year} state representative \
             candidate from {state}, on a scale of 1 to 100. Display the college major, \
             undergraduate institution, highest degree and institution, work history, and your \
             confidence level as 5 elements of a flat JSON object whose keys are exactly \
             \"College Major\", \"Undergraduate Institution\", \"Highest Degree and \
             Institution\", \"Work History\" and \"Confidence Level\".",
            context = entity.context,
        )
    }
}

/// Recover the scraped context from a rendered biography prompt
///
/// The context runs from the first opener to the last closer, so markers
/// inside scraped text survive. Returns `None` when the prompt was not
/// produced by [`BiographyPromptBuilder`].
pub fn extract_context(prompt: &str) -> Option<&str> {
    let start = prompt.find(CONTEXT_OPENER)? + CONTEXT_OPENER.len();
    let rest = &prompt[start..];
    let end = rest.rfind(CONTEXT_CLOSER)?;
    Some(&rest[..end])
}

/// Builds the birth-year request from previously scraped context
#[derive(Debug, Clone, Copy, Default)]
pub struct BirthYearPromptBuilder;

impl BirthYearPromptBuilder {
    /// Create a builder
    pub fn new() -> Self {
        Self
    }

    /// Render the request
    pub fn build(&self, full_name: &str, state: &str, context: &str) -> String {
        format!(
            "Print a value indicating the year of birth of {full_name}, a state representative \
             candidate from {state}. If the year of birth is present, print only the year as a \
             number. If the year of undergraduate graduation is present, subtract 22 from that \
             year and print that. No full sentences. If the information is not present, print \
             N/A, and nothing else: {context}"
        )
    }
}

/// Builds the violation classification request for one case document
#[derive(Debug, Clone, Default)]
pub struct ClassificationPromptBuilder {
    program: ClassificationProgram,
}

impl ClassificationPromptBuilder {
    /// Create a builder around a prompting program
    pub fn new(program: ClassificationProgram) -> Self {
        Self { program }
    }

    /// Render the request for already-truncated case text
    pub fn build(&self, case_text: &str) -> String {
        let mut prompt = String::new();

        prompt.push_str(&self.program.instructions);
        prompt.push_str("\n\nAnswer each of the following with 1, 0 or -1:\n");
        for violation in Violation::ALL {
            prompt.push_str(&format!("- {}: {}\n", violation.as_str(), violation.description()));
        }

        for demo in &self.program.demos {
            prompt.push_str("\n---\nCase document:\n");
            prompt.push_str(&demo.case_document);
            prompt.push_str("\nAnswer:\n");
            let answers: serde_json::Map<String, serde_json::Value> = demo
                .answers
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::from(*v)))
                .collect();
            prompt.push_str(&serde_json::Value::Object(answers).to_string());
            prompt.push('\n');
        }

        prompt.push_str("\n---\nCase document:\n");
        prompt.push_str(case_text);
        prompt.push_str("\n\n");
        prompt.push_str(&output_format_reminder());
        prompt
    }
}

fn output_format_reminder() -> String {
    let keys: Vec<String> = Violation::ALL
        .iter()
        .map(|v| format!("\"{}\"", v.as_str()))
        .collect();
    format!(
        "Output format (JSON object only, no additional text) with exactly these keys: {}",
        keys.join(", ")
    )
}

/// Builds the trouble-summary request for one case document
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryPromptBuilder;

impl SummaryPromptBuilder {
    /// Create a builder
    pub fn new() -> Self {
        Self
    }

    /// Render the request for already-truncated case text
    pub fn build(&self, case_text: &str) -> String {
        format!(
            "Create a 1-2 sentence summary describing why the doctor faced disciplinary action \
             from the state medical board. Respond 'Not Sure' if the answer is unclear. If the \
             trouble is related to violations in another state, describe those violations as \
             well. Respond with the summary only.\n\nCase document:\n{case_text}"
        )
    }
}
