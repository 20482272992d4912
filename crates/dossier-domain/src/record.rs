//! Prompt and response records for the summarization stage

use crate::entity::{EntityRecord, EntityStatus};
use serde_json::{Map, Value};

/// An entity paired with the request text sent for it
///
/// One prompt record maps to exactly one downstream service call.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptRecord {
    /// The entity the request is about
    pub entity: EntityRecord,

    /// Rendered request text
    pub prompt: String,
}

impl PromptRecord {
    /// Pair an entity with its rendered request
    pub fn new(entity: EntityRecord, prompt: impl Into<String>) -> Self {
        Self {
            entity,
            prompt: prompt.into(),
        }
    }
}

/// Flat field map decoded from a model response
///
/// Keys are whatever the base identity and the response supplied; nothing is
/// validated against an expected set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EntityFields(Map<String, Value>);

impl EntityFields {
    /// Empty field map
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one field
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Overlay decoded keys; later values win
    pub fn merge(&mut self, other: Map<String, Value>) {
        for (key, value) in other {
            self.0.insert(key, value);
        }
    }

    /// Raw value of a field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Field rendered as a table cell
    ///
    /// Strings come through verbatim, null becomes empty, anything else is
    /// written as compact JSON.
    pub fn get_text(&self, key: &str) -> Option<String> {
        self.0.get(key).map(|value| match value {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        })
    }

    /// Whether a field is present
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Field names
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }
}

/// Outcome of one service call, partitioned when it is created
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseRecord {
    /// The call succeeded and the payload decoded
    Parsed {
        /// Originating request
        prompt: PromptRecord,
        /// Decoded fields merged onto the entity identity
        fields: EntityFields,
    },

    /// The call itself failed
    ServiceFailure {
        /// Originating request
        prompt: PromptRecord,
        /// Error text
        cause: String,
    },

    /// The call succeeded but the payload did not decode
    ParseFailure {
        /// Originating request
        prompt: PromptRecord,
        /// Response text exactly as received
        raw_response: String,
        /// Decoder error text
        cause: String,
    },
}

impl ResponseRecord {
    /// Terminal status this outcome corresponds to
    pub fn status(&self) -> EntityStatus {
        match self {
            ResponseRecord::Parsed { .. } => EntityStatus::Parsed,
            ResponseRecord::ServiceFailure { .. } => EntityStatus::ServiceError,
            ResponseRecord::ParseFailure { .. } => EntityStatus::ParseError,
        }
    }

    /// Originating request
    pub fn prompt(&self) -> &PromptRecord {
        match self {
            ResponseRecord::Parsed { prompt, .. }
            | ResponseRecord::ServiceFailure { prompt, .. }
            | ResponseRecord::ParseFailure { prompt, .. } => prompt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Candidate;
    use serde_json::json;

    fn prompt() -> PromptRecord {
        let c = Candidate::from_parts("a", "", "b", "", "2000", "Utah", "1");
        PromptRecord::new(EntityRecord::new(c).unwrap(), "p")
    }

    #[test]
    fn test_merge_overwrites_and_extends() {
        let mut fields = EntityFields::new();
        fields.insert("State", "Utah");
        fields.insert("College Major", "");

        let decoded = json!({"College Major": "History", "Work History": ["a", "b"]});
        if let Value::Object(map) = decoded {
            fields.merge(map);
        }

        assert_eq!(fields.get_text("College Major").as_deref(), Some("History"));
        assert_eq!(fields.get_text("Work History").as_deref(), Some("[\"a\",\"b\"]"));
        assert_eq!(fields.get_text("State").as_deref(), Some("Utah"));
        assert_eq!(fields.len(), 3);
    }

    #[test]
    fn test_status_of_each_partition() {
        let parsed = ResponseRecord::Parsed {
            prompt: prompt(),
            fields: EntityFields::new(),
        };
        let service = ResponseRecord::ServiceFailure {
            prompt: prompt(),
            cause: "down".into(),
        };
        let parse = ResponseRecord::ParseFailure {
            prompt: prompt(),
            raw_response: "nope".into(),
            cause: "expected value".into(),
        };
        assert_eq!(parsed.status(), EntityStatus::Parsed);
        assert_eq!(service.status(), EntityStatus::ServiceError);
        assert_eq!(parse.status(), EntityStatus::ParseError);
        assert_eq!(parse.prompt().prompt, "p");
    }
}
