//! Entity module - the unit of work carried through the biography pipeline

use crate::candidate::Candidate;
use crate::error::DomainError;
use crate::source::SourceReference;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier for an entity (candidate id or document id)
///
/// Immutable once constructed; the inner string is never exposed mutably.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(String);

impl EntityId {
    /// Create an identifier, rejecting empty input
    ///
    /// # Examples
    ///
    /// ```
    /// use dossier_domain::EntityId;
    ///
    /// let id = EntityId::new("  42 ").unwrap();
    /// assert_eq!(id.as_str(), "42");
    /// assert!(EntityId::new("").is_err());
    /// ```
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(DomainError::EmptyIdentifier);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Borrow the identifier text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Progress of an entity through search, scrape and summarization
///
/// Transitions only move forward:
///
/// ```text
/// Pending -> Searched -> {Fetched | ScrapeTimeout | ScrapeError}
/// Fetched -> Prompted -> {Responded | ServiceError}
/// Responded -> {Parsed | ParseError}
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityStatus {
    /// Read from the source table, nothing done yet
    Pending,

    /// Search results attached
    Searched,

    /// Sources scraped and context assembled
    Fetched,

    /// Scrape exceeded its per-item time budget
    ScrapeTimeout,

    /// Scrape worker failed outright
    ScrapeError,

    /// Request text rendered
    Prompted,

    /// Model call returned text
    Responded,

    /// Model call exhausted its retries
    ServiceError,

    /// Response decoded into fields
    Parsed,

    /// Response text did not decode
    ParseError,
}

impl EntityStatus {
    /// Get the status name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityStatus::Pending => "pending",
            EntityStatus::Searched => "searched",
            EntityStatus::Fetched => "fetched",
            EntityStatus::ScrapeTimeout => "scrape-timeout",
            EntityStatus::ScrapeError => "scrape-error",
            EntityStatus::Prompted => "prompted",
            EntityStatus::Responded => "responded",
            EntityStatus::ServiceError => "service-error",
            EntityStatus::Parsed => "parsed",
            EntityStatus::ParseError => "parse-error",
        }
    }

    /// Parse a status from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(EntityStatus::Pending),
            "searched" => Some(EntityStatus::Searched),
            "fetched" => Some(EntityStatus::Fetched),
            "scrape-timeout" => Some(EntityStatus::ScrapeTimeout),
            "scrape-error" => Some(EntityStatus::ScrapeError),
            "prompted" => Some(EntityStatus::Prompted),
            "responded" => Some(EntityStatus::Responded),
            "service-error" => Some(EntityStatus::ServiceError),
            "parsed" => Some(EntityStatus::Parsed),
            "parse-error" => Some(EntityStatus::ParseError),
            _ => None,
        }
    }

    /// Whether no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            EntityStatus::Parsed
                | EntityStatus::ParseError
                | EntityStatus::ServiceError
                | EntityStatus::ScrapeTimeout
                | EntityStatus::ScrapeError
        )
    }

    /// Whether `next` is a legal successor of this status
    pub fn can_advance_to(&self, next: EntityStatus) -> bool {
        use EntityStatus::*;
        matches!(
            (self, next),
            (Pending, Searched)
                | (Searched, Fetched)
                | (Searched, ScrapeTimeout)
                | (Searched, ScrapeError)
                | (Fetched, Prompted)
                | (Prompted, Responded)
                | (Prompted, ServiceError)
                | (Responded, Parsed)
                | (Responded, ParseError)
        )
    }
}

impl fmt::Display for EntityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EntityStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid status: {}", s))
    }
}

/// One candidate under research, with everything gathered about it so far
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRecord {
    id: EntityId,
    status: EntityStatus,

    /// Identity and grouping metadata
    pub candidate: Candidate,

    /// Documents consulted for this entity, owned exclusively
    pub sources: Vec<SourceReference>,

    /// Context text assembled from the sources
    pub context: String,
}

impl EntityRecord {
    /// Create a pending record keyed by the candidate id
    pub fn new(candidate: Candidate) -> Result<Self, DomainError> {
        Self::at_stage(candidate, Vec::new(), String::new(), EntityStatus::Pending)
    }

    /// Rehydrate a record persisted at a given stage
    ///
    /// Stage output files are the hand-off between runs, so a record read back
    /// from `retrievals.csv` starts life at `Fetched` rather than replaying
    /// the earlier transitions.
    pub fn at_stage(
        candidate: Candidate,
        sources: Vec<SourceReference>,
        context: String,
        status: EntityStatus,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            id: EntityId::new(candidate.candid.clone())?,
            status,
            candidate,
            sources,
            context,
        })
    }

    /// Stable identifier
    pub fn id(&self) -> &EntityId {
        &self.id
    }

    /// Current status
    pub fn status(&self) -> EntityStatus {
        self.status
    }

    /// Move to the next status, rejecting anything out of order
    pub fn advance(&mut self, next: EntityStatus) -> Result<(), DomainError> {
        if !self.status.can_advance_to(next) {
            return Err(DomainError::InvalidTransition {
                id: self.id.to_string(),
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    /// Produce a fresh `Searched` record for another scrape attempt
    ///
    /// Only scrape timeouts and scrape errors may be requeued; `self` is left
    /// untouched.
    pub fn requeue(&self) -> Result<EntityRecord, DomainError> {
        if !matches!(
            self.status,
            EntityStatus::ScrapeTimeout | EntityStatus::ScrapeError
        ) {
            return Err(DomainError::NotRequeueable {
                id: self.id.to_string(),
                status: self.status,
            });
        }
        Ok(EntityRecord {
            id: self.id.clone(),
            status: EntityStatus::Searched,
            candidate: self.candidate.clone(),
            sources: self
                .sources
                .iter()
                .map(|s| SourceReference::new(s.url.clone()))
                .collect(),
            context: String::new(),
        })
    }

    /// URLs of every attached source, in search order
    pub fn source_urls(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.url.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate() -> Candidate {
        Candidate::from_parts("Jane", "nan", "Doe", "", "2010", "Ohio", "77")
    }

    #[test]
    fn test_status_round_trip_names() {
        for status in [
            EntityStatus::Pending,
            EntityStatus::Searched,
            EntityStatus::Fetched,
            EntityStatus::ScrapeTimeout,
            EntityStatus::ScrapeError,
            EntityStatus::Prompted,
            EntityStatus::Responded,
            EntityStatus::ServiceError,
            EntityStatus::Parsed,
            EntityStatus::ParseError,
        ] {
            assert_eq!(EntityStatus::parse(status.as_str()), Some(status));
        }
        assert!("bogus".parse::<EntityStatus>().is_err());
    }

    #[test]
    fn test_happy_path_transitions() {
        let mut record = EntityRecord::new(candidate()).unwrap();
        assert_eq!(record.id().as_str(), "77");

        for next in [
            EntityStatus::Searched,
            EntityStatus::Fetched,
            EntityStatus::Prompted,
            EntityStatus::Responded,
            EntityStatus::Parsed,
        ] {
            record.advance(next).unwrap();
        }
        assert!(record.status().is_terminal());
    }

    #[test]
    fn test_rejects_skips_and_regressions() {
        let mut record = EntityRecord::new(candidate()).unwrap();
        let err = record.advance(EntityStatus::Fetched).unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition { .. }));

        record.advance(EntityStatus::Searched).unwrap();
        record.advance(EntityStatus::Fetched).unwrap();
        assert!(record.advance(EntityStatus::Searched).is_err());
        assert!(record.advance(EntityStatus::Parsed).is_err());
        assert_eq!(record.status(), EntityStatus::Fetched);
    }

    #[test]
    fn test_terminal_states_have_no_successors() {
        let all = [
            EntityStatus::Pending,
            EntityStatus::Searched,
            EntityStatus::Fetched,
            EntityStatus::ScrapeTimeout,
            EntityStatus::ScrapeError,
            EntityStatus::Prompted,
            EntityStatus::Responded,
            EntityStatus::ServiceError,
            EntityStatus::Parsed,
            EntityStatus::ParseError,
        ];
        for from in all.iter().filter(|s| s.is_terminal()) {
            for to in all {
                assert!(!from.can_advance_to(to), "{} -> {}", from, to);
            }
        }
    }

    #[test]
    fn test_requeue_only_from_scrape_failures() {
        let mut record = EntityRecord::new(candidate()).unwrap();
        record.sources.push(SourceReference::new("https://a.example"));
        record.advance(EntityStatus::Searched).unwrap();
        assert!(record.requeue().is_err());

        record.advance(EntityStatus::ScrapeTimeout).unwrap();
        let fresh = record.requeue().unwrap();
        assert_eq!(fresh.status(), EntityStatus::Searched);
        assert_eq!(fresh.id(), record.id());
        assert_eq!(fresh.source_urls(), vec!["https://a.example".to_string()]);
        assert_eq!(record.status(), EntityStatus::ScrapeTimeout);
    }

    #[test]
    fn test_empty_candid_rejected() {
        let c = Candidate::from_parts("a", "", "b", "", "2000", "Iowa", " ");
        assert_eq!(
            EntityRecord::new(c).unwrap_err(),
            DomainError::EmptyIdentifier
        );
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    const STATUSES: [EntityStatus; 10] = [
        EntityStatus::Pending,
        EntityStatus::Searched,
        EntityStatus::Fetched,
        EntityStatus::ScrapeTimeout,
        EntityStatus::ScrapeError,
        EntityStatus::Prompted,
        EntityStatus::Responded,
        EntityStatus::ServiceError,
        EntityStatus::Parsed,
        EntityStatus::ParseError,
    ];

    proptest! {
        /// Terminal statuses have no successor
        #[test]
        fn test_terminal_has_no_successor(a in 0usize..10, b in 0usize..10) {
            let (from, to) = (STATUSES[a], STATUSES[b]);
            if from.is_terminal() {
                prop_assert!(!from.can_advance_to(to));
            }
        }

        /// Status names parse back to the same status
        #[test]
        fn test_status_name_round_trip(a in 0usize..10) {
            let status = STATUSES[a];
            prop_assert_eq!(EntityStatus::parse(status.as_str()), Some(status));
        }
    }
}
