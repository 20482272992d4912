//! Violation categories judged for each case document

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// A yes/no/unsure question asked about a case document
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Violation {
    /// Patient mentioned in the text
    PatientMentioned,
    /// Fraud against government or insurers
    FraudCase,
    /// Medical malpractice
    MalpracticeCase,
    /// Drug Enforcement Agency involvement
    DeaCase,
    /// Improper opioid prescribing
    ImproperOpioidPrescription,
    /// Improper prescribing of any drug
    ImproperDrugPrescription,
    /// Unrelated legal trouble leading to license action
    UnfitToPractice,
    /// Inadequate medical records
    BadMedicalRecords,
    /// Administrative license problems
    LicenseIssues,
    /// Anything not covered above
    MiscellaneousViolation,
    /// Violation in another state
    OtherStateAction,
    /// Text carries no substantive information
    NoSubstantiveInformation,
    /// Someone else acted before the board did
    Proactive,
}

impl Violation {
    /// Every category, in output column order
    pub const ALL: [Violation; 13] = [
        Violation::PatientMentioned,
        Violation::FraudCase,
        Violation::MalpracticeCase,
        Violation::DeaCase,
        Violation::ImproperOpioidPrescription,
        Violation::ImproperDrugPrescription,
        Violation::UnfitToPractice,
        Violation::BadMedicalRecords,
        Violation::LicenseIssues,
        Violation::MiscellaneousViolation,
        Violation::OtherStateAction,
        Violation::NoSubstantiveInformation,
        Violation::Proactive,
    ];

    /// Column / JSON key name
    pub fn as_str(&self) -> &'static str {
        match self {
            Violation::PatientMentioned => "patient_mentioned",
            Violation::FraudCase => "fraud_case",
            Violation::MalpracticeCase => "malpractice_case",
            Violation::DeaCase => "dea_case",
            Violation::ImproperOpioidPrescription => "improper_opioid_prescription",
            Violation::ImproperDrugPrescription => "improper_drug_prescription",
            Violation::UnfitToPractice => "unfit_to_practice",
            Violation::BadMedicalRecords => "bad_medical_records",
            Violation::LicenseIssues => "license_issues",
            Violation::MiscellaneousViolation => "miscellaneous_violation",
            Violation::OtherStateAction => "other_state_action",
            Violation::NoSubstantiveInformation => "no_substantive_information",
            Violation::Proactive => "proactive",
        }
    }

    /// Parse a category from its key name
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.as_str() == s.trim())
    }

    /// Question put to the model for this category
    pub fn description(&self) -> &'static str {
        match self {
            Violation::PatientMentioned => {
                "1 if the patient is mentioned in the case text (including by initials or as 'patient'), 0 otherwise. -1 if unsure."
            }
            Violation::FraudCase => {
                "1 if the case is related to fraud, 0 otherwise. -1 if unsure. Fraud is any behavior where the doctor lied to the government or an insurance company in order to increase their profits. This includes billing for services not rendered, billing for patients not seen, sending inflated invoices to receive higher reimbursement, and lying about a patient's health to get insurance to pay for a service. Mark 1 if the doctor has been subject to any form of anti-fraud enforcement, including litigation under the false claims act, the federal health care fraud statute, the anti-kickback statute, the Stark Law; arrest or indictment for fraud; or exclusion from the Medicare program due to fraud."
            }
            Violation::MalpracticeCase => {
                "1 if the case is related to medical malpractice, 0 otherwise. -1 if unsure."
            }
            Violation::DeaCase => {
                "1 if the case involves the Drug Enforcement Agency, 0 otherwise. -1 if unsure."
            }
            Violation::ImproperOpioidPrescription => {
                "1 if the doctor improperly prescribed opioids, 0 otherwise. -1 if unsure."
            }
            Violation::ImproperDrugPrescription => {
                "1 if the doctor improperly prescribed any drugs (including opioids), 0 otherwise. -1 if unsure."
            }
            Violation::UnfitToPractice => {
                "1 if the doctor got into unrelated legal trouble resulting in action being taken against their license, 0 otherwise. -1 if unsure."
            }
            Violation::BadMedicalRecords => {
                "1 if the doctor failed to maintain adequate medical records, 0 otherwise. -1 if unsure."
            }
            Violation::LicenseIssues => {
                "1 if the doctor faced administrative issues with their license, 0 otherwise. -1 if unsure. Voluntary relinquishment should be marked as 0."
            }
            Violation::MiscellaneousViolation => {
                "1 if the doctor committed a violation that is not already specified, 0 otherwise. -1 if unsure."
            }
            Violation::OtherStateAction => {
                "1 if the doctor committed a violation in another state, 0 otherwise. -1 if unsure."
            }
            Violation::NoSubstantiveInformation => {
                "1 if there is no substantive information in the case text regarding the doctor's violation, 0 otherwise. -1 if unsure."
            }
            Violation::Proactive => {
                "1 if someone else (agency, lawsuit, etc) got the doctor in trouble first, before the state medical board, 0 otherwise. -1 if unsure."
            }
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Answer to one violation question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Judgment {
    /// 1
    Yes,
    /// 0
    No,
    /// -1
    Unsure,
}

impl Judgment {
    /// Integer encoding used in output tables
    pub fn as_i8(&self) -> i8 {
        match self {
            Judgment::Yes => 1,
            Judgment::No => 0,
            Judgment::Unsure => -1,
        }
    }

    /// Label used in output tables and confusion matrices
    pub fn as_str(&self) -> &'static str {
        match self {
            Judgment::Yes => "1",
            Judgment::No => "0",
            Judgment::Unsure => "-1",
        }
    }

    /// Coerce a decoded JSON value
    ///
    /// Accepts integers, numeric strings and booleans; anything else is
    /// treated as unsure.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Number(n) => match n.as_i64() {
                Some(1) => Judgment::Yes,
                Some(0) => Judgment::No,
                _ => Judgment::Unsure,
            },
            Value::Bool(true) => Judgment::Yes,
            Value::Bool(false) => Judgment::No,
            Value::String(s) => match s.trim() {
                "1" => Judgment::Yes,
                "0" => Judgment::No,
                _ => Judgment::Unsure,
            },
            _ => Judgment::Unsure,
        }
    }
}

impl fmt::Display for Judgment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Judgments decoded for one document; absent keys stay absent
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViolationJudgments(BTreeMap<Violation, Judgment>);

impl ViolationJudgments {
    /// Empty set of judgments
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a judgment
    pub fn insert(&mut self, violation: Violation, judgment: Judgment) {
        self.0.insert(violation, judgment);
    }

    /// Look up a judgment
    pub fn get(&self, violation: Violation) -> Option<Judgment> {
        self.0.get(&violation).copied()
    }

    /// Number of answered categories
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing was answered
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
