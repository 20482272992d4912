//! Candidate identity and name handling

use serde::{Deserialize, Serialize};

/// Marker that tabular exports use for an absent cell
pub const MISSING_MARKER: &str = "nan";

/// A political candidate read from the source table
///
/// Name parts are stored lowercase; absent parts are `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// First name
    pub first: Option<String>,

    /// Middle name
    pub middle: Option<String>,

    /// Last name
    pub last: Option<String>,

    /// Suffix (jr, iii, ...)
    pub suffix: Option<String>,

    /// Space-joined present name parts, lowercase
    pub full_name: String,

    /// First election year on record
    pub min_year: String,

    /// Full state name
    pub state: String,

    /// Candidate identifier from the source table
    pub candid: String,

    /// Zero-based data row in the source table, when known
    pub row: Option<usize>,
}

impl Candidate {
    /// Build a candidate from raw table cells
    ///
    /// # Examples
    ///
    /// ```
    /// use dossier_domain::Candidate;
    ///
    /// let c = Candidate::from_parts("Mary", "nan", "O'Neil", "Jr", "2004", "Texas", "11");
    /// assert_eq!(c.full_name, "mary o'neil jr");
    /// assert_eq!(c.middle, None);
    /// assert_eq!(c.title_name(), "Mary O'Neil Jr");
    /// ```
    pub fn from_parts(
        first: &str,
        middle: &str,
        last: &str,
        suffix: &str,
        min_year: &str,
        state: &str,
        candid: &str,
    ) -> Self {
        let first = name_part(first);
        let middle = name_part(middle);
        let last = name_part(last);
        let suffix = name_part(suffix);
        let full_name = [&first, &middle, &last, &suffix]
            .iter()
            .filter_map(|p| p.as_deref())
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            first,
            middle,
            last,
            suffix,
            full_name,
            min_year: min_year.trim().to_string(),
            state: state.trim().to_string(),
            candid: candid.trim().to_string(),
            row: None,
        }
    }

    /// Rebuild a candidate from a stored full name
    ///
    /// Later stage files keep only the full name. The first word becomes the
    /// first name, the last word the last name and anything between the
    /// middle name; a suffix cannot be told apart and stays inside them.
    pub fn from_full_name(full_name: &str, min_year: &str, state: &str, candid: &str) -> Self {
        let words: Vec<String> = full_name
            .split_whitespace()
            .map(str::to_lowercase)
            .collect();
        let first = words.first().cloned();
        let last = if words.len() > 1 { words.last().cloned() } else { None };
        let middle = if words.len() > 2 {
            Some(words[1..words.len() - 1].join(" "))
        } else {
            None
        };

        Self {
            first,
            middle,
            last,
            suffix: None,
            full_name: words.join(" "),
            min_year: min_year.trim().to_string(),
            state: state.trim().to_string(),
            candid: candid.trim().to_string(),
            row: None,
        }
    }

    /// Attach the source row number
    pub fn with_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }

    /// Full name in title case, as used in search queries and prompts
    pub fn title_name(&self) -> String {
        title_case(&self.full_name)
    }

    /// Query text sent to the search collaborator
    pub fn search_query(&self) -> String {
        format!("{} {}", self.title_name(), self.state)
    }

    /// Anchor phrases in priority order: last, first, middle
    pub fn anchor_candidates(&self) -> Vec<&str> {
        [&self.last, &self.first, &self.middle]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .collect()
    }
}

/// Normalise a raw name cell; the missing marker and blanks become `None`
pub fn name_part(raw: &str) -> Option<String> {
    let part = raw.trim().to_lowercase();
    if part.is_empty() || part == MISSING_MARKER {
        None
    } else {
        Some(part)
    }
}

/// Title-case text: every letter that follows a non-letter is uppercased,
/// every other letter lowercased
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}
