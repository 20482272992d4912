//! Two-letter state codes

/// The 50 US states, keyed by lowercase postal code
pub const STATES: [(&str, &str); 50] = [
    ("al", "Alabama"),
    ("ak", "Alaska"),
    ("az", "Arizona"),
    ("ar", "Arkansas"),
    ("ca", "California"),
    ("co", "Colorado"),
    ("ct", "Connecticut"),
    ("de", "Delaware"),
    ("fl", "Florida"),
    ("ga", "Georgia"),
    ("hi", "Hawaii"),
    ("id", "Idaho"),
    ("il", "Illinois"),
    ("in", "Indiana"),
    ("ia", "Iowa"),
    ("ks", "Kansas"),
    ("ky", "Kentucky"),
    ("la", "Louisiana"),
    ("me", "Maine"),
    ("md", "Maryland"),
    ("ma", "Massachusetts"),
    ("mi", "Michigan"),
    ("mn", "Minnesota"),
    ("ms", "Mississippi"),
    ("mo", "Missouri"),
    ("mt", "Montana"),
    ("ne", "Nebraska"),
    ("nv", "Nevada"),
    ("nh", "New Hampshire"),
    ("nj", "New Jersey"),
    ("nm", "New Mexico"),
    ("ny", "New York"),
    ("nc", "North Carolina"),
    ("nd", "North Dakota"),
    ("oh", "Ohio"),
    ("ok", "Oklahoma"),
    ("or", "Oregon"),
    ("pa", "Pennsylvania"),
    ("ri", "Rhode Island"),
    ("sc", "South Carolina"),
    ("sd", "South Dakota"),
    ("tn", "Tennessee"),
    ("tx", "Texas"),
    ("ut", "Utah"),
    ("vt", "Vermont"),
    ("va", "Virginia"),
    ("wa", "Washington"),
    ("wv", "West Virginia"),
    ("wi", "Wisconsin"),
    ("wy", "Wyoming"),
];

/// Expand a postal code to the full state name
///
/// Unknown codes pass through trimmed, so a table that already holds full
/// names is left alone.
///
/// # Examples
///
/// ```
/// use dossier_domain::expand_state;
///
/// assert_eq!(expand_state(" ny "), "New York");
/// assert_eq!(expand_state("Ohio"), "Ohio");
/// ```
pub fn expand_state(code: &str) -> String {
    let trimmed = code.trim();
    let key = trimmed.to_lowercase();
    STATES
        .iter()
        .find(|(abbr, _)| *abbr == key)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| trimmed.to_string())
}
