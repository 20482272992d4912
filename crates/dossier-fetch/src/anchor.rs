//! Excerpt windows around an anchor phrase

use crate::config::AnchorConfig;

/// Take the excerpt of `text` that starts at the first occurrence of `phrase`
///
/// Whitespace runs that contain a newline collapse to one space, then the
/// text is split on single spaces. At most `config.max_tokens` tokens are
/// kept, starting with the one holding the anchor; if the cutoff token shows
/// up among them, the window ends just after it. An absent or empty phrase
/// gives an empty window.
pub fn window(text: &str, phrase: &str, config: &AnchorConfig) -> String {
    if phrase.is_empty() {
        return String::new();
    }
    let Some(start) = text.find(phrase) else {
        return String::new();
    };

    let collapsed = collapse_newlines(&text[start..]);
    let words: Vec<&str> = collapsed.split(' ').collect();
    let head = &words[..words.len().min(config.max_tokens)];
    let end = head
        .iter()
        .position(|w| *w == config.cutoff_token)
        .map_or(head.len(), |i| i + 1);
    head[..end].join(" ")
}

/// Pick the anchor for a document: the first name part that yields a
/// non-empty window
///
/// `anchors` are tried in order (last, first, middle).
pub fn anchored_window(text: &str, anchors: &[&str], config: &AnchorConfig) -> String {
    for anchor in anchors {
        let excerpt = window(text, &anchor.to_lowercase(), config);
        if !excerpt.is_empty() {
            return excerpt;
        }
    }
    String::new()
}

fn collapse_newlines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut run = String::new();
    for c in text.chars() {
        if c.is_whitespace() {
            run.push(c);
            continue;
        }
        flush_run(&mut out, &mut run);
        out.push(c);
    }
    flush_run(&mut out, &mut run);
    out
}

fn flush_run(out: &mut String, run: &mut String) {
    if run.contains('\n') {
        out.push(' ');
    } else {
        out.push_str(run);
    }
    run.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(max_tokens: usize) -> AnchorConfig {
        AnchorConfig {
            max_tokens,
            ..Default::default()
        }
    }

    #[test]
    fn test_window_starts_at_anchor() {
        let text = "home page doe served two terms in the house";
        assert_eq!(
            window(text, "doe", &config(400)),
            "doe served two terms in the house"
        );
    }

    #[test]
    fn test_window_token_limit() {
        let text = "intro smith a b c d e f";
        assert_eq!(window(text, "smith", &config(3)), "smith a b");
    }

    #[test]
    fn test_accessibility_cutoff() {
        let text = "smith was elected accessibility statementwithnospaces and more";
        assert_eq!(
            window(text, "smith", &config(400)),
            "smith was elected accessibility"
        );
    }

    #[test]
    fn test_cutoff_outside_limit_is_ignored() {
        let text = "smith a b accessibility";
        assert_eq!(window(text, "smith", &config(3)), "smith a b");
    }

    #[test]
    fn test_newline_runs_collapse() {
        let text = "smith\n\n   was  \n born";
        assert_eq!(window(text, "smith", &config(400)), "smith was born");
    }

    #[test]
    fn test_plain_double_spaces_kept() {
        // Splitting on single spaces keeps the empty token between them.
        assert_eq!(window("smith  jr", "smith", &config(2)), "smith ");
    }

    #[test]
    fn test_absent_anchor() {
        assert_eq!(window("nothing here", "doe", &config(400)), "");
        assert_eq!(window("nothing here", "", &config(400)), "");
    }

    #[test]
    fn test_anchor_inside_word() {
        assert_eq!(window("mr. johnson spoke", "john", &config(2)), "johnson spoke");
    }

    #[test]
    fn test_anchored_window_falls_through() {
        let text = "jane spoke at the hearing";
        assert_eq!(
            anchored_window(text, &["doe", "Jane"], &config(2)),
            "jane spoke"
        );
        assert_eq!(anchored_window(text, &["doe"], &config(2)), "");
        assert_eq!(anchored_window(text, &[], &config(2)), "");
    }
}
