//! Visible text of an HTML page

use scraper::{Html, Node};

/// Elements whose text never reaches the page text
const SKIPPED_ELEMENTS: [&str; 2] = ["script", "style"];

/// Join the stripped text nodes of `html` with single spaces
///
/// Text inside `script` and `style` is dropped, as are comments. Whitespace
/// inside a text node is kept; only its ends are trimmed.
pub fn page_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut parts: Vec<&str> = Vec::new();

    for node in document.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let skipped = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| SKIPPED_ELEMENTS.contains(&el.name()))
        });
        if skipped {
            continue;
        }
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            parts.push(trimmed);
        }
    }

    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drops_script_and_style() {
        let html = r#"<html><head><title>Bio</title><style>p { color: red }</style></head>
            <body><script>var x = "hidden";</script><p>Jane  Doe</p>
            <!-- a comment --><div>served <b>two</b> terms</div></body></html>"#;
        assert_eq!(page_text(html), "Bio Jane  Doe served two terms");
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(page_text(""), "");
        assert_eq!(page_text("<html><body>   </body></html>"), "");
    }

    #[test]
    fn test_nested_script_text_is_skipped() {
        let html = "<div><noscript>enable js</noscript><script>alert(1)</script>kept</div>";
        assert_eq!(page_text(html), "enable js kept");
    }
}
