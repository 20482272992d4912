//! Text of the leading pages of a PDF

use crate::error::FetchError;
use lopdf::Document;

/// Extract the text of at most the first `max_pages` pages of a PDF
///
/// Page texts are joined with single spaces.
pub fn pdf_text(bytes: &[u8], max_pages: usize) -> Result<String, FetchError> {
    let document = Document::load_mem(bytes).map_err(|e| FetchError::Pdf(e.to_string()))?;

    let pages: Vec<u32> = document
        .get_pages()
        .keys()
        .copied()
        .take(max_pages)
        .collect();

    let mut texts = Vec::with_capacity(pages.len());
    for page in pages {
        let text = document
            .extract_text(&[page])
            .map_err(|e| FetchError::Pdf(format!("page {}: {}", page, e)))?;
        texts.push(text);
    }
    Ok(texts.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    fn document(pages: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids = Vec::new();
        for text in pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![100.into(), 600.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_reads_first_pages_only() {
        let bytes = document(&["alpha", "bravo", "charlie", "delta"]);
        let text = pdf_text(&bytes, 3).unwrap();
        assert!(text.contains("alpha"));
        assert!(text.contains("charlie"));
        assert!(!text.contains("delta"));
    }

    #[test]
    fn test_short_document() {
        let bytes = document(&["only page"]);
        assert!(pdf_text(&bytes, 3).unwrap().contains("only page"));
    }

    #[test]
    fn test_garbage_is_pdf_error() {
        assert!(matches!(
            pdf_text(b"<html>not a pdf</html>", 3),
            Err(FetchError::Pdf(_))
        ));
    }
}
