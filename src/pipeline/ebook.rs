//! EPUB-style package assembly from ordered page texts.
//!
//! The output is a single XHTML document with one `<h2>Page N</h2>` section
//! per source page, served under the EPUB MIME type. This is a structural
//! approximation, not a spec-compliant e-book: no container zip, no OPF
//! manifest. Readers that fall back to HTML open it fine.

use crate::error::ConvertError;

/// Assemble the package from per-page texts, ordered by page number.
///
/// Produces exactly `texts.len()` page sections, numbered 1..N in order.
pub fn build_package(title: &str, texts: &[String]) -> Result<Vec<u8>, ConvertError> {
    if texts.is_empty() {
        return Err(ConvertError::EncodeFailed {
            detail: "no page text to package".into(),
        });
    }

    let mut body = String::with_capacity(texts.iter().map(|t| t.len() + 64).sum());
    for (idx, text) in texts.iter().enumerate() {
        body.push_str(&format!("<h2>Page {}</h2>\n<p>", idx + 1));
        body.push_str(&escape_text(text));
        body.push_str("</p>\n");
    }

    let doc = format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
         <html xmlns=\"http://www.w3.org/1999/xhtml\">\n\
         <head><title>{}</title></head>\n\
         <body>\n{}</body>\n\
         </html>\n",
        escape_text(title),
        body
    );

    Ok(doc.into_bytes())
}

/// Escape the characters XHTML cannot carry verbatim.
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section_headers(doc: &str) -> Vec<String> {
        doc.lines()
            .filter(|l| l.starts_with("<h2>"))
            .map(|l| l.to_string())
            .collect()
    }

    #[test]
    fn one_section_per_page_in_order() {
        let texts: Vec<String> = (1..=5).map(|i| format!("text of page {i}")).collect();
        let bytes = build_package("book", &texts).unwrap();
        let doc = String::from_utf8(bytes).unwrap();

        let headers = section_headers(&doc);
        assert_eq!(headers.len(), 5);
        for (i, h) in headers.iter().enumerate() {
            assert_eq!(h, &format!("<h2>Page {}</h2>", i + 1));
        }
    }

    #[test]
    fn page_text_survives_with_escaping() {
        let texts = vec!["a < b && c > d".to_string()];
        let doc = String::from_utf8(build_package("t", &texts).unwrap()).unwrap();
        assert!(doc.contains("a &lt; b &amp;&amp; c &gt; d"));
        assert!(!doc.contains("a < b"));
    }

    #[test]
    fn empty_page_list_is_an_error() {
        let err = build_package("t", &[]).unwrap_err();
        assert!(matches!(err, ConvertError::EncodeFailed { .. }));
    }

    #[test]
    fn blank_pages_still_get_sections() {
        let texts = vec![String::new(), String::new()];
        let doc = String::from_utf8(build_package("t", &texts).unwrap()).unwrap();
        assert_eq!(section_headers(&doc).len(), 2);
    }

    #[test]
    fn output_is_well_formed_xhtml_shell() {
        let doc =
            String::from_utf8(build_package("my & title", &["x".to_string()]).unwrap()).unwrap();
        assert!(doc.starts_with("<?xml"));
        assert!(doc.contains("<title>my &amp; title</title>"));
        assert!(doc.trim_end().ends_with("</html>"));
    }
}
