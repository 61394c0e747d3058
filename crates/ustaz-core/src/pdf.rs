//! PDF output for generated documents.
//!
//! Template HTML (or plain agent text wrapped in the standard letter
//! layout) is reduced to a flat list of lines, and the lines are laid
//! out on A4 pages by a small built-in writer. The writer references
//! the base Helvetica font and embeds the text bytes as-is; no fonts
//! are embedded.

use std::path::Path;

use chrono::Local;
use scraper::{Html, Node};

use crate::error::{PdfError, PdfResult};

const A4_WIDTH: u32 = 595;
const A4_HEIGHT: u32 = 842;
const MARGIN: u32 = 50;
const FONT_SIZE: u32 = 12;
const LEADING: u32 = 18;
const WRAP_COLUMNS: usize = 80;
const LINES_PER_PAGE: usize = ((A4_HEIGHT - 2 * MARGIN) / LEADING) as usize;

/// Renders the document as PDF bytes. Text starting with `<` is taken
/// as template HTML; anything else gets the standard letter layout.
pub fn render_document(doc_type: &str, text: &str) -> PdfResult<Vec<u8>> {
    let lines = if text.trim_start().starts_with('<') {
        html_to_lines(text)
    } else {
        letter_lines(doc_type, text)
    };
    if lines.iter().all(|line| line.trim().is_empty()) {
        return Err(PdfError::EmptyDocument);
    }
    Ok(write_pdf(&wrap_lines(&lines)))
}

/// Renders and writes the document to `path`.
pub fn save_document(path: &Path, doc_type: &str, text: &str) -> PdfResult<()> {
    let bytes = render_document(doc_type, text)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// The official letter framing around free-form text.
fn letter_lines(doc_type: &str, text: &str) -> Vec<String> {
    let mut lines = vec![
        "ҚР Оқу-ағарту министрінің №130 бұйрығына сәйкес".to_string(),
        doc_type.to_string(),
        "Директорға, №15 орта мектеп".to_string(),
        String::new(),
    ];
    lines.extend(text.split('\n').map(str::to_string));
    lines.push(String::new());
    lines.push(format!(
        "Күні: {}",
        Local::now().date_naive().format("%d.%m.%Y")
    ));
    lines.push("Қолы: ______________".to_string());
    lines
}

/// Flattens markup to text lines, one per block-level element. Inline
/// tags contribute their text to the enclosing block.
pub fn html_to_lines(html: &str) -> Vec<String> {
    let fragment = Html::parse_fragment(html);
    let mut lines = Vec::new();
    let mut current = String::new();

    for node in fragment.root_element().descendants() {
        match node.value() {
            Node::Element(element) => {
                if is_block(element.name()) {
                    flush_line(&mut lines, &mut current);
                }
            }
            Node::Text(text) => {
                let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
                if !collapsed.is_empty() {
                    if !current.is_empty() {
                        current.push(' ');
                    }
                    current.push_str(&collapsed);
                }
            }
            _ => {}
        }
    }
    flush_line(&mut lines, &mut current);
    lines
}

fn is_block(tag: &str) -> bool {
    matches!(
        tag,
        "p" | "div"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "li"
            | "tr"
            | "br"
            | "table"
            | "ul"
            | "ol"
    )
}

fn flush_line(lines: &mut Vec<String>, current: &mut String) {
    if current.trim().is_empty() {
        current.clear();
    } else {
        lines.push(std::mem::take(current));
    }
}

/// Word-wraps long lines to the page column width. Blank lines pass
/// through as vertical spacing.
fn wrap_lines(lines: &[String]) -> Vec<String> {
    let mut wrapped = Vec::new();
    for line in lines {
        if line.chars().count() <= WRAP_COLUMNS {
            wrapped.push(line.clone());
            continue;
        }
        let mut current = String::new();
        let mut width = 0usize;
        for word in line.split_whitespace() {
            let word_width = word.chars().count();
            if width > 0 && width + 1 + word_width > WRAP_COLUMNS {
                wrapped.push(std::mem::take(&mut current));
                width = 0;
            }
            if width > 0 {
                current.push(' ');
                width += 1;
            }
            current.push_str(word);
            width += word_width;
        }
        if !current.is_empty() {
            wrapped.push(current);
        }
    }
    wrapped
}

fn write_pdf(lines: &[String]) -> Vec<u8> {
    let pages: Vec<&[String]> = lines.chunks(LINES_PER_PAGE).collect();

    // Object ids: 1 catalog, 2 page tree, 3 font, then a page object
    // and its content stream per page.
    let kids: Vec<String> = (0..pages.len())
        .map(|index| format!("{} 0 R", 4 + 2 * index))
        .collect();

    let mut objects: Vec<Vec<u8>> = vec![
        b"<< /Type /Catalog /Pages 2 0 R >>".to_vec(),
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            pages.len()
        )
        .into_bytes(),
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_vec(),
    ];

    for (index, page) in pages.iter().enumerate() {
        objects.push(
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {A4_WIDTH} {A4_HEIGHT}] \
                 /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
                5 + 2 * index
            )
            .into_bytes(),
        );

        let content = page_stream(page);
        let mut stream = format!("<< /Length {} >>\nstream\n", content.len()).into_bytes();
        stream.extend_from_slice(&content);
        stream.extend_from_slice(b"\nendstream");
        objects.push(stream);
    }

    let mut out = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (index, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n", index + 1).as_bytes());
        out.extend_from_slice(body);
        out.extend_from_slice(b"\nendobj\n");
    }

    let xref_offset = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for offset in offsets {
        out.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_offset
        )
        .as_bytes(),
    );
    out
}

fn page_stream(lines: &[String]) -> Vec<u8> {
    let mut content = format!(
        "BT\n/F1 {FONT_SIZE} Tf\n{LEADING} TL\n{MARGIN} {} Td\n",
        A4_HEIGHT - MARGIN - FONT_SIZE
    )
    .into_bytes();
    for (index, line) in lines.iter().enumerate() {
        if index > 0 {
            content.extend_from_slice(b"T*\n");
        }
        content.push(b'(');
        content.extend_from_slice(&escape_literal(line));
        content.extend_from_slice(b") Tj\n");
    }
    content.extend_from_slice(b"ET");
    content
}

/// PDF string literals reserve `(`, `)` and `\`.
fn escape_literal(line: &str) -> Vec<u8> {
    let mut escaped = Vec::with_capacity(line.len());
    for &byte in line.as_bytes() {
        match byte {
            b'(' | b')' | b'\\' => {
                escaped.push(b'\\');
                escaped.push(byte);
            }
            b'\r' | b'\n' => escaped.push(b' '),
            _ => escaped.push(byte),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contains(haystack: &[u8], needle: &str) -> bool {
        let needle = needle.as_bytes();
        haystack.windows(needle.len()).any(|window| window == needle)
    }

    #[test]
    fn plain_text_gets_the_letter_framing() {
        let pdf = render_document("Өтініш", "Сұраймын.").unwrap();
        assert!(pdf.starts_with(b"%PDF-1.4"));
        assert!(pdf.ends_with(b"%%EOF\n"));
        assert!(contains(&pdf, "бұйрығына сәйкес"));
        assert!(contains(&pdf, "Өтініш"));
        assert!(contains(&pdf, "Қолы:"));
    }

    #[test]
    fn markup_reduces_to_one_line_per_block() {
        let lines = html_to_lines("<h2>Бас</h2><p>Бірінші <strong>жол</strong></p><p>Екінші</p>");
        assert_eq!(lines, vec!["Бас", "Бірінші жол", "Екінші"]);
    }

    #[test]
    fn table_rows_collapse_into_single_lines() {
        let lines = html_to_lines(
            "<table><tr><th>№</th><th>Аты</th></tr><tr><td>1</td><td>Арман</td></tr></table>",
        );
        assert_eq!(lines, vec!["№ Аты", "1 Арман"]);
    }

    #[test]
    fn markup_without_text_is_rejected() {
        let err = render_document("Есеп", "<div>   </div>").unwrap_err();
        assert!(matches!(err, PdfError::EmptyDocument));
    }

    #[test]
    fn overflowing_text_spans_multiple_pages() {
        let body = "Жол мәтіні\n".repeat(100);
        let pdf = render_document("Есеп", &body).unwrap();
        assert!(contains(&pdf, "/Count 3"), "108 lines at 41 per page");
    }

    #[test]
    fn single_page_document_has_five_objects() {
        let pdf = render_document("Анықтама", "Қысқа мәтін.").unwrap();
        assert!(contains(&pdf, "/Count 1"));
        assert!(contains(&pdf, "/Size 6"));
        assert!(contains(&pdf, "startxref"));
        assert!(contains(&pdf, "0000000000 65535 f"));
    }

    #[test]
    fn long_lines_wrap_at_the_column_limit() {
        let long = vec!["сөз ".repeat(60).trim().to_string()];
        let wrapped = wrap_lines(&long);
        assert!(wrapped.len() > 1);
        assert!(wrapped.iter().all(|l| l.chars().count() <= WRAP_COLUMNS));
    }

    #[test]
    fn literal_delimiters_are_escaped() {
        assert_eq!(escape_literal(r"a(b)c\d"), b"a\\(b\\)c\\\\d");
    }
}
