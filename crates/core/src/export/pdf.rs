use std::io::BufWriter;

use printpdf::{BuiltinFont, Mm, PdfDocument};

use super::ExportError;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const FONT_SIZE_PT: f32 = 10.0;
const LINE_HEIGHT_MM: f32 = 5.0;

pub const WRAP_COLUMNS: usize = 90;
pub const LINES_PER_PAGE: usize = 50;

/// Paginated A4 document in Helvetica, one wrapped line per text row.
pub fn to_pdf(text: &str) -> Result<Vec<u8>, ExportError> {
    let pages = layout_pages(text)?;

    let (doc, first_page, first_layer) = PdfDocument::new(
        "konspekt",
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;

    for (idx, lines) in pages.iter().enumerate() {
        let (page, layer) = if idx == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(
                Mm(PAGE_WIDTH_MM),
                Mm(PAGE_HEIGHT_MM),
                format!("Layer {}", idx + 1),
            )
        };
        let current_layer = doc.get_page(page).get_layer(layer);
        for (row, line) in lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            let y = PAGE_HEIGHT_MM - MARGIN_MM - LINE_HEIGHT_MM * (row as f32 + 1.0);
            current_layer.use_text(line.as_str(), FONT_SIZE_PT, Mm(MARGIN_MM), Mm(y), &font);
        }
    }

    let mut buffer = Vec::new();
    {
        let mut writer = BufWriter::new(&mut buffer);
        doc.save(&mut writer)
            .map_err(|e| ExportError::Pdf(e.to_string()))?;
    }
    Ok(buffer)
}

/// Wrapped lines grouped into pages. Always returns at least one page.
pub fn layout_pages(text: &str) -> Result<Vec<Vec<String>>, ExportError> {
    let text = fold_to_latin1(text)?;
    let lines = wrap_lines(&text, WRAP_COLUMNS);
    let mut pages: Vec<Vec<String>> = lines
        .chunks(LINES_PER_PAGE)
        .map(|chunk| chunk.to_vec())
        .collect();
    if pages.is_empty() {
        pages.push(Vec::new());
    }
    Ok(pages)
}

/// Greedy word wrap by character count. Words longer than `width` are split.
pub fn wrap_lines(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_len = 0usize;

        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();

            while word.len() > width {
                if current_len > 0 {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                let rest = word.split_off(width);
                lines.push(word.into_iter().collect());
                word = rest;
            }
            if word.is_empty() {
                continue;
            }

            if current_len > 0 && current_len + 1 + word.len() > width {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.extend(word.iter());
            current_len += word.len();
        }

        lines.push(current);
    }

    lines
}

/// The built-in PDF fonts only cover Latin-1, so common typography is folded
/// to ASCII and anything else is refused.
fn fold_to_latin1(text: &str) -> Result<String, ExportError> {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\r' => {}
            '\n' => out.push('\n'),
            '\t' | '\u{00A0}' | '\u{2009}' | '\u{202F}' => out.push(' '),
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => out.push('\''),
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => out.push('"'),
            '\u{2010}' | '\u{2011}' | '\u{2013}' | '\u{2014}' | '\u{2212}' => out.push('-'),
            '\u{2026}' => out.push_str("..."),
            '\u{2022}' | '\u{25CF}' => out.push('*'),
            c if c.is_control() || (c as u32) > 0xFF => {
                return Err(ExportError::UnsupportedCharacter {
                    ch: c,
                    format: "pdf",
                });
            }
            c => out.push(c),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_is_a_pdf() {
        let bytes = to_pdf("Summary\n\nCafé au lait, s'il vous plaît.").unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn words_wrap_at_the_column_limit() {
        let lines = wrap_lines("aaa bbb ccc ddd", 7);
        assert_eq!(lines, ["aaa bbb", "ccc ddd"]);
    }

    #[test]
    fn long_words_are_split() {
        let lines = wrap_lines("xx abcdefghij", 4);
        assert_eq!(lines, ["xx", "abcd", "efgh", "ij"]);
    }

    #[test]
    fn blank_lines_are_kept() {
        assert_eq!(wrap_lines("one\n\ntwo", 10), ["one", "", "two"]);
    }

    #[test]
    fn pages_hold_a_fixed_number_of_lines() {
        let text = (0..120).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        let pages = layout_pages(&text).unwrap();
        assert_eq!(
            pages.iter().map(Vec::len).collect::<Vec<_>>(),
            [LINES_PER_PAGE, LINES_PER_PAGE, 20]
        );
    }

    #[test]
    fn empty_text_is_one_blank_page() {
        let pages = layout_pages("").unwrap();
        assert_eq!(pages.len(), 1);
        assert!(to_pdf("").unwrap().starts_with(b"%PDF"));
    }

    #[test]
    fn typography_is_folded() {
        let pages = layout_pages("\u{201C}Hi\u{201D} \u{2014} it\u{2019}s\u{2026}").unwrap();
        assert_eq!(pages[0], ["\"Hi\" - it's..."]);
    }

    #[test]
    fn characters_outside_latin1_are_refused() {
        let err = to_pdf("要点").unwrap_err();
        assert!(matches!(
            err,
            ExportError::UnsupportedCharacter { ch: '要', format: "pdf" }
        ));
    }
}
