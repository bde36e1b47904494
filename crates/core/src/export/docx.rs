use std::io::{Cursor, Write};

use quick_xml::{
    Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};
use zip::{CompressionMethod, ZipWriter, write::FileOptions};

use super::ExportError;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const WORDML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Minimal Word document: one paragraph, one run, line breaks as `<w:br/>`.
pub fn to_docx(text: &str) -> Result<Vec<u8>, ExportError> {
    check_xml_chars(text)?;
    let document = document_xml(text)?;

    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in [
        ("[Content_Types].xml", CONTENT_TYPES.as_bytes()),
        ("_rels/.rels", PACKAGE_RELS.as_bytes()),
        ("word/document.xml", document.as_slice()),
    ] {
        writer.start_file(name, options)?;
        writer.write_all(content)?;
    }

    Ok(writer.finish()?.into_inner())
}

fn xml_err(e: impl std::fmt::Display) -> ExportError {
    ExportError::Xml(e.to_string())
}

fn document_xml(text: &str) -> Result<Vec<u8>, ExportError> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
        .map_err(xml_err)?;
    writer
        .write_event(Event::Start(
            BytesStart::new("w:document").with_attributes([("xmlns:w", WORDML_NS)]),
        ))
        .map_err(xml_err)?;
    for tag in ["w:body", "w:p", "w:r"] {
        writer
            .write_event(Event::Start(BytesStart::new(tag)))
            .map_err(xml_err)?;
    }

    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    for (i, line) in normalized.split('\n').enumerate() {
        if i > 0 {
            writer
                .write_event(Event::Empty(BytesStart::new("w:br")))
                .map_err(xml_err)?;
        }
        if line.is_empty() {
            continue;
        }
        writer
            .write_event(Event::Start(
                BytesStart::new("w:t").with_attributes([("xml:space", "preserve")]),
            ))
            .map_err(xml_err)?;
        writer
            .write_event(Event::Text(BytesText::new(line)))
            .map_err(xml_err)?;
        writer
            .write_event(Event::End(BytesEnd::new("w:t")))
            .map_err(xml_err)?;
    }

    for tag in ["w:r", "w:p", "w:body", "w:document"] {
        writer
            .write_event(Event::End(BytesEnd::new(tag)))
            .map_err(xml_err)?;
    }

    Ok(writer.into_inner().into_inner())
}

/// XML 1.0 forbids most control characters, even escaped.
fn check_xml_chars(text: &str) -> Result<(), ExportError> {
    let bad = text.chars().find(|&c| {
        matches!(
            c,
            '\u{0}'..='\u{8}' | '\u{B}' | '\u{C}' | '\u{E}'..='\u{1F}' | '\u{FFFE}' | '\u{FFFF}'
        )
    });
    match bad {
        Some(ch) => Err(ExportError::UnsupportedCharacter { ch, format: "docx" }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use zip::ZipArchive;

    use super::*;

    fn read_entry(bytes: &[u8], name: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn package_has_the_three_parts() {
        let bytes = to_docx("hello").unwrap();
        let archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let mut names: Vec<&str> = archive.file_names().collect();
        names.sort();
        assert_eq!(
            names,
            ["[Content_Types].xml", "_rels/.rels", "word/document.xml"]
        );
    }

    #[test]
    fn text_is_escaped_and_lines_become_breaks() {
        let bytes = to_docx("Tom & Jerry <3\r\nsecond line").unwrap();
        let xml = read_entry(&bytes, "word/document.xml");
        assert!(xml.contains("Tom &amp; Jerry &lt;3"));
        assert!(xml.contains("<w:br/>"));
        assert!(xml.contains("second line"));
        assert_eq!(xml.matches("<w:p>").count(), 1);
    }

    #[test]
    fn unicode_survives() {
        let bytes = to_docx("Привет, 世界").unwrap();
        let xml = read_entry(&bytes, "word/document.xml");
        assert!(xml.contains("Привет, 世界"));
    }

    #[test]
    fn control_characters_are_rejected() {
        let err = to_docx("bell\u{7}").unwrap_err();
        assert!(matches!(
            err,
            ExportError::UnsupportedCharacter { ch: '\u{7}', .. }
        ));
        assert!(to_docx("tab\there").is_ok());
    }
}
