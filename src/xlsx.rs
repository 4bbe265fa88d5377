//! Minimal OOXML spreadsheet writer for the export artifact.
//!
//! Writes the handful of parts common spreadsheet readers require
//! (`[Content_Types].xml`, the package and workbook relationships, the
//! workbook, and one worksheet per sheet) with inline-string cells, so no
//! shared-strings table is needed. Rows are loosely-structured JSON
//! objects; columns are the union of their keys in first-seen order.

use anyhow::Result;
use quick_xml::escape::escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde_json::Value;
use std::io::{Cursor, Seek, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// MIME type of the produced artifact.
pub const MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Worksheet names are capped at 31 characters by the format; readers
/// reject longer ones.
pub const SHEET_NAME_MAX: usize = 31;

const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const NS_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// One sheet: a display name and row objects.
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Value>,
}

/// Truncates a sheet name to the format's 31-character cap (counted in
/// characters, matching what spreadsheet writers do).
pub fn truncate_sheet_name(name: &str) -> String {
    name.chars().take(SHEET_NAME_MAX).collect()
}

/// Writes a complete workbook to `out`.
pub fn write_workbook<W: Write + Seek>(out: W, sheets: &[Sheet]) -> Result<()> {
    let opts = SimpleFileOptions::default();
    let mut zip = ZipWriter::new(out);

    zip.start_file("[Content_Types].xml", opts)?;
    zip.write_all(content_types_xml(sheets.len()).as_bytes())?;

    zip.start_file("_rels/.rels", opts)?;
    zip.write_all(package_rels_xml().as_bytes())?;

    zip.start_file("xl/workbook.xml", opts)?;
    zip.write_all(workbook_xml(sheets)?.as_slice())?;

    zip.start_file("xl/_rels/workbook.xml.rels", opts)?;
    zip.write_all(workbook_rels_xml(sheets.len()).as_bytes())?;

    for (i, sheet) in sheets.iter().enumerate() {
        zip.start_file(format!("xl/worksheets/sheet{}.xml", i + 1), opts)?;
        zip.write_all(worksheet_xml(&sheet.rows)?.as_slice())?;
    }

    zip.finish()?;
    Ok(())
}

fn content_types_xml(sheet_count: usize) -> String {
    let mut overrides = String::new();
    for i in 1..=sheet_count {
        overrides.push_str(&format!(
            "<Override PartName=\"/xl/worksheets/sheet{}.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml\"/>",
            i
        ));
    }
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
         <Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\
         <Default Extension=\"xml\" ContentType=\"application/xml\"/>\
         <Override PartName=\"/xl/workbook.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml\"/>\
         {}</Types>",
        overrides
    )
}

fn package_rels_xml() -> String {
    "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
     <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
     <Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument\" Target=\"xl/workbook.xml\"/>\
     </Relationships>"
        .to_string()
}

fn workbook_xml(sheets: &[Sheet]) -> Result<Vec<u8>> {
    let mut body = String::new();
    for (i, sheet) in sheets.iter().enumerate() {
        body.push_str(&format!(
            "<sheet name=\"{}\" sheetId=\"{}\" r:id=\"rId{}\"/>",
            escape(truncate_sheet_name(&sheet.name).as_str()),
            i + 1,
            i + 1
        ));
    }
    Ok(format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <workbook xmlns=\"{}\" xmlns:r=\"{}\"><sheets>{}</sheets></workbook>",
        NS_MAIN, NS_REL, body
    )
    .into_bytes())
}

fn workbook_rels_xml(sheet_count: usize) -> String {
    let mut rels = String::new();
    for i in 1..=sheet_count {
        rels.push_str(&format!(
            "<Relationship Id=\"rId{}\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet\" Target=\"worksheets/sheet{}.xml\"/>",
            i, i
        ));
    }
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">{}</Relationships>",
        rels
    )
}

/// Column order: union of row-object keys in first-seen order.
fn column_order(rows: &[Value]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for row in rows {
        if let Some(object) = row.as_object() {
            for key in object.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }
    }
    columns
}

enum CellValue {
    Text(String),
    Number(String),
    Bool(bool),
}

/// JSON value to cell. Nulls become gaps; nested arrays/objects are
/// serialized into a text cell.
fn cell_value(value: &Value) -> Option<CellValue> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(CellValue::Bool(*b)),
        Value::Number(n) => Some(CellValue::Number(n.to_string())),
        Value::String(s) => Some(CellValue::Text(s.clone())),
        other => Some(CellValue::Text(other.to_string())),
    }
}

fn worksheet_xml(rows: &[Value]) -> Result<Vec<u8>> {
    let columns = column_order(rows);
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;

    let mut worksheet = BytesStart::new("worksheet");
    worksheet.push_attribute(("xmlns", NS_MAIN));
    writer.write_event(Event::Start(worksheet))?;
    writer.write_event(Event::Start(BytesStart::new("sheetData")))?;

    // Header row, then one row per document.
    let header: Vec<Option<CellValue>> = columns
        .iter()
        .map(|c| Some(CellValue::Text(c.clone())))
        .collect();
    write_row(&mut writer, 1, &header)?;

    for (i, row) in rows.iter().enumerate() {
        let cells: Vec<Option<CellValue>> = columns
            .iter()
            .map(|column| row.get(column).and_then(cell_value))
            .collect();
        write_row(&mut writer, i + 2, &cells)?;
    }

    writer.write_event(Event::End(BytesEnd::new("sheetData")))?;
    writer.write_event(Event::End(BytesEnd::new("worksheet")))?;
    Ok(writer.into_inner().into_inner())
}

fn write_row<W: Write>(
    writer: &mut Writer<W>,
    row_number: usize,
    cells: &[Option<CellValue>],
) -> Result<()> {
    let mut row = BytesStart::new("row");
    row.push_attribute(("r", row_number.to_string().as_str()));
    writer.write_event(Event::Start(row))?;

    for (col, cell) in cells.iter().enumerate() {
        let Some(cell) = cell else { continue };
        let reference = format!("{}{}", column_letters(col), row_number);
        match cell {
            CellValue::Text(text) => {
                let mut c = BytesStart::new("c");
                c.push_attribute(("r", reference.as_str()));
                c.push_attribute(("t", "inlineStr"));
                writer.write_event(Event::Start(c))?;
                writer.write_event(Event::Start(BytesStart::new("is")))?;
                writer.write_event(Event::Start(BytesStart::new("t")))?;
                writer.write_event(Event::Text(BytesText::new(text)))?;
                writer.write_event(Event::End(BytesEnd::new("t")))?;
                writer.write_event(Event::End(BytesEnd::new("is")))?;
                writer.write_event(Event::End(BytesEnd::new("c")))?;
            }
            CellValue::Number(n) => {
                let mut c = BytesStart::new("c");
                c.push_attribute(("r", reference.as_str()));
                writer.write_event(Event::Start(c))?;
                writer.write_event(Event::Start(BytesStart::new("v")))?;
                writer.write_event(Event::Text(BytesText::new(n)))?;
                writer.write_event(Event::End(BytesEnd::new("v")))?;
                writer.write_event(Event::End(BytesEnd::new("c")))?;
            }
            CellValue::Bool(b) => {
                let mut c = BytesStart::new("c");
                c.push_attribute(("r", reference.as_str()));
                c.push_attribute(("t", "b"));
                writer.write_event(Event::Start(c))?;
                writer.write_event(Event::Start(BytesStart::new("v")))?;
                writer.write_event(Event::Text(BytesText::new(if *b { "1" } else { "0" })))?;
                writer.write_event(Event::End(BytesEnd::new("v")))?;
                writer.write_event(Event::End(BytesEnd::new("c")))?;
            }
        }
    }

    writer.write_event(Event::End(BytesEnd::new("row")))?;
    Ok(())
}

/// 0-based column index to spreadsheet letters (A, B, ..., Z, AA, ...).
fn column_letters(mut col: usize) -> String {
    let mut letters = String::new();
    loop {
        letters.insert(0, (b'A' + (col % 26) as u8) as char);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    letters
}

#[cfg(test)]
pub(crate) mod reader {
    //! Read-back helpers for tests, mirroring how external readers walk
    //! the package.

    use std::io::Read;

    /// Sheet names from `xl/workbook.xml`.
    pub fn sheet_names(bytes: &[u8]) -> Vec<String> {
        let xml = zip_entry(bytes, "xl/workbook.xml");
        let mut reader = quick_xml::Reader::from_reader(xml.as_slice());
        let mut names = Vec::new();
        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(quick_xml::events::Event::Empty(e)) | Ok(quick_xml::events::Event::Start(e))
                    if e.local_name().as_ref() == b"sheet" =>
                {
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"name" {
                            names.push(String::from_utf8(attr.value.to_vec()).unwrap());
                        }
                    }
                }
                Ok(quick_xml::events::Event::Eof) => break,
                Err(e) => panic!("workbook.xml parse error: {}", e),
                _ => {}
            }
            buf.clear();
        }
        names
    }

    /// Inline-string and numeric cell texts of one sheet, in document order.
    pub fn cell_texts(bytes: &[u8], sheet_index: usize) -> Vec<String> {
        let xml = zip_entry(bytes, &format!("xl/worksheets/sheet{}.xml", sheet_index + 1));
        let mut reader = quick_xml::Reader::from_reader(xml.as_slice());
        reader.config_mut().trim_text(true);
        let mut texts = Vec::new();
        let mut buf = Vec::new();
        let mut in_text = false;
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(quick_xml::events::Event::Start(e)) => {
                    let name = e.local_name();
                    if name.as_ref() == b"t" || name.as_ref() == b"v" {
                        in_text = true;
                    }
                }
                Ok(quick_xml::events::Event::Text(t)) if in_text => {
                    texts.push(t.unescape().unwrap().into_owned());
                    in_text = false;
                }
                Ok(quick_xml::events::Event::End(_)) => in_text = false,
                Ok(quick_xml::events::Event::Eof) => break,
                Err(e) => panic!("worksheet parse error: {}", e),
                _ => {}
            }
            buf.clear();
        }
        texts
    }

    fn zip_entry(bytes: &[u8], name: &str) -> Vec<u8> {
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
        let mut entry = archive.by_name(name).unwrap();
        let mut out = Vec::new();
        entry.read_to_end(&mut out).unwrap();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn build(sheets: &[Sheet]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        write_workbook(&mut cursor, sheets).unwrap();
        cursor.into_inner()
    }

    #[test]
    fn sheet_names_are_truncated_to_31_chars() {
        let long = "Colección_Inventario_Turístico_Completo_2024";
        let sheets = vec![Sheet {
            name: long.to_string(),
            rows: vec![json!({ "info": "Sin datos" })],
        }];
        let bytes = build(&sheets);
        let names = reader::sheet_names(&bytes);
        assert_eq!(names.len(), 1);
        assert_eq!(names[0].chars().count(), 31);
        assert!(long.starts_with(&names[0]));
    }

    #[test]
    fn rows_carry_headers_then_values() {
        let sheets = vec![Sheet {
            name: "Sitios".to_string(),
            rows: vec![
                json!({ "nombre": "Playa Blanca", "puntuacion": 4.5 }),
                json!({ "nombre": "Museo", "municipio": "Santa Marta" }),
            ],
        }];
        let bytes = build(&sheets);
        let texts = reader::cell_texts(&bytes, 0);
        // Header: union of keys in first-seen order.
        assert_eq!(&texts[..3], &["nombre", "puntuacion", "municipio"]);
        assert!(texts.contains(&"4.5".to_string()));
        assert!(texts.contains(&"Santa Marta".to_string()));
    }

    #[test]
    fn nested_objects_become_text_cells() {
        let sheets = vec![Sheet {
            name: "Tips".to_string(),
            rows: vec![json!({ "tip": { "texto": "bonito", "fecha": "Enero 1" } })],
        }];
        let bytes = build(&sheets);
        let texts = reader::cell_texts(&bytes, 0);
        assert!(texts.iter().any(|t| t.contains("bonito")));
    }

    #[test]
    fn column_letters_wrap_past_z() {
        assert_eq!(column_letters(0), "A");
        assert_eq!(column_letters(25), "Z");
        assert_eq!(column_letters(26), "AA");
        assert_eq!(column_letters(27), "AB");
    }
}
