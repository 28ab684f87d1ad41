//! Minimal SpreadsheetML (`.xlsx`) writer.
//!
//! A workbook is a zip archive of XML parts. Only what the reports need is
//! supported: inline strings, numbers, booleans and dates, plus a bold header
//! row.

use crate::utils::error::{EtlError, Result};
use crate::utils::validation::validate_non_empty_string;
use chrono::NaiveDate;
use std::io::Write;
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::CompressionMethod;

pub const XLSX_MEDIA_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PKG_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

const MAX_SHEET_NAME_LEN: usize = 31;
const INVALID_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

const STYLE_DATE: u32 = 1;
const STYLE_HEADER: u32 = 2;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::Bool(value)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Cell::Empty)
    }
}

#[derive(Debug, Clone)]
pub struct Worksheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

#[derive(Debug, Clone, Default)]
pub struct Workbook {
    sheets: Vec<Worksheet>,
}

/// `0` → `A`, `25` → `Z`, `26` → `AA`.
pub fn column_letter(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

/// Days since the 1900 date system epoch (Excel's 1899-12-30 origin).
pub fn excel_serial(date: NaiveDate) -> i64 {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or_default();
    (date - epoch).num_days()
}

fn escape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            // Other control characters are not allowed in XML 1.0.
            '\t' | '\n' | '\r' => out.push(c),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

fn write_cell(xml: &mut String, reference: &str, cell: &Cell, style: Option<u32>) {
    let style_attr = style.map(|s| format!(r#" s="{}""#, s)).unwrap_or_default();
    match cell {
        Cell::Empty => {}
        Cell::Text(text) => xml.push_str(&format!(
            r#"<c r="{}" t="inlineStr"{}><is><t xml:space="preserve">{}</t></is></c>"#,
            reference,
            style_attr,
            escape_xml(text)
        )),
        Cell::Number(n) if n.is_finite() => xml.push_str(&format!(
            r#"<c r="{}"{}><v>{}</v></c>"#,
            reference, style_attr, n
        )),
        Cell::Number(_) => {}
        Cell::Bool(b) => xml.push_str(&format!(
            r#"<c r="{}" t="b"{}><v>{}</v></c>"#,
            reference,
            style_attr,
            u8::from(*b)
        )),
        Cell::Date(d) => xml.push_str(&format!(
            r#"<c r="{}" s="{}"><v>{}</v></c>"#,
            reference,
            STYLE_DATE,
            excel_serial(*d)
        )),
    }
}

impl Worksheet {
    fn to_xml(&self) -> String {
        let mut xml = format!(r#"{}<worksheet xmlns="{}"><sheetData>"#, XML_DECL, MAIN_NS);

        xml.push_str(r#"<row r="1">"#);
        for (col, header) in self.headers.iter().enumerate() {
            let reference = format!("{}1", column_letter(col));
            write_cell(
                &mut xml,
                &reference,
                &Cell::Text(header.clone()),
                Some(STYLE_HEADER),
            );
        }
        xml.push_str("</row>");

        for (idx, row) in self.rows.iter().enumerate() {
            let row_number = idx + 2;
            xml.push_str(&format!(r#"<row r="{}">"#, row_number));
            for (col, cell) in row.iter().enumerate() {
                let reference = format!("{}{}", column_letter(col), row_number);
                write_cell(&mut xml, &reference, cell, None);
            }
            xml.push_str("</row>");
        }

        xml.push_str("</sheetData></worksheet>");
        xml
    }
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn add_sheet(
        &mut self,
        name: &str,
        headers: Vec<String>,
        rows: Vec<Vec<Cell>>,
    ) -> Result<()> {
        validate_non_empty_string("sheet_name", name)?;
        if name.chars().count() > MAX_SHEET_NAME_LEN || name.contains(INVALID_SHEET_CHARS) {
            return Err(EtlError::validation(format!(
                "Invalid sheet name '{}': at most {} characters, none of {:?}",
                name, MAX_SHEET_NAME_LEN, INVALID_SHEET_CHARS
            )));
        }
        if self
            .sheets
            .iter()
            .any(|s| s.name.eq_ignore_ascii_case(name))
        {
            return Err(EtlError::validation(format!(
                "Duplicate sheet name '{}'",
                name
            )));
        }

        self.sheets.push(Worksheet {
            name: name.to_string(),
            headers,
            rows,
        });
        Ok(())
    }

    fn content_types(&self) -> String {
        let mut xml = format!(
            r#"{}<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
            XML_DECL
        );
        for idx in 1..=self.sheets.len() {
            xml.push_str(&format!(
                r#"<Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
                idx
            ));
        }
        xml.push_str("</Types>");
        xml
    }

    fn root_rels() -> String {
        format!(
            r#"{}<Relationships xmlns="{}"><Relationship Id="rId1" Type="{}/officeDocument" Target="xl/workbook.xml"/></Relationships>"#,
            XML_DECL, PKG_REL_NS, REL_NS
        )
    }

    fn workbook_xml(&self) -> String {
        let mut xml = format!(
            r#"{}<workbook xmlns="{}" xmlns:r="{}"><sheets>"#,
            XML_DECL, MAIN_NS, REL_NS
        );
        for (idx, sheet) in self.sheets.iter().enumerate() {
            xml.push_str(&format!(
                r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                escape_xml(&sheet.name),
                idx + 1,
                idx + 1
            ));
        }
        xml.push_str("</sheets></workbook>");
        xml
    }

    fn workbook_rels(&self) -> String {
        let mut xml = format!(r#"{}<Relationships xmlns="{}">"#, XML_DECL, PKG_REL_NS);
        for idx in 1..=self.sheets.len() {
            xml.push_str(&format!(
                r#"<Relationship Id="rId{}" Type="{}/worksheet" Target="worksheets/sheet{}.xml"/>"#,
                idx, REL_NS, idx
            ));
        }
        xml.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="{}/styles" Target="styles.xml"/>"#,
            self.sheets.len() + 1,
            REL_NS
        ));
        xml.push_str("</Relationships>");
        xml
    }

    fn styles_xml() -> String {
        format!(
            concat!(
                r#"{}<styleSheet xmlns="{}">"#,
                r#"<numFmts count="1"><numFmt numFmtId="164" formatCode="yyyy-mm-dd"/></numFmts>"#,
                r#"<fonts count="2"><font><sz val="11"/><name val="Calibri"/></font><font><b/><sz val="11"/><name val="Calibri"/></font></fonts>"#,
                r#"<fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills>"#,
                r#"<borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>"#,
                r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#,
                r#"<cellXfs count="3"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>"#,
                r#"<xf numFmtId="164" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/>"#,
                r#"<xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/></cellXfs>"#,
                r#"<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>"#,
                r#"</styleSheet>"#
            ),
            XML_DECL, MAIN_NS
        )
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        if self.sheets.is_empty() {
            return Err(EtlError::validation("A workbook needs at least one sheet"));
        }

        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

        let mut parts = vec![
            ("[Content_Types].xml".to_string(), self.content_types()),
            ("_rels/.rels".to_string(), Self::root_rels()),
            ("xl/workbook.xml".to_string(), self.workbook_xml()),
            ("xl/_rels/workbook.xml.rels".to_string(), self.workbook_rels()),
            ("xl/styles.xml".to_string(), Self::styles_xml()),
        ];
        for (idx, sheet) in self.sheets.iter().enumerate() {
            parts.push((format!("xl/worksheets/sheet{}.xml", idx + 1), sheet.to_xml()));
        }

        for (name, xml) in parts {
            zip.start_file(name, options)?;
            zip.write_all(xml.as_bytes())?;
        }

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }
}
