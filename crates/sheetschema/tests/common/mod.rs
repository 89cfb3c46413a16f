//! Builds schema workbooks as XLSX packages.
//!
//! Rows are written as inline strings. A cell starting with `=` becomes a
//! formula without a cached value; `TRUE`/`FALSE` become booleans.
//! [`SheetFixture::formula`] and [`SheetFixture::shared_formula`] write
//! formulas the way Excel saves them, with a cached result.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;

const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PKG_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Field table header used by most tests, columns A to G
pub const FIELD_HEADER: &[&str] = &[
    "Required Field",
    "Field Type",
    "Parameter",
    "Visibility",
    "Question",
    "Allow Multiple Answers",
    "Answer",
];

pub struct SheetFixture {
    name: String,
    cells: BTreeMap<(u32, u32), String>,
    links: Vec<(String, String)>,
    shared_groups: u32,
}

impl SheetFixture {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            cells: BTreeMap::new(),
            links: Vec::new(),
            shared_groups: 0,
        }
    }

    /// Append rows below whatever is already there
    pub fn rows(mut self, rows: &[&[&str]]) -> Self {
        let start = self.cells.keys().map(|(r, _)| r + 1).max().unwrap_or(0);
        for (r, cells) in rows.iter().enumerate() {
            for (c, text) in cells.iter().enumerate() {
                if !text.is_empty() {
                    self.cells
                        .insert((start + r as u32, c as u32), cell_xml(text));
                }
            }
        }
        self
    }

    /// Boolean formula in `cell` with its last computed result
    pub fn formula(mut self, cell: &str, formula: &str, cached: bool) -> Self {
        let body = format!(
            r#"<c r="{{ref}}" t="b"><f>{}</f><v>{}</v></c>"#,
            escape(formula.trim_start_matches('=')),
            cached as u8
        );
        self.cells.insert(cell_key(cell), body);
        self
    }

    /// Shared boolean formula over `range` (e.g. `D6:D8`). The first cell
    /// holds the text; the others only name the group.
    pub fn shared_formula(mut self, range: &str, formula: &str, cached: bool) -> Self {
        let si = self.shared_groups;
        self.shared_groups += 1;

        let (first, last) = range.split_once(':').unwrap_or((range, range));
        let ((r0, c0), (r1, c1)) = (cell_key(first), cell_key(last));
        for r in r0..=r1 {
            for c in c0..=c1 {
                let f = if (r, c) == (r0, c0) {
                    format!(
                        r#"<f t="shared" ref="{}" si="{}">{}</f>"#,
                        range,
                        si,
                        escape(formula.trim_start_matches('='))
                    )
                } else {
                    format!(r#"<f t="shared" si="{}"/>"#, si)
                };
                let body = format!(r#"<c r="{{ref}}" t="b">{}<v>{}</v></c>"#, f, cached as u8);
                self.cells.insert((r, c), body);
            }
        }
        self
    }

    /// Internal hyperlink from `cell` to another worksheet
    pub fn link(mut self, cell: &str, worksheet: &str) -> Self {
        self.links.push((cell.to_string(), worksheet.to_string()));
        self
    }

    fn xml(&self) -> String {
        let mut rows: BTreeMap<u32, String> = BTreeMap::new();
        for ((r, c), body) in &self.cells {
            let reference = format!("{}{}", column_name(*c), r + 1);
            rows.entry(*r)
                .or_default()
                .push_str(&body.replace("{ref}", &reference));
        }

        let mut xml = String::from("<sheetData>");
        for (r, cells) in rows {
            xml.push_str(&format!(r#"<row r="{}">{}</row>"#, r + 1, cells));
        }
        xml.push_str("</sheetData>");

        if !self.links.is_empty() {
            xml.push_str("<hyperlinks>");
            for (cell, worksheet) in &self.links {
                xml.push_str(&format!(
                    r#"<hyperlink ref="{}" location="'{}'!A1" display="{}"/>"#,
                    cell,
                    escape(worksheet),
                    escape(worksheet)
                ));
            }
            xml.push_str("</hyperlinks>");
        }
        xml
    }
}

fn cell_xml(text: &str) -> String {
    match text {
        "TRUE" => r#"<c r="{ref}" t="b"><v>1</v></c>"#.to_string(),
        "FALSE" => r#"<c r="{ref}" t="b"><v>0</v></c>"#.to_string(),
        _ if text.starts_with('=') => {
            format!(r#"<c r="{{ref}}"><f>{}</f></c>"#, escape(&text[1..]))
        }
        _ => format!(
            r#"<c r="{{ref}}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
            escape(text)
        ),
    }
}

/// Zero-based (row, col) of an A1 reference
fn cell_key(cell: &str) -> (u32, u32) {
    let split = cell.find(|c: char| c.is_ascii_digit()).unwrap();
    let col = cell[..split]
        .bytes()
        .fold(0u32, |n, b| n * 26 + (b - b'A' + 1) as u32);
    let row: u32 = cell[split..].parse().unwrap();
    (row - 1, col - 1)
}

fn column_name(col: u32) -> String {
    let mut n = col + 1;
    let mut name = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        name.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    name.reverse();
    String::from_utf8(name).unwrap()
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Package a list of sheets, in tab order
pub fn workbook(sheets: Vec<SheetFixture>) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
        let options = SimpleFileOptions::default();
        let mut put = |path: &str, content: String| {
            zip.start_file(path, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        };

        put(
            "[Content_Types].xml",
            r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/></Types>"#.to_string(),
        );

        let entries: String = sheets
            .iter()
            .enumerate()
            .map(|(i, s)| {
                format!(
                    r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                    escape(&s.name),
                    i + 1,
                    i + 1
                )
            })
            .collect();
        put(
            "xl/workbook.xml",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?><workbook xmlns="{}" xmlns:r="{}"><sheets>{}</sheets></workbook>"#,
                MAIN_NS, REL_NS, entries
            ),
        );

        let rels: String = (1..=sheets.len())
            .map(|i| {
                format!(
                    r#"<Relationship Id="rId{i}" Type="{REL_NS}/worksheet" Target="worksheets/sheet{i}.xml"/>"#
                )
            })
            .collect();
        put(
            "xl/_rels/workbook.xml.rels",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="{}">{}</Relationships>"#,
                PKG_REL_NS, rels
            ),
        );

        for (i, sheet) in sheets.iter().enumerate() {
            put(
                &format!("xl/worksheets/sheet{}.xml", i + 1),
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8"?><worksheet xmlns="{}" xmlns:r="{}">{}</worksheet>"#,
                    MAIN_NS,
                    REL_NS,
                    sheet.xml()
                ),
            );
        }

        zip.finish().unwrap();
    }
    buf
}
