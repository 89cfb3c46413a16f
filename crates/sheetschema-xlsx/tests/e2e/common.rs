//! In-memory XLSX package builder for tests.

use std::io::{Cursor, Write};
use std::path::PathBuf;

use zip::write::SimpleFileOptions;

const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PKG_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

struct SheetPart {
    name: String,
    body: String,
    hyperlink_rels: Vec<(String, String)>,
}

/// Builds a minimal but well-formed XLSX package.
///
/// Sheet bodies are the children of `<worksheet>` (usually a `<sheetData>`
/// followed by `<dataValidations>`/`<hyperlinks>`), written verbatim.
#[derive(Default)]
pub struct XlsxFixture {
    shared_strings: Vec<String>,
    styles: Option<String>,
    sheets: Vec<SheetPart>,
}

#[allow(dead_code)]
impl XlsxFixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw `<si>` contents, in index order
    pub fn shared_strings(mut self, items: &[&str]) -> Self {
        self.shared_strings = items.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Children of `<styleSheet>`
    pub fn styles(mut self, body: &str) -> Self {
        self.styles = Some(body.to_string());
        self
    }

    pub fn sheet(self, name: &str, body: &str) -> Self {
        self.sheet_with_links(name, body, &[])
    }

    /// A sheet whose part relationships declare external hyperlink targets
    pub fn sheet_with_links(mut self, name: &str, body: &str, links: &[(&str, &str)]) -> Self {
        self.sheets.push(SheetPart {
            name: name.to_string(),
            body: body.to_string(),
            hyperlink_rels: links
                .iter()
                .map(|(id, target)| (id.to_string(), target.to_string()))
                .collect(),
        });
        self
    }

    pub fn build(&self) -> Vec<u8> {
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

            let sheets: String = self
                .sheets
                .iter()
                .enumerate()
                .map(|(i, s)| {
                    format!(
                        r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                        s.name,
                        i + 1,
                        i + 1
                    )
                })
                .collect();
            put(
                "xl/workbook.xml",
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8"?><workbook xmlns="{}" xmlns:r="{}"><sheets>{}</sheets></workbook>"#,
                    MAIN_NS, REL_NS, sheets
                ),
            );

            let rels: String = (1..=self.sheets.len())
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

            if !self.shared_strings.is_empty() {
                let items: String = self
                    .shared_strings
                    .iter()
                    .map(|s| format!("<si>{}</si>", s))
                    .collect();
                put(
                    "xl/sharedStrings.xml",
                    format!(
                        r#"<?xml version="1.0" encoding="UTF-8"?><sst xmlns="{}" count="{n}" uniqueCount="{n}">{}</sst>"#,
                        MAIN_NS,
                        items,
                        n = self.shared_strings.len()
                    ),
                );
            }

            if let Some(styles) = &self.styles {
                put(
                    "xl/styles.xml",
                    format!(
                        r#"<?xml version="1.0" encoding="UTF-8"?><styleSheet xmlns="{}">{}</styleSheet>"#,
                        MAIN_NS, styles
                    ),
                );
            }

            for (i, sheet) in self.sheets.iter().enumerate() {
                put(
                    &format!("xl/worksheets/sheet{}.xml", i + 1),
                    format!(
                        r#"<?xml version="1.0" encoding="UTF-8"?><worksheet xmlns="{}" xmlns:r="{}" xmlns:x14="http://schemas.microsoft.com/office/spreadsheetml/2009/9/main" xmlns:xm="http://schemas.microsoft.com/office/excel/2006/main">{}</worksheet>"#,
                        MAIN_NS, REL_NS, sheet.body
                    ),
                );

                if !sheet.hyperlink_rels.is_empty() {
                    let rels: String = sheet
                        .hyperlink_rels
                        .iter()
                        .map(|(id, target)| {
                            format!(
                                r#"<Relationship Id="{}" Type="{}/hyperlink" Target="{}" TargetMode="External"/>"#,
                                id, REL_NS, target
                            )
                        })
                        .collect();
                    put(
                        &format!("xl/worksheets/_rels/sheet{}.xml.rels", i + 1),
                        format!(
                            r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="{}">{}</Relationships>"#,
                            PKG_REL_NS, rels
                        ),
                    );
                }
            }

            zip.finish().unwrap();
        }
        buf
    }

    /// Write the package to a fresh temp directory, returning (dir guard, path)
    pub fn write_temp(&self) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixture.xlsx");
        std::fs::write(&path, self.build()).unwrap();
        (dir, path)
    }
}
