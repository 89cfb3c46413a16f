//! XLSX reader

mod shared;

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use crate::styles::read_styles_xml;
use shared::SharedFormula;
use sheetschema_core::style::Style;
use sheetschema_core::validation::{DataValidation, ValidationType};
use sheetschema_core::{CellAddress, CellError, CellRange, CellValue, Hyperlink, Workbook, Worksheet};

/// Hyperlinks spanning more cells than this are attached to their first cell only
const MAX_HYPERLINK_CELLS: u64 = 4096;

/// Decode Excel's `_xHHHH_` escape sequences (`_x000a_` is LF, `_x005f_` an underscore).
fn decode_excel_escapes(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(pos) = rest.find("_x") {
        result.push_str(&rest[..pos]);
        let candidate = &rest[pos..];

        let decoded = candidate
            .get(2..6)
            .filter(|hex| hex.chars().all(|c| c.is_ascii_hexdigit()))
            .filter(|_| candidate.as_bytes().get(6) == Some(&b'_'))
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .and_then(char::from_u32);

        match decoded {
            Some(c) => {
                result.push(c);
                rest = &candidate[7..];
            }
            None => {
                result.push_str("_x");
                rest = &candidate[2..];
            }
        }
    }

    result.push_str(rest);
    result
}

fn attr_string(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok().map(|v| v.to_string()))
}

/// Package path of the relationships part belonging to `part`
/// (`xl/worksheets/sheet1.xml` → `xl/worksheets/_rels/sheet1.xml.rels`)
fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Raw attributes and children of a `<c>` element
#[derive(Debug, Default)]
struct RawCell {
    reference: Option<String>,
    cell_type: Option<String>,
    style: Option<u32>,
    value: Option<String>,
    formula: Option<String>,
    /// Group index of a shared formula (`<f t="shared" si=".."/>`)
    shared_index: Option<u32>,
}

impl RawCell {
    fn from_attrs(e: &BytesStart<'_>) -> Self {
        Self {
            reference: attr_string(e, b"r"),
            cell_type: attr_string(e, b"t"),
            style: attr_string(e, b"s").and_then(|s| s.parse().ok()),
            ..Default::default()
        }
    }

    fn read_formula_attrs(&mut self, e: &BytesStart<'_>) {
        if attr_string(e, b"t").as_deref() == Some("shared") {
            self.shared_index = attr_string(e, b"si").and_then(|s| s.parse().ok());
        }
    }
}

/// XLSX file reader
pub struct XlsxReader;

impl XlsxReader {
    /// Read a workbook from a file path
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<Workbook> {
        let file = File::open(path)?;
        Self::read(BufReader::new(file))
    }

    /// Read a workbook from an in-memory package
    pub fn read_bytes(bytes: &[u8]) -> XlsxResult<Workbook> {
        Self::read(std::io::Cursor::new(bytes))
    }

    /// Read a workbook from a reader
    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<Workbook> {
        let mut archive = zip::ZipArchive::new(reader)?;

        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        let shared_strings = Self::read_shared_strings(&mut archive)?;
        let styles = Self::read_styles(&mut archive)?;
        let sheet_info = Self::read_workbook_xml(&mut archive)?;
        let sheet_paths = Self::read_workbook_rels(&mut archive)?;

        let mut workbook = Workbook::empty();

        for (name, r_id) in &sheet_info {
            let Some(path) = sheet_paths.get(r_id) else {
                log::warn!("sheet '{}' has no relationship target ({})", name, r_id);
                continue;
            };

            let sheet_idx = workbook.add_worksheet_with_name(name)?;
            let worksheet = workbook
                .worksheet_mut(sheet_idx)
                .ok_or_else(|| XlsxError::InvalidFormat(format!("sheet '{}' vanished", name)))?;

            let links = Self::read_part_rels(&mut archive, &rels_path_for(path))?;
            Self::read_worksheet(&mut archive, path, worksheet, &shared_strings, &styles, &links)?;
            log::debug!(
                "read sheet '{}': {} cells, {} validations, {} hyperlinks",
                name,
                worksheet.cell_count(),
                worksheet.data_validations().len(),
                worksheet.hyperlink_count()
            );
        }

        Ok(workbook)
    }

    /// Read the shared strings table; rich-text runs are concatenated
    fn read_shared_strings<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<String>> {
        let mut strings = Vec::new();

        let file = match archive.by_name("xl/sharedStrings.xml") {
            Ok(f) => f,
            Err(_) => return Ok(strings),
        };

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(false);

        let mut buf = Vec::new();
        let mut current = String::new();
        let mut in_si = false;
        let mut in_t = false;
        let mut in_phonetic = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current.clear();
                    }
                    b"rPh" => in_phonetic = true,
                    b"t" if in_si && !in_phonetic => in_t = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) if e.name().as_ref() == b"si" => {
                    strings.push(String::new());
                }
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"si" => {
                        strings.push(decode_excel_escapes(&current));
                        in_si = false;
                    }
                    b"rPh" => in_phonetic = false,
                    b"t" => in_t = false,
                    _ => {}
                },
                Ok(Event::Text(e)) if in_t => {
                    if let Ok(text) = e.unescape() {
                        current.push_str(&text);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(strings)
    }

    fn read_styles<R: Read + Seek>(archive: &mut zip::ZipArchive<R>) -> XlsxResult<Vec<Style>> {
        match archive.by_name("xl/styles.xml") {
            Ok(file) => read_styles_xml(file),
            Err(_) => Ok(vec![Style::default()]),
        }
    }

    /// Read workbook.xml to get sheet names and rIds, in tab order
    fn read_workbook_xml<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<(String, String)>> {
        let file = archive
            .by_name("xl/workbook.xml")
            .map_err(|_| XlsxError::MissingPart("xl/workbook.xml".into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut sheets = Vec::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.name().as_ref() == b"sheet" => {
                    if let (Some(name), Some(r_id)) =
                        (attr_string(&e, b"name"), attr_string(&e, b"r:id"))
                    {
                        sheets.push((name, r_id));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(sheets)
    }

    /// Read workbook.xml.rels to get worksheet part paths
    fn read_workbook_rels<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<HashMap<String, String>> {
        let path = "xl/_rels/workbook.xml.rels";
        if archive.by_name(path).is_err() {
            return Err(XlsxError::MissingPart(path.into()));
        }

        let rels = Self::read_relationships(archive, path)?;
        Ok(rels
            .into_iter()
            .filter(|rel| rel.rel_type.ends_with("/worksheet"))
            .map(|rel| {
                let full_path = match rel.target.strip_prefix('/') {
                    Some(absolute) => absolute.to_string(),
                    None => format!("xl/{}", rel.target),
                };
                (rel.id, full_path)
            })
            .collect())
    }

    /// Read a part's relationships, keeping hyperlink targets by id
    fn read_part_rels<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        path: &str,
    ) -> XlsxResult<HashMap<String, String>> {
        Ok(Self::read_relationships(archive, path)?
            .into_iter()
            .filter(|rel| rel.rel_type.ends_with("/hyperlink"))
            .map(|rel| (rel.id, rel.target))
            .collect())
    }

    fn read_relationships<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        path: &str,
    ) -> XlsxResult<Vec<Relationship>> {
        let file = match archive.by_name(path) {
            Ok(f) => f,
            Err(_) => return Ok(Vec::new()),
        };

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut rels = Vec::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e))
                    if e.name().as_ref() == b"Relationship" =>
                {
                    if let (Some(id), Some(target), Some(rel_type)) = (
                        attr_string(&e, b"Id"),
                        attr_string(&e, b"Target"),
                        attr_string(&e, b"Type"),
                    ) {
                        rels.push(Relationship {
                            id,
                            target,
                            rel_type,
                        });
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    /// Read a worksheet part: cells, list validations (including the x14
    /// extension form) and hyperlinks
    fn read_worksheet<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        path: &str,
        worksheet: &mut Worksheet,
        shared_strings: &[String],
        styles: &[Style],
        links: &HashMap<String, String>,
    ) -> XlsxResult<()> {
        let file = archive
            .by_name(path)
            .map_err(|_| XlsxError::MissingPart(path.to_string()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(false);

        let mut buf = Vec::new();

        let mut cell: Option<RawCell> = None;
        let mut in_value = false;
        let mut in_formula = false;
        let mut in_inline_text = false;
        let mut shared_formulas: HashMap<u32, SharedFormula> = HashMap::new();

        let mut validation: Option<DataValidation> = None;
        let mut in_dv_formula1 = false;
        let mut in_dv_sqref = false;
        let mut dv_formula1 = String::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.local_name().as_ref() {
                    b"c" => cell = Some(RawCell::from_attrs(&e)),
                    b"v" if cell.is_some() => in_value = true,
                    b"f" => {
                        if let Some(raw) = cell.as_mut() {
                            raw.read_formula_attrs(&e);
                            in_formula = true;
                        }
                    }
                    b"t" if cell.is_some() => in_inline_text = true,
                    b"dataValidation" => {
                        dv_formula1.clear();
                        validation = Some(Self::parse_data_validation_attrs(&e));
                    }
                    b"formula1" if validation.is_some() => in_dv_formula1 = true,
                    b"sqref" if validation.is_some() => in_dv_sqref = true,
                    b"hyperlink" => Self::apply_hyperlink(worksheet, &e, links),
                    _ => {}
                },
                Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                    b"c" => {
                        let raw = RawCell::from_attrs(&e);
                        Self::process_cell(
                            worksheet,
                            &raw,
                            shared_strings,
                            styles,
                            &mut shared_formulas,
                        )?;
                    }
                    b"f" => {
                        if let Some(raw) = cell.as_mut() {
                            raw.read_formula_attrs(&e);
                        }
                    }
                    b"hyperlink" => Self::apply_hyperlink(worksheet, &e, links),
                    _ => {}
                },
                Ok(Event::End(e)) => match e.local_name().as_ref() {
                    b"c" => {
                        if let Some(raw) = cell.take() {
                            Self::process_cell(
                                worksheet,
                                &raw,
                                shared_strings,
                                styles,
                                &mut shared_formulas,
                            )?;
                        }
                    }
                    b"v" => in_value = false,
                    b"f" => in_formula = false,
                    b"t" => in_inline_text = false,
                    b"formula1" => in_dv_formula1 = false,
                    b"sqref" => in_dv_sqref = false,
                    b"dataValidation" => {
                        if let Some(mut dv) = validation.take() {
                            if let ValidationType::List { source } = &mut dv.validation_type {
                                *source = dv_formula1.trim().to_string();
                            }
                            if dv.ranges.is_empty() {
                                log::warn!("{}: data validation without sqref ignored", path);
                            } else {
                                worksheet.add_data_validation(dv);
                            }
                        }
                    }
                    _ => {}
                },
                Ok(Event::Text(e)) => match e.unescape() {
                    Ok(text) => {
                        if let Some(raw) = cell.as_mut() {
                            if in_value {
                                raw.value.get_or_insert_with(String::new).push_str(&text);
                            } else if in_formula {
                                raw.formula.get_or_insert_with(String::new).push_str(&text);
                            } else if in_inline_text {
                                raw.value.get_or_insert_with(String::new).push_str(&text);
                                raw.cell_type = Some("inlineStr".to_string());
                            }
                        } else if in_dv_formula1 {
                            dv_formula1.push_str(&text);
                        } else if in_dv_sqref {
                            if let Some(dv) = validation.as_mut() {
                                dv.ranges.extend(Self::parse_sqref(&text));
                            }
                        }
                    }
                    Err(err) => log::warn!("{}: undecodable text skipped: {}", path, err),
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(())
    }

    /// Store a cell's value (or formula with cached result) and style.
    ///
    /// Members of a shared formula group get the master's formula, moved to
    /// their own position.
    fn process_cell(
        worksheet: &mut Worksheet,
        raw: &RawCell,
        shared_strings: &[String],
        styles: &[Style],
        shared_formulas: &mut HashMap<u32, SharedFormula>,
    ) -> XlsxResult<()> {
        let Some(cell_ref) = raw.reference.as_deref() else {
            log::warn!("cell without a reference skipped");
            return Ok(());
        };
        let addr = CellAddress::parse(cell_ref).map_err(|e| {
            XlsxError::Parse(format!("Invalid cell reference '{}': {}", cell_ref, e))
        })?;

        let value = match raw.value.as_deref() {
            Some(v) => Self::typed_value(v, raw.cell_type.as_deref(), shared_strings)?,
            None => CellValue::Empty,
        };

        let written = raw.formula.as_deref().filter(|f| !f.trim().is_empty());
        let formula = match (raw.shared_index, written) {
            (Some(si), Some(f)) => {
                shared_formulas.insert(si, SharedFormula::new(addr, f));
                Some(f.to_string())
            }
            (Some(si), None) => Some(match shared_formulas.get(&si) {
                Some(master) => master.text_at(addr),
                None => {
                    log::warn!("{}: shared formula group {} has no master", cell_ref, si);
                    "#REF!".to_string()
                }
            }),
            (None, f) => f.map(str::to_string),
        };

        match formula.as_deref() {
            Some(f) => {
                let text = if f.starts_with('=') {
                    f.to_string()
                } else {
                    format!("={}", f)
                };
                let cached_value = (!value.is_empty()).then(|| Box::new(value));
                worksheet.set_cell_value_at(
                    addr.row,
                    addr.col,
                    CellValue::Formula { text, cached_value },
                )?;
            }
            None => {
                if !value.is_empty() {
                    worksheet.set_cell_value_at(addr.row, addr.col, value)?;
                }
            }
        }

        if let Some(s) = raw.style.filter(|&s| s != 0) {
            match styles.get(s as usize) {
                Some(style) => worksheet.set_cell_style_at(addr.row, addr.col, style)?,
                None => log::warn!("{}: style index {} out of bounds", cell_ref, s),
            }
        }

        Ok(())
    }

    fn typed_value(
        value: &str,
        cell_type: Option<&str>,
        shared_strings: &[String],
    ) -> XlsxResult<CellValue> {
        Ok(match cell_type {
            Some("s") => {
                let idx: usize = value.trim().parse().map_err(|_| {
                    XlsxError::Parse(format!("Invalid shared string index: {}", value))
                })?;
                let s = shared_strings.get(idx).ok_or_else(|| {
                    XlsxError::Parse(format!("Shared string index {} out of bounds", idx))
                })?;
                CellValue::String(s.clone())
            }
            Some("b") => CellValue::Boolean(value.trim() == "1" || value.eq_ignore_ascii_case("true")),
            Some("e") => CellError::parse(value.trim())
                .map(CellValue::Error)
                .unwrap_or_else(|| CellValue::String(value.to_string())),
            Some("inlineStr") | Some("str") => CellValue::String(decode_excel_escapes(value)),
            None | Some("n") => match value.trim().parse::<f64>() {
                Ok(n) => CellValue::Number(n),
                Err(_) => CellValue::String(value.to_string()),
            },
            Some(_) => CellValue::String(value.to_string()),
        })
    }

    /// Parse `<dataValidation>` attributes; the source is filled in from `<formula1>`
    fn parse_data_validation_attrs(e: &BytesStart<'_>) -> DataValidation {
        let mut validation = DataValidation::default();

        for attr in e.attributes().flatten() {
            let Ok(value) = attr.unescape_value() else {
                continue;
            };
            match attr.key.as_ref() {
                b"type" => {
                    validation.validation_type = match value.as_ref() {
                        "list" => ValidationType::List {
                            source: String::new(),
                        },
                        "none" => ValidationType::None,
                        other => ValidationType::Other(other.to_string()),
                    };
                }
                b"allowBlank" => validation.allow_blank = value.as_ref() == "1",
                b"sqref" => validation.ranges = Self::parse_sqref(&value),
                _ => {}
            }
        }

        validation
    }

    /// Attach a `<hyperlink>` to every cell of its `ref`
    fn apply_hyperlink(worksheet: &mut Worksheet, e: &BytesStart<'_>, links: &HashMap<String, String>) {
        let Some(range) = attr_string(e, b"ref").and_then(|r| CellRange::parse(&r).ok()) else {
            log::warn!("hyperlink without a valid ref ignored");
            return;
        };

        let link = Hyperlink {
            location: attr_string(e, b"location"),
            target: attr_string(e, b"r:id").and_then(|id| links.get(&id).cloned()),
            display: attr_string(e, b"display"),
        };
        if link.location.is_none() && link.target.is_none() {
            log::warn!("hyperlink at {} has no location or target", range);
            return;
        }

        let cells = (range.end.row - range.start.row + 1) as u64
            * (range.end.col - range.start.col + 1) as u64;
        if cells > MAX_HYPERLINK_CELLS {
            worksheet.set_hyperlink_at(range.start.row, range.start.col, link);
            return;
        }
        for addr in range.cells() {
            worksheet.set_hyperlink_at(addr.row, addr.col, link.clone());
        }
    }

    /// Parse a space-separated sqref string into cell ranges
    fn parse_sqref(sqref: &str) -> Vec<CellRange> {
        sqref
            .split_whitespace()
            .filter_map(|s| CellRange::parse(s).ok())
            .collect()
    }
}

#[derive(Debug)]
struct Relationship {
    id: String,
    target: String,
    rel_type: String,
}
