//! styles.xml reading: number formats and fonts resolved per cellXfs entry

use std::collections::HashMap;
use std::io::{BufReader, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use sheetschema_core::style::{Color, FontStyle, NumberFormat, Style};

/// Read styles.xml into a list indexed by the cell `s` attribute
pub(crate) fn read_styles_xml<R: Read>(reader: R) -> XlsxResult<Vec<Style>> {
    let mut xml_reader = Reader::from_reader(BufReader::new(reader));
    xml_reader.trim_text(true);

    let mut buf = Vec::new();

    let mut numfmts: HashMap<u32, String> = HashMap::new();
    let mut fonts: Vec<FontStyle> = Vec::new();
    let mut cell_xfs: Vec<Style> = Vec::new();

    let mut in_fonts = false;
    let mut in_cell_xfs = false;
    let mut current_font: Option<FontStyle> = None;
    let mut pending_xf: Option<(u32, u32)> = None;

    loop {
        let event = xml_reader.read_event_into(&mut buf);
        let is_empty = matches!(event, Ok(Event::Empty(_)));
        match event {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                match e.name().as_ref() {
                    b"fonts" if !is_empty => in_fonts = true,
                    b"cellXfs" if !is_empty => in_cell_xfs = true,

                    b"numFmt" => {
                        let id = attr_value(e, b"numFmtId").and_then(|s| s.parse().ok());
                        let code = attr_value(e, b"formatCode");
                        if let (Some(id), Some(code)) = (id, code) {
                            numfmts.insert(id, code);
                        }
                    }

                    b"font" if in_fonts => {
                        if is_empty {
                            fonts.push(FontStyle::default());
                        } else {
                            current_font = Some(FontStyle::default());
                        }
                    }
                    b"b" => {
                        if let Some(font) = current_font.as_mut() {
                            font.bold = flag_on(e);
                        }
                    }
                    b"i" => {
                        if let Some(font) = current_font.as_mut() {
                            font.italic = flag_on(e);
                        }
                    }
                    b"sz" => {
                        if let Some(font) = current_font.as_mut() {
                            if let Some(size) = attr_value(e, b"val").and_then(|s| s.parse().ok()) {
                                font.size = size;
                            }
                        }
                    }
                    b"name" => {
                        if let Some(font) = current_font.as_mut() {
                            if let Some(name) = attr_value(e, b"val") {
                                font.name = name;
                            }
                        }
                    }
                    b"color" => {
                        if let Some(font) = current_font.as_mut() {
                            font.color = parse_color_attrs(e);
                        }
                    }

                    b"xf" if in_cell_xfs => {
                        let ids = (
                            attr_value(e, b"numFmtId")
                                .and_then(|s| s.parse().ok())
                                .unwrap_or(0),
                            attr_value(e, b"fontId")
                                .and_then(|s| s.parse().ok())
                                .unwrap_or(0),
                        );
                        if is_empty {
                            cell_xfs.push(resolve_style(ids.0, ids.1, &numfmts, &fonts));
                        } else {
                            pending_xf = Some(ids);
                        }
                    }
                    _ => {}
                }
            }

            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"fonts" => in_fonts = false,
                b"font" if in_fonts => {
                    if let Some(font) = current_font.take() {
                        fonts.push(font);
                    }
                }
                b"xf" => {
                    if let Some((num_fmt_id, font_id)) = pending_xf.take() {
                        cell_xfs.push(resolve_style(num_fmt_id, font_id, &numfmts, &fonts));
                    }
                }
                b"cellXfs" => in_cell_xfs = false,
                _ => {}
            },

            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }

        drop(event);
        buf.clear();
    }

    if cell_xfs.is_empty() {
        cell_xfs.push(Style::default());
    }

    Ok(cell_xfs)
}

fn resolve_style(
    num_fmt_id: u32,
    font_id: u32,
    numfmts: &HashMap<u32, String>,
    fonts: &[FontStyle],
) -> Style {
    let font = fonts.get(font_id as usize).cloned().unwrap_or_else(|| {
        log::warn!("styles.xml references missing font {}", font_id);
        FontStyle::default()
    });

    let number_format = if num_fmt_id == 0 {
        NumberFormat::General
    } else if let Some(code) = numfmts.get(&num_fmt_id) {
        NumberFormat::Custom(code.clone())
    } else {
        NumberFormat::BuiltIn(num_fmt_id)
    };

    Style {
        font,
        number_format,
    }
}

fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok().map(|v| v.to_string()))
}

/// `<b/>` is on, `<b val="0"/>` is off
fn flag_on(e: &BytesStart<'_>) -> bool {
    !matches!(attr_value(e, b"val").as_deref(), Some("0") | Some("false"))
}

/// Priority: rgb > theme > indexed > auto
fn parse_color_attrs(e: &BytesStart<'_>) -> Color {
    if let Some(color) = attr_value(e, b"rgb").and_then(|rgb| Color::from_hex(&rgb)) {
        return color;
    }

    if let Some(index) = attr_value(e, b"theme").and_then(|s| s.parse::<u8>().ok()) {
        let tint = attr_value(e, b"tint")
            .and_then(|s| s.parse::<f64>().ok())
            .map(|t| (t * 100.0).round() as i8)
            .unwrap_or(0);
        return Color::theme(index, tint);
    }

    attr_value(e, b"indexed")
        .and_then(|s| s.parse::<u8>().ok())
        .map(Color::Indexed)
        .unwrap_or(Color::Auto)
}
