//! Cell value converters
//!
//! Pure functions from raw cell content to typed values. None of them fail:
//! input they do not understand yields a neutral default.

use chrono::{Duration, NaiveDate};
use sheetschema_core::FontStyle;

use crate::dictionary::Dictionary;
use crate::model::{FontDescriptor, SchemaEntity};

/// Which side of the number a unit is written on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitPosition {
    Prefix,
    Postfix,
}

pub fn to_bool(text: &str, dictionary: &Dictionary) -> bool {
    dictionary.is_truthy(text)
}

/// Split on `delimiter`, trimming entries and dropping empty ones
pub fn to_list(text: &str, delimiter: char) -> Vec<String> {
    text.split(delimiter)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// One value, or a list of them when `is_array` is set
pub fn to_values(text: &str, delimiter: char, is_array: bool) -> Vec<String> {
    if is_array {
        return to_list(text, delimiter);
    }
    let text = text.trim();
    if text.is_empty() {
        Vec::new()
    } else {
        vec![text.to_string()]
    }
}

pub fn to_entity(text: &str, dictionary: &Dictionary) -> Option<SchemaEntity> {
    dictionary.entity(text)
}

/// Literal text printed before or after the digits of a number format.
///
/// Quoted text (`"kg"`), escaped characters (`\ `), currency tokens
/// (`[$€-409]`) and bare currency symbols count as literals. Only the first
/// (positive) section of the format is considered.
pub fn unit_from_format(format: &str, position: UnitPosition) -> Option<String> {
    let mut before = String::new();
    let mut after = String::new();
    let mut seen_placeholder = false;

    let mut chars = format.chars().peekable();
    while let Some(c) = chars.next() {
        let literal: Option<String> = match c {
            ';' => break,
            '"' => {
                let mut text = String::new();
                for q in chars.by_ref() {
                    if q == '"' {
                        break;
                    }
                    text.push(q);
                }
                Some(text)
            }
            '\\' => chars.next().map(String::from),
            '[' => {
                let mut token = String::new();
                for b in chars.by_ref() {
                    if b == ']' {
                        break;
                    }
                    token.push(b);
                }
                token
                    .strip_prefix('$')
                    .map(|currency| currency.split('-').next().unwrap_or("").to_string())
            }
            '_' | '*' => {
                chars.next();
                None
            }
            '0' | '#' | '?' | '@' => {
                seen_placeholder = true;
                after.clear();
                None
            }
            '$' | '€' | '£' | '¥' => Some(c.to_string()),
            _ => None,
        };

        if let Some(text) = literal {
            if seen_placeholder {
                after.push_str(&text);
            } else {
                before.push_str(&text);
            }
        }
    }

    let unit = match position {
        UnitPosition::Prefix => before,
        UnitPosition::Postfix if seen_placeholder => after,
        UnitPosition::Postfix => String::new(),
    };
    let unit = unit.trim();
    if unit.is_empty() {
        None
    } else {
        Some(unit.to_string())
    }
}

/// Font descriptor from cell styling
pub fn font_from_style(font: &FontStyle) -> FontDescriptor {
    FontDescriptor {
        size: Some(format!("{}px", format_size(font.size))),
        color: font.color.to_css(),
        bold: font.bold,
    }
}

/// Font descriptor from its text encoding, `size: 18px; color: #FF0000; bold: true`.
///
/// Unknown keys are ignored; a bare number size is taken as pixels.
pub fn font_from_text(text: &str, dictionary: &Dictionary) -> FontDescriptor {
    let mut font = FontDescriptor::default();

    for part in text.split(|c| c == ';' || c == '\n') {
        let Some((key, value)) = part.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match key.trim().to_ascii_lowercase().as_str() {
            "size" | "font-size" => {
                font.size = Some(match value.parse::<f64>() {
                    Ok(px) => format!("{}px", format_size(px)),
                    Err(_) => value.to_string(),
                });
            }
            "color" => font.color = Some(value.to_string()),
            "bold" => font.bold = to_bool(value, dictionary),
            _ => {}
        }
    }

    font
}

/// Render a spreadsheet serial date as ISO text for a JSON schema string
/// format (`date`, `time` or `date-time`)
pub fn serial_to_iso(serial: f64, format: &str) -> Option<String> {
    // 9999-12-31 is the last serial a spreadsheet can hold
    if !serial.is_finite() || !(0.0..2_958_466.0).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    let at = epoch.checked_add_signed(Duration::try_milliseconds(millis)?)?;

    let pattern = match format {
        "date" => "%Y-%m-%d",
        "time" => "%H:%M:%S",
        "date-time" => "%Y-%m-%dT%H:%M:%S",
        _ => return None,
    };
    Some(at.format(pattern).to_string())
}

fn format_size(size: f64) -> String {
    if size.fract() == 0.0 {
        format!("{}", size as i64)
    } else {
        format!("{}", size)
    }
}
