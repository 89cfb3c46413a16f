//! Shared formulas
//!
//! Excel writes a filled-down formula once, on the master cell of a group;
//! the other cells of the group carry only the group index. Their text is
//! the master's with relative references moved by the distance between the
//! two cells.

use lazy_regex::regex;
use regex::Captures;
use sheetschema_core::CellAddress;

/// Master formula of a shared group
#[derive(Debug, Clone)]
pub(crate) struct SharedFormula {
    pub anchor: CellAddress,
    /// Formula text without the leading `=`
    pub text: String,
}

impl SharedFormula {
    pub fn new(anchor: CellAddress, text: &str) -> Self {
        Self {
            anchor,
            text: text.strip_prefix('=').unwrap_or(text).to_string(),
        }
    }

    /// Formula text of the group member at `target`
    pub fn text_at(&self, target: CellAddress) -> String {
        shift_references(
            &self.text,
            target.row as i64 - self.anchor.row as i64,
            target.col as i64 - self.anchor.col as i64,
        )
    }
}

/// Move the relative cell references of a formula.
///
/// String literals are left untouched. A reference moved off the grid
/// becomes `#REF!`.
pub(crate) fn shift_references(formula: &str, rows: i64, cols: i64) -> String {
    if rows == 0 && cols == 0 {
        return formula.to_string();
    }

    // odd parts sit between double quotes; `""` escapes split into an empty part
    formula
        .split('"')
        .enumerate()
        .map(|(i, part)| {
            if i % 2 == 1 {
                part.to_string()
            } else {
                shift_part(part, rows, cols)
            }
        })
        .collect::<Vec<_>>()
        .join("\"")
}

fn shift_part(part: &str, rows: i64, cols: i64) -> String {
    let re = regex!(r"((?:'[^']+'|[A-Za-z_][A-Za-z0-9_.]*)!)?(\$?[A-Za-z]{1,3}\$?[0-9]+)");

    re.replace_all(part, |caps: &Captures| {
        let Some(found) = caps.get(0) else {
            return String::new();
        };
        let whole = found.as_str();

        // function names like LOG10( and longer identifiers are not references
        let before = part[..found.start()].chars().next_back();
        let after = part[found.end()..].chars().next();
        let in_word = |c: Option<char>| {
            c.is_some_and(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
        };
        if in_word(before) || in_word(after) || after == Some('(') {
            return whole.to_string();
        }

        let sheet = caps.get(1).map_or("", |m| m.as_str());
        match CellAddress::parse(&caps[2]) {
            Ok(address) => match address.offset(rows, cols) {
                Some(moved) => format!("{}{}", sheet, moved.to_a1_string()),
                None => "#REF!".to_string(),
            },
            Err(_) => whole.to_string(),
        }
    })
    .into_owned()
}
