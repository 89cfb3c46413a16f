//! Cell hyperlinks

/// A hyperlink attached to a cell
///
/// Internal links carry a `location` such as `'Sensor Readings'!A1`
/// (sometimes with a leading `#`); external links carry a `target` URL.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Hyperlink {
    /// In-workbook location
    pub location: Option<String>,
    /// External target (URL or file path)
    pub target: Option<String>,
    /// Display text, if different from the cell value
    pub display: Option<String>,
}

impl Hyperlink {
    /// Create a link to a location inside the workbook
    pub fn internal(location: impl Into<String>) -> Self {
        Self {
            location: Some(location.into()),
            ..Default::default()
        }
    }

    /// Create a link to an external target
    pub fn external(target: impl Into<String>) -> Self {
        Self {
            target: Some(target.into()),
            ..Default::default()
        }
    }

    /// Name of the worksheet this link points at, if it points inside the workbook.
    ///
    /// Accepts `#'Sheet 2'!A1`, `Sheet2!A1` and a bare `#Sheet2`. External
    /// targets of the `#Sheet!A1` form (some writers store them that way) are
    /// understood too.
    pub fn sheet_name(&self) -> Option<String> {
        let raw = match (&self.location, &self.target) {
            (Some(location), _) => location.as_str(),
            (None, Some(target)) if target.starts_with('#') => target.as_str(),
            _ => return None,
        };

        let raw = raw.trim().trim_start_matches('#');
        let sheet = match raw.rfind('!') {
            Some(bang) => &raw[..bang],
            None => raw,
        };
        let sheet = match sheet.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')) {
            Some(quoted) => quoted.replace("''", "'"),
            None => sheet.to_string(),
        };

        if sheet.is_empty() {
            None
        } else {
            Some(sheet)
        }
    }
}
