//! Cell styling types
//!
//! Only the parts of a cell's format that carry meaning for schema
//! authoring are modelled:
//! - [`FontStyle`] - Font settings (help text rendering)
//! - [`NumberFormat`] - Number format (unit prefixes/postfixes)
//! - [`Color`] - Color representation

mod color;
mod font;
mod number_format;
mod pool;

pub use color::Color;
pub use font::FontStyle;
pub use number_format::NumberFormat;
pub use pool::StylePool;

/// Cell style
///
/// Styles are deduplicated via [`StylePool`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Style {
    /// Font settings
    pub font: FontStyle,
    /// Number format
    pub number_format: NumberFormat,
}

impl Style {
    /// Create a new default style
    pub fn new() -> Self {
        Self::default()
    }

    /// Set font to bold
    pub fn bold(mut self, bold: bool) -> Self {
        self.font.bold = bold;
        self
    }

    /// Set font size in points
    pub fn font_size(mut self, size: f64) -> Self {
        self.font.size = size;
        self
    }

    /// Set font color
    pub fn font_color(mut self, color: Color) -> Self {
        self.font.color = color;
        self
    }

    /// Set number format string
    pub fn number_format<S: Into<String>>(mut self, format: S) -> Self {
        self.number_format = NumberFormat::Custom(format.into());
        self
    }
}
