//! Reading tests - verify that the XLSX reader interprets hand-built packages.

mod data_types;
mod data_validation;
mod font_styles;
mod hyperlinks;
mod number_formats;
mod shared_formulas;
