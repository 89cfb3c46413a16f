//! Field reader: one schema field per table row

use serde_json::{Number, Value};
use sheetschema_core::{CellAddress, CellValue};

use crate::convert::{
    font_from_style, font_from_text, serial_to_iso, to_bool, to_list, unit_from_format,
};
use crate::dictionary::Header;
use crate::error::{Annotated, CompileError, CompileResult, ErrorTarget, ParseError};
use crate::field_type::{FieldTypeEntry, ParameterRule};
use crate::header::HeaderTable;
use crate::links::LinkCache;
use crate::model::SchemaField;
use crate::options::CompilerOptions;
use crate::source::CellSource;

/// Reads fields from the rows of a worksheet's field table
pub struct FieldReader<'a, S: CellSource> {
    source: &'a S,
    headers: &'a HeaderTable,
    options: &'a CompilerOptions,
}

impl<'a, S: CellSource> FieldReader<'a, S> {
    pub fn new(source: &'a S, headers: &'a HeaderTable, options: &'a CompilerOptions) -> Self {
        Self {
            source,
            headers,
            options,
        }
    }

    /// Read the field on `row`.
    ///
    /// Returns None for rows with neither a question nor a type. Type labels
    /// missing from the registry are recorded in `links` and the field
    /// becomes reference-typed.
    pub fn read(&self, row: u32, links: &mut LinkCache) -> Option<Annotated<SchemaField>> {
        let type_col = self.headers.column(Header::FieldType)?;
        let question_col = self.headers.column(Header::Question)?;
        let answer_col = self.headers.column(Header::Answer)?;

        let label = self.source.text(row, type_col);
        let description = self.source.text(row, question_col);
        if label.is_empty() && description.is_empty() {
            return None;
        }

        let mut field = SchemaField {
            name: CellAddress::new(row, answer_col).to_path(),
            description,
            required: self.flag(row, Header::RequiredField),
            is_array: self.flag(row, Header::AllowMultiple),
            row,
            ..Default::default()
        };
        let mut errors = Vec::new();

        if label.is_empty() {
            errors.push(self.error(row, type_col, &field.name, &CompileError::UnknownFieldType));
            return Some(Annotated::with_errors(field, errors));
        }

        match self.options.registry.get(&label) {
            Some(entry) => {
                apply_entry(&mut field, entry);

                if let Err(err) = self.extract_parameters(row, entry, &mut field) {
                    let col = self.headers.column(Header::Parameter).unwrap_or(answer_col);
                    errors.push(self.error(row, col, &field.name, &err));
                }

                if entry.kind.records_example() && !field.is_ref {
                    field.examples = self.read_examples(row, answer_col, &field);
                }
            }
            None => {
                let link = links.add(label, self.source.hyperlink_sheet(row, type_col));
                field.field_type = Some(link.placeholder());
                field.is_ref = true;
                field.link = Some(link);
            }
        }

        Some(Annotated::with_errors(field, errors))
    }

    fn flag(&self, row: u32, header: Header) -> bool {
        self.headers
            .column(header)
            .map(|col| to_bool(&self.source.text(row, col), &self.options.dictionary))
            .unwrap_or(false)
    }

    fn parameter(&self, row: u32) -> String {
        self.headers
            .column(Header::Parameter)
            .map(|col| self.source.text(row, col))
            .unwrap_or_default()
    }

    /// Type-specific parameters; a non-empty parameter cell always wins
    fn extract_parameters(
        &self,
        row: u32,
        entry: &FieldTypeEntry,
        field: &mut SchemaField,
    ) -> CompileResult<()> {
        let parameter = self.parameter(row);
        let answer_col = self.headers.column(Header::Answer).unwrap_or_default();
        let question_col = self.headers.column(Header::Question).unwrap_or_default();

        match entry.kind.parameter_rule() {
            ParameterRule::Unit(position) => {
                let unit = if parameter.is_empty() {
                    unit_from_format(
                        self.source.number_format(row, answer_col).format_string(),
                        position,
                    )
                } else {
                    Some(parameter)
                };
                if unit.is_some() {
                    field.unit = unit;
                }
            }
            ParameterRule::EnumValues => {
                let values = if parameter.is_empty() {
                    self.source
                        .validation_list(row, answer_col)?
                        .unwrap_or_default()
                } else {
                    to_list(&parameter, self.options.enum_delimiter)
                };
                if values.is_empty() {
                    return Err(CompileError::EmptyEnum);
                }
                field.enum_values = Some(values);
            }
            ParameterRule::Font => {
                field.font = Some(if parameter.is_empty() {
                    font_from_style(self.source.font(row, question_col))
                } else {
                    font_from_text(&parameter, &self.options.dictionary)
                });
            }
            ParameterRule::None => {}
        }
        Ok(())
    }

    fn read_examples(&self, row: u32, col: u16, field: &SchemaField) -> Option<Vec<Value>> {
        let value = self.source.value(row, col);
        let value = value.effective_value();
        let text = value.to_text();
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        if field.is_array {
            let items = to_list(text, self.options.example_delimiter)
                .iter()
                .map(|item| self.text_example(item, field))
                .collect();
            Some(vec![Value::Array(items)])
        } else {
            Some(vec![self.cell_example(value, text, field)])
        }
    }

    fn cell_example(&self, value: &CellValue, text: &str, field: &SchemaField) -> Value {
        match (field.field_type.as_deref(), value) {
            (Some("number"), CellValue::Number(n)) => number(*n),
            (Some("integer"), CellValue::Number(n)) if n.fract() == 0.0 => Value::from(*n as i64),
            (Some("boolean"), CellValue::Boolean(b)) => Value::Bool(*b),
            (Some("string"), CellValue::Number(n)) => field
                .format
                .as_deref()
                .and_then(|format| serial_to_iso(*n, format))
                .map(Value::String)
                .unwrap_or_else(|| Value::String(text.to_string())),
            _ => self.text_example(text, field),
        }
    }

    fn text_example(&self, text: &str, field: &SchemaField) -> Value {
        match field.field_type.as_deref() {
            Some("number") => text
                .parse::<f64>()
                .map(number)
                .unwrap_or_else(|_| Value::String(text.to_string())),
            Some("integer") => text
                .parse::<i64>()
                .map(Value::from)
                .unwrap_or_else(|_| Value::String(text.to_string())),
            Some("boolean") => Value::Bool(to_bool(text, &self.options.dictionary)),
            _ => Value::String(text.to_string()),
        }
    }

    fn error(&self, row: u32, col: u16, field: &str, err: &CompileError) -> ParseError {
        ParseError::from_error(self.source.name(), err)
            .at(row, col)
            .with_target(ErrorTarget::Field(field.to_string()))
    }
}

/// Copy registry metadata onto a field
fn apply_entry(field: &mut SchemaField, entry: &FieldTypeEntry) {
    field.kind = Some(entry.kind);
    field.field_type = Some(entry.type_name.clone());
    field.is_ref = entry.is_ref;
    field.format = entry.format.clone();
    field.pattern = entry.pattern.clone();
    field.unit = entry.unit.clone();
    field.unit_system = entry.unit_system.clone();
    field.custom_type = entry.custom_type.clone();
    field.read_only = entry.kind.is_read_only();
}

fn number(n: f64) -> Value {
    Number::from_f64(n)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field_type::FieldTypeKind;
    use crate::model::FontDescriptor;
    use crate::source::SheetView;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use sheetschema_core::{CellRange, Color, DataValidation, Hyperlink, Style, Workbook};

    const HEADER: [&str; 7] = [
        "Required Field",
        "Field Type",
        "Parameter",
        "Visibility",
        "Question",
        "Allow Multiple Answers",
        "Answer",
    ];

    /// Workbook with the field header on row 1 and `rows` below it
    fn workbook(rows: &[[&str; 7]]) -> Workbook {
        let mut workbook = Workbook::empty();
        workbook.add_worksheet_with_name("Sensor").unwrap();
        let ws = workbook.worksheet_mut(0).unwrap();
        for (c, text) in HEADER.iter().enumerate() {
            ws.set_cell_value_at(0, c as u16, *text).unwrap();
        }
        for (r, cells) in rows.iter().enumerate() {
            for (c, text) in cells.iter().enumerate() {
                if !text.is_empty() {
                    ws.set_cell_value_at(r as u32 + 1, c as u16, *text).unwrap();
                }
            }
        }
        workbook
    }

    fn read_row(workbook: &Workbook, row: u32) -> (Option<Annotated<SchemaField>>, LinkCache) {
        let options = CompilerOptions::default();
        let view = SheetView::new(workbook, workbook.worksheet(0).unwrap());
        let headers = HeaderTable::scan(&view, &options.dictionary);
        let mut links = LinkCache::new();
        let field = FieldReader::new(&view, &headers, &options).read(row, &mut links);
        (field, links)
    }

    #[test]
    fn test_registered_type() {
        let workbook = workbook(&[["Yes", "Date", "", "", "Installed on", "No", "2024-01-05"]]);
        let (field, _) = read_row(&workbook, 1);
        let field = field.unwrap();

        assert!(!field.has_errors());
        let field = field.value;
        assert_eq!(field.name, "G2");
        assert_eq!(field.description, "Installed on");
        assert!(field.required);
        assert!(!field.is_array);
        assert_eq!(field.field_type.as_deref(), Some("string"));
        assert_eq!(field.format.as_deref(), Some("date"));
        assert_eq!(field.kind, Some(FieldTypeKind::Date));
        assert_eq!(field.examples, Some(vec![json!("2024-01-05")]));
    }

    #[test]
    fn test_empty_type_is_an_error() {
        let workbook = workbook(&[["", "", "", "", "Orphan question", "", "x"]]);
        let (field, links) = read_row(&workbook, 1);
        let field = field.unwrap();

        assert_eq!(field.errors.len(), 1);
        assert_eq!(field.errors[0].text, "Unknown field type");
        assert_eq!(field.errors[0].cell.as_deref(), Some("B2"));
        assert_eq!(field.errors[0].target, Some(ErrorTarget::Field("G2".into())));
        assert_eq!(field.value.field_type, None);
        assert!(links.is_empty());
    }

    #[test]
    fn test_blank_row_is_skipped() {
        let workbook = workbook(&[["Yes", "", "", "", "", "", "orphan answer"]]);
        let (field, _) = read_row(&workbook, 1);
        assert!(field.is_none());
    }

    #[test]
    fn test_unregistered_type_becomes_link() {
        let mut workbook = workbook(&[["", "Sensor Readings", "", "", "Readings", "", ""]]);
        workbook
            .worksheet_mut(0)
            .unwrap()
            .set_hyperlink("B2", Hyperlink::internal("#'Readings Sheet'!A1"))
            .unwrap();

        let (field, links) = read_row(&workbook, 1);
        let field = field.unwrap().value;

        assert!(field.is_ref);
        let link = field.link.unwrap();
        assert_eq!(field.field_type, Some(link.placeholder()));
        let entry = links.get(link).unwrap();
        assert_eq!(entry.name, "Sensor Readings");
        assert_eq!(entry.worksheet.as_deref(), Some("Readings Sheet"));
        assert_eq!(field.examples, None);
    }

    #[test]
    fn test_enum_from_parameter() {
        let workbook = workbook(&[["", "Enum", "Low\nMedium\nHigh", "", "Level", "", "Low"]]);
        let (field, _) = read_row(&workbook, 1);
        let field = field.unwrap().value;

        assert_eq!(
            field.enum_values,
            Some(vec!["Low".to_string(), "Medium".to_string(), "High".to_string()])
        );
    }

    #[test]
    fn test_enum_from_validation_and_override() {
        let mut workbook = workbook(&[
            ["", "Enum", "", "", "Level", "", ""],
            ["", "Enum", "A\nB", "", "Grade", "", ""],
        ]);
        workbook.worksheet_mut(0).unwrap().add_data_validation(
            DataValidation::list("\"Red,Green\"").with_range(CellRange::parse("G2:G3").unwrap()),
        );

        let (first, _) = read_row(&workbook, 1);
        assert_eq!(
            first.unwrap().value.enum_values,
            Some(vec!["Red".to_string(), "Green".to_string()])
        );

        let (second, _) = read_row(&workbook, 2);
        assert_eq!(
            second.unwrap().value.enum_values,
            Some(vec!["A".to_string(), "B".to_string()])
        );
    }

    #[test]
    fn test_enum_without_values() {
        let workbook = workbook(&[
            ["", "Enum", "", "", "Level", "", ""],
            ["", "String", "", "", "Name", "", "Bob"],
        ]);
        let (field, _) = read_row(&workbook, 1);
        let field = field.unwrap();

        assert_eq!(field.errors.len(), 1);
        assert_eq!(field.errors[0].text, "Enum values not set");
        assert_eq!(field.errors[0].cell.as_deref(), Some("C2"));
        assert_eq!(field.value.enum_values, None);

        let (sibling, _) = read_row(&workbook, 2);
        assert!(!sibling.unwrap().has_errors());
    }

    #[test]
    fn test_enum_with_unresolvable_list() {
        let mut workbook = workbook(&[["", "Enum", "", "", "Level", "", ""]]);
        workbook.worksheet_mut(0).unwrap().add_data_validation(
            DataValidation::list("Missing!A1:A3").with_range(CellRange::parse("G2").unwrap()),
        );
        let (field, _) = read_row(&workbook, 1);
        assert_eq!(field.unwrap().errors.len(), 1);
    }

    #[test]
    fn test_unit_from_format_or_parameter() {
        let mut workbook = workbook(&[
            ["", "Postfix", "", "", "Weight", "", ""],
            ["", "Prefix", "USD", "", "Price", "", ""],
            ["", "Postfix", "", "", "Count", "", ""],
        ]);
        let ws = workbook.worksheet_mut(0).unwrap();
        ws.set_cell_value_at(1, 6, 12.5).unwrap();
        ws.set_cell_style("G2", &Style::new().number_format("0.0\\ \"kg\"")).unwrap();
        ws.set_cell_style("G3", &Style::new().number_format("\"$\"0.00")).unwrap();

        let (weight, _) = read_row(&workbook, 1);
        let weight = weight.unwrap().value;
        assert_eq!(weight.unit.as_deref(), Some("kg"));
        assert_eq!(weight.unit_system.as_deref(), Some("postfix"));
        assert_eq!(weight.examples, Some(vec![json!(12.5)]));

        let (price, _) = read_row(&workbook, 2);
        assert_eq!(price.unwrap().value.unit.as_deref(), Some("USD"));

        let (count, _) = read_row(&workbook, 3);
        assert_eq!(count.unwrap().value.unit, None);
    }

    #[test]
    fn test_help_text_font() {
        let mut workbook = workbook(&[
            ["", "Help Text", "", "", "Read this first", "", ""],
            ["", "Help Text", "size: 9; bold: yes", "", "Small print", "", ""],
        ]);
        workbook
            .worksheet_mut(0)
            .unwrap()
            .set_cell_style(
                "E2",
                &Style::new().bold(true).font_size(18.0).font_color(Color::rgb(255, 0, 0)),
            )
            .unwrap();

        let (styled, _) = read_row(&workbook, 1);
        let styled = styled.unwrap().value;
        assert!(styled.read_only);
        assert_eq!(styled.field_type.as_deref(), Some("null"));
        assert_eq!(
            styled.font,
            Some(FontDescriptor {
                size: Some("18px".into()),
                color: Some("#FF0000".into()),
                bold: true,
            })
        );

        let (encoded, _) = read_row(&workbook, 2);
        assert_eq!(
            encoded.unwrap().value.font,
            Some(FontDescriptor {
                size: Some("9px".into()),
                color: None,
                bold: true,
            })
        );
    }

    #[test]
    fn test_array_examples() {
        let workbook = workbook(&[
            ["", "Number", "", "", "Readings", "Yes", "1, 2.5, x"],
            ["", "Boolean", "", "", "Flags", "Yes", "yes,no"],
        ]);

        let (numbers, _) = read_row(&workbook, 1);
        let numbers = numbers.unwrap().value;
        assert!(numbers.is_array);
        assert_eq!(numbers.examples, Some(vec![json!([1.0, 2.5, "x"])]));

        let (flags, _) = read_row(&workbook, 2);
        assert_eq!(flags.unwrap().value.examples, Some(vec![json!([true, false])]));
    }

    #[test]
    fn test_typed_single_examples() {
        let mut workbook = workbook(&[
            ["", "Integer", "", "", "Count", "", ""],
            ["", "Boolean", "", "", "Active", "", ""],
            ["", "Date", "", "", "Installed", "", ""],
        ]);
        let ws = workbook.worksheet_mut(0).unwrap();
        ws.set_cell_value_at(1, 6, 7.0).unwrap();
        ws.set_cell_value_at(2, 6, true).unwrap();
        ws.set_cell_value_at(3, 6, 45000.0).unwrap();

        let (count, _) = read_row(&workbook, 1);
        assert_eq!(count.unwrap().value.examples, Some(vec![json!(7)]));

        let (active, _) = read_row(&workbook, 2);
        assert_eq!(active.unwrap().value.examples, Some(vec![json!(true)]));

        let (installed, _) = read_row(&workbook, 3);
        assert_eq!(installed.unwrap().value.examples, Some(vec![json!("2023-03-15")]));
    }

    #[test]
    fn test_auto_calculate_records_no_example() {
        let mut workbook = workbook(&[["", "Auto-Calculate", "", "", "Total", "", ""]]);
        let ws = workbook.worksheet_mut(0).unwrap();
        ws.set_cell_formula_at(1, 6, "=SUM(G3:G9)").unwrap();
        ws.set_formula_result(1, 6, CellValue::Number(12.0)).unwrap();

        let (total, _) = read_row(&workbook, 1);
        let total = total.unwrap();
        assert!(!total.has_errors());
        assert_eq!(total.value.examples, None);
        assert!(total.value.read_only);
    }

    #[test]
    fn test_registry_metadata_copied() {
        let workbook = workbook(&[["", "Account", "", "", "Account", "", "0.0.1"]]);
        let (field, _) = read_row(&workbook, 1);
        let field = field.unwrap().value;

        let entry = CompilerOptions::default().registry.get("Account").cloned().unwrap();
        assert_eq!(field.pattern, entry.pattern);
        assert_eq!(field.custom_type, entry.custom_type);
        assert_eq!(field.format, entry.format);
        assert_eq!(field.unit, entry.unit);
    }
}
