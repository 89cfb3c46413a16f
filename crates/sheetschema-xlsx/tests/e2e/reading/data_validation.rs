//! Tests for reading list data validations.

use crate::XlsxFixture;
use pretty_assertions::assert_eq;
use sheetschema_core::{ListSource, ValidationType};
use sheetschema_xlsx::XlsxReader;

#[test]
fn test_inline_list_validation() {
    let bytes = XlsxFixture::new()
        .sheet(
            "Choices",
            r#"<sheetData><row r="1"><c r="A1" t="inlineStr"><is><t>Pick</t></is></c></row></sheetData>
            <dataValidations count="1">
              <dataValidation type="list" allowBlank="1" showInputMessage="1" sqref="B1:B4 D1">
                <formula1>"Red,Green,Blue"</formula1>
              </dataValidation>
            </dataValidations>"#,
        )
        .build();

    let workbook = XlsxReader::read_bytes(&bytes).unwrap();
    let sheet = workbook.worksheet(0).unwrap();

    let validations = sheet.data_validations();
    assert_eq!(validations.len(), 1);
    assert!(validations[0].allow_blank);
    assert_eq!(validations[0].ranges.len(), 2);

    let dv = sheet.data_validation_at(2, 1).unwrap();
    assert_eq!(
        dv.list_source().unwrap(),
        Some(ListSource::Inline(vec![
            "Red".into(),
            "Green".into(),
            "Blue".into()
        ]))
    );
    assert!(sheet.data_validation_at(0, 3).is_some());
    assert!(sheet.data_validation_at(0, 2).is_none());
    assert_eq!(
        workbook.resolve_list(sheet, dv).unwrap(),
        vec!["Red", "Green", "Blue"]
    );
}

#[test]
fn test_range_list_validation() {
    let bytes = XlsxFixture::new()
        .shared_strings(&["<t>Low</t>", "<t>High</t>"])
        .sheet(
            "Form",
            r#"<sheetData/>
            <dataValidations count="1">
              <dataValidation type="list" sqref="C2"><formula1>'Enum Values'!$A$1:$A$4</formula1></dataValidation>
            </dataValidations>"#,
        )
        .sheet(
            "Enum Values",
            r#"<sheetData>
                <row r="1"><c r="A1" t="s"><v>0</v></c></row>
                <row r="3"><c r="A3" t="s"><v>1</v></c></row>
            </sheetData>"#,
        )
        .build();

    let workbook = XlsxReader::read_bytes(&bytes).unwrap();
    let sheet = workbook.worksheet_by_name("Form").unwrap();
    let dv = sheet.data_validation_at(1, 2).unwrap();

    assert_eq!(
        dv.validation_type,
        ValidationType::List {
            source: "'Enum Values'!$A$1:$A$4".into()
        }
    );
    assert_eq!(workbook.resolve_list(sheet, dv).unwrap(), vec!["Low", "High"]);
}

#[test]
fn test_extension_list_validation() {
    let bytes = XlsxFixture::new()
        .sheet(
            "Form",
            r#"<sheetData/>
            <extLst><ext uri="{CCE6A557-97BC-4b89-ADB6-D9C93CAAB3DF}">
              <x14:dataValidations count="1">
                <x14:dataValidation type="list" allowBlank="1">
                  <x14:formula1><xm:f>Lists!$B$1:$B$2</xm:f></x14:formula1>
                  <xm:sqref>E5:E9</xm:sqref>
                </x14:dataValidation>
              </x14:dataValidations>
            </ext></extLst>"#,
        )
        .sheet(
            "Lists",
            r#"<sheetData>
                <row r="1"><c r="B1" t="inlineStr"><is><t>Metric</t></is></c></row>
                <row r="2"><c r="B2" t="inlineStr"><is><t>Imperial</t></is></c></row>
            </sheetData>"#,
        )
        .build();

    let workbook = XlsxReader::read_bytes(&bytes).unwrap();
    let sheet = workbook.worksheet(0).unwrap();

    let dv = sheet.data_validation_at(6, 4).unwrap();
    assert_eq!(
        workbook.resolve_list(sheet, dv).unwrap(),
        vec!["Metric", "Imperial"]
    );
}

#[test]
fn test_non_list_validation_is_kept_by_name() {
    let bytes = XlsxFixture::new()
        .sheet(
            "Numbers",
            r#"<sheetData/>
            <dataValidations count="1">
              <dataValidation type="whole" operator="between" sqref="A1"><formula1>1</formula1><formula2>10</formula2></dataValidation>
            </dataValidations>"#,
        )
        .build();

    let workbook = XlsxReader::read_bytes(&bytes).unwrap();
    let sheet = workbook.worksheet(0).unwrap();
    let dv = sheet.data_validation_at(0, 0).unwrap();

    assert_eq!(dv.validation_type, ValidationType::Other("whole".into()));
    assert_eq!(dv.list_source().unwrap(), None);
}
