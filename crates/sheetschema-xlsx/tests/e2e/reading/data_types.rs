//! Tests for reading cell values of each type.

use crate::XlsxFixture;
use pretty_assertions::assert_eq;
use sheetschema_core::{CellError, CellValue};
use sheetschema_xlsx::XlsxReader;

#[test]
fn test_shared_and_inline_strings() {
    let bytes = XlsxFixture::new()
        .shared_strings(&[
            "<t>Field Type</t>",
            "<r><t>Ques</t></r><r><rPr><b/></rPr><t>tion</t></r>",
            "<t>Line_x000a_Break</t>",
        ])
        .sheet(
            "Sensor",
            r#"<sheetData><row r="1">
                <c r="A1" t="s"><v>0</v></c>
                <c r="B1" t="s"><v>1</v></c>
                <c r="C1" t="s"><v>2</v></c>
                <c r="D1" t="inlineStr"><is><t>Answer</t></is></c>
            </row></sheetData>"#,
        )
        .build();

    let workbook = XlsxReader::read_bytes(&bytes).unwrap();
    let sheet = workbook.worksheet(0).unwrap();

    assert_eq!(sheet.text_at(0, 0), "Field Type");
    assert_eq!(sheet.text_at(0, 1), "Question");
    assert_eq!(sheet.text_at(0, 2), "Line\nBreak");
    assert_eq!(sheet.text_at(0, 3), "Answer");
}

#[test]
fn test_numbers_booleans_and_errors() {
    let bytes = XlsxFixture::new()
        .sheet(
            "Values",
            r#"<sheetData><row r="2">
                <c r="A2"><v>42</v></c>
                <c r="B2" t="n"><v>2.5</v></c>
                <c r="C2" t="b"><v>1</v></c>
                <c r="D2" t="b"><v>0</v></c>
                <c r="E2" t="e"><v>#N/A</v></c>
            </row></sheetData>"#,
        )
        .build();

    let workbook = XlsxReader::read_bytes(&bytes).unwrap();
    let sheet = workbook.worksheet(0).unwrap();

    assert_eq!(sheet.get_value_at(1, 0), CellValue::Number(42.0));
    assert_eq!(sheet.text_at(1, 0), "42");
    assert_eq!(sheet.get_value_at(1, 1), CellValue::Number(2.5));
    assert_eq!(sheet.get_value_at(1, 2), CellValue::Boolean(true));
    assert_eq!(sheet.text_at(1, 3), "FALSE");
    assert_eq!(sheet.get_value_at(1, 4), CellValue::Error(CellError::Na));
    assert!(sheet.get_value_at(0, 0).is_empty());
}

#[test]
fn test_formula_keeps_cached_value() {
    let bytes = XlsxFixture::new()
        .sheet(
            "Calc",
            r#"<sheetData><row r="1">
                <c r="A1"><v>3</v></c>
                <c r="B1"><f>A1*2</f><v>6</v></c>
                <c r="C1" t="str"><f>IF(A1&gt;1,"big","small")</f><v>big</v></c>
                <c r="D1" t="b"><f>EXACT(A1,"3")</f><v>1</v></c>
                <c r="E1"><f>NOW()</f></c>
            </row></sheetData>"#,
        )
        .build();

    let workbook = XlsxReader::read_bytes(&bytes).unwrap();
    let sheet = workbook.worksheet(0).unwrap();

    assert_eq!(sheet.formula_at(0, 1), Some("=A1*2"));
    assert_eq!(sheet.text_at(0, 1), "6");
    assert_eq!(sheet.formula_at(0, 2), Some("=IF(A1>1,\"big\",\"small\")"));
    assert_eq!(sheet.text_at(0, 2), "big");
    assert_eq!(sheet.formula_at(0, 3), Some("=EXACT(A1,\"3\")"));
    assert_eq!(sheet.text_at(0, 3), "TRUE");
    assert_eq!(sheet.formula_at(0, 4), Some("=NOW()"));
    assert_eq!(sheet.text_at(0, 4), "");
}

#[test]
fn test_sheets_in_tab_order() {
    let bytes = XlsxFixture::new()
        .sheet("Policy", "<sheetData/>")
        .sheet("Sub Schema", "<sheetData/>")
        .sheet("Enums", "<sheetData/>")
        .build();

    let workbook = XlsxReader::read_bytes(&bytes).unwrap();
    let names: Vec<_> = workbook.worksheets().map(|ws| ws.name().to_string()).collect();
    assert_eq!(names, vec!["Policy", "Sub Schema", "Enums"]);
}

#[test]
fn test_read_file() {
    let fixture = XlsxFixture::new().sheet(
        "Disk",
        r#"<sheetData><row r="1"><c r="A1" t="inlineStr"><is><t>on disk</t></is></c></row></sheetData>"#,
    );
    let (_dir, path) = fixture.write_temp();

    let workbook = XlsxReader::read_file(&path).unwrap();
    assert_eq!(workbook.worksheet(0).unwrap().text_at(0, 0), "on disk");
}
