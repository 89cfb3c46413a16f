//! Tests for filled-down (shared) formulas.

use crate::XlsxFixture;
use pretty_assertions::assert_eq;
use sheetschema_core::CellValue;
use sheetschema_xlsx::XlsxReader;

#[test]
fn test_group_members_get_moved_formula() {
    let bytes = XlsxFixture::new()
        .sheet(
            "Survey",
            r#"<sheetData>
              <row r="3"><c r="B3" t="b"><f t="shared" ref="B3:B5" si="0">EXACT($D$2,"Yes")</f><v>0</v></c></row>
              <row r="4"><c r="B4" t="b"><f t="shared" si="0"/><v>0</v></c></row>
              <row r="5"><c r="B5" t="b"><f t="shared" si="0"></f><v>1</v></c></row>
              <row r="6"><c r="C6"><f t="shared" ref="C6:D7" si="1">A6*2</f><v>2</v></c>
                <c r="D6"><f t="shared" si="1"/><v>4</v></c></row>
              <row r="7"><c r="D7"><f t="shared" si="1"/><v>8</v></c></row>
            </sheetData>"#,
        )
        .build();

    let workbook = XlsxReader::read_bytes(&bytes).unwrap();
    let sheet = workbook.worksheet(0).unwrap();

    assert_eq!(sheet.formula_at(2, 1), Some("=EXACT($D$2,\"Yes\")"));
    assert_eq!(sheet.formula_at(3, 1), Some("=EXACT($D$2,\"Yes\")"));
    assert_eq!(sheet.formula_at(4, 1), Some("=EXACT($D$2,\"Yes\")"));
    assert_eq!(sheet.text_at(3, 1), "FALSE");

    assert_eq!(sheet.formula_at(5, 3), Some("=B6*2"));
    assert_eq!(sheet.formula_at(6, 3), Some("=B7*2"));
    assert_eq!(sheet.text_at(6, 3), "8");
}

#[test]
fn test_member_without_master() {
    let bytes = XlsxFixture::new()
        .sheet(
            "Survey",
            r#"<sheetData><row r="4"><c r="B4" t="b"><f t="shared" si="7"/><v>0</v></c></row></sheetData>"#,
        )
        .build();

    let workbook = XlsxReader::read_bytes(&bytes).unwrap();
    let sheet = workbook.worksheet(0).unwrap();

    assert_eq!(sheet.formula_at(3, 1), Some("=#REF!"));
    assert!(matches!(sheet.get_value_at(3, 1), CellValue::Formula { .. }));
}
