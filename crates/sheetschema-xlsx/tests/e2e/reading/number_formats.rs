//! Tests for reading number formats.

use crate::XlsxFixture;
use pretty_assertions::assert_eq;
use sheetschema_core::NumberFormat;
use sheetschema_xlsx::XlsxReader;

const STYLES: &str = r#"
<numFmts count="3">
  <numFmt numFmtId="164" formatCode="&quot;$&quot;#,##0.00"/>
  <numFmt numFmtId="165" formatCode="0.0\ &quot;kg&quot;"/>
  <numFmt numFmtId="166" formatCode="yyyy\-mm\-dd"/>
</numFmts>
<fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts>
<cellXfs count="5">
  <xf numFmtId="0" fontId="0"/>
  <xf numFmtId="164" fontId="0" applyNumberFormat="1"/>
  <xf numFmtId="165" fontId="0" applyNumberFormat="1"/>
  <xf numFmtId="166" fontId="0" applyNumberFormat="1"/>
  <xf numFmtId="14" fontId="0" applyNumberFormat="1"/>
</cellXfs>"#;

#[test]
fn test_custom_and_builtin_formats() {
    let bytes = XlsxFixture::new()
        .styles(STYLES)
        .sheet(
            "Units",
            r#"<sheetData><row r="1">
                <c r="A1"><v>1</v></c>
                <c r="B1" s="1"><v>1</v></c>
                <c r="C1" s="2"><v>1</v></c>
                <c r="D1" s="3"><v>45000</v></c>
                <c r="E1" s="4"><v>45000</v></c>
                <c r="F1" s="2"/>
            </row></sheetData>"#,
        )
        .build();

    let workbook = XlsxReader::read_bytes(&bytes).unwrap();
    let sheet = workbook.worksheet(0).unwrap();

    assert_eq!(sheet.cell_style_at(0, 0).number_format, NumberFormat::General);
    assert_eq!(
        sheet.cell_style_at(0, 1).number_format.format_string(),
        "\"$\"#,##0.00"
    );
    assert_eq!(
        sheet.cell_style_at(0, 2).number_format.format_string(),
        "0.0\\ \"kg\""
    );
    assert!(sheet.cell_style_at(0, 3).number_format.is_date_format());
    assert_eq!(sheet.cell_style_at(0, 4).number_format, NumberFormat::BuiltIn(14));
    assert!(sheet.cell_style_at(0, 4).number_format.is_date_format());

    // styled but valueless cells keep their format
    assert!(sheet.get_value_at(0, 5).is_empty());
    assert_eq!(
        sheet.cell_style_at(0, 5).number_format.format_string(),
        "0.0\\ \"kg\""
    );
}
