//! Tests for reading font styles.

use crate::XlsxFixture;
use pretty_assertions::assert_eq;
use sheetschema_core::Color;
use sheetschema_xlsx::XlsxReader;

const STYLES: &str = r#"
<fonts count="3">
  <font><sz val="11"/><name val="Calibri"/></font>
  <font><b/><sz val="18"/><color rgb="FF0070C0"/><name val="Arial"/></font>
  <font><i/><sz val="9"/><color theme="1"/><name val="Calibri"/></font>
</fonts>
<cellXfs count="3">
  <xf numFmtId="0" fontId="0"/>
  <xf numFmtId="0" fontId="1" applyFont="1"/>
  <xf numFmtId="0" fontId="2" applyFont="1"/>
</cellXfs>"#;

#[test]
fn test_font_properties() {
    let bytes = XlsxFixture::new()
        .styles(STYLES)
        .sheet(
            "Fonts",
            r#"<sheetData>
                <row r="1"><c r="A1" s="1" t="inlineStr"><is><t>Title</t></is></c></row>
                <row r="2"><c r="A2" s="2" t="inlineStr"><is><t>note</t></is></c></row>
                <row r="3"><c r="A3" t="inlineStr"><is><t>plain</t></is></c></row>
            </sheetData>"#,
        )
        .build();

    let workbook = XlsxReader::read_bytes(&bytes).unwrap();
    let sheet = workbook.worksheet(0).unwrap();

    let title = &sheet.cell_style_at(0, 0).font;
    assert!(title.bold);
    assert!(!title.italic);
    assert_eq!(title.size, 18.0);
    assert_eq!(title.name, "Arial");
    assert_eq!(title.color.to_css().as_deref(), Some("#0070C0"));

    let note = &sheet.cell_style_at(1, 0).font;
    assert!(note.italic);
    assert_eq!(note.size, 9.0);
    assert_eq!(note.color, Color::theme(1, 0));

    let plain = &sheet.cell_style_at(2, 0).font;
    assert!(!plain.bold);
    assert_eq!(plain.size, 11.0);
    assert!(plain.color.is_auto());
}

#[test]
fn test_missing_styles_part() {
    let bytes = XlsxFixture::new()
        .sheet(
            "Bare",
            r#"<sheetData><row r="1"><c r="A1" s="3"><v>1</v></c></row></sheetData>"#,
        )
        .build();

    let workbook = XlsxReader::read_bytes(&bytes).unwrap();
    let sheet = workbook.worksheet(0).unwrap();

    assert_eq!(sheet.text_at(0, 0), "1");
    assert!(!sheet.cell_style_at(0, 0).font.bold);
}
