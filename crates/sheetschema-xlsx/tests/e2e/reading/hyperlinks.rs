//! Tests for reading cell hyperlinks.

use crate::XlsxFixture;
use pretty_assertions::assert_eq;
use sheetschema_xlsx::XlsxReader;

#[test]
fn test_internal_location_link() {
    let bytes = XlsxFixture::new()
        .sheet(
            "Policy",
            r#"<sheetData><row r="4"><c r="A4" t="inlineStr"><is><t>Sub-Schema</t></is></c></row></sheetData>
            <hyperlinks><hyperlink ref="F4" location="'Sensor Readings'!A1" display="Sensor Readings"/></hyperlinks>"#,
        )
        .sheet("Sensor Readings", "<sheetData/>")
        .build();

    let workbook = XlsxReader::read_bytes(&bytes).unwrap();
    let sheet = workbook.worksheet(0).unwrap();

    let link = sheet.hyperlink_at(3, 5).unwrap();
    assert_eq!(link.location.as_deref(), Some("'Sensor Readings'!A1"));
    assert_eq!(link.display.as_deref(), Some("Sensor Readings"));
    assert_eq!(link.sheet_name().as_deref(), Some("Sensor Readings"));
    assert!(sheet.hyperlink_at(3, 4).is_none());
}

#[test]
fn test_external_link_through_relationship() {
    let bytes = XlsxFixture::new()
        .sheet_with_links(
            "Policy",
            r#"<sheetData/>
            <hyperlinks>
              <hyperlink ref="B2" r:id="rId1"/>
              <hyperlink ref="B3" r:id="rId2"/>
            </hyperlinks>"#,
            &[("rId1", "https://example.org/docs"), ("rId2", "#Devices!A1")],
        )
        .build();

    let workbook = XlsxReader::read_bytes(&bytes).unwrap();
    let sheet = workbook.worksheet(0).unwrap();

    let docs = sheet.hyperlink_at(1, 1).unwrap();
    assert_eq!(docs.target.as_deref(), Some("https://example.org/docs"));
    assert_eq!(docs.sheet_name(), None);

    let devices = sheet.hyperlink_at(2, 1).unwrap();
    assert_eq!(devices.sheet_name().as_deref(), Some("Devices"));
}

#[test]
fn test_link_over_range() {
    let bytes = XlsxFixture::new()
        .sheet(
            "Policy",
            r#"<sheetData/><hyperlinks><hyperlink ref="C1:D2" location="Other!A1"/></hyperlinks>"#,
        )
        .build();

    let workbook = XlsxReader::read_bytes(&bytes).unwrap();
    let sheet = workbook.worksheet(0).unwrap();

    assert_eq!(sheet.hyperlink_count(), 4);
    assert_eq!(
        sheet.hyperlink_at(1, 3).and_then(|l| l.sheet_name()).as_deref(),
        Some("Other")
    );
}
