//! Row codec round-trip tests for `easel-core`.
//!
//! Each `#[case]` populates a different subset of fields; decoding the encoded
//! row must reproduce exactly those fields and leave the rest absent.

use easel_core::{columns, ArtworkId, ArtworkRecord, Row, Value};
use rstest::rstest;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn empty() -> ArtworkRecord {
    ArtworkRecord::default()
}

fn token_only() -> ArtworkRecord {
    ArtworkRecord { token: Some("t1".into()), ..Default::default() }
}

fn display_fields() -> ArtworkRecord {
    ArtworkRecord {
        title: Some("The Great Wave off Kanagawa".into()),
        byline: Some("Katsushika Hokusai, 1831".into()),
        attribution: Some("Public domain".into()),
        ..Default::default()
    }
}

fn stored() -> ArtworkRecord {
    ArtworkRecord {
        id: Some(ArtworkId(41)),
        token: Some("wave".into()),
        persistent_uri: Some("https://images.example.com/wave.jpg".into()),
        web_uri: Some("https://example.com/wave".into()),
        metadata: Some(r#"{"source":"featured"}"#.into()),
        data: Some("/data/artwork/41".into()),
        date_added: Some(1_700_000_000),
        date_modified: Some(1_700_000_500),
        ..Default::default()
    }
}

fn unicode() -> ArtworkRecord {
    ArtworkRecord {
        token: Some("トークン-🚀".into()),
        title: Some("Звёздная ночь".into()),
        byline: Some("文森特·梵高 · <>&\"'".into()),
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Round trips
// ---------------------------------------------------------------------------

#[rstest]
#[case::empty(empty())]
#[case::token_only(token_only())]
#[case::display_fields(display_fields())]
#[case::stored(stored())]
#[case::unicode(unicode())]
fn from_row_reproduces_populated_fields(#[case] record: ArtworkRecord) {
    let decoded = ArtworkRecord::from_row(&record.to_row()).expect("decode");
    assert_eq!(decoded, record);
}

#[rstest]
#[case::empty(empty(), 0)]
#[case::token_only(token_only(), 1)]
#[case::display_fields(display_fields(), 3)]
#[case::stored(stored(), 8)]
fn to_row_emits_only_populated_columns(#[case] record: ArtworkRecord, #[case] expected: usize) {
    let row = record.to_row();
    assert_eq!(row.len(), expected);
    assert!(row.iter().all(|(_, v)| !v.is_null()), "sparse rows never carry NULL");
}

#[rstest]
#[case::stored(stored())]
#[case::unicode(unicode())]
fn json_row_roundtrip(#[case] record: ArtworkRecord) {
    let json = record.to_row().to_json();
    let row = Row::from_json(&json).expect("parse json row");
    assert_eq!(ArtworkRecord::from_row(&row).expect("decode"), record);
}

#[test]
fn row_from_store_with_extra_columns_decodes() {
    let mut row = stored().to_row();
    row.insert("_count", Value::Integer(3));
    row.insert(columns::BYLINE, Value::Null);
    assert_eq!(ArtworkRecord::from_row(&row).expect("decode"), stored());
}
