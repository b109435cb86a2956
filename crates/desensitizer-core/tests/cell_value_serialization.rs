use chrono::NaiveDate;
use desensitizer_core::CellValue;

#[test]
fn serializes_cell_values_with_kind_tags() {
    let values = vec![
        CellValue::Null,
        CellValue::text("Acme Inc"),
        CellValue::Float(12.5),
        CellValue::Date(NaiveDate::from_ymd_opt(1999, 12, 31).expect("valid date")),
    ];

    let json = serde_json::to_string(&values).expect("serialize values");
    let expected = r#"[{"kind":"null"},{"kind":"text","value":"Acme Inc"},{"kind":"float","value":12.5},{"kind":"date","value":"1999-12-31"}]"#;
    assert_eq!(json, expected);

    let parsed: Vec<CellValue> = serde_json::from_str(&json).expect("parse values");
    assert_eq!(parsed, values);
}
