use datable::action::{self, Action, HistoryMethod};
use datable::cell::{CellChange, CellValue, cell_name, column_label};
use datable::settings::GridSettings;
use serde_json::json;

#[test]
fn test_column_labels() {
    assert_eq!(column_label(0), "A");
    assert_eq!(column_label(25), "Z");
    assert_eq!(column_label(26), "AA");
    assert_eq!(column_label(51), "AZ");
    assert_eq!(column_label(702), "AAA");
    println!("✓ Column labels follow A..Z, AA..");

    assert_eq!(cell_name(0, 0), "A1");
    assert_eq!(cell_name(9, 27), "AB10");
    assert_eq!(CellChange::new(0, 1, 2, 99).to_string(), "B1: '2' -> '99'");
    println!("✓ Cell names are one-based rows");
}

#[test]
fn test_labels_at_index_limit() {
    assert_eq!(column_label(usize::MAX), "GKGWBYLWRXTLPP");
    assert_ne!(column_label(usize::MAX - 1), column_label(usize::MAX));
    println!("✓ Largest column index has a label");

    assert_eq!(cell_name(usize::MAX, 0), "A18446744073709551616");
    let change = CellChange::new(0, usize::MAX, CellValue::Empty, 1);
    assert_eq!(change.to_string(), "GKGWBYLWRXTLPP1: '' -> '1'");
    println!("✓ Largest row and column indices format without overflow");
}

#[test]
fn test_cell_values_from_json() {
    let values: Vec<CellValue> = serde_json::from_value(json!([null, true, 3, 2.5, "x"])).unwrap();
    assert_eq!(
        values,
        vec![
            CellValue::Empty,
            CellValue::Bool(true),
            CellValue::Number(3.0),
            CellValue::Number(2.5),
            CellValue::Text("x".to_string()),
        ]
    );
    assert_eq!(serde_json::to_value(CellValue::Empty).unwrap(), json!(null));
    println!("✓ Cell values travel as bare JSON values");
}

#[test]
fn test_update_sheet_data_from_widget_shape() {
    let action: Action = serde_json::from_value(json!({
        "type": "UPDATE_SHEET_DATA",
        "dataChanges": [[0, 1, 2, 99], [3, 0, null, "new"]]
    }))
    .unwrap();

    assert_eq!(
        action,
        action::update_sheet_data(vec![
            CellChange::new(0, 1, 2, 99),
            CellChange::new(3, 0, CellValue::Empty, "new"),
        ])
    );
    println!("✓ Widget change tuples decode into CellChange");
}

#[test]
fn test_read_only_and_router_actions_from_json() {
    let action: Action =
        serde_json::from_value(json!({"type": "UPDATE_SHEET_READ_ONLY", "readOnly": true})).unwrap();
    assert_eq!(action, action::update_sheet_read_only(true));

    let action: Action = serde_json::from_value(json!({
        "type": "@@router/CALL_HISTORY_METHOD",
        "payload": {"method": "push", "args": "/workbook/q1"}
    }))
    .unwrap();
    assert_eq!(
        action,
        Action::CallHistoryMethod {
            payload: HistoryMethod::Push("/workbook/q1".to_string())
        }
    );

    let action: Action = serde_json::from_value(json!({
        "type": "@@router/CALL_HISTORY_METHOD",
        "payload": {"method": "goBack"}
    }))
    .unwrap();
    assert_eq!(action, action::go_back());
    println!("✓ Read-only and navigation actions decode");
}

#[test]
fn test_unknown_tag_is_accepted() {
    let action: Action =
        serde_json::from_value(json!({"type": "SOMETHING_ELSE", "payload": 1})).unwrap();
    assert_eq!(action, Action::Unknown);
    assert_eq!(action.kind(), datable::action::UNKNOWN);
    println!("✓ Unrecognized tag decodes to Unknown");
}

#[test]
fn test_settings_use_widget_keys() {
    let value = serde_json::to_value(GridSettings::default()).unwrap();
    for key in ["data", "colHeaders", "rowHeaders", "readOnly", "colWidths", "minSpareRows", "minSpareCols"] {
        assert!(value.get(key).is_some(), "missing {}", key);
    }
    assert_eq!(value["colWidths"], json!(100));
    assert!(value["data"].is_array());
    println!("✓ Settings serialize with the widget's keys");
}
