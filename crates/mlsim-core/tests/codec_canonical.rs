use std::collections::HashMap;

use mlsim_core::{stable_hash_string, to_canonical_json_bytes, DrawMatrix};

#[test]
fn canonical_json_orders_keys() {
    let mut map = HashMap::new();
    map.insert("zeta", 1);
    map.insert("alpha", 2);
    let bytes = to_canonical_json_bytes(&map).unwrap();
    assert_eq!(String::from_utf8(bytes).unwrap(), r#"{"alpha":2,"zeta":1}"#);
}

#[test]
fn stable_hash_ignores_insertion_order() {
    let mut a = HashMap::new();
    a.insert("x", 1.5);
    a.insert("y", 2.5);
    let mut b = HashMap::new();
    b.insert("y", 2.5);
    b.insert("x", 1.5);
    assert_eq!(stable_hash_string(&a).unwrap(), stable_hash_string(&b).unwrap());
    assert_eq!(stable_hash_string(&a).unwrap().len(), 64);
}

#[test]
fn draw_matrix_transposes_columns() {
    let matrix = DrawMatrix::from_columns(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
    assert_eq!(matrix.draws(), 3);
    assert_eq!(matrix.columns(), 2);
    assert_eq!(matrix.get(1, 1), 5.0);
    assert_eq!(matrix.transpose(), vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
}

#[test]
fn draw_matrix_rejects_ragged_columns() {
    let err = DrawMatrix::from_columns(&[vec![1.0, 2.0], vec![3.0]]).unwrap_err();
    assert_eq!(err.code(), "draw-matrix-ragged");
    let err = DrawMatrix::from_row_major(2, 2, vec![0.0; 3]).unwrap_err();
    assert_eq!(err.code(), "draw-matrix-shape");
}
