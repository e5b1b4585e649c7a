use serde_json::json;
use stateweave::paths::{get_at, set_at};

#[test]
fn get_root_returns_whole_value() {
    let data = json!({"a": 1});
    assert_eq!(get_at(&data, "$"), data);
}

#[test]
fn get_descends_objects_and_arrays() {
    let data = json!({"order": {"items": [{"sku": "x"}, {"sku": "y"}]}});
    assert_eq!(get_at(&data, "$.order.items.1.sku"), json!("y"));
}

#[test]
fn bare_path_is_rooted() {
    let data = json!({"a": {"b": 7}});
    assert_eq!(get_at(&data, "a.b"), json!(7));
    assert_eq!(get_at(&data, "a.b"), get_at(&data, "$.a.b"));
}

#[test]
fn missing_key_yields_null() {
    let data = json!({"a": 1});
    assert_eq!(get_at(&data, "$.b"), json!(null));
    assert_eq!(get_at(&data, "$.a.b.c"), json!(null));
}

#[test]
fn out_of_range_index_yields_null() {
    let data = json!({"items": [1, 2]});
    assert_eq!(get_at(&data, "$.items.5"), json!(null));
    assert_eq!(get_at(&data, "$.items.not_a_number"), json!(null));
}

#[test]
fn descending_through_scalar_yields_null() {
    let data = json!({"n": 42});
    assert_eq!(get_at(&data, "$.n.deeper"), json!(null));
}

#[test]
fn explicit_null_and_missing_are_conflated() {
    let data = json!({"present_null": null});
    assert_eq!(get_at(&data, "$.present_null"), json!(null));
    assert_eq!(get_at(&data, "$.absent"), json!(null));
}

#[test]
fn set_at_root_replaces_wholesale() {
    let data = json!({"a": 1});
    assert_eq!(set_at(&data, "$", json!([1, 2])), json!([1, 2]));
}

#[test]
fn set_creates_intermediate_objects() {
    let data = json!({});
    let updated = set_at(&data, "$.a.b.c", json!("deep"));
    assert_eq!(updated, json!({"a": {"b": {"c": "deep"}}}));
}

#[test]
fn set_does_not_mutate_original() {
    let data = json!({"a": 1});
    let _updated = set_at(&data, "$.b", json!(2));
    assert_eq!(data, json!({"a": 1}));
}

#[test]
fn set_merges_objects_recursively() {
    let data = json!({"cfg": {"keep": 1, "nested": {"x": 10}}});
    let updated = set_at(&data, "$.cfg", json!({"nested": {"y": 20}, "new": 3}));
    assert_eq!(
        updated,
        json!({"cfg": {"keep": 1, "nested": {"x": 10, "y": 20}, "new": 3}})
    );
}

#[test]
fn set_replaces_non_object_combinations() {
    let data = json!({"v": [1, 2, 3]});
    assert_eq!(set_at(&data, "$.v", json!([9])), json!({"v": [9]}));
    assert_eq!(set_at(&data, "$.v", json!("s")), json!({"v": "s"}));

    let scalar = json!({"v": 5});
    assert_eq!(
        set_at(&scalar, "$.v", json!({"o": 1})),
        json!({"v": {"o": 1}})
    );
}

#[test]
fn set_indexes_into_existing_arrays() {
    let data = json!({"items": [{"n": 1}, {"n": 2}]});
    let updated = set_at(&data, "$.items.1.n", json!(20));
    assert_eq!(updated, json!({"items": [{"n": 1}, {"n": 20}]}));
}

#[test]
fn set_displaces_scalar_on_the_way_down() {
    let data = json!({"a": 7});
    let updated = set_at(&data, "$.a.b", json!(1));
    assert_eq!(updated, json!({"a": {"b": 1}}));
}
