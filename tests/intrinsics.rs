use serde_json::json;
use stateweave::intrinsics::evaluate;

#[test]
fn format_substitutes_placeholders_positionally() {
    let data = json!({"user": "ada", "n": 3});
    assert_eq!(
        evaluate("States.Format('{} ordered {} items', $.user, $.n)", &data),
        json!("ada ordered 3 items"),
    );
}

#[test]
fn format_renders_non_strings_as_json() {
    let data = json!({"flag": true, "tree": {"k": 1}});
    assert_eq!(
        evaluate("States.Format('{} / {}', $.flag, $.tree)", &data),
        json!("true / {\"k\":1}"),
    );
}

#[test]
fn format_accepts_json_literal_arguments() {
    let data = json!({});
    assert_eq!(
        evaluate("States.Format('{} and {}', 1, \"two\")", &data),
        json!("1 and two"),
    );
}

#[test]
fn string_to_json_parses_resolved_string() {
    let data = json!({"raw": "{\"a\": [1, 2]}"});
    assert_eq!(
        evaluate("States.StringToJson($.raw)", &data),
        json!({"a": [1, 2]}),
    );
}

#[test]
fn json_to_string_serializes_resolved_value() {
    let data = json!({"tree": {"a": 1}});
    assert_eq!(
        evaluate("States.JsonToString($.tree)", &data),
        json!("{\"a\":1}"),
    );
}

#[test]
fn array_collects_evaluated_arguments() {
    let data = json!({"x": 10});
    assert_eq!(
        evaluate("States.Array($.x, 'lit', 5)", &data),
        json!([10, "lit", 5]),
    );
}

#[test]
fn math_random_stays_in_inclusive_range() {
    let data = json!({});
    for _ in 0..50 {
        let value = evaluate("States.MathRandom(3, 7)", &data);
        let n = value.as_i64().expect("integer result");
        assert!((3..=7).contains(&n), "out of range: {n}");
    }
}

#[test]
fn math_random_handles_degenerate_range() {
    let data = json!({});
    assert_eq!(evaluate("States.MathRandom(4, 4)", &data), json!(4));
}

#[test]
fn uuid_produces_v4_identifiers() {
    let data = json!({});
    let value = evaluate("States.UUID()", &data);
    let text = value.as_str().expect("string result");
    assert_eq!(text.len(), 36);
    assert_eq!(text.as_bytes()[14], b'4');
    assert_ne!(evaluate("States.UUID()", &data), value);
}

#[test]
fn nested_calls_evaluate_inside_out() {
    let data = json!({});
    let value = evaluate("States.Array(States.UUID())", &data);
    let items = value.as_array().expect("array result");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].as_str().map(str::len), Some(36));
}

#[test]
fn path_reference_without_function_resolves() {
    let data = json!({"a": {"b": [1, 2]}});
    assert_eq!(evaluate("$.a.b.1", &data), json!(2));
    assert_eq!(evaluate("$", &data), data);
}

#[test]
fn plain_strings_pass_through() {
    let data = json!({});
    assert_eq!(evaluate("no function here", &data), json!("no function here"));
}

#[test]
fn malformed_calls_fall_back_to_the_literal() {
    let data = json!({});
    // unbalanced parens
    assert_eq!(
        evaluate("States.Format('{}', $.a", &data),
        json!("States.Format('{}', $.a"),
    );
    // StringToJson over a non-string
    let data = json!({"n": 5});
    assert_eq!(
        evaluate("States.StringToJson($.n)", &data),
        json!("States.StringToJson($.n)"),
    );
    // arity error
    assert_eq!(
        evaluate("States.MathRandom(1)", &data),
        json!("States.MathRandom(1)"),
    );
    // inverted range
    assert_eq!(
        evaluate("States.MathRandom(9, 1)", &data),
        json!("States.MathRandom(9, 1)"),
    );
}

#[test]
fn quoted_arguments_keep_commas_and_parens() {
    let data = json!({});
    assert_eq!(
        evaluate("States.Array('a, b', '(c)')", &data),
        json!(["a, b", "(c)"]),
    );
}
