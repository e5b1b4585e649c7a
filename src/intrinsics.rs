//! Evaluation of intrinsic functions embedded in parameter strings.
//!
//! Parameter templates may carry small function calls in string position:
//!
//! | Function | Result |
//! |----------|--------|
//! | `States.Format('{} {}', $.a, $.b)` | placeholder substitution, yields a string |
//! | `States.StringToJson($.raw)` | parse a string value as JSON |
//! | `States.JsonToString($.tree)` | serialize a value to JSON text |
//! | `States.Array($.a, 1, 'x')` | evaluate each argument, collect into an array |
//! | `States.MathRandom(1, 10)` | integer drawn uniformly from the inclusive range |
//! | `States.UUID()` | fresh RFC 4122 v4 identifier |
//!
//! A string is scanned for the first recognized function name; when one is
//! found the call is parsed and its result replaces the whole string. A
//! string with no recognized call that starts with `$` is resolved as a path
//! against the current data value. Everything else passes through as a
//! literal.
//!
//! Evaluation is best-effort: any parse or evaluation error inside a call
//! yields the original literal string rather than failing the state.

use rand::RngExt;
use serde_json::Value;

use crate::paths::get_at;

const FUNCTION_NAMES: &[&str] = &[
    "States.Format",
    "States.StringToJson",
    "States.JsonToString",
    "States.Array",
    "States.MathRandom",
    "States.UUID",
];

/// Evaluate one template string against the current data value.
///
/// # Examples
///
/// ```rust
/// use serde_json::json;
/// use stateweave::intrinsics::evaluate;
///
/// let data = json!({"user": "ada", "count": 3});
/// assert_eq!(
///     evaluate("States.Format('{} has {} items', $.user, $.count)", &data),
///     json!("ada has 3 items"),
/// );
/// assert_eq!(evaluate("$.count", &data), json!(3));
/// assert_eq!(evaluate("plain text", &data), json!("plain text"));
/// ```
#[must_use]
pub fn evaluate(text: &str, data: &Value) -> Value {
    if let Some(value) = try_call(text, data) {
        return value;
    }
    let trimmed = text.trim();
    if trimmed.starts_with('$') {
        return get_at(data, trimmed);
    }
    Value::String(text.to_string())
}

/// Locate the earliest recognized function name in `text`.
fn find_function(text: &str) -> Option<(&'static str, usize)> {
    FUNCTION_NAMES
        .iter()
        .filter_map(|name| text.find(name).map(|at| (*name, at)))
        .min_by_key(|(_, at)| *at)
}

/// Parse and evaluate a recognized call, or `None` on any error.
fn try_call(text: &str, data: &Value) -> Option<Value> {
    let (name, at) = find_function(text)?;
    let after = &text[at + name.len()..];
    let open = after.find('(')?;
    if !after[..open].trim().is_empty() {
        return None;
    }
    let args_src = balanced_parens(&after[open..])?;
    let args = split_arguments(args_src);
    apply(name, &args, data)
}

fn apply(name: &str, args: &[&str], data: &Value) -> Option<Value> {
    match name {
        "States.Format" => {
            let (fmt, rest) = args.split_first()?;
            let Value::String(template) = eval_argument(fmt, data)? else {
                return None;
            };
            let mut out = template;
            for arg in rest {
                let rendered = render(eval_argument(arg, data)?);
                let at = out.find("{}")?;
                out.replace_range(at..at + 2, &rendered);
            }
            Some(Value::String(out))
        }
        "States.StringToJson" => {
            let Value::String(raw) = eval_argument(args.first()?, data)? else {
                return None;
            };
            serde_json::from_str(&raw).ok()
        }
        "States.JsonToString" => {
            let value = eval_argument(args.first()?, data)?;
            serde_json::to_string(&value).ok().map(Value::String)
        }
        "States.Array" => args
            .iter()
            .map(|arg| eval_argument(arg, data))
            .collect::<Option<Vec<_>>>()
            .map(Value::Array),
        "States.MathRandom" => {
            if args.len() != 2 {
                return None;
            }
            let lo = as_integer(&eval_argument(args[0], data)?)?;
            let hi = as_integer(&eval_argument(args[1], data)?)?;
            if lo > hi {
                return None;
            }
            Some(Value::from(rand::rng().random_range(lo..=hi)))
        }
        "States.UUID" => {
            if args.is_empty() {
                Some(Value::String(uuid::Uuid::new_v4().to_string()))
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Evaluate a single argument: nested call, path reference, quoted string
/// literal, or JSON literal, in that order.
fn eval_argument(raw: &str, data: &Value) -> Option<Value> {
    let arg = raw.trim();
    if arg.is_empty() {
        return None;
    }
    if find_function(arg).is_some() {
        return try_call(arg, data);
    }
    if arg.starts_with('$') {
        return Some(get_at(data, arg));
    }
    if let Some(inner) = arg.strip_prefix('\'').and_then(|r| r.strip_suffix('\'')) {
        return Some(Value::String(inner.to_string()));
    }
    serde_json::from_str(arg).ok()
}

fn render(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Given a slice starting at `(`, return the argument text between the
/// matching parentheses. Quotes suppress nesting.
fn balanced_parens(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (at, ch) in text.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(ch),
            (None, '(') => depth += 1,
            (None, ')') => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&text[1..at]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split an argument list at top-level commas, honoring quotes and nested
/// brackets of every kind.
fn split_arguments(src: &str) -> Vec<&str> {
    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0usize;
    for (at, ch) in src.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(ch),
            (None, '(' | '[' | '{') => depth += 1,
            (None, ')' | ']' | '}') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                args.push(src[start..at].trim());
                start = at + 1;
            }
            _ => {}
        }
    }
    let tail = src[start..].trim();
    if !tail.is_empty() || !args.is_empty() {
        args.push(tail);
    }
    args
}
