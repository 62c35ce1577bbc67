//! Parser for `--set` style overrides
//!
//! Accepts `key=value` pairs separated by commas. Dotted keys build nested
//! mappings, `name[i]` addresses a sequence element, `{a,b}` builds a
//! sequence and a backslash escapes the next character. Values are typed the same way Helm types them: `true`, `false`,
//! `null` and integers without a leading zero become scalars of that type,
//! everything else stays a string.

use serde_json::{Map, Number, Value};

use helm_crds::Values;

use crate::errors::CaptainError;

/// Parse one `--set` argument into `dest`, overwriting existing keys
pub fn parse_into(input: &str, dest: &mut Values) -> Result<(), CaptainError> {
    for pair in split_unescaped(input, ',', true) {
        if pair.is_empty() {
            continue;
        }

        let (raw_key, raw_value) = split_once_unescaped(&pair, '=').ok_or_else(|| {
            CaptainError::ValuesError(format!("key \"{}\" has no value", unescape(&pair)))
        })?;

        let mut path = Vec::new();
        for segment in split_unescaped(raw_key, '.', false) {
            path.extend(parse_segment(&segment, raw_key)?);
        }

        insert_path(dest, &path, parse_value(raw_value));
    }
    Ok(())
}

/// Parse a list of `--set` arguments into a fresh tree
pub fn parse_all<S: AsRef<str>>(inputs: &[S]) -> Result<Values, CaptainError> {
    let mut out = Values::new();
    for input in inputs {
        parse_into(input.as_ref(), &mut out)?;
    }
    Ok(out)
}

fn parse_value(raw: &str) -> Value {
    if raw.starts_with('{') && raw.ends_with('}') && !raw.ends_with("\\}") && raw.len() >= 2 {
        let inner = &raw[1..raw.len() - 1];
        if inner.is_empty() {
            return Value::Array(Vec::new());
        }
        let items = split_unescaped(inner, ',', false)
            .iter()
            .map(|item| typed_value(&unescape(item)))
            .collect();
        return Value::Array(items);
    }
    typed_value(&unescape(raw))
}

fn typed_value(val: &str) -> Value {
    if val.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if val.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if val.eq_ignore_ascii_case("null") {
        return Value::Null;
    }
    if val == "0" {
        return Value::Number(Number::from(0));
    }
    // leading zeros keep the value a string, e.g. "0755"
    if !val.starts_with('0') {
        if let Ok(n) = val.parse::<i64>() {
            return Value::Number(Number::from(n));
        }
    }
    Value::String(val.to_string())
}

/// Largest list index accepted in a key, the same cap Helm applies
const MAX_INDEX: usize = 65536;

#[derive(Debug, Clone, PartialEq, Eq)]
enum PathSegment {
    Key(String),
    Index(usize),
}

/// Split one dotted segment such as `servers[0][1]` into a key and indexes
fn parse_segment(raw: &str, raw_key: &str) -> Result<Vec<PathSegment>, CaptainError> {
    let invalid = |reason: &str| {
        CaptainError::ValuesError(format!("key \"{}\" {reason}", unescape(raw_key)))
    };

    let (name, mut rest) = match find_unescaped(raw, '[') {
        Some(idx) => (&raw[..idx], &raw[idx..]),
        None => (raw, ""),
    };
    let name = unescape(name);
    if name.is_empty() {
        return Err(invalid("has an empty segment"));
    }

    let mut segments = vec![PathSegment::Key(name)];
    while !rest.is_empty() {
        let close = rest
            .find(']')
            .filter(|_| rest.starts_with('['))
            .ok_or_else(|| invalid("has a malformed list index"))?;
        let index: usize = rest[1..close]
            .parse()
            .map_err(|_| invalid("has a malformed list index"))?;
        if index > MAX_INDEX {
            return Err(invalid(&format!("has an index above {MAX_INDEX}")));
        }
        segments.push(PathSegment::Index(index));
        rest = &rest[close + 1..];
    }
    Ok(segments)
}

fn insert_path(dest: &mut Values, path: &[PathSegment], value: Value) {
    let mut root = Value::Object(std::mem::take(dest));
    let mut current = &mut root;
    for segment in path {
        current = child_slot(current, segment);
    }
    *current = value;

    if let Value::Object(map) = root {
        *dest = map;
    }
}

/// Slot for `segment` under `current`, reshaping `current` when it holds the
/// wrong kind of node. Sequences grow with nulls up to the index.
fn child_slot<'a>(current: &'a mut Value, segment: &PathSegment) -> &'a mut Value {
    match segment {
        PathSegment::Key(key) => {
            if !current.is_object() {
                *current = Value::Object(Map::new());
            }
            match current {
                Value::Object(map) => map.entry(key.clone()).or_insert(Value::Null),
                _ => unreachable!("slot was just replaced by a mapping"),
            }
        }
        PathSegment::Index(index) => {
            if !current.is_array() {
                *current = Value::Array(Vec::new());
            }
            match current {
                Value::Array(list) => {
                    if list.len() <= *index {
                        list.resize(*index + 1, Value::Null);
                    }
                    &mut list[*index]
                }
                _ => unreachable!("slot was just replaced by a sequence"),
            }
        }
    }
}

/// Split on `sep`, skipping escaped separators and, optionally, separators
/// inside braces. Escapes are preserved in the output.
fn split_unescaped(input: &str, sep: char, respect_braces: bool) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                current.push(c);
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            '{' if respect_braces => {
                depth += 1;
                current.push(c);
            }
            '}' if respect_braces => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            c if c == sep && depth == 0 => parts.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    parts.push(current);
    parts
}

fn split_once_unescaped(input: &str, sep: char) -> Option<(&str, &str)> {
    find_unescaped(input, sep).map(|idx| (&input[..idx], &input[idx + sep.len_utf8()..]))
}

fn find_unescaped(input: &str, sep: char) -> Option<usize> {
    let mut escaped = false;
    for (idx, c) in input.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if c == '\\' {
            escaped = true;
        } else if c == sep {
            return Some(idx);
        }
    }
    None
}

fn unescape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}
