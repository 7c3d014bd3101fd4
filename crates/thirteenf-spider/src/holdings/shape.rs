use serde_json::Value;

/// Fewest CUSIP-bearing rows a keyed table needs, however short it is.
pub const MIN_KEYED_ROWS: usize = 5;

/// The part of a response worth searching: the `data` member of the envelope when there is
/// one, otherwise the whole payload.
pub fn table_root(payload: &Value) -> &Value {
    match payload {
        Value::Object(map) => map.get("data").unwrap_or(payload),
        _ => payload,
    }
}

/// Find the sequence that most likely holds the holdings table.
///
/// Two shapes qualify:
/// - a sequence of mappings, where at least `max(5, ceil(len / 2))` of them carry a `cusip`
///   key (any case);
/// - a sequence of sequences (positional rows), unconditionally.
///
/// The longest qualifying sequence wins, the first one found on ties. The tree is walked with
/// an explicit stack, so deeply nested payloads cannot overflow the call stack. Returns an
/// empty vector when nothing qualifies.
///
/// ```rust
/// use serde_json::json;
/// use thirteenf_spider::holdings::detect_table;
///
/// let payload = json!({ "meta": { "rows": [[1, 2], [3, 4]] }, "title": "Q4 2024" });
/// assert_eq!(detect_table(&payload).len(), 2);
/// ```
pub fn detect_table(root: &Value) -> Vec<Value> {
    let mut best: Option<&Vec<Value>> = None;
    let mut stack: Vec<&Value> = vec![root];

    while let Some(node) = stack.pop() {
        match node {
            Value::Object(map) => stack.extend(map.values()),
            Value::Array(items) if !items.is_empty() => {
                let candidate = if items.iter().all(Value::is_object) {
                    is_keyed_table(items)
                } else {
                    items.iter().all(Value::is_array)
                };

                if candidate && best.map_or(true, |b| items.len() > b.len()) {
                    best = Some(items);
                }

                // true holdings may sit inside an outer wrapper sequence
                stack.extend(
                    items
                        .iter()
                        .filter(|item| item.is_object() || item.is_array()),
                );
            }
            _ => {}
        }
    }

    best.cloned().unwrap_or_default()
}

/// Does this sequence of mappings have enough CUSIP-bearing rows to be a holdings table?
fn is_keyed_table(items: &[Value]) -> bool {
    let holding_like = items.iter().filter(|item| has_cusip(item)).count();
    holding_like >= MIN_KEYED_ROWS.max(items.len().div_ceil(2))
}

fn has_cusip(item: &Value) -> bool {
    item.as_object()
        .is_some_and(|map| map.keys().any(|key| key.eq_ignore_ascii_case("cusip")))
}
