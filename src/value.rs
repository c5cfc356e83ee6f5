//! JSON values with value-level equality.
//!
//! `enum` membership and `uniqueItems` compare values, not bytes: `1` equals
//! `1.0`, object key order is irrelevant. `CanonValue` is that comparison
//! domain, built either from a parsed schema document or incrementally from
//! the event stream.
use crate::event::Event;
use crate::number::Number;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum CanonValue {
    Null,
    Boolean(bool),
    Number(Number),
    String(String),
    Array(Vec<CanonValue>),
    Object(BTreeMap<String, CanonValue>),
}

impl CanonValue {
    /// Convert a DOM value from a schema document.
    pub(crate) fn from_json(value: &Value) -> Option<CanonValue> {
        match value {
            Value::Null => Some(CanonValue::Null),
            Value::Bool(value) => Some(CanonValue::Boolean(*value)),
            Value::Number(number) => Number::from_json(number).ok().map(CanonValue::Number),
            Value::String(value) => Some(CanonValue::String(value.clone())),
            Value::Array(items) => items
                .iter()
                .map(CanonValue::from_json)
                .collect::<Option<Vec<_>>>()
                .map(CanonValue::Array),
            Value::Object(map) => map
                .iter()
                .map(|(key, value)| CanonValue::from_json(value).map(|v| (key.clone(), v)))
                .collect::<Option<BTreeMap<_, _>>>()
                .map(CanonValue::Object),
        }
    }
}

enum Partial {
    Array(Vec<CanonValue>),
    Object(BTreeMap<String, CanonValue>, Option<String>),
}

/// Builds one `CanonValue` from a well-ordered event sequence.
pub(crate) struct ValueBuilder {
    stack: Vec<Partial>,
    result: Option<CanonValue>,
}

impl ValueBuilder {
    pub(crate) fn new() -> ValueBuilder {
        ValueBuilder {
            stack: Vec::new(),
            result: None,
        }
    }

    /// Feed one event. Returns `Some(true)` once the value is complete,
    /// `Some(false)` while more events are needed, `None` if the event
    /// sequence violates JSON ordering.
    pub(crate) fn feed(&mut self, event: &Event<'_>) -> Option<bool> {
        let value = match event {
            Event::Null => CanonValue::Null,
            Event::Boolean(value) => CanonValue::Boolean(*value),
            Event::Number(literal) => CanonValue::Number(Number::parse(literal).ok()?),
            Event::String(value) => CanonValue::String((*value).to_string()),
            Event::ObjectBegin => {
                self.stack.push(Partial::Object(BTreeMap::new(), None));
                return Some(false);
            }
            Event::ArrayBegin => {
                self.stack.push(Partial::Array(Vec::new()));
                return Some(false);
            }
            Event::ObjectKey(key) => {
                return match self.stack.last_mut() {
                    Some(Partial::Object(_, pending)) => {
                        *pending = Some((*key).to_string());
                        Some(false)
                    }
                    _ => None,
                };
            }
            Event::ObjectEnd => match self.stack.pop() {
                Some(Partial::Object(map, None)) => CanonValue::Object(map),
                _ => return None,
            },
            Event::ArrayEnd => match self.stack.pop() {
                Some(Partial::Array(items)) => CanonValue::Array(items),
                _ => return None,
            },
        };
        self.place(value)
    }

    pub(crate) fn take(&mut self) -> Option<CanonValue> {
        self.result.take()
    }

    fn place(&mut self, value: CanonValue) -> Option<bool> {
        match self.stack.last_mut() {
            None => {
                self.result = Some(value);
                Some(true)
            }
            Some(Partial::Array(items)) => {
                items.push(value);
                Some(false)
            }
            Some(Partial::Object(map, pending)) => match pending.take() {
                Some(key) => {
                    map.insert(key, value);
                    Some(false)
                }
                None => None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn build(events: &[Event<'_>]) -> CanonValue {
        let mut builder = ValueBuilder::new();
        for (idx, event) in events.iter().enumerate() {
            let done = builder.feed(event).expect("well-ordered events");
            assert_eq!(done, idx == events.len() - 1);
        }
        builder.take().expect("complete value")
    }

    #[test]
    fn scalar() {
        assert_eq!(build(&[Event::Null]), CanonValue::Null);
        assert_eq!(build(&[Event::Boolean(true)]), CanonValue::Boolean(true));
    }

    #[test]
    fn nested() {
        let value = build(&[
            Event::ObjectBegin,
            Event::ObjectKey("a"),
            Event::ArrayBegin,
            Event::Number("1"),
            Event::Number("2.0"),
            Event::ArrayEnd,
            Event::ObjectEnd,
        ]);
        assert_eq!(value, CanonValue::from_json(&json!({"a": [1.0, 2]})).unwrap());
    }

    #[test]
    fn key_order_is_irrelevant() {
        let a = CanonValue::from_json(&json!({"x": 1, "y": 2})).unwrap();
        let b = CanonValue::from_json(&json!({"y": 2, "x": 1})).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn number_spelling_is_irrelevant() {
        let a = CanonValue::from_json(&json!([1.0])).unwrap();
        let b = build(&[Event::ArrayBegin, Event::Number("1"), Event::ArrayEnd]);
        assert_eq!(a, b);
    }

    #[test]
    fn misordered_events_are_rejected() {
        let mut builder = ValueBuilder::new();
        assert_eq!(builder.feed(&Event::ObjectBegin), Some(false));
        assert_eq!(builder.feed(&Event::Number("1")), None);
    }
}
