//! Frozen snapshots of a record.
//!
//! A `Snapshot` is the flat, immutable view a factory returns: the
//! active record's own properties at extraction time, with every
//! method value bound to that record. Immutability is by construction;
//! the type exposes no mutators and no interior mutability.

use std::fmt;

use crate::error::{DeclassifyError, Result};
use crate::record::Record;
use crate::value::{Method, Value};

/// A method permanently paired with the record it was extracted from.
///
/// The receiver handle lives inside the `BoundMethod`, so calls keep
/// working against the record's live state even after the snapshot and
/// every other handle to the instance are gone.
#[derive(Clone)]
pub struct BoundMethod {
    receiver: Record,
    method: Method,
}

impl BoundMethod {
    /// Invoke against the captured receiver.
    pub async fn call(&self, args: Vec<Value>) -> Result<Value> {
        self.method
            .invoke(self.receiver.clone(), args)
            .await
            .map_err(DeclassifyError::Method)
    }
}

impl fmt::Debug for BoundMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<bound method>")
    }
}

/// One extracted snapshot entry: plain data or a bound method.
#[derive(Clone, Debug)]
pub enum SnapshotValue {
    Data(Value),
    Method(BoundMethod),
}

/// Immutable, flat, insertion-ordered view of a record's own properties.
pub struct Snapshot {
    entries: Vec<(String, SnapshotValue)>,
}

impl Snapshot {
    /// Extract the active record's own properties.
    ///
    /// Enumeration happens exactly once, here. Method values are bound
    /// to the active record; data values are shallow-copied, so nested
    /// records and lists keep sharing structure with the instance.
    /// A non-record active value yields an empty snapshot.
    pub(crate) fn extract(active: &Value) -> Snapshot {
        let Value::Record(record) = active else {
            return Snapshot {
                entries: Vec::new(),
            };
        };
        let entries = record
            .entries()
            .into_iter()
            .map(|(key, value)| {
                let slot = match value {
                    Value::Method(method) => SnapshotValue::Method(BoundMethod {
                        receiver: record.clone(),
                        method,
                    }),
                    value => SnapshotValue::Data(value),
                };
                (key, slot)
            })
            .collect();
        Snapshot { entries }
    }

    fn slot(&self, key: &str) -> Option<&SnapshotValue> {
        self.entries
            .iter()
            .find(|entry| entry.0 == key)
            .map(|entry| &entry.1)
    }

    /// The data value stored under `key`. Returns `None` for absent
    /// keys and for method entries.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self.slot(key)? {
            SnapshotValue::Data(value) => Some(value),
            SnapshotValue::Method(_) => None,
        }
    }

    /// The bound method stored under `key`, if that entry is a method.
    pub fn method(&self, key: &str) -> Option<BoundMethod> {
        match self.slot(key)? {
            SnapshotValue::Method(bound) => Some(bound.clone()),
            SnapshotValue::Data(_) => None,
        }
    }

    /// Invoke the method entry under `key`.
    pub async fn call(&self, key: &str, args: Vec<Value>) -> Result<Value> {
        match self.slot(key) {
            Some(SnapshotValue::Method(bound)) => bound.call(args).await,
            Some(SnapshotValue::Data(_)) => Err(DeclassifyError::NotCallable {
                key: key.to_string(),
            }),
            None => Err(DeclassifyError::NoSuchProperty {
                key: key.to_string(),
            }),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.slot(key).is_some()
    }

    /// Property names in extraction order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.0.as_str())
    }

    /// Entries in extraction order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &SnapshotValue)> {
        self.entries
            .iter()
            .map(|entry| (entry.0.as_str(), &entry.1))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (key, slot) in &self.entries {
            map.entry(key, slot);
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_record() -> Record {
        let record = Record::new();
        record.set("name", "sample");
        record.set("ready", false);
        record.define_method("mark_ready", |this, _args| async move {
            this.set("ready", true);
            Ok(Value::Null)
        });
        record
    }

    #[test]
    fn extraction_copies_own_properties_in_order() {
        let record = sample_record();
        let snapshot = Snapshot::extract(&Value::Record(record));

        assert_eq!(
            snapshot.keys().collect::<Vec<_>>(),
            vec!["name", "ready", "mark_ready"]
        );
        assert_eq!(snapshot.get("name"), Some(&Value::from("sample")));
        assert_eq!(snapshot.get("ready"), Some(&Value::Bool(false)));
        // Method entries are not data.
        assert_eq!(snapshot.get("mark_ready"), None);
        assert!(snapshot.method("mark_ready").is_some());
        assert!(snapshot.method("name").is_none());
    }

    #[test]
    fn non_record_values_extract_to_an_empty_snapshot() {
        for value in [Value::Number(7.0), Value::from("truthy"), Value::Bool(true)] {
            let snapshot = Snapshot::extract(&value);
            assert!(snapshot.is_empty());
        }
    }

    #[test]
    fn data_entries_are_frozen_at_extraction_time() {
        let record = sample_record();
        let snapshot = Snapshot::extract(&Value::Record(record.clone()));

        record.set("ready", true);
        record.set("late", "addition");

        assert_eq!(snapshot.get("ready"), Some(&Value::Bool(false)));
        assert!(!snapshot.contains_key("late"));
    }

    #[tokio::test]
    async fn bound_methods_outlive_the_snapshot() {
        let record = sample_record();
        let snapshot = Snapshot::extract(&Value::Record(record.clone()));

        let mark_ready = snapshot.method("mark_ready").expect("method entry");
        drop(snapshot);

        mark_ready.call(Vec::new()).await.expect("method call");
        assert_eq!(record.get("ready"), Some(Value::Bool(true)));
    }

    #[tokio::test]
    async fn call_distinguishes_missing_from_non_callable() {
        let snapshot = Snapshot::extract(&Value::Record(sample_record()));

        let missing = snapshot.call("absent", Vec::new()).await.unwrap_err();
        assert!(matches!(missing, DeclassifyError::NoSuchProperty { .. }));

        let not_callable = snapshot.call("name", Vec::new()).await.unwrap_err();
        assert!(matches!(not_callable, DeclassifyError::NotCallable { .. }));
    }
}
