//! Mutable instance records.
//!
//! A `Record` is the open, insertion-ordered property bag a constructor
//! produces and an initializer mutates. Handles are cheap to clone and
//! share the underlying state, so a method bound to a record keeps
//! observing its live properties.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{DeclassifyError, Result};
use crate::value::{Method, Value};

/// Shared handle to a mutable, insertion-ordered property record.
#[derive(Clone, Default)]
pub struct Record {
    state: Arc<Mutex<Vec<(String, Value)>>>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, Vec<(String, Value)>> {
        // A poisoned lock only means a panic elsewhere; the data is
        // still a coherent property list.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert or overwrite a property. Overwriting keeps the key's
    /// original insertion position.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        let mut entries = self.state();
        if let Some(entry) = entries.iter_mut().find(|entry| entry.0 == key) {
            entry.1 = value;
        } else {
            entries.push((key, value));
        }
    }

    /// Clone of the value stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.state()
            .iter()
            .find(|entry| entry.0 == key)
            .map(|entry| entry.1.clone())
    }

    /// Remove a property, returning its value if it was present.
    pub fn remove(&self, key: &str) -> Option<Value> {
        let mut entries = self.state();
        let index = entries.iter().position(|entry| entry.0 == key)?;
        Some(entries.remove(index).1)
    }

    /// Declare a method property. Shorthand for
    /// `set(name, Value::Method(Method::new(f)))`.
    pub fn define_method<F, Fut>(&self, name: impl Into<String>, f: F)
    where
        F: Fn(Record, Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        self.set(name, Value::Method(Method::new(f)));
    }

    /// Invoke a method property with this record as the receiver.
    pub async fn call(&self, name: &str, args: Vec<Value>) -> Result<Value> {
        let Some(value) = self.get(name) else {
            return Err(DeclassifyError::NoSuchProperty {
                key: name.to_string(),
            });
        };
        match value {
            Value::Method(method) => method
                .invoke(self.clone(), args)
                .await
                .map_err(DeclassifyError::Method),
            _ => Err(DeclassifyError::NotCallable {
                key: name.to_string(),
            }),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.state().iter().any(|entry| entry.0 == key)
    }

    /// Property names in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.state().iter().map(|entry| entry.0.clone()).collect()
    }

    /// The current property list in insertion order. This is the
    /// enumeration primitive snapshot extraction runs exactly once.
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.state().clone()
    }

    pub fn len(&self) -> usize {
        self.state().len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().is_empty()
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Record) -> bool {
        if Arc::ptr_eq(&self.state, &other.state) {
            return true;
        }
        self.entries() == other.entries()
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries();
        let mut map = f.debug_map();
        for (key, value) in &entries {
            map.entry(key, value);
        }
        map.finish()
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let record = Record::new();
        for (key, value) in iter {
            record.set(key, value);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn preserves_insertion_order() {
        let record = Record::new();
        record.set("b", 1);
        record.set("a", 2);
        record.set("c", 3);

        assert_eq!(record.keys(), vec!["b", "a", "c"]);
    }

    #[test]
    fn overwriting_keeps_original_position() {
        let record = Record::new();
        record.set("first", 1);
        record.set("second", 2);
        record.set("first", 10);

        assert_eq!(record.keys(), vec!["first", "second"]);
        assert_eq!(record.get("first"), Some(Value::Number(10.0)));
    }

    #[test]
    fn clones_share_state() {
        let record = Record::new();
        let alias = record.clone();
        alias.set("shared", true);

        assert_eq!(record.get("shared"), Some(Value::Bool(true)));
    }

    #[test]
    fn remove_returns_the_value() {
        let record = Record::new();
        record.set("gone", "soon");

        assert_eq!(record.remove("gone"), Some(Value::from("soon")));
        assert_eq!(record.remove("gone"), None);
        assert!(record.is_empty());
    }

    #[tokio::test]
    async fn call_invokes_method_with_self_as_receiver() {
        let record = Record::new();
        record.set("count", 0);
        record.define_method("bump", |this, _args| async move {
            let next = this.get("count").and_then(|v| v.as_number()).unwrap_or(0.0) + 1.0;
            this.set("count", next);
            Ok(Value::Number(next))
        });

        assert_eq!(record.call("bump", Vec::new()).await.unwrap(), Value::Number(1.0));
        assert_eq!(record.call("bump", Vec::new()).await.unwrap(), Value::Number(2.0));
        assert_eq!(record.get("count"), Some(Value::Number(2.0)));
    }

    #[tokio::test]
    async fn call_rejects_missing_and_non_callable_properties() {
        let record = Record::new();
        record.set("data", "plain");

        let missing = record.call("absent", Vec::new()).await.unwrap_err();
        assert!(matches!(missing, DeclassifyError::NoSuchProperty { .. }));

        let not_callable = record.call("data", Vec::new()).await.unwrap_err();
        assert!(matches!(not_callable, DeclassifyError::NotCallable { .. }));
    }
}
