//! Dynamic property values.
//!
//! `Value` is the open, dynamically typed model records are built from.
//! Records and methods are reference values: cloning a `Value` holding
//! one shares the underlying state rather than copying it.

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::record::Record;

/// Type-erased async closure invoked with an explicit receiver record.
type MethodFn = dyn Fn(Record, Vec<Value>) -> BoxFuture<'static, anyhow::Result<Value>> + Send + Sync;

/// A dynamically typed property value.
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<Value>),
    /// A nested record, shared by reference.
    Record(Record),
    /// An unbound method; binding happens at snapshot extraction.
    Method(Method),
}

impl Value {
    /// Truthiness used to select the active record after initialization:
    /// `Null`, `false`, zero/NaN, and the empty string are falsy,
    /// everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Text(s) => !s.is_empty(),
            Value::List(_) | Value::Record(_) | Value::Method(_) => true,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_method(&self) -> Option<&Method> {
        match self {
            Value::Method(method) => Some(method),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => a == b,
            // Closures are opaque; only handle identity is meaningful.
            (Value::Method(a), Value::Method(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => fmt::Debug::fmt(b, f),
            Value::Number(n) => fmt::Debug::fmt(n, f),
            Value::Text(s) => fmt::Debug::fmt(s, f),
            Value::List(items) => f.debug_list().entries(items).finish(),
            Value::Record(record) => fmt::Debug::fmt(record, f),
            Value::Method(method) => fmt::Debug::fmt(method, f),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Record(record)
    }
}

impl From<Method> for Value {
    fn from(method: Method) -> Self {
        Value::Method(method)
    }
}

/// Shared handle to an async method closure.
///
/// A `Method` is unbound: it takes its receiver record as an explicit
/// argument. `Snapshot` extraction pairs it with the active record to
/// produce a `BoundMethod`.
#[derive(Clone)]
pub struct Method(Arc<MethodFn>);

impl Method {
    /// Wrap an async closure of the form
    /// `|receiver, args| async move { .. }` returning `anyhow::Result<Value>`.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(Record, Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        Method(Arc::new(move |receiver, args| Box::pin(f(receiver, args))))
    }

    /// Invoke against an explicit receiver.
    pub(crate) fn invoke(
        &self,
        receiver: Record,
        args: Vec<Value>,
    ) -> BoxFuture<'static, anyhow::Result<Value>> {
        (self.0)(receiver, args)
    }

    /// Handle identity.
    pub fn ptr_eq(&self, other: &Method) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<method>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn truthiness_matches_source_semantics() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(!Value::Number(0.0).is_truthy());
        assert!(!Value::Number(f64::NAN).is_truthy());
        assert!(!Value::Text(String::new()).is_truthy());

        assert!(Value::Bool(true).is_truthy());
        assert!(Value::Number(-1.5).is_truthy());
        assert!(Value::from("x").is_truthy());
        assert!(Value::List(Vec::new()).is_truthy());
        assert!(Value::Record(Record::new()).is_truthy());
    }

    #[test]
    fn conversions_produce_expected_variants() {
        assert_eq!(Value::from(3), Value::Number(3.0));
        assert_eq!(Value::from(2.5), Value::Number(2.5));
        assert_eq!(Value::from("hi"), Value::Text("hi".to_string()));
        assert_eq!(Value::from(vec!["a", "b"]), Value::List(vec!["a".into(), "b".into()]));
        assert_eq!(Value::from(None::<bool>), Value::Null);
        assert_eq!(Value::from(Some(true)), Value::Bool(true));
    }

    #[test]
    fn methods_compare_by_identity() {
        let method = Method::new(|_, _| async { Ok(Value::Null) });
        let same = Value::Method(method.clone());
        let other = Method::new(|_, _| async { Ok(Value::Null) });

        assert_eq!(Value::Method(method), same);
        assert!(Value::Method(other.clone()) != same);
        assert!(other.ptr_eq(&other.clone()));
    }
}
