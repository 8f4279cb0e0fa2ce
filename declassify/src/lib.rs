//! Declassify class-like constructors into frozen plain records.
//!
//! Wraps a constructor and an optional async initializer into an async
//! factory. Each factory call constructs a mutable [`Record`] instance,
//! awaits the initializer against it, then extracts the active record's
//! own properties into an immutable [`Snapshot`]. Method properties are
//! bound to the record at extraction, so they keep access to its live
//! state; everything else is shallow-copied. The instance itself is
//! never exposed to the caller.
//!
//! If the initializer returns a truthy value, that value replaces the
//! instance as the record to snapshot; falsy results keep the original
//! instance.
//!
//! # Example
//!
//! ```
//! use declassify::{Record, Value, wrap_with};
//!
//! let factory = wrap_with(
//!     |args| {
//!         let instance = Record::new();
//!         instance.set("args", Value::List(args));
//!         instance.define_method("activate", |this, _args| async move {
//!             this.set("active", true);
//!             Ok(Value::Null)
//!         });
//!         Ok(instance)
//!     },
//!     |instance| async move {
//!         instance.call("activate", Vec::new()).await?;
//!         Ok(Value::Null)
//!     },
//! );
//!
//! let snapshot = futures::executor::block_on(factory.call(vec!["a".into(), "test".into()]))?;
//! assert_eq!(snapshot.get("active"), Some(&Value::Bool(true)));
//! assert_eq!(snapshot.get("args"), Some(&Value::from(vec!["a", "test"])));
//! # Ok::<(), declassify::DeclassifyError>(())
//! ```

mod error;
mod factory;
mod record;
mod snapshot;
mod value;

pub use error::{DeclassifyError, Result};
pub use factory::{Factory, wrap, wrap_with};
pub use record::Record;
pub use snapshot::{BoundMethod, Snapshot, SnapshotValue};
pub use value::{Method, Value};
