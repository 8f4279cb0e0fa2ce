//! The declassifying factory.
//!
//! `wrap` turns a constructor (and optionally an async initializer)
//! into an async factory. Each invocation constructs a fresh instance,
//! awaits the initializer against it, and returns a frozen [`Snapshot`]
//! of the active record's own properties.

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::trace;

use crate::error::{DeclassifyError, Result};
use crate::record::Record;
use crate::snapshot::Snapshot;
use crate::value::Value;

type ConstructorFn = dyn Fn(Vec<Value>) -> anyhow::Result<Record> + Send + Sync;
type InitializerFn = dyn Fn(Record) -> BoxFuture<'static, anyhow::Result<Value>> + Send + Sync;

/// An async factory over a wrapped constructor and initializer.
///
/// Holds no mutable state; concurrent [`Factory::call`]s are fully
/// independent, each constructing its own instance.
#[derive(Clone)]
pub struct Factory {
    constructor: Arc<ConstructorFn>,
    initializer: Arc<InitializerFn>,
}

/// Wrap a constructor with the identity initializer.
///
/// Equivalent to `wrap_with(constructor, |instance| async move { Ok(instance.into()) })`.
pub fn wrap<C>(constructor: C) -> Factory
where
    C: Fn(Vec<Value>) -> anyhow::Result<Record> + Send + Sync + 'static,
{
    wrap_with(constructor, |instance: Record| async move {
        Ok(Value::Record(instance))
    })
}

/// Wrap a constructor and an async initializer into a [`Factory`].
///
/// Nothing is validated here; constructor and initializer errors
/// surface when the factory is invoked.
pub fn wrap_with<C, I, Fut>(constructor: C, initializer: I) -> Factory
where
    C: Fn(Vec<Value>) -> anyhow::Result<Record> + Send + Sync + 'static,
    I: Fn(Record) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
{
    Factory {
        constructor: Arc::new(constructor),
        initializer: Arc::new(move |instance| Box::pin(initializer(instance))),
    }
}

impl Factory {
    /// Construct, initialize, and declassify one instance.
    ///
    /// The sequence is fixed: construction, then the single await on
    /// the initializer, then synchronous snapshot extraction. If the
    /// initializer's result is truthy it becomes the active record;
    /// otherwise the original instance is used. No snapshot is produced
    /// on failure.
    pub async fn call(&self, args: Vec<Value>) -> Result<Snapshot> {
        let instance = (self.constructor)(args).map_err(DeclassifyError::Construction)?;
        trace!(properties = instance.len(), "constructed instance");

        let inited = (self.initializer)(instance.clone())
            .await
            .map_err(DeclassifyError::Initialization)?;

        let active = if inited.is_truthy() {
            inited
        } else {
            Value::Record(instance)
        };

        let snapshot = Snapshot::extract(&active);
        trace!(properties = snapshot.len(), "extracted snapshot");
        Ok(snapshot)
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Factory")
    }
}
