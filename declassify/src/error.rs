use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, DeclassifyError>;

/// Failures surfaced by a factory invocation or a bound method call.
///
/// Constructor, initializer, and method closures are arbitrary caller
/// code returning `anyhow::Result`; their errors are carried here
/// unchanged so the caller gets back exactly what its own code raised.
#[derive(Debug, Error)]
pub enum DeclassifyError {
    /// The constructor closure failed; no instance was created.
    #[error("construction failed: {0}")]
    Construction(anyhow::Error),

    /// The initializer failed; no snapshot is produced.
    #[error("initialization failed: {0}")]
    Initialization(anyhow::Error),

    /// A method failed when invoked against its receiver.
    #[error("method call failed: {0}")]
    Method(anyhow::Error),

    /// A call referenced a property that does not exist.
    #[error("no property named `{key}`")]
    NoSuchProperty { key: String },

    /// A call referenced a data property rather than a method.
    #[error("property `{key}` is not callable")]
    NotCallable { key: String },
}

impl DeclassifyError {
    /// The underlying caller error, when this variant carries one.
    pub fn user_error(&self) -> Option<&anyhow::Error> {
        match self {
            Self::Construction(err) | Self::Initialization(err) | Self::Method(err) => Some(err),
            Self::NoSuchProperty { .. } | Self::NotCallable { .. } => None,
        }
    }
}
