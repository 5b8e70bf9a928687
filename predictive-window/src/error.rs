/// Errors returned by [`crate::WindowedStore`].
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum WindowError {
    /// A configuration value is out of its accepted range.
    #[error("invalid configuration: `{field}` {reason}")]
    InvalidConfiguration {
        field: &'static str,
        reason: &'static str,
    },
    /// Two items passed to `initialize` produced the same key.
    #[error("duplicate item key at index {index}")]
    DuplicateKey { index: usize },
    /// The store was destroyed and cannot be reused.
    #[error("store has been destroyed")]
    Destroyed,
}
