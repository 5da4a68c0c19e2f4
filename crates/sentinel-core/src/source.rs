use std::any::Any;

/// Handle to the data under validation. Opaque to the engine beyond a stable
/// fingerprint for cache keying; concrete evaluators downcast to whatever
/// capability set their connector exposes.
pub trait DataSource: Send + Sync {
    /// Stable identity string. Must change whenever the underlying data
    /// changes in a way that should invalidate cached results.
    fn fingerprint(&self) -> String;

    fn as_any(&self) -> &dyn Any;
}
