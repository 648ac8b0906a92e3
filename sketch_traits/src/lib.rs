use std::error;

/// Builds an instance from a validated configuration. Validation itself
/// lives on the configuration's own constructor, so `new` here is
/// infallible: by the time a `Config` exists it is already known-good.
pub trait New {
    type Config;

    fn new(config: &Self::Config) -> Self;
}

/// A distinct-count sketch: insert items, read back an approximate
/// cardinality, and combine independently-built sketches into a fresh one.
///
/// Kept narrow on purpose (add/count/union/size) so a sketch other than
/// `pcsa::Pcsa` could stand in without any caller-side changes.
pub trait DistinctSketch: Sized {
    type Item: ?Sized;
    type UnionError: error::Error;

    fn add(&mut self, item: &Self::Item);

    fn count(&self) -> f64;

    fn size_bytes(&self) -> f64;

    /// Combines independently-built sketches into a fresh one. Static by
    /// design: unioning never mutates its operands.
    fn union(sketches: &[Self]) -> Result<Self, Self::UnionError>;
}
