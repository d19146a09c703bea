/// Identifier for a point in a [`crate::dataset::Dataset`].
///
/// This is an index into the dataset's point buffer, and is only meaningful
/// for point sets derived from that dataset (the engine's working copy and
/// its statistics tracker share the same indexing).
pub type PointId = usize;
