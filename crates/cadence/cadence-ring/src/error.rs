/// Errors raised while constructing a ring.
///
/// Everything after construction is precondition-checked rather than fallible.
#[derive(Debug, thiserror::Error)]
pub enum RingError {
    #[error("failed to allocate storage for {capacity} items of {item_size} bytes")]
    Allocation { capacity: usize, item_size: usize },
}
