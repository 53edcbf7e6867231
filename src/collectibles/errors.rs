use thiserror::Error;

/// Errors raised by [`Inventory`](super::Inventory). Lookups and deletes that miss are not errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InventoryError {
    /// The raw snapshot handed to the container was not a JSON array.
    #[error("inventory snapshot must be an array, got {found}")]
    NotAnArray { found: &'static str },

    /// A merge would push the container past its configured limit.
    #[error("inventory capacity exceeded: limit {limit}, attempted {attempted}")]
    CapacityExceeded { limit: usize, attempted: usize },
}
