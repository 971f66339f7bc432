//! Error types for building and sending QR orders.

/// An order or its credentials failed validation.
///
/// Always raised before any network activity.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// The order has no line items.
    #[error("at least one item is required")]
    EmptyItems,

    /// A line item has a blank title.
    #[error("item {index}: title must not be empty")]
    EmptyItemTitle {
        /// Zero-based position of the item.
        index: usize,
    },

    /// A line item has a negative or non-finite unit price.
    #[error("item {index}: unit price must be a finite number >= 0, got {unit_price}")]
    InvalidUnitPrice {
        /// Zero-based position of the item.
        index: usize,
        /// The rejected price.
        unit_price: f64,
    },

    /// A line item has a quantity of zero.
    #[error("item {index}: quantity must be at least 1")]
    ZeroQuantity {
        /// Zero-based position of the item.
        index: usize,
    },

    /// The order total is not a finite number.
    #[error("order total is not a finite number")]
    NonFiniteTotal,

    /// A required credential field is blank.
    #[error("credential `{0}` must not be empty")]
    MissingCredential(&'static str),
}

/// Errors returned by [`crate::node::QrOrderNode::execute`].
///
/// Transport errors are carried as-is so callers can inspect the
/// dispatcher's own error type (status codes, response bodies, ...).
#[derive(Debug, thiserror::Error)]
pub enum NodeError<E> {
    /// The order or credentials were rejected before sending.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The order could not be encoded as JSON.
    #[error("failed to encode order: {0}")]
    Encode(#[source] serde_json::Error),

    /// The dispatcher failed to deliver the request or the API rejected it.
    #[error("{0}")]
    Transport(#[source] E),
}

impl<E> NodeError<E> {
    /// Returns the validation error, if this is one.
    #[must_use]
    pub const fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }

    /// Returns the transport error, if this is one.
    #[must_use]
    pub const fn as_transport(&self) -> Option<&E> {
        match self {
            Self::Transport(err) => Some(err),
            _ => None,
        }
    }
}
