use thiserror::Error;

use super::order::OrderStatus;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid pincode: expected exactly 6 digits")]
    InvalidPincodeFormat,
    #[error("Cart is empty")]
    EmptyCart,
    #[error("Delivery address has not been validated")]
    InvalidDeliveryAddress,
    #[error("Order not found")]
    UnknownOrder,
    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    #[error("Order id already taken")]
    DuplicateOrderId,
    #[error("Not found")]
    NotFound,
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid credentials")]
    Unauthorized,
    #[error("Store unavailable: {0}")]
    Store(String),
}
