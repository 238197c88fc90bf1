//! Utility functions and helpers.

pub mod validation;

pub use validation::{validate_amount, validate_not_blank};
