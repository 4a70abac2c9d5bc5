//! Remote note store contracts and HTTP implementation.
//!
//! # Responsibility
//! - Define the logical store operations consumed by the service layer.
//! - Keep HTTP query/header details inside the store boundary.
//!
//! # Invariants
//! - Every operation issues exactly one remote request.
//! - Store implementations hold no state besides connection configuration.

pub mod note_store;
pub mod rest;
