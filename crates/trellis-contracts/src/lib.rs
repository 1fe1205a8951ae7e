//! # trellis-contracts
//!
//! Shared contracts for the trellis ACL graph.
//!
//! Every other crate in the workspace imports from here. This crate holds the
//! read contract a permission must satisfy ([`Permission`] and
//! [`WildcardAware`]), one concrete permission ([`GenericPermission`]), the
//! predicate type used for additional assertions, and the error types.

pub mod error;
pub mod permission;

pub use error::{AclError, AclResult};
pub use permission::{eq_ignore_case, Assertion, GenericPermission, Permission, WildcardAware};
