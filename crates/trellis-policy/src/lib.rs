//! # trellis-policy
//!
//! A TOML-driven ACL registry built on the trellis entity graph.
//!
//! ## Overview
//!
//! This crate provides [`Acl`], a registry that addresses entities by
//! case-insensitive ID, loads entity declarations from TOML, answers
//! authorization queries and records every decision in an in-memory trail.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use trellis_policy::Acl;
//!
//! let mut acl = Acl::from_file(Path::new("acl/example.toml"))?;
//! let allowed = acl.is_allowed("alice", "read", "wiki", None, &[]);
//! ```
//!
//! ## Permission matching
//!
//! Each permission names an `action` and a `resource`. Both accept the
//! wildcard `"*"`. An entity's own permissions are checked first, in
//! declaration order, and the first match decides. Inherited permissions are
//! only consulted when no own permission matches.

pub mod acl;
pub mod audit;
pub mod config;

pub use acl::Acl;
pub use audit::{DecisionRecord, DecisionTrail};
pub use config::{AclConfig, EntityConfig, PermissionConfig};

// ── Tests ─────────────────────────────────────────────────────────────────────
