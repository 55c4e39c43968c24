//! Domains module containing business logic organized by bounded contexts.
//!
//! The server currently has a single domain: the AMap tools.

pub mod tools;
