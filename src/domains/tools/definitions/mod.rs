//! Tool definitions.
//!
//! Each file groups related tools by provider service. A tool is a
//! `const` [`ToolSpec`](super::schema::ToolSpec) plus its response shaper.

pub mod common;
pub mod geocode;
pub mod poi;
pub mod region;
pub mod route;
