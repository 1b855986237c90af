//! Anchors module - Version anchors for changelog-like documents
//!
//! Headings such as `25.5.0 (2025-05-21)` in a changelog get a stable
//! identifier (`version-25.5.0`) that other documents can link to, either by
//! fragment or with an inline `` :version:`25.5.0` `` reference. Issue
//! references such as `(#123)` in the same documents can be rewritten into
//! tracker links.

pub mod api;
pub mod classify;
pub mod github;
pub mod heading;
pub mod hook;
pub mod lint;
pub mod literal;
pub mod registry;
pub mod role;
pub mod template;
