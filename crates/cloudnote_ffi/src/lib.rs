//! Flutter bridge crate for CloudNote.

pub mod api;
