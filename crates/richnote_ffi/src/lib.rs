//! FRB bridge crate for RichNote editor sessions.

pub mod api;
