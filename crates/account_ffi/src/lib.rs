//! FFI bridge crate exposing account use-cases to the UI layer.

pub mod api;
