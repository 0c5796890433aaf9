//! Request handlers, one module per resource.

pub mod conversions;
pub mod recordings;
pub mod tracks;
