//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A create DTO for inserts
//!
//! There are no update DTOs: every artifact row is immutable after creation
//! and only ever deleted.

pub mod converted;
pub mod recording;
pub mod saved_track;
