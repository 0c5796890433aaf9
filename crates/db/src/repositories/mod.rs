//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. All writes are single-row
//! statements; the lifecycle design deliberately avoids multi-statement
//! transactions (see the sweeper's tolerance of the promote/sweep race).

pub mod converted_repo;
pub mod recording_repo;
pub mod saved_track_repo;

pub use converted_repo::ConvertedRepo;
pub use recording_repo::RecordingRepo;
pub use saved_track_repo::SavedTrackRepo;
