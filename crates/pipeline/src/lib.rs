//! Artifact lifecycle pipeline.
//!
//! Three services over the shared repositories and blob store:
//!
//! - [`convert::ConversionService`] -- notes in, durable rendered artifact out
//! - [`promote::PromotionService`] -- turn a transient artifact into a kept
//!   track, and manage kept tracks
//! - [`sweeper::ReclamationSweeper`] -- recurring storage reclamation for
//!   everything that aged out without being kept

pub mod convert;
pub mod promote;
pub mod sweeper;

pub use convert::{ConversionError, ConversionService};
pub use promote::{PromotionError, PromotionService};
pub use sweeper::{ReclamationSweeper, SweepReport};
