//! Slidereel Timeline Model
//!
//! Defines the core data contracts for Slidereel:
//! - **MediaItem:** One timeline entry, either a still image with a display
//!   duration or a video clip
//! - **Timeline:** The ordered sequence of items that defines play order
//!   and concatenation order, with JSON persistence
//!
//! The timeline is created and edited entirely outside the compile engine;
//! the engine receives a snapshot per run and treats it as immutable.

pub mod item;
pub mod timeline;

pub use item::*;
pub use timeline::*;
