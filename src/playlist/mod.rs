//! Playlist model and persistence

pub mod model;
pub mod store;

pub use model::{Playlist, TrackEntry};
pub use store::PlaylistStore;
