//! Sorts freshly downloaded movies and TV episodes into a media library.
//!
//! The [`organize::Engine`] classifies every top-level entry of the download
//! directory as an episode, a full season, a movie or unrecognized, then
//! relocates it into the configured library layout, matching releases
//! against existing show directories and creating season folders on demand.

pub mod config;
pub mod organize;
