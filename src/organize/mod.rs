mod engine;
mod episode;
mod library;
mod normalize;
mod patterns;

pub use engine::Engine;
pub use episode::{EpisodeNumbers, parse_season_episode};
pub use library::{Library, SeasonStyle, decode_season_number};
pub use normalize::normalize;
pub use patterns::{Classification, PATTERNS, Patterns, matches_any};

/// Organize result type
pub type Result<T> = std::result::Result<T, OrganizeError>;

/// Organize error types
#[derive(Debug, thiserror::Error)]
pub enum OrganizeError {
    #[error("No season/episode numbers found in {0:?}")]
    EpisodeNumbersNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
