use crate::organize::{OrganizeError, Result};
use regex::Regex;
use std::sync::LazyLock;

/// Season and episode numbers parsed out of a release name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeNumbers {
    pub season: u32,
    pub episode: u32,
}

/// Capture templates tried in order; the first one that matches wins, even
/// when a later template would also match. Each captures exactly two numeric
/// groups: season, then episode.
static TEMPLATES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)S(\d{2})E(\d{2})").expect("Invalid episode template regex"),
        Regex::new(r"(?i)(\d)x(\d{2})").expect("Invalid episode template regex"),
        Regex::new(r"(?i)Season\D*?(\d{2}).*?Episode\D*?(\d{2})")
            .expect("Invalid episode template regex"),
        Regex::new(r"(?i)S(\d{2}).*EP(\d{2})").expect("Invalid episode template regex"),
    ]
});

/// Extract season and episode numbers from a release name.
///
/// A template whose captured groups fail to parse as integers counts as a
/// non-match and the next template is tried. When nothing matches, the typed
/// not-found error is returned; callers treat it as "no season resolvable",
/// not as a fatal condition.
pub fn parse_season_episode(name: &str) -> Result<EpisodeNumbers> {
    for template in TEMPLATES.iter() {
        if let Some(caps) = template.captures(name) {
            let season = caps.get(1).and_then(|m| m.as_str().parse().ok());
            let episode = caps.get(2).and_then(|m| m.as_str().parse().ok());
            if let (Some(season), Some(episode)) = (season, episode) {
                return Ok(EpisodeNumbers { season, episode });
            }
        }
    }
    Err(OrganizeError::EpisodeNumbersNotFound(name.to_string()))
}
