use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;

/// How a top-level download entry should be handled.
///
/// Underscore-prefixed entries are skipped before classification and never
/// reach this tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// A single episode, bare file or folder.
    Episode,
    /// A folder of loose episodes; carries the first episode found inside.
    FullSeason(PathBuf),
    /// A movie, bare file or folder.
    Movie,
    /// Nothing matched; the entry gets the ignore prefix and stays put.
    Unrecognized,
}

/// Pre-compiled marker patterns for classifying release names
pub struct Patterns {
    /// Episode markers, ordered: S00E00, Season 00 Episode 00, S00..EP00, 0x00
    pub episode_markers: Vec<Regex>,
    /// Movie markers: quality tags
    pub movie_markers: Vec<Regex>,
    /// Names already marked to be skipped (leading underscore)
    pub ignore_markers: Vec<Regex>,
    /// Season directory name formats: S.<NN>, Season <N>
    pub season_dir_formats: Vec<Regex>,
}

impl Patterns {
    pub fn new() -> Self {
        Self {
            episode_markers: vec![
                Regex::new(r"(?i)S\d{2}E\d{2}").expect("Invalid episode marker regex"),
                Regex::new(r"(?i)Season \d{2} Episode \d{2}")
                    .expect("Invalid episode marker regex"),
                Regex::new(r"(?i)S\d{2}.*EP\d{2}").expect("Invalid episode marker regex"),
                Regex::new(r"(?i)\dx\d{2}").expect("Invalid episode marker regex"),
            ],
            movie_markers: vec![
                Regex::new(r"(?i)1080p").expect("Invalid movie marker regex"),
                Regex::new(r"(?i)720p").expect("Invalid movie marker regex"),
            ],
            ignore_markers: vec![Regex::new(r"^_").expect("Invalid ignore marker regex")],
            season_dir_formats: vec![
                Regex::new(r"(?i)^S.\d{2}").expect("Invalid season format regex"),
                Regex::new(r"(?i)^Season \d").expect("Invalid season format regex"),
            ],
        }
    }

    /// Whether `name` looks like a single episode release.
    pub fn is_episode(&self, name: &str) -> bool {
        matches_any(name, &self.episode_markers)
    }

    /// Whether `name` carries a movie quality tag.
    pub fn is_movie(&self, name: &str) -> bool {
        matches_any(name, &self.movie_markers)
    }

    /// Whether `name` is marked to be skipped on this and future runs.
    pub fn is_ignored(&self, name: &str) -> bool {
        matches_any(name, &self.ignore_markers)
    }

    /// Whether `name` is a recognized season directory name.
    pub fn is_season_dir(&self, name: &str) -> bool {
        matches_any(name, &self.season_dir_formats)
    }
}

impl Default for Patterns {
    fn default() -> Self {
        Self::new()
    }
}

/// First-match-wins test of `name` against an ordered pattern list.
pub fn matches_any(name: &str, patterns: &[Regex]) -> bool {
    patterns.iter().any(|p| p.is_match(name))
}

/// Global singleton for patterns
pub static PATTERNS: LazyLock<Patterns> = LazyLock::new(Patterns::new);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_episode_markers() {
        let p = &*PATTERNS;
        assert!(p.is_episode("Show.Name.S02E05.1080p"));
        assert!(p.is_episode("show.name.s02e05"));
        assert!(p.is_episode("Show Season 02 Episode 05"));
        assert!(p.is_episode("Show.S02.Part.EP05"));
        assert!(p.is_episode("Show.2x05.HDTV"));
        assert!(!p.is_episode("Movie.Title.2020.720p"));
    }

    #[test]
    fn test_movie_markers() {
        let p = &*PATTERNS;
        assert!(p.is_movie("Movie.Title.2020.1080p.BluRay"));
        assert!(p.is_movie("Movie.Title.720P.WEB"));
        assert!(!p.is_movie("Movie.Title.2020.480p"));
    }

    #[test]
    fn test_ignore_marker_is_anchored() {
        let p = &*PATTERNS;
        assert!(p.is_ignored("_Show.Name.S01E01"));
        assert!(!p.is_ignored("Show_Name.S01E01"));
    }

    #[test]
    fn test_season_dir_formats() {
        let p = &*PATTERNS;
        assert!(p.is_season_dir("S.01"));
        assert!(p.is_season_dir("s.23"));
        assert!(p.is_season_dir("Season 1"));
        assert!(p.is_season_dir("Season 23"));
        assert!(!p.is_season_dir("Specials"));
        assert!(!p.is_season_dir("extras S.01"));
    }

    #[test]
    fn test_episode_beats_movie_tag() {
        // Classification checks episode markers before movie markers, so a
        // tagged episode must register as an episode too.
        let p = &*PATTERNS;
        let name = "Show.Name.S02E05.1080p";
        assert!(p.is_episode(name));
        assert!(p.is_movie(name));
    }
}
