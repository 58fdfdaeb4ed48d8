//! Show and season directory resolution against the configured TV library roots.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, error, info, trace};

use super::episode::parse_season_episode;
use super::normalize::normalize;
use super::patterns::PATTERNS;

static DOTTED_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^S.(\d{2})").expect("Invalid season format regex"));
static WORDED_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^Season (\d)(.*)$").expect("Invalid season format regex"));

/// Naming style for season directories.
///
/// The configured style governs newly created folders only; lookups decode
/// every style, since an existing library may mix both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeasonStyle {
    /// `S.<NN>`, zero-padded to two digits
    #[default]
    Dotted,
    /// `Season <N>`, unpadded
    Worded,
}

impl SeasonStyle {
    const ALL: [SeasonStyle; 2] = [SeasonStyle::Dotted, SeasonStyle::Worded];

    /// Decode a season directory name into its season number.
    pub fn decode(self, name: &str) -> Option<u32> {
        match self {
            Self::Dotted => {
                let caps = DOTTED_FORMAT.captures(name)?;
                caps.get(1)?.as_str().parse().ok()
            }
            Self::Worded => {
                // Multi-digit seasons land split across the two groups;
                // re-joining them is the decoding policy, so "Season 23"
                // reads as 23 and "Season 2 Extras" as nothing.
                let caps = WORDED_FORMAT.captures(name)?;
                let digits = format!("{}{}", caps.get(1)?.as_str(), caps.get(2)?.as_str());
                digits.parse().ok()
            }
        }
    }

    /// Directory name for a season in this style.
    #[must_use]
    pub fn folder_name(self, season: u32) -> String {
        match self {
            Self::Dotted => format!("S.{season:02}"),
            Self::Worded => format!("Season {season}"),
        }
    }
}

/// Decode a season directory name, trying every known style.
pub fn decode_season_number(name: &str) -> Option<u32> {
    SeasonStyle::ALL.iter().find_map(|style| style.decode(name))
}

/// Resolves destinations for episodes against the TV library roots
pub struct Library {
    tv_dirs: Vec<PathBuf>,
    fallback_dir: PathBuf,
    season_style: SeasonStyle,
}

impl Library {
    pub fn new(tv_dirs: Vec<PathBuf>, fallback_dir: PathBuf, season_style: SeasonStyle) -> Self {
        Self {
            tv_dirs,
            fallback_dir,
            season_style,
        }
    }

    /// Find the show directory a release name belongs to.
    ///
    /// Scans every TV root in order; a show matches when its normalized name
    /// appears inside the normalized candidate, so extra tokens (year,
    /// quality, group tag) on the release don't break the match. First match
    /// wins.
    pub fn find_show_dir(&self, candidate: &str) -> Option<PathBuf> {
        let wanted = normalize(candidate);
        for root in &self.tv_dirs {
            if !root.is_dir() {
                trace!("TV root {:?} is not a directory, skipping", root);
                continue;
            }
            debug!("Searching TV root {:?}", root);
            let entries = match fs::read_dir(root) {
                Ok(entries) => entries,
                Err(e) => {
                    error!("Failed to list TV root {:?}: {}", root, e);
                    continue;
                }
            };
            for entry in entries.filter_map(|e| e.ok()) {
                let path = entry.path();
                if !path.is_dir() {
                    continue;
                }
                let show_name = entry.file_name();
                let Some(show_name) = show_name.to_str() else {
                    continue;
                };
                trace!("Comparing {:?} against show {:?}", candidate, show_name);
                if wanted.contains(&normalize(show_name)) {
                    debug!("Found show {:?} for {:?}", show_name, candidate);
                    return Some(path);
                }
            }
        }
        trace!("No show found for {:?}", candidate);
        None
    }

    /// Find the season directory for an episode under a show, creating it
    /// in the configured style when missing.
    ///
    /// Returns `None` when the episode name has no parseable season or the
    /// directory can't be created; both mean "no season resolvable" and
    /// never abort the run.
    pub fn find_or_create_season_dir(
        &self,
        show_dir: &Path,
        episode_name: &str,
    ) -> Option<PathBuf> {
        let numbers = match parse_season_episode(episode_name) {
            Ok(numbers) => numbers,
            Err(e) => {
                debug!("{}", e);
                return None;
            }
        };

        debug!(
            "Searching for season {} directory under {:?}",
            numbers.season, show_dir
        );
        let entries = match fs::read_dir(show_dir) {
            Ok(entries) => entries,
            Err(e) => {
                error!("Failed to list show directory {:?}: {}", show_dir, e);
                return None;
            }
        };
        for entry in entries.filter_map(|e| e.ok()) {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if !PATTERNS.is_season_dir(name) {
                continue;
            }
            if decode_season_number(name) == Some(numbers.season) {
                debug!("Found season directory {:?}", path);
                return Some(path);
            }
        }

        let new_name = self.season_style.folder_name(numbers.season);
        let season_dir = show_dir.join(&new_name);
        info!("Creating season folder {:?} under {:?}", new_name, show_dir);
        match fs::create_dir(&season_dir) {
            Ok(()) => Some(season_dir),
            Err(e) => {
                error!("Failed to create {:?}: {}", season_dir, e);
                None
            }
        }
    }

    /// Compute the destination directory for an episode.
    ///
    /// Candidates are tried in order (a folder's own name first, then names
    /// of files found inside it); the first one that resolves both a show
    /// and a season wins. When nothing resolves, the catch-all directory is
    /// returned, so an episode always has somewhere to go.
    pub fn destination_for(&self, candidates: &[&str]) -> PathBuf {
        for candidate in candidates {
            debug!("Searching for a show path using {:?}", candidate);
            let Some(show_dir) = self.find_show_dir(candidate) else {
                continue;
            };
            if let Some(season_dir) = self.find_or_create_season_dir(&show_dir, candidate) {
                debug!("Using season path {:?}", season_dir);
                return season_dir;
            }
        }
        info!(
            "No show found for {:?}, falling back to the unsorted directory",
            candidates
        );
        self.fallback_dir.clone()
    }
}
