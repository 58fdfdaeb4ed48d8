//! Per-entry reorganize state machine: classify each download, flatten and
//! prune folders, then move everything to its resolved destination.

use chrono::Local;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, trace};
use walkdir::WalkDir;

use crate::config::Settings;
use crate::organize::library::Library;
use crate::organize::patterns::{Classification, PATTERNS};
use crate::organize::Result;

/// Supported video file extensions
const VIDEO_EXTENSIONS: &[&str] = &["mkv", "mp4", "avi", "wmv", "mpeg4"];

/// Supported subtitle file extensions
const SUBTITLE_EXTENSIONS: &[&str] = &["srt", "idx", "sub"];

/// Sidecar files deleted outright during pruning
const DISCARD_EXTENSIONS: &[&str] = &[
    "txt", "nzb", "srr", "sfv", "url", "md5", "par2", "jpg", "tbn", "smi", "exe",
];

fn has_extension_in(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| extensions.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn is_video(path: &Path) -> bool {
    has_extension_in(path, VIDEO_EXTENSIONS)
}

fn is_subtitle(path: &Path) -> bool {
    has_extension_in(path, SUBTITLE_EXTENSIONS)
}

fn file_name_str(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}

/// Move `src` (file or directory) into the directory `dest_dir`, keeping its
/// name.
fn move_into(src: &Path, dest_dir: &Path) -> io::Result<PathBuf> {
    let file_name = src
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
    let dest = dest_dir.join(file_name);
    fs::rename(src, &dest)?;
    Ok(dest)
}

/// Sibling name carrying a time-based suffix, used when flattening collides
/// with an existing file at the top level.
fn timestamped_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stamp = Local::now().format("%H%M%S");
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}.{stamp}.{ext}"),
        None => format!("{stem}.{stamp}"),
    }
}

/// Reorganizes the download directory into the configured library layout.
///
/// Entries are processed strictly one after another; every filesystem
/// failure is logged at its operation site and the run continues with the
/// next file or entry.
pub struct Engine {
    download_dir: PathBuf,
    movie_dir: PathBuf,
    unsorted_dir: PathBuf,
    library: Library,
}

impl Engine {
    pub fn new(settings: &Settings) -> Self {
        Self {
            download_dir: settings.download_dir.clone(),
            movie_dir: settings.movie_dir.clone(),
            unsorted_dir: settings.unsorted_dir.clone(),
            library: Library::new(
                settings.tv_dirs.clone(),
                settings.unsorted_dir.clone(),
                settings.season_style,
            ),
        }
    }

    /// Process one snapshot of the download directory.
    pub fn run(&self) -> Result<()> {
        let entries: Vec<PathBuf> = fs::read_dir(&self.download_dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .collect();
        if entries.is_empty() {
            debug!("Download directory {:?} is empty", self.download_dir);
            return Ok(());
        }

        let mut header_logged = false;
        for path in entries {
            let Some(name) = file_name_str(&path).map(String::from) else {
                error!("Skipping entry with a non-UTF8 name: {:?}", path);
                continue;
            };
            if PATTERNS.is_ignored(&name) {
                debug!("Ignoring the entry {:?}", name);
                continue;
            }
            if !header_logged {
                info!("** Entries found, starting post processing **");
                header_logged = true;
            }
            match self.classify(&path, &name) {
                Classification::Episode => {
                    info!("Handling the episode {:?}", name);
                    self.handle_episode(&path);
                }
                Classification::FullSeason(found) => {
                    self.handle_full_season(&path, &found);
                }
                Classification::Movie => {
                    info!("Handling the movie {:?}", name);
                    self.handle_movie(&path);
                }
                Classification::Unrecognized => {
                    info!("Not sure what to do with {:?}, ignoring", name);
                    self.ignore_entry(&path);
                }
            }
        }
        Ok(())
    }

    fn classify(&self, path: &Path, name: &str) -> Classification {
        if PATTERNS.is_episode(name) {
            return Classification::Episode;
        }
        if path.is_dir() {
            if let Some(found) = find_episode_in(path) {
                info!(
                    "Found an episode in {:?}, treating it as a full season",
                    path
                );
                return Classification::FullSeason(found);
            }
        }
        if PATTERNS.is_movie(name) {
            return Classification::Movie;
        }
        Classification::Unrecognized
    }

    /// Rename an entry with the underscore marker so future runs skip it.
    fn ignore_entry(&self, path: &Path) {
        let Some(name) = file_name_str(path) else {
            return;
        };
        let Some(parent) = path.parent() else {
            return;
        };
        let dest = parent.join(format!("_{name}"));
        debug!("Renaming {:?} to {:?}", path, dest);
        if let Err(e) = fs::rename(path, &dest) {
            error!("Failed to rename {:?} to {:?}: {}", path, dest, e);
        }
    }

    /// Relocate every file nested below `dir` up to its top level, then drop
    /// the emptied subdirectories. Runs before any pattern-driven handling
    /// so junk nesting never affects matches.
    fn flatten(&self, dir: &Path) {
        debug!("Flattening the directory structure of {:?}", dir);
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .contents_first(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if entry.file_type().is_file() {
                if entry.depth() == 1 {
                    continue;
                }
                let Some(name) = file_name_str(path) else {
                    continue;
                };
                let mut dest = dir.join(name);
                if dest.exists() {
                    dest = dir.join(timestamped_name(path));
                }
                debug!("Moving {:?} up to {:?}", path, dest);
                if let Err(e) = fs::rename(path, &dest) {
                    error!("Failed to move {:?} to {:?}: {}", path, dest, e);
                }
            } else if entry.file_type().is_dir() {
                debug!("Removing the emptied directory {:?}", path);
                if let Err(e) = fs::remove_dir(path) {
                    error!("Failed to remove {:?}: {}", path, e);
                }
            }
        }
    }

    /// Delete sample videos and sidecar files from the top level of `dir`.
    /// Best-effort: a failed deletion is logged and skipped.
    fn prune(&self, dir: &Path) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                error!("Failed to list {:?}: {}", dir, e);
                return;
            }
        };
        for entry in entries.filter_map(|e| e.ok()) {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(name) = file_name_str(&path) else {
                continue;
            };
            if is_video(&path) && name.to_lowercase().contains("sample") {
                debug!("Removing the video file {:?}: sample", name);
                if let Err(e) = fs::remove_file(&path) {
                    error!("Failed to remove {:?}: {}", path, e);
                }
            } else if has_extension_in(&path, DISCARD_EXTENSIONS) {
                debug!("Removing the file {:?} because of its extension", name);
                if let Err(e) = fs::remove_file(&path) {
                    error!("Failed to remove {:?}: {}", path, e);
                }
            }
        }
    }

    /// Move an episode file into its destination directory, unless it is
    /// already there.
    fn move_episode(&self, src: &Path, dest_dir: &Path) {
        if src.parent().is_some_and(|p| p == dest_dir) {
            info!("No need to move {:?}, already in place", src);
            return;
        }
        info!("Moving the episode file {:?} to {:?}", src, dest_dir);
        if let Err(e) = move_into(src, dest_dir) {
            error!("Failed to move {:?} to {:?}: {}", src, dest_dir, e);
        }
    }

    fn handle_episode(&self, path: &Path) {
        if path.is_dir() {
            trace!("Episode {:?} is a folder", path);
            self.flatten(path);
            self.prune(path);
            let Some(dir_name) = file_name_str(path).map(String::from) else {
                return;
            };
            let children: Vec<PathBuf> = match fs::read_dir(path) {
                Ok(entries) => entries.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
                Err(e) => {
                    error!("Failed to list {:?}: {}", path, e);
                    return;
                }
            };
            let mut moved = false;
            for child in children {
                if !(is_video(&child) || is_subtitle(&child)) {
                    continue;
                }
                let Some(child_name) = file_name_str(&child) else {
                    continue;
                };
                moved = true;
                let dest = self.library.destination_for(&[dir_name.as_str(), child_name]);
                self.move_episode(&child, &dest);
            }
            if moved {
                debug!("Removing the source directory {:?}", path);
                if let Err(e) = fs::remove_dir_all(path) {
                    error!("Failed to remove {:?}: {}", path, e);
                }
            } else {
                info!("The folder {:?} contains no video file, ignoring", path);
                self.ignore_entry(path);
            }
        } else if is_video(path) || is_subtitle(path) {
            trace!("Episode {:?} is a bare video or subtitle file", path);
            let Some(name) = file_name_str(path) else {
                return;
            };
            let dest = self.library.destination_for(&[name]);
            self.move_episode(path, &dest);
        } else {
            info!("Episode {:?} is not a video, ignoring", path);
            self.ignore_entry(path);
        }
    }

    fn handle_movie(&self, path: &Path) {
        if path.is_dir() {
            trace!("Movie {:?} is a folder", path);
            self.flatten(path);
            self.prune(path);
            let contains_video = fs::read_dir(path)
                .map(|entries| {
                    entries
                        .filter_map(|e| e.ok())
                        .any(|e| is_video(&e.path()))
                })
                .unwrap_or(false);
            if !contains_video {
                info!("No video file under {:?}, ignoring", path);
                self.ignore_entry(path);
                return;
            }
            info!("Moving the movie {:?} to {:?}", path, self.movie_dir);
            if let Err(e) = move_into(path, &self.movie_dir) {
                error!("Failed to move {:?} to {:?}: {}", path, self.movie_dir, e);
            }
        } else if is_video(path) {
            trace!("Movie {:?} is a bare video file", path);
            // Movies live in their own folder; wrap the file first.
            let folder = path.with_extension("");
            info!("Creating the folder {:?} for the movie file", folder);
            let wrapped = fs::create_dir(&folder).and_then(|()| move_into(path, &folder));
            if let Err(e) = wrapped {
                error!("Failed to wrap the movie file {:?}: {}", path, e);
                return;
            }
            info!("Moving the movie {:?} to {:?}", folder, self.movie_dir);
            if let Err(e) = move_into(&folder, &self.movie_dir) {
                error!("Failed to move {:?} to {:?}: {}", folder, self.movie_dir, e);
            }
        } else {
            debug!("Movie {:?} is neither a folder nor a video file", path);
        }
    }

    fn handle_full_season(&self, path: &Path, episode_in_dir: &Path) {
        self.flatten(path);
        self.prune(path);
        let Some(season_name) = file_name_str(path).map(String::from) else {
            return;
        };
        let Some(episode_name) = file_name_str(episode_in_dir).map(String::from) else {
            return;
        };

        // The folder's own name is the best show hint; the episode inside is
        // the fallback, and it always carries the season number.
        let show_dir = self
            .library
            .find_show_dir(&season_name)
            .or_else(|| self.library.find_show_dir(&episode_name));
        let resolved = show_dir
            .and_then(|show| self.library.find_or_create_season_dir(&show, &episode_name));
        let (dest, show_found) = match resolved {
            Some(season_dir) => (season_dir, true),
            None => (self.unsorted_dir.clone(), false),
        };

        if path.parent().is_some_and(|p| p == dest.as_path()) {
            info!("No need to move the season {:?}, already in place", path);
            return;
        }

        info!("Moving the season {:?} to {:?}", path, dest);
        if show_found {
            let children: Vec<PathBuf> = match fs::read_dir(path) {
                Ok(entries) => entries.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
                Err(e) => {
                    error!("Failed to list {:?}: {}", path, e);
                    return;
                }
            };
            for child in children {
                if let Err(e) = move_into(&child, &dest) {
                    error!("Failed to move {:?} to {:?}: {}", child, dest, e);
                }
            }
            if let Err(e) = fs::remove_dir(path) {
                error!("Failed to remove {:?}: {}", path, e);
            }
        } else if let Err(e) = move_into(path, &dest) {
            error!("Failed to move {:?} to {:?}: {}", path, dest, e);
        }
    }
}

/// Scan a directory's immediate children for anything that looks like an
/// episode; a hit means the directory is a full season.
fn find_episode_in(dir: &Path) -> Option<PathBuf> {
    debug!("Testing whether {:?} is a full season", dir);
    let entries = fs::read_dir(dir).ok()?;
    for entry in entries.filter_map(|e| e.ok()) {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if PATTERNS.is_episode(name) {
            return Some(entry.path());
        }
    }
    trace!("No episode found in {:?}", dir);
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_predicates() {
        assert!(is_video(Path::new("Show.S01E01.mkv")));
        assert!(is_video(Path::new("Show.S01E01.MKV")));
        assert!(is_subtitle(Path::new("Show.S01E01.srt")));
        assert!(!is_video(Path::new("Show.S01E01.nfo")));
        assert!(!is_subtitle(Path::new("Show.S01E01.mkv")));
        assert!(has_extension_in(Path::new("checksums.sfv"), DISCARD_EXTENSIONS));
        assert!(!has_extension_in(Path::new("noext"), DISCARD_EXTENSIONS));
    }

    #[test]
    fn test_timestamped_name_keeps_extension() {
        let name = timestamped_name(Path::new("/tmp/video.mkv"));
        assert!(name.starts_with("video."));
        assert!(name.ends_with(".mkv"));
        assert!(name.len() > "video.mkv".len());
    }

    #[test]
    fn test_timestamped_name_without_extension() {
        let name = timestamped_name(Path::new("/tmp/video"));
        assert!(name.starts_with("video."));
        assert!(!name.contains(".."));
    }
}
