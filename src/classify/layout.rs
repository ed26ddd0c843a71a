//! Canonical library layouts, matched against a representative file's full path.
//!
//! Accepted shapes (case-insensitive, either path separator):
//!
//! - flat:  `.../<Artist>/<YYYY> - <Album>/<NN|N-NN> - <Title>.<ext>`
//! - disc:  `.../<Artist>/<YYYY> - <Album>[ - Disc N]/[Disc N/]<NN|N-NN> - <Title>.<ext>`
//!
//! The disc layout needs at least one disc marker, either as its own
//! subfolder or as an inline suffix on the album folder. The flat layout
//! refuses album names carrying a disc marker so a path never matches both.

use regex::{Captures, Regex};
use std::path::{Component, Path, PathBuf};

lazy_static::lazy_static! {
    static ref FLAT_LAYOUT: Regex = Regex::new(
        r"(?i)(?:^|[\\/])(?P<artist>[^\\/]+)[\\/](?P<year>\d{4}) - (?P<album>[^\\/]+)[\\/](?P<track>\d{2}|\d-\d{2}) - (?P<title>[^\\/]+)\.(?P<ext>[^.\\/]+)$"
    ).unwrap();

    static ref DISC_LAYOUT: Regex = Regex::new(
        r"(?i)(?:^|[\\/])(?P<artist>[^\\/]+)[\\/](?P<year>\d{4}) - (?P<album>[^\\/]+?)(?: - (?:disc|cd)\s*(?P<inline_disc>\d+))?[\\/](?:(?:disc|cd)\s*(?P<sub_disc>\d+)[\\/])?(?P<track>\d{2}|\d-\d{2}) - (?P<title>[^\\/]+)\.(?P<ext>[^.\\/]+)$"
    ).unwrap();

    static ref DISC_MARKER: Regex = Regex::new(r"(?i)\b(?:disc|cd)\s*\d+").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Flat,
    Disc,
}

/// What a matching path says about its track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutMatch {
    pub layout: Layout,
    pub artist: String,
    /// The artist folder, located by position rather than by name.
    pub artist_dir: PathBuf,
    pub year: u32,
    pub album: String,
    pub disc: Option<u32>,
    pub track: u32,
    pub title: String,
}

pub fn matches_flat_album_layout(full_path: &Path) -> Option<LayoutMatch> {
    let text = full_path.to_string_lossy();
    let caps = FLAT_LAYOUT.captures(&text)?;

    if DISC_MARKER.is_match(&caps["album"]) {
        return None;
    }

    build_match(&text, &caps, Layout::Flat, None)
}

pub fn matches_disc_album_layout(full_path: &Path) -> Option<LayoutMatch> {
    let text = full_path.to_string_lossy();
    let caps = DISC_LAYOUT.captures(&text)?;

    let disc = caps
        .name("sub_disc")
        .or_else(|| caps.name("inline_disc"))
        .and_then(|m| m.as_str().parse::<u32>().ok())?;

    build_match(&text, &caps, Layout::Disc, Some(disc))
}

/// Flat layout first, then disc layout; first match wins.
pub fn match_layout(full_path: &Path) -> Option<LayoutMatch> {
    matches_flat_album_layout(full_path).or_else(|| matches_disc_album_layout(full_path))
}

/// Rebuild the path prefix up to and including the first component named
/// `artist_segment`.
pub fn extract_artist_folder_path(full_path: &Path, artist_segment: &str) -> Option<PathBuf> {
    let mut prefix = PathBuf::new();
    for component in full_path.components() {
        prefix.push(component.as_os_str());
        if let Component::Normal(name) = component {
            if name.to_string_lossy() == artist_segment {
                return Some(prefix);
            }
        }
    }
    None
}

pub fn has_disc_marker(name: &str) -> bool {
    DISC_MARKER.is_match(name)
}

fn build_match(
    text: &str,
    caps: &Captures<'_>,
    layout: Layout,
    folder_disc: Option<u32>,
) -> Option<LayoutMatch> {
    let year = caps["year"].parse::<u32>().ok()?;
    let (track_disc, track) = parse_track_spec(&caps["track"])?;
    let artist_end = caps.name("artist")?.end();
    let artist_dir = PathBuf::from(&text[..artist_end]);

    Some(LayoutMatch {
        layout,
        artist: caps["artist"].to_string(),
        artist_dir,
        year,
        album: caps["album"].trim().to_string(),
        disc: folder_disc.or(track_disc),
        track,
        title: caps["title"].trim().to_string(),
    })
}

/// `NN` or `N-NN`.
fn parse_track_spec(spec: &str) -> Option<(Option<u32>, u32)> {
    match spec.split_once('-') {
        Some((disc, track)) => Some((Some(disc.parse().ok()?), track.parse().ok()?)),
        None => Some((None, spec.parse().ok()?)),
    }
}
