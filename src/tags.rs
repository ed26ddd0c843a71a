//! Embedded tag access.
//!
//! The classification engine only needs to know whether a file opens; the
//! tagger reads and writes a small set of named fields. Both go through the
//! `TagLibrary` trait so scans can run against fake audio in tests.

use lofty::config::WriteOptions;
use lofty::prelude::{Accessor, ItemKey, TagExt, TaggedFileExt};
use lofty::probe::Probe;
use lofty::tag::{ItemValue, Tag, TagItem};
use std::path::Path;
use tracing::debug;

use crate::error::Error;

/// The fields this toolkit manages. Empty lists and `None` mean "not set"
/// when reading and "leave unchanged" when writing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackTags {
    pub title: Option<String>,
    pub performers: Vec<String>,
    pub album_artists: Vec<String>,
    pub album: Option<String>,
    pub year: Option<u32>,
    pub track: Option<u32>,
    pub disc: Option<u32>,
    pub genres: Vec<String>,
    pub comment: Option<String>,
    pub composers: Vec<String>,
}

impl TrackTags {
    pub fn is_empty(&self) -> bool {
        *self == TrackTags::default()
    }
}

pub trait TagLibrary: Send + Sync {
    /// Open the file and parse its container. Any failure means the file is
    /// treated as corrupted.
    fn probe(&self, path: &Path) -> Result<(), Error>;

    fn read(&self, path: &Path) -> Result<TrackTags, Error>;

    /// Apply every set field of `tags` to the file and persist it.
    fn write(&self, path: &Path, tags: &TrackTags) -> Result<(), Error>;
}

/// `TagLibrary` backed by lofty.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoftyTags;

impl TagLibrary for LoftyTags {
    fn probe(&self, path: &Path) -> Result<(), Error> {
        Probe::open(path)
            .and_then(|probe| probe.read())
            .map(|_| ())
            .map_err(|e| Error::tag(path, e.to_string()))
    }

    fn read(&self, path: &Path) -> Result<TrackTags, Error> {
        let tagged_file = lofty::read_from_path(path).map_err(|e| Error::tag(path, e.to_string()))?;

        let mut tags = TrackTags::default();
        let Some(tag) = tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) else {
            return Ok(tags);
        };

        tags.title = tag.title().map(|v| v.to_string());
        tags.album = tag.album().map(|v| v.to_string());
        tags.year = tag.year();
        tags.track = tag.track();
        tags.disc = tag.disk();
        tags.comment = tag.comment().map(|v| v.to_string());
        tags.performers = collect_strings(tag, &ItemKey::TrackArtist);
        tags.album_artists = collect_strings(tag, &ItemKey::AlbumArtist);
        tags.genres = collect_strings(tag, &ItemKey::Genre);
        tags.composers = collect_strings(tag, &ItemKey::Composer);

        Ok(tags)
    }

    fn write(&self, path: &Path, tags: &TrackTags) -> Result<(), Error> {
        let mut tagged_file = Probe::open(path)
            .and_then(|probe| probe.read())
            .map_err(|e| Error::tag(path, e.to_string()))?;

        let tag_type = tagged_file.primary_tag_type();
        if tagged_file.tag(tag_type).is_none() {
            tagged_file.insert_tag(Tag::new(tag_type));
        }
        let tag = tagged_file
            .tag_mut(tag_type)
            .ok_or_else(|| Error::tag(path, "file has no writable tag"))?;

        if let Some(title) = &tags.title {
            tag.set_title(title.clone());
        }
        if let Some(album) = &tags.album {
            tag.set_album(album.clone());
        }
        if let Some(year) = tags.year {
            tag.set_year(year);
        }
        if let Some(track) = tags.track {
            tag.set_track(track);
        }
        if let Some(disc) = tags.disc {
            tag.set_disk(disc);
        }
        if let Some(comment) = &tags.comment {
            tag.set_comment(comment.clone());
        }
        replace_strings(tag, ItemKey::TrackArtist, &tags.performers);
        replace_strings(tag, ItemKey::AlbumArtist, &tags.album_artists);
        replace_strings(tag, ItemKey::Genre, &tags.genres);
        replace_strings(tag, ItemKey::Composer, &tags.composers);

        tag.save_to_path(path, WriteOptions::default())
            .map_err(|e| Error::tag(path, e.to_string()))?;

        debug!("Wrote tags to {}", path.display());
        Ok(())
    }
}

fn collect_strings(tag: &Tag, key: &ItemKey) -> Vec<String> {
    tag.get_strings(key).map(|s| s.to_string()).collect()
}

fn replace_strings(tag: &mut Tag, key: ItemKey, values: &[String]) {
    if values.is_empty() {
        return;
    }
    tag.remove_key(&key);
    for value in values {
        tag.push(TagItem::new(key.clone(), ItemValue::Text(value.clone())));
    }
}
