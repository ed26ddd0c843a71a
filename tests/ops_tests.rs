mod common;

use std::fs;
use std::path::Path;
use tempfile::tempdir;

use common::{default_options, touch, FakeTags};
use music_tidy::classify::Validator;
use music_tidy::journal::read_entries;
use music_tidy::ops::{
    move_library, replay, tag_library, ReplayAction, ReplayReport, TagOptions, TagReport,
};
use music_tidy::{Journal, LogFormat};

/// Music/
///   Nirvana/1991 - Nevermind/{01 - Breed.mp3, 02 - Lithium.mp3, bonus.mp3, cover.jpg}
///   Muse/2001 - Origin of Symmetry/01 - New Born.mp3
///   Loose/track.mp3
fn build_library(root: &Path) {
    let nevermind = root.join("Nirvana/1991 - Nevermind");
    touch(&nevermind.join("01 - Breed.mp3"), "audio");
    touch(&nevermind.join("02 - Lithium.mp3"), "audio");
    touch(&nevermind.join("bonus.mp3"), "audio");
    touch(&nevermind.join("cover.jpg"), "jpeg");
    touch(
        &root.join("Muse/2001 - Origin of Symmetry/01 - New Born.mp3"),
        "audio",
    );
    touch(&root.join("Loose/track.mp3"), "audio");
}

#[test]
fn test_tag_library_writes_layout_tags() {
    let tmp = tempdir().unwrap();
    let music = tmp.path().join("Music");
    build_library(&music);

    let tags = FakeTags::default();
    let options = default_options();
    let validator = Validator::new(&tags, &options);
    let tag_options = TagOptions {
        genre: Some("Rock".to_string()),
        ..Default::default()
    };

    let report = tag_library(&validator, &music, &tag_options, None).unwrap();
    assert_eq!(
        report,
        TagReport {
            folders: 2,
            tagged: 3,
            skipped: 1,
            failed: 0,
        }
    );

    let written = tags.written();
    assert!(written.iter().all(|(path, _)| !path.starts_with(music.join("Loose"))));
    let (_, breed) = written
        .iter()
        .find(|(path, _)| path.ends_with("01 - Breed.mp3"))
        .unwrap();
    assert_eq!(breed.title.as_deref(), Some("Breed"));
    assert_eq!(breed.performers, vec!["Nirvana"]);
    assert_eq!(breed.album.as_deref(), Some("Nevermind"));
    assert_eq!(breed.year, Some(1991));
    assert_eq!(breed.track, Some(1));
    assert_eq!(breed.genres, vec!["Rock"]);
}

#[test]
fn test_tag_failures_are_counted_not_fatal() {
    let tmp = tempdir().unwrap();
    let music = tmp.path().join("Music");
    let album = music.join("Nirvana/1991 - Nevermind");
    touch(&album.join("01 - Breed.mp3"), "audio");
    touch(&album.join("02 - Lithium.mp3"), "READONLY");
    let log_path = tmp.path().join("tag.jsonl");

    let tags = FakeTags::default();
    let options = default_options();
    let validator = Validator::new(&tags, &options);
    let report = {
        let mut journal = Journal::create(&log_path, LogFormat::Json).unwrap();
        tag_library(&validator, &music, &TagOptions::default(), Some(&mut journal)).unwrap()
    };
    assert_eq!(report.tagged, 1);
    assert_eq!(report.failed, 1);

    let entries = read_entries(&log_path).unwrap();
    let tag_entry = entries.iter().find(|e| e.function == "tag").unwrap();
    assert_eq!(tag_entry.status, "Bad");
    assert_eq!(tag_entry.path, music.join("Nirvana").to_string_lossy());
}

#[test]
fn test_tag_dry_run_writes_nothing() {
    let tmp = tempdir().unwrap();
    let music = tmp.path().join("Music");
    build_library(&music);

    let tags = FakeTags::default();
    let options = default_options();
    let validator = Validator::new(&tags, &options);
    let tag_options = TagOptions {
        dry_run: true,
        ..Default::default()
    };

    let report = tag_library(&validator, &music, &tag_options, None).unwrap();
    assert_eq!(report.tagged, 3);
    assert!(tags.written().is_empty());
}

#[test]
fn test_move_library_moves_and_merges_good_artists() {
    let tmp = tempdir().unwrap();
    let music = tmp.path().join("Music");
    build_library(&music);
    let dest = tmp.path().join("Sorted");
    touch(&dest.join("Muse/2003 - Absolution/01 - Apocalypse.mp3"), "audio");

    let tags = FakeTags::default();
    let options = default_options();
    let validator = Validator::new(&tags, &options);
    let report = move_library(&validator, &music, &dest, false, None).unwrap();

    assert_eq!(report.moved, 1);
    assert_eq!(report.merged, 1);
    assert_eq!(report.failed, 0);

    assert!(dest.join("Nirvana/1991 - Nevermind/01 - Breed.mp3").exists());
    assert!(dest.join("Nirvana/1991 - Nevermind/cover.jpg").exists());
    assert!(dest
        .join("Muse/2001 - Origin of Symmetry/01 - New Born.mp3")
        .exists());
    assert!(dest.join("Muse/2003 - Absolution/01 - Apocalypse.mp3").exists());
    assert!(!music.join("Nirvana").exists());
    assert!(!music.join("Muse").exists());
    // bad folders stay where they are
    assert!(music.join("Loose/track.mp3").exists());
}

#[test]
fn test_move_dry_run_touches_nothing() {
    let tmp = tempdir().unwrap();
    let music = tmp.path().join("Music");
    build_library(&music);
    let dest = tmp.path().join("Sorted");

    let tags = FakeTags::default();
    let options = default_options();
    let validator = Validator::new(&tags, &options);
    let report = move_library(&validator, &music, &dest, true, None).unwrap();

    assert_eq!(report.moved, 2);
    assert!(music.join("Nirvana/1991 - Nevermind/01 - Breed.mp3").exists());
    assert!(!dest.exists());
}

#[test]
fn test_replay_revalidates_before_acting() {
    let tmp = tempdir().unwrap();
    let music = tmp.path().join("Music");
    build_library(&music);
    let log_path = tmp.path().join("validate.jsonl");

    let tags = FakeTags::default();
    let options = default_options();
    let validator = Validator::new(&tags, &options);
    {
        let mut journal = Journal::create(&log_path, LogFormat::Json).unwrap();
        validator
            .validate_detailed(&music, Some(&mut journal))
            .unwrap();
    }

    // Muse goes bad after it was logged as good
    fs::remove_dir_all(music.join("Muse/2001 - Origin of Symmetry")).unwrap();

    let action = ReplayAction::Tag(TagOptions::default());
    let report = replay(&validator, &log_path, &action, None).unwrap();
    assert_eq!(
        report,
        ReplayReport {
            candidates: 2,
            replayed: 1,
            refused: 1,
            failed: 0,
        }
    );
    assert!(tags
        .written()
        .iter()
        .all(|(path, _)| path.starts_with(music.join("Nirvana"))));
    assert_eq!(tags.written().len(), 2);
}

#[test]
fn test_replay_move() {
    let tmp = tempdir().unwrap();
    let music = tmp.path().join("Music");
    build_library(&music);
    let log_path = tmp.path().join("validate.jsonl");
    let dest = tmp.path().join("Sorted");

    let tags = FakeTags::default();
    let options = default_options();
    let validator = Validator::new(&tags, &options);
    {
        let mut journal = Journal::create(&log_path, LogFormat::Json).unwrap();
        validator
            .validate_detailed(&music, Some(&mut journal))
            .unwrap();
    }

    let action = ReplayAction::Move {
        destination: dest.clone(),
        dry_run: false,
    };
    let replay_log = tmp.path().join("replay.jsonl");
    let report = {
        let mut journal = Journal::create(&replay_log, LogFormat::Json).unwrap();
        replay(&validator, &log_path, &action, Some(&mut journal)).unwrap()
    };

    assert_eq!(report.replayed, 2);
    assert!(dest.join("Nirvana/1991 - Nevermind/02 - Lithium.mp3").exists());
    assert!(dest.join("Muse").is_dir());
    assert!(music.join("Loose").is_dir());

    let entries = read_entries(&replay_log).unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.function == "move" && e.status == "Good"));
}

#[test]
fn test_replay_missing_log_is_an_error() {
    let tmp = tempdir().unwrap();
    let tags = FakeTags::default();
    let options = default_options();
    let validator = Validator::new(&tags, &options);
    let action = ReplayAction::Tag(TagOptions::default());

    assert!(replay(&validator, &tmp.path().join("missing.jsonl"), &action, None).is_err());
}
