mod common;

use std::fs;
use std::path::Path;
use tempfile::tempdir;

use common::{default_options, exts, touch, FakeTags};
use music_tidy::classify::{Reason, Status, ValidateOptions, ValidationResult, Validator, Validity};
use music_tidy::journal::read_entries;
use music_tidy::{Error, Journal, LogFormat};

fn result_for<'a>(results: &'a [ValidationResult], path: &Path) -> &'a ValidationResult {
    results
        .iter()
        .find(|r| r.path == path)
        .unwrap_or_else(|| panic!("no result for {}", path.display()))
}

#[test]
fn test_single_good_artist_folder() {
    let tmp = tempdir().unwrap();
    let music = tmp.path().join("Music");
    touch(
        &music.join("Nirvana/1991 - Nevermind/01 - Smells Like Teen Spirit.mp3"),
        "audio",
    );

    let tags = FakeTags::default();
    let options = default_options();
    let validator = Validator::new(&tags, &options);

    let good = validator
        .validate_simple(&music, Validity::Good, None)
        .unwrap();
    assert_eq!(good, vec![music.join("Nirvana")]);

    let results = validator.validate_detailed(&music, None).unwrap();
    let artist = result_for(&results, &music.join("Nirvana"));
    assert!(artist.is_valid);
    assert_eq!(artist.reason, Reason::Valid);
    assert_eq!(artist.status, Status::Good);

    let album = result_for(&results, &music.join("Nirvana/1991 - Nevermind"));
    assert_eq!(album.status, Status::Good);
    assert_eq!(album.unit_path, music.join("Nirvana"));
}

#[test]
fn test_bad_album_name_is_bad_structure_on_its_folder() {
    let tmp = tempdir().unwrap();
    let music = tmp.path().join("Music");
    let album = music.join("BadArtist/NotAYear - Album");
    touch(&album.join("track.mp3"), "audio");

    let tags = FakeTags::default();
    let options = default_options();
    let validator = Validator::new(&tags, &options);
    let results = validator.validate_detailed(&music, None).unwrap();

    let bad = result_for(&results, &album);
    assert_eq!(bad.reason, Reason::BadStructure);
    assert_eq!(bad.status, Status::Bad);
    assert!(!bad.is_valid);
    assert_eq!(bad.unit_path, album);

    let bad_units = validator
        .validate_simple(&music, Validity::Bad, None)
        .unwrap();
    assert!(bad_units.contains(&album));
    assert!(validator
        .validate_simple(&music, Validity::Good, None)
        .unwrap()
        .is_empty());
}

#[test]
fn test_disc_folders_validate_through_their_own_tracks() {
    let tmp = tempdir().unwrap();
    let music = tmp.path().join("Music");
    touch(
        &music.join("Pink Floyd/1979 - The Wall/Disc 1/01 - In The Flesh.mp3"),
        "audio",
    );
    touch(
        &music.join("Pink Floyd/1979 - The Wall/Disc 2/01 - Hey You.mp3"),
        "audio",
    );

    let tags = FakeTags::default();
    let options = default_options();
    let validator = Validator::new(&tags, &options);
    let results = validator.validate_detailed(&music, None).unwrap();

    // no direct audio in the album folder, so neither it nor the artist qualifies
    for folder in ["Pink Floyd", "Pink Floyd/1979 - The Wall"] {
        let result = result_for(&results, &music.join(folder));
        assert_eq!(result.reason, Reason::NoMusicFiles, "{}", folder);
        assert_eq!(result.unit_path, music.join(folder));
    }
    for folder in [
        "Pink Floyd/1979 - The Wall/Disc 1",
        "Pink Floyd/1979 - The Wall/Disc 2",
    ] {
        let result = result_for(&results, &music.join(folder));
        assert_eq!(result.status, Status::Good, "{}", folder);
        assert_eq!(result.unit_path, music.join("Pink Floyd"));
    }

    let good = validator
        .validate_simple(&music, Validity::Good, None)
        .unwrap();
    assert_eq!(good, vec![music.join("Pink Floyd")]);
}

#[test]
fn test_loose_disc_folder_does_not_lend_audio_to_its_parent() {
    let tmp = tempdir().unwrap();
    let downloads = tmp.path().join("Downloads");
    touch(&downloads.join("CD1/01 - Track.mp3"), "audio");

    let tags = FakeTags::default();
    let options = default_options();
    let validator = Validator::new(&tags, &options);
    let result = validator.validate_folder(&downloads);

    assert_eq!(result.reason, Reason::NoMusicFiles);
    assert_eq!(result.unit_path, downloads);
    assert!(tags.probed().is_empty());
}

#[test]
fn test_empty_and_no_music_are_distinct() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("lib");
    let empty = root.join("Empty");
    let covers = root.join("Covers");
    fs::create_dir_all(&empty).unwrap();
    touch(&covers.join("cover.jpg"), "jpeg");

    let tags = FakeTags::default();
    let options = default_options();
    let validator = Validator::new(&tags, &options);
    let results = validator.validate_detailed(&root, None).unwrap();

    assert_eq!(result_for(&results, &empty).reason, Reason::Empty);
    assert_eq!(result_for(&results, &covers).reason, Reason::NoMusicFiles);
    assert_eq!(result_for(&results, &empty).status, Status::Bad);
    assert!(tags.probed().is_empty());
}

#[test]
fn test_unreadable_representative_is_corrupted() {
    let tmp = tempdir().unwrap();
    let music = tmp.path().join("Music");
    touch(&music.join("Broken/2000 - Album/01 - Song.mp3"), "CORRUPT");

    let tags = FakeTags::default();
    let options = default_options();
    let validator = Validator::new(&tags, &options);
    let results = validator.validate_detailed(&music, None).unwrap();

    let artist = result_for(&results, &music.join("Broken"));
    assert_eq!(artist.reason, Reason::CorruptedFile);
    assert_eq!(artist.status, Status::Bad);
    assert!(artist.details.contains("01 - Song.mp3"));
}

#[test]
fn test_extension_order_picks_representative() {
    let tmp = tempdir().unwrap();
    let album = tmp.path().join("Music/Artist/2000 - Album");
    // the flac sorts first by name, but mp3 comes first in the extension list
    touch(&album.join("00 - Intro.flac"), "CORRUPT");
    touch(&album.join("01 - Song.mp3"), "audio");

    let tags = FakeTags::default();
    let options = default_options();
    let validator = Validator::new(&tags, &options);
    let result = validator.validate_folder(&album);

    assert_eq!(result.status, Status::Good);
    assert_eq!(tags.probed(), vec![album.join("01 - Song.mp3")]);
}

#[test]
fn test_skip_list_excludes_whole_subtree() {
    let tmp = tempdir().unwrap();
    let music = tmp.path().join("music");
    let various = music.join("Various");
    touch(&various.join("01 - Loose.mp3"), "audio");
    touch(&various.join("Nested/1990 - Deep/01 - Track.mp3"), "audio");
    touch(&music.join("Various Artists/2000 - Hits/01 - Hit.mp3"), "audio");

    let options = ValidateOptions::new(&[various.to_string_lossy().into_owned()], &exts()).unwrap();
    let tags = FakeTags::default();
    let validator = Validator::new(&tags, &options);
    let results = validator.validate_detailed(&music, None).unwrap();

    let under_various: Vec<&ValidationResult> = results
        .iter()
        .filter(|r| r.path.starts_with(&various))
        .collect();
    assert_eq!(under_various.len(), 3);
    for result in under_various {
        assert_eq!(result.reason, Reason::Skipped, "{}", result.path.display());
        assert_eq!(result.status, Status::Skipped);
    }
    assert!(tags.probed().iter().all(|p| !p.starts_with(&various)));

    // a sibling sharing the prefix text is not skipped
    let sibling = result_for(&results, &music.join("Various Artists"));
    assert_ne!(sibling.reason, Reason::Skipped);
}

#[test]
fn test_skipped_album_does_not_vouch_for_its_artist() {
    let tmp = tempdir().unwrap();
    let music = tmp.path().join("music");
    let skipped = music.join("Nirvana/1991 - Nevermind");
    touch(&skipped.join("01 - Breed.mp3"), "audio");
    let kept = music.join("Muse/2001 - Origin of Symmetry");
    touch(&kept.join("01 - New Born.mp3"), "audio");
    let also_skipped = music.join("Muse/1999 - Showbiz");
    touch(&also_skipped.join("01 - Sunburn.mp3"), "CORRUPT");

    let skip = [
        skipped.to_string_lossy().into_owned(),
        also_skipped.to_string_lossy().into_owned(),
    ];
    let options = ValidateOptions::new(&skip, &exts()).unwrap();
    let tags = FakeTags::default();
    let validator = Validator::new(&tags, &options);
    let results = validator.validate_detailed(&music, None).unwrap();

    let nirvana = result_for(&results, &music.join("Nirvana"));
    assert_eq!(nirvana.reason, Reason::NoMusicFiles);
    assert_eq!(result_for(&results, &skipped).reason, Reason::Skipped);

    // the corrupt skipped album sorts first but is never opened
    let muse = result_for(&results, &music.join("Muse"));
    assert_eq!(muse.status, Status::Good);
    assert!(tags
        .probed()
        .iter()
        .all(|p| !p.starts_with(&skipped) && !p.starts_with(&also_skipped)));
}

#[test]
fn test_blacklist_pattern_skips_matches() {
    let tmp = tempdir().unwrap();
    let music = tmp.path().join("Music");
    touch(&music.join("Nirvana/1991 - Nevermind/01 - Breed.mp3"), "audio");
    fs::create_dir_all(music.join("Nirvana/@eaDir/SYNOINDEX")).unwrap();

    let mut config = music_tidy::AppConfig::default();
    config.blacklist_patterns = vec!["**/@eaDir".to_string()];
    let options = ValidateOptions::from_config(&config).unwrap();
    let tags = FakeTags::default();
    let validator = Validator::new(&tags, &options);
    let results = validator.validate_detailed(&music, None).unwrap();

    let hidden = result_for(&results, &music.join("Nirvana/@eaDir"));
    assert_eq!(hidden.reason, Reason::Skipped);
    assert!(hidden.details.contains("@eaDir"));

    let nested = result_for(&results, &music.join("Nirvana/@eaDir/SYNOINDEX"));
    assert_eq!(nested.reason, Reason::Skipped);
    assert!(nested.details.contains("@eaDir"));
}

#[test]
fn test_validation_is_idempotent() {
    let tmp = tempdir().unwrap();
    let music = tmp.path().join("Music");
    touch(&music.join("Nirvana/1991 - Nevermind/01 - Breed.mp3"), "audio");
    touch(&music.join("Loose/track.mp3"), "audio");
    touch(&music.join("Broken/2000 - X/01 - Y.mp3"), "CORRUPT");
    fs::create_dir_all(music.join("Empty")).unwrap();

    let tags = FakeTags::default();
    let options = default_options();
    let validator = Validator::new(&tags, &options);

    let first = validator.validate_detailed(&music, None).unwrap();
    let second = validator.validate_detailed(&music, None).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_missing_start_path_is_an_error() {
    let tmp = tempdir().unwrap();
    let tags = FakeTags::default();
    let options = default_options();
    let validator = Validator::new(&tags, &options);

    let err = validator
        .validate_detailed(&tmp.path().join("nope"), None)
        .unwrap_err();
    assert!(matches!(err, Error::StartPathNotFound(_)));
    assert!(validator.validate_detailed(Path::new(""), None).is_err());
}

#[test]
fn test_journal_logs_each_unit_once_per_run() {
    let tmp = tempdir().unwrap();
    let music = tmp.path().join("Music");
    touch(&music.join("Nirvana/1991 - Nevermind/01 - Breed.mp3"), "audio");
    touch(&music.join("Nirvana/1993 - In Utero/01 - Serve.mp3"), "audio");
    let log_path = tmp.path().join("logs/validate.jsonl");

    let tags = FakeTags::default();
    let options = default_options();
    let validator = Validator::new(&tags, &options);
    {
        let mut journal = Journal::create(&log_path, LogFormat::Json).unwrap();
        validator
            .validate_detailed(&music, Some(&mut journal))
            .unwrap();
    }

    let entries = read_entries(&log_path).unwrap();
    let nirvana = music.join("Nirvana").to_string_lossy().into_owned();
    let good: Vec<_> = entries.iter().filter(|e| e.status == "Good").collect();
    assert_eq!(good.len(), 1);
    assert_eq!(good[0].path, nirvana);
    assert_eq!(good[0].function, "validate");
    assert_eq!(good[0].reason.as_deref(), Some("Valid"));

    // the start folder has no audio of its own
    let bad: Vec<_> = entries.iter().filter(|e| e.status == "Bad").collect();
    assert_eq!(bad.len(), 1);
    assert_eq!(bad[0].reason.as_deref(), Some("NoMusicFiles"));

    // a second run into the same file repeats its own entries
    {
        let mut journal = Journal::open_append(&log_path, LogFormat::Json).unwrap();
        validator
            .validate_detailed(&music, Some(&mut journal))
            .unwrap();
    }
    assert_eq!(read_entries(&log_path).unwrap().len(), 4);
}

#[test]
fn test_require_good_refuses_bad_folders() {
    let tmp = tempdir().unwrap();
    let music = tmp.path().join("Music");
    touch(&music.join("Nirvana/1991 - Nevermind/01 - Breed.mp3"), "audio");
    fs::create_dir_all(music.join("Empty")).unwrap();

    let tags = FakeTags::default();
    let options = default_options();
    let validator = Validator::new(&tags, &options);

    assert!(validator.require_good(&music.join("Nirvana")).is_ok());
    let err = validator.require_good(&music.join("Empty")).unwrap_err();
    assert!(matches!(err, Error::NotGood { .. }));
    assert!(validator.require_good(&music.join("Gone")).is_err());
}
