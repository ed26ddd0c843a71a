//! Semantic folder classification for human review.
//!
//! Unlike validation this never gates an action. It looks at one folder,
//! collects a few counts, and walks an ordered rule table; the first rule
//! that applies decides the structure type, its confidence, and the advice
//! attached to it.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

use crate::classify::validate::{ValidateOptions, ALBUM_FOLDER};
use crate::error::Error;
use crate::journal::{Journal, LogEntry};
use crate::scanner::walk::{folder_name, has_audio_extension};
use crate::scanner::{audio_files_recursive, list_directories, read_children};

lazy_static::lazy_static! {
    static ref DISC_FOLDER: Regex = Regex::new(r"(?i)(disc|cd)\s*\d+").unwrap();
    static ref COMPILATION_FOLDER: Regex = Regex::new(r"^\d{4} - .+ - .+$").unwrap();
    static ref DRIVE_ROOT: Regex = Regex::new(r"^(?:[A-Za-z]:[\\/]?|[\\/])$").unwrap();
    static ref HOLDING_WORDS: Regex = Regex::new(r"(?i)\b(?:compilations?|temp|backup)\b").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StructureType {
    ArtistFolder,
    SimpleAlbum,
    MixedAlbum,
    MultiDiscAlbum,
    CompilationFolder,
    AmbiguousStructure,
    NonMusicFolder,
}

impl StructureType {
    pub fn as_str(self) -> &'static str {
        match self {
            StructureType::ArtistFolder => "ArtistFolder",
            StructureType::SimpleAlbum => "SimpleAlbum",
            StructureType::MixedAlbum => "MixedAlbum",
            StructureType::MultiDiscAlbum => "MultiDiscAlbum",
            StructureType::CompilationFolder => "CompilationFolder",
            StructureType::AmbiguousStructure => "AmbiguousStructure",
            StructureType::NonMusicFolder => "NonMusicFolder",
        }
    }
}

impl fmt::Display for StructureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A heuristic score in `[0.1, 1.0]`, rounded to two decimals.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct Confidence(f64);

impl Confidence {
    pub const FLOOR: f64 = 0.1;

    pub fn new(value: f64) -> Self {
        let rounded = (value * 100.0).round() / 100.0;
        Confidence(rounded.clamp(Self::FLOOR, 1.0))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AnalysisMetadata {
    pub direct_audio_files: usize,
    pub subfolders: usize,
    pub album_subfolders: usize,
    pub disc_subfolders: usize,
    pub compilation_subfolders: usize,
    pub total_audio_files: usize,
    pub album_audio_files: usize,
    pub has_direct_audio: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructureAnalysis {
    pub path: PathBuf,
    pub folder_name: String,
    pub structure_type: StructureType,
    pub confidence: Confidence,
    pub details: Vec<String>,
    pub recommendations: Vec<String>,
    pub metadata: AnalysisMetadata,
}

struct Facts {
    name: String,
    suspicious_name: bool,
    name_is_album: bool,
    meta: AnalysisMetadata,
}

impl Facts {
    fn plain_album_subfolders(&self) -> usize {
        self.meta.album_subfolders - self.meta.compilation_subfolders
    }
}

struct Verdict {
    structure_type: StructureType,
    confidence: f64,
    details: Vec<String>,
    recommendations: Vec<String>,
}

struct Rule {
    applies: fn(&Facts) -> bool,
    classify: fn(&Facts) -> Verdict,
}

/// Most specific first; order is the tie-break.
static RULES: &[Rule] = &[
    Rule {
        applies: is_artist_folder,
        classify: artist_folder,
    },
    Rule {
        applies: is_single_album,
        classify: single_album,
    },
    Rule {
        applies: is_mixed_album,
        classify: mixed_album,
    },
    Rule {
        applies: is_compilation_folder,
        classify: compilation_folder,
    },
    Rule {
        applies: is_disc_set,
        classify: disc_set,
    },
    Rule {
        applies: has_any_audio,
        classify: ambiguous,
    },
    Rule {
        applies: always,
        classify: non_music,
    },
];

pub fn analyze(path: &Path, audio_extensions: &[String]) -> Result<StructureAnalysis, Error> {
    let facts = gather_facts(path, audio_extensions)?;

    let rule = RULES
        .iter()
        .find(|rule| (rule.applies)(&facts))
        .unwrap_or(&RULES[RULES.len() - 1]);
    let verdict = (rule.classify)(&facts);

    debug!(
        "{} classified as {} ({:.2})",
        path.display(),
        verdict.structure_type,
        verdict.confidence
    );

    Ok(StructureAnalysis {
        path: path.to_path_buf(),
        folder_name: facts.name,
        structure_type: verdict.structure_type,
        confidence: Confidence::new(verdict.confidence),
        details: verdict.details,
        recommendations: verdict.recommendations,
        metadata: facts.meta,
    })
}

/// Analyze `start` and every non-excluded folder beneath it. Folders that
/// cannot be read are reported and skipped.
pub fn analyze_tree(
    start: &Path,
    options: &ValidateOptions,
    mut journal: Option<&mut Journal>,
) -> Result<Vec<StructureAnalysis>, Error> {
    let mut analyses = Vec::new();

    for folder in list_directories(start)? {
        if options.skip.excluded(&folder).is_some() {
            continue;
        }
        match analyze(&folder, &options.audio_extensions) {
            Ok(analysis) => {
                if let Some(journal) = journal.as_deref_mut() {
                    if let Err(e) = journal.append(&LogEntry::analysis(&analysis)) {
                        error!("Failed to log analysis for {}: {}", folder.display(), e);
                    }
                }
                analyses.push(analysis);
            }
            Err(e) => warn!("Unable to analyze {}: {}", folder.display(), e),
        }
    }

    Ok(analyses)
}

fn gather_facts(path: &Path, audio_extensions: &[String]) -> Result<Facts, Error> {
    let (subfolders, files) = read_children(path)?;
    let name = folder_name(path);

    let mut meta = AnalysisMetadata {
        direct_audio_files: files
            .iter()
            .filter(|f| has_audio_extension(f, audio_extensions))
            .count(),
        subfolders: subfolders.len(),
        ..Default::default()
    };
    meta.has_direct_audio = meta.direct_audio_files > 0;

    for dir in &subfolders {
        let sub_name = folder_name(dir);
        if DISC_FOLDER.is_match(&sub_name) {
            meta.disc_subfolders += 1;
        }
        if ALBUM_FOLDER.is_match(&sub_name) {
            meta.album_subfolders += 1;
            meta.album_audio_files += audio_files_recursive(dir, audio_extensions).len();
            if COMPILATION_FOLDER.is_match(&sub_name) {
                meta.compilation_subfolders += 1;
            }
        }
    }
    meta.total_audio_files = audio_files_recursive(path, audio_extensions).len();

    Ok(Facts {
        suspicious_name: DRIVE_ROOT.is_match(&name) || HOLDING_WORDS.is_match(&name),
        name_is_album: ALBUM_FOLDER.is_match(&name),
        name,
        meta,
    })
}

fn is_artist_folder(f: &Facts) -> bool {
    f.plain_album_subfolders() >= 1 && !f.meta.has_direct_audio && f.meta.album_audio_files > 0
}

fn artist_folder(f: &Facts) -> Verdict {
    let mut confidence = 0.9;
    let mut details = vec![
        format!(
            "{} album folders named 'YYYY - Album'",
            f.plain_album_subfolders()
        ),
        "No audio files directly in this folder".to_string(),
        format!(
            "{} audio files inside album folders",
            f.meta.album_audio_files
        ),
    ];
    let mut recommendations = vec!["Validate, tag and move as an artist folder".to_string()];

    if f.suspicious_name {
        confidence -= 0.3;
        details.push(format!(
            "Folder name '{}' looks like a drive root or holding folder",
            f.name
        ));
        recommendations.push("Check that this is really a single artist".to_string());
    }
    if f.plain_album_subfolders() < 2 {
        confidence -= 0.2;
        details.push("Only one album folder found".to_string());
        recommendations
            .push("Confirm this is an artist folder and not a misplaced album".to_string());
    }
    if f.meta.compilation_subfolders > 0 {
        recommendations.push(format!(
            "{} subfolders look like 'YYYY - Album - Artist' compilations; review them separately",
            f.meta.compilation_subfolders
        ));
    }

    Verdict {
        structure_type: StructureType::ArtistFolder,
        confidence,
        details,
        recommendations,
    }
}

fn is_single_album(f: &Facts) -> bool {
    f.meta.has_direct_audio && f.meta.album_subfolders == 0 && f.meta.subfolders <= 2
}

fn single_album(f: &Facts) -> Verdict {
    if f.meta.disc_subfolders > 0 {
        return Verdict {
            structure_type: StructureType::MultiDiscAlbum,
            confidence: 0.85,
            details: vec![
                format!("{} audio files directly in folder", f.meta.direct_audio_files),
                format!("{} disc subfolders", f.meta.disc_subfolders),
            ],
            recommendations: vec![
                "Keep disc subfolders as 'Disc N' under the album folder".to_string(),
                "Number tracks as N-NN if the discs are flattened".to_string(),
            ],
        };
    }

    let mut details = vec![format!(
        "{} audio files directly in folder",
        f.meta.direct_audio_files
    )];
    let mut recommendations = Vec::new();
    let confidence = if f.name_is_album {
        details.push("Folder name follows 'YYYY - Album'".to_string());
        recommendations.push("Place under an artist folder: Artist/YYYY - Album".to_string());
        0.8 + 0.1
    } else {
        details.push("Folder name does not follow 'YYYY - Album'".to_string());
        recommendations.push("Rename the folder to 'YYYY - Album'".to_string());
        recommendations.push("Then place it under an artist folder".to_string());
        0.8 - 0.2
    };

    Verdict {
        structure_type: StructureType::SimpleAlbum,
        confidence,
        details,
        recommendations,
    }
}

fn is_mixed_album(f: &Facts) -> bool {
    f.meta.has_direct_audio && f.meta.album_subfolders >= 1
}

fn mixed_album(f: &Facts) -> Verdict {
    Verdict {
        structure_type: StructureType::MixedAlbum,
        confidence: 0.3,
        details: vec![
            format!("{} audio files directly in folder", f.meta.direct_audio_files),
            format!(
                "{} album folders alongside them",
                f.meta.album_subfolders
            ),
        ],
        recommendations: vec![
            "MANUAL REVIEW REQUIRED: loose tracks sit next to release folders".to_string(),
            "Option 1: treat the root files as the album and ignore the subfolders".to_string(),
            "Option 2: treat each subfolder as a separate release".to_string(),
        ],
    }
}

fn is_compilation_folder(f: &Facts) -> bool {
    f.meta.compilation_subfolders >= 1 && !f.meta.has_direct_audio
}

fn compilation_folder(f: &Facts) -> Verdict {
    Verdict {
        structure_type: StructureType::CompilationFolder,
        confidence: 0.7,
        details: vec![format!(
            "{} subfolders named 'YYYY - Album - Artist'",
            f.meta.compilation_subfolders
        )],
        recommendations: vec![
            "Split releases out to their own artist folders, or skip this folder".to_string(),
        ],
    }
}

fn is_disc_set(f: &Facts) -> bool {
    f.meta.disc_subfolders > 1 && !f.meta.has_direct_audio
}

fn disc_set(f: &Facts) -> Verdict {
    let mut recommendations = Vec::new();
    if !f.name_is_album {
        recommendations.push("Rename the folder to 'YYYY - Album'".to_string());
    }
    recommendations.push("Keep discs as 'Disc N' subfolders".to_string());

    Verdict {
        structure_type: StructureType::MultiDiscAlbum,
        confidence: 0.8,
        details: vec![format!("{} disc subfolders", f.meta.disc_subfolders)],
        recommendations,
    }
}

fn has_any_audio(f: &Facts) -> bool {
    f.meta.total_audio_files > 0
}

fn ambiguous(f: &Facts) -> Verdict {
    Verdict {
        structure_type: StructureType::AmbiguousStructure,
        confidence: 0.2,
        details: vec![format!(
            "{} audio files below this folder, no recognizable layout",
            f.meta.total_audio_files
        )],
        recommendations: vec!["Inspect manually and reorganize".to_string()],
    }
}

fn always(_f: &Facts) -> bool {
    true
}

fn non_music(_f: &Facts) -> Verdict {
    Verdict {
        structure_type: StructureType::NonMusicFolder,
        confidence: 0.9,
        details: vec!["No audio files anywhere below this folder".to_string()],
        recommendations: vec!["Skip or add to the skip list".to_string()],
    }
}
