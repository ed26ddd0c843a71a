//! The structured event log: one record per classified folder or performed
//! action, written as JSON lines or plain text.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

use crate::classify::analyze::{AnalysisMetadata, StructureAnalysis};
use crate::classify::validate::ValidationResult;
use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(LogFormat::Text),
            "json" | "jsonl" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{}' (expected text or json)", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LogEntry {
    pub timestamp: String,
    pub status: String,
    pub path: String,
    pub function: String,
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure_details: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<AnalysisMetadata>,
}

impl LogEntry {
    pub fn new(status: &str, path: &Path, function: &str, kind: &str) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            status: status.to_string(),
            path: path.to_string_lossy().into_owned(),
            function: function.to_string(),
            kind: kind.to_string(),
            reason: None,
            details: None,
            structure_type: None,
            confidence: None,
            structure_details: None,
            recommendations: None,
            metadata: None,
        }
    }

    /// A validation outcome, logged against its canonical unit path.
    pub fn validation(result: &ValidationResult, function: &str) -> Self {
        let mut entry = Self::new(
            result.status.as_str(),
            &result.unit_path,
            function,
            "Folder",
        );
        entry.reason = Some(result.reason.as_str().to_string());
        entry.details = Some(result.details.clone());
        entry
    }

    pub fn analysis(analysis: &StructureAnalysis) -> Self {
        let mut entry = Self::new("Analyzed", &analysis.path, "analyze", "Structure");
        entry.structure_type = Some(analysis.structure_type.as_str().to_string());
        entry.confidence = Some(analysis.confidence.value());
        entry.structure_details = Some(analysis.details.clone());
        entry.recommendations = Some(analysis.recommendations.clone());
        entry.metadata = Some(analysis.metadata.clone());
        entry
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    fn to_text_line(&self) -> String {
        let mut line = format!(
            "{} [{}] {} | {}",
            self.timestamp, self.status, self.function, self.path
        );
        if let Some(structure) = &self.structure_type {
            line.push_str(&format!(" | {}", structure));
            if let Some(confidence) = self.confidence {
                line.push_str(&format!(" ({:.2})", confidence));
            }
        }
        if let Some(reason) = &self.reason {
            line.push_str(&format!(" | {}", reason));
        }
        if let Some(details) = &self.details {
            line.push_str(&format!(" | {}", details));
        }
        line
    }
}

/// Append-only sink for `LogEntry` records.
pub struct Journal {
    writer: Box<dyn Write + Send>,
    format: LogFormat,
    written: usize,
}

impl Journal {
    /// Start a fresh log file, truncating any previous content.
    pub fn create(path: &Path, format: LogFormat) -> Result<Self, Error> {
        ensure_parent(path)?;
        let file = File::create(path)?;
        debug!("Journal initialized at {}", path.display());
        Ok(Self::from_writer(Box::new(BufWriter::new(file)), format))
    }

    pub fn open_append(path: &Path, format: LogFormat) -> Result<Self, Error> {
        ensure_parent(path)?;
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::from_writer(Box::new(BufWriter::new(file)), format))
    }

    pub fn from_writer(writer: Box<dyn Write + Send>, format: LogFormat) -> Self {
        Self {
            writer,
            format,
            written: 0,
        }
    }

    pub fn append(&mut self, entry: &LogEntry) -> Result<(), Error> {
        match self.format {
            LogFormat::Json => {
                serde_json::to_writer(&mut self.writer, entry)?;
                self.writer.write_all(b"\n")?;
            }
            LogFormat::Text => {
                writeln!(self.writer, "{}", entry.to_text_line())?;
            }
        }
        self.written += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), Error> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn entries_written(&self) -> usize {
        self.written
    }

    pub fn format(&self) -> LogFormat {
        self.format
    }
}

impl Drop for Journal {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

fn ensure_parent(path: &Path) -> Result<(), Error> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Read every JSON record in a log file. Blank, malformed, and text-format
/// lines are skipped.
pub fn read_entries(path: &Path) -> Result<Vec<LogEntry>, Error> {
    let reader = BufReader::new(File::open(path)?);
    let mut entries = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<LogEntry>(trimmed) {
            Ok(entry) => entries.push(entry),
            Err(e) => debug!("Skipping line {} of {}: {}", index + 1, path.display(), e),
        }
    }

    Ok(entries)
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct LogSummary {
    pub total: usize,
    pub by_status: BTreeMap<String, usize>,
    pub by_reason: BTreeMap<String, usize>,
    pub by_function: BTreeMap<String, usize>,
    pub by_structure: BTreeMap<String, usize>,
    /// Distinct paths per status, in first-seen order.
    pub paths_by_status: BTreeMap<String, Vec<String>>,
}

pub fn summarize(entries: &[LogEntry]) -> LogSummary {
    let mut summary = LogSummary {
        total: entries.len(),
        ..Default::default()
    };
    let mut seen: AHashSet<(String, String)> = AHashSet::new();

    for entry in entries {
        *summary.by_status.entry(entry.status.clone()).or_default() += 1;
        *summary.by_function.entry(entry.function.clone()).or_default() += 1;
        if let Some(reason) = &entry.reason {
            *summary.by_reason.entry(reason.clone()).or_default() += 1;
        }
        if let Some(structure) = &entry.structure_type {
            *summary.by_structure.entry(structure.clone()).or_default() += 1;
        }
        if seen.insert((entry.status.clone(), entry.path.clone())) {
            summary
                .paths_by_status
                .entry(entry.status.clone())
                .or_default()
                .push(entry.path.clone());
        }
    }

    summary
}

/// Distinct paths logged as Good by a validation pass, in log order.
pub fn good_paths(entries: &[LogEntry]) -> Vec<PathBuf> {
    let mut seen = AHashSet::new();
    entries
        .iter()
        .filter(|e| e.status == "Good" && e.function == "validate")
        .filter(|e| seen.insert(e.path.clone()))
        .map(|e| PathBuf::from(&e.path))
        .collect()
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    timestamp: &'a str,
    status: &'a str,
    path: &'a str,
    function: &'a str,
    kind: &'a str,
    reason: &'a str,
    structure_type: &'a str,
    confidence: Option<f64>,
    details: &'a str,
}

pub fn export_csv(entries: &[LogEntry], path: &Path) -> Result<usize, Error> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    for entry in entries {
        writer.serialize(CsvRow {
            timestamp: &entry.timestamp,
            status: &entry.status,
            path: &entry.path,
            function: &entry.function,
            kind: &entry.kind,
            reason: entry.reason.as_deref().unwrap_or(""),
            structure_type: entry.structure_type.as_deref().unwrap_or(""),
            confidence: entry.confidence,
            details: entry.details.as_deref().unwrap_or(""),
        })?;
    }
    writer.flush()?;
    Ok(entries.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_json_entry_uses_pascal_case_keys() {
        let buffer = SharedBuffer::default();
        let mut journal = Journal::from_writer(Box::new(buffer.clone()), LogFormat::Json);
        let entry = LogEntry::new("Good", Path::new("/Music/Nirvana"), "validate", "Folder")
            .with_reason("Valid");
        journal.append(&entry).unwrap();

        let text = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        let value: serde_json::Value = serde_json::from_str(text.trim()).unwrap();
        assert_eq!(value["Status"], "Good");
        assert_eq!(value["Path"], "/Music/Nirvana");
        assert_eq!(value["Function"], "validate");
        assert_eq!(value["Type"], "Folder");
        assert_eq!(value["Reason"], "Valid");
        assert!(value.get("Confidence").is_none());
        assert_eq!(journal.entries_written(), 1);
    }

    #[test]
    fn test_text_format_line() {
        let buffer = SharedBuffer::default();
        let mut journal = Journal::from_writer(Box::new(buffer.clone()), LogFormat::Text);
        let entry = LogEntry::new("Bad", Path::new("/Music/X"), "validate", "Folder")
            .with_reason("Empty")
            .with_details("Folder has no entries");
        journal.append(&entry).unwrap();

        let text = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        assert!(text.contains("[Bad] validate | /Music/X | Empty | Folder has no entries"));
    }

    #[test]
    fn test_create_truncates_and_reader_skips_garbage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs/run.jsonl");

        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "stale line\n").unwrap();

        {
            let mut journal = Journal::create(&path, LogFormat::Json).unwrap();
            journal
                .append(&LogEntry::new("Good", Path::new("/a"), "validate", "Folder"))
                .unwrap();
        }
        {
            let mut journal = Journal::open_append(&path, LogFormat::Json).unwrap();
            journal
                .append(&LogEntry::new("Bad", Path::new("/b"), "validate", "Folder"))
                .unwrap();
        }
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "{{not json").unwrap();
        writeln!(file).unwrap();

        let entries = read_entries(&path).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].path, "/a");
        assert_eq!(entries[1].status, "Bad");
    }

    #[test]
    fn test_summarize_and_good_paths() {
        let entries = vec![
            LogEntry::new("Good", Path::new("/m/A"), "validate", "Folder").with_reason("Valid"),
            LogEntry::new("Good", Path::new("/m/A"), "validate", "Folder").with_reason("Valid"),
            LogEntry::new("Bad", Path::new("/m/B"), "validate", "Folder").with_reason("Empty"),
            LogEntry::new("Good", Path::new("/m/C"), "move", "Artist"),
        ];
        let summary = summarize(&entries);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.by_status["Good"], 3);
        assert_eq!(summary.by_reason["Valid"], 2);
        assert_eq!(summary.by_function["move"], 1);
        assert_eq!(summary.paths_by_status["Good"], vec!["/m/A", "/m/C"]);

        assert_eq!(good_paths(&entries), vec![PathBuf::from("/m/A")]);
    }

    #[test]
    fn test_export_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let entries = vec![LogEntry::new("Bad", Path::new("/m/B"), "validate", "Folder")
            .with_reason("NoMusicFiles")];
        assert_eq!(export_csv(&entries, &path).unwrap(), 1);

        let text = fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "timestamp,status,path,function,kind,reason,structure_type,confidence,details"
        );
        assert!(lines.next().unwrap().contains("NoMusicFiles"));
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
