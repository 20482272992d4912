//! Stage files: CSV tables and the error log

use crate::error::{PipelineError, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Search results, one row per candidate
pub const SEARCHES: &str = "searches.csv";
/// Prompts built from scraped context
pub const RETRIEVALS: &str = "retrievals.csv";
/// Candidates whose scrape timed out
pub const SCRAPE_TIMEOUTS: &str = "scrape_timeouts.csv";
/// Candidates whose scrape failed outright
pub const SCRAPE_ERRORS: &str = "scrape_errors.csv";
/// Parsed biographies
pub const EXTRACTIONS: &str = "extractions.csv";
/// Prompts whose model call failed
pub const SERVICE_ERRORS: &str = "service_errors.csv";
/// Responses that were not valid JSON objects
pub const PARSE_ERRORS: &str = "parse_errors.csv";
/// Biographies recovered by re-running failed calls
pub const RERUNS: &str = "reruns.csv";
/// Birth-year answers
pub const BIRTH_YEARS: &str = "birth_years.csv";
/// Append-only log of captured per-item exceptions
pub const ERROR_LOG: &str = "errors.txt";

/// Files cleared at the start of a full run
pub const RUN_FILES: [&str; 9] = [
    SEARCHES,
    RETRIEVALS,
    SCRAPE_TIMEOUTS,
    SCRAPE_ERRORS,
    EXTRACTIONS,
    SERVICE_ERRORS,
    PARSE_ERRORS,
    RERUNS,
    ERROR_LOG,
];

/// How a table is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Replace the file, header first
    Overwrite,
    /// Add rows to the end; the header is written only if the file is new
    Append,
}

/// Locations of the stage files in an output directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFiles {
    dir: PathBuf,
}

impl OutputFiles {
    /// Stage files under `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The output directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a named file in the output directory
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Create the directory and delete the files of any previous run
    ///
    /// Returns how many files were removed.
    pub fn reset(&self) -> Result<usize> {
        fs::create_dir_all(&self.dir)?;
        let mut removed = 0;
        for name in RUN_FILES {
            let path = self.path(name);
            if path.exists() {
                fs::remove_file(&path)?;
                removed += 1;
            }
        }
        info!(dir = %self.dir.display(), removed, "cleared previous output");
        Ok(removed)
    }

    /// Append one captured exception to `errors.txt`
    ///
    /// Entries read `{info} {stage} - {task} generated an exception: {error}`
    /// and are separated by a blank line. A failed append is only warned
    /// about; stages keep building their partitions.
    pub fn log_error(&self, info: &str, stage: &str, task: &str, error: &str) {
        if let Err(e) = self.append_error(info, stage, task, error) {
            warn!(
                path = %self.path(ERROR_LOG).display(),
                error = %e,
                "could not append to error log"
            );
        }
    }

    fn append_error(&self, info: &str, stage: &str, task: &str, error: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path(ERROR_LOG))?;
        write!(
            file,
            "\n\n{} {} - {} generated an exception: {}",
            info, stage, task, error
        )?;
        Ok(())
    }
}

/// Write `rows` under `headers`
pub fn write_table(
    path: &Path,
    headers: &[&str],
    rows: &[Vec<String>],
    mode: WriteMode,
) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let existing = mode == WriteMode::Append
        && fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false);

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(mode == WriteMode::Append)
        .truncate(mode == WriteMode::Overwrite)
        .open(path)?;
    let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(file);
    if !existing {
        writer.write_record(headers)?;
    }
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    debug!(path = %path.display(), rows = rows.len(), "wrote table");
    Ok(())
}

/// A CSV file read fully into memory
#[derive(Debug, Clone)]
pub struct Table {
    path: PathBuf,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Read `path`; UTF-8 is expected, Latin-1 is accepted
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = decode_text(fs::read(path)?);
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(text.as_bytes());
        let headers = reader.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(record?.iter().map(str::to_string).collect());
        }
        Ok(Self {
            path: path.to_path_buf(),
            headers,
            rows,
        })
    }

    /// Build a table in memory
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            path: PathBuf::new(),
            headers,
            rows,
        }
    }

    /// Replace `path` with this table
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let headers: Vec<&str> = self.headers.iter().map(String::as_str).collect();
        write_table(path.as_ref(), &headers, &self.rows, WriteMode::Overwrite)
    }

    /// Column names in file order
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Data rows
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column, if present
    pub fn find(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    /// Position of a required column
    pub fn column(&self, column: &str) -> Result<usize> {
        self.find(column).ok_or_else(|| PipelineError::MissingColumn {
            path: self.path.clone(),
            column: column.to_string(),
        })
    }

    /// Cell at `row` and column index `col`; empty when the row is short
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Decode file bytes as UTF-8, falling back to Latin-1
fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => e.into_bytes().iter().map(|&b| b as char).collect(),
    }
}

/// Render a source list as a JSON array
pub fn format_sources(urls: &[String]) -> String {
    serde_json::to_string(urls).unwrap_or_else(|_| "[]".to_string())
}

/// Parse a source list cell
///
/// Accepts a JSON array of strings or a bracketed, comma-separated list with
/// optional single quotes (`['a', 'b']`). A blank or empty list yields a
/// single empty URL, which later stages treat as missing.
pub fn parse_sources(cell: &str) -> Vec<String> {
    let trimmed = cell.trim();
    if let Ok(urls) = serde_json::from_str::<Vec<String>>(trimmed) {
        if urls.is_empty() {
            return vec![String::new()];
        }
        return urls;
    }
    let inner = trimmed.strip_prefix('[').unwrap_or(trimmed);
    let inner = inner.strip_suffix(']').unwrap_or(inner);
    inner
        .split(',')
        .map(|s| s.trim().replace('\'', ""))
        .collect()
}

/// Concatenate every CSV in `dir` into `out`, aligning columns by name
///
/// Columns appear in order of first appearance; cells a file lacks are left
/// empty. Files are read in name order and `out` itself is skipped. Returns
/// the number of rows written.
pub fn combine_csv(dir: &Path, out: &Path) -> Result<usize> {
    let mut inputs: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "csv"))
        .filter(|p| !same_file(p, out))
        .collect();
    inputs.sort();

    let tables = inputs
        .iter()
        .map(Table::read)
        .collect::<Result<Vec<_>>>()?;

    let mut headers: Vec<String> = Vec::new();
    for table in &tables {
        for h in table.headers() {
            if !headers.contains(h) {
                headers.push(h.clone());
            }
        }
    }

    let mut rows = Vec::new();
    for table in &tables {
        let positions: Vec<Option<usize>> = headers.iter().map(|h| table.find(h)).collect();
        for i in 0..table.len() {
            rows.push(
                positions
                    .iter()
                    .map(|p| p.map_or(String::new(), |c| table.cell(i, c).to_string()))
                    .collect(),
            );
        }
    }

    let header_refs: Vec<&str> = headers.iter().map(String::as_str).collect();
    write_table(out, &header_refs, &rows, WriteMode::Overwrite)?;
    info!(files = tables.len(), rows = rows.len(), out = %out.display(), "combined tables");
    Ok(rows.len())
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_and_read_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.csv");
        let rows = vec![
            vec!["a, with comma".to_string(), "1".to_string()],
            vec!["line\nbreak".to_string(), "2".to_string()],
        ];
        write_table(&path, &["Text", "N"], &rows, WriteMode::Overwrite).unwrap();

        let table = Table::read(&path).unwrap();
        assert_eq!(table.headers(), &["Text", "N"]);
        assert_eq!(table.rows(), rows.as_slice());
        assert_eq!(table.cell(1, table.column("N").unwrap()), "2");
        assert!(matches!(
            table.column("Missing"),
            Err(PipelineError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_append_writes_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.csv");
        let row = vec![vec!["x".to_string()]];
        write_table(&path, &["A"], &row, WriteMode::Append).unwrap();
        write_table(&path, &["A"], &row, WriteMode::Append).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "A\nx\nx\n");

        write_table(&path, &["A"], &[], WriteMode::Overwrite).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "A\n");
    }

    #[test]
    fn test_latin1_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.csv");
        fs::write(&path, b"Name\nJos\xe9\n").unwrap();
        let table = Table::read(&path).unwrap();
        assert_eq!(table.cell(0, 0), "José");
    }

    #[test]
    fn test_unwritable_error_log_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let files = OutputFiles::new(dir.path());
        fs::create_dir(files.path(ERROR_LOG)).unwrap();

        files.log_error("{'Candid': 1}", "search", "googleSearch", "boom");
        assert!(files.append_error("{'Candid': 1}", "search", "googleSearch", "boom").is_err());
        assert!(files.path(ERROR_LOG).is_dir());
    }

    #[test]
    fn test_reset_and_error_log() {
        let dir = tempfile::tempdir().unwrap();
        let files = OutputFiles::new(dir.path().join("out"));
        files.log_error("{'Candid': 1}", "retrieve", "bioData", "TimeoutError");
        files.log_error("{'Candid': 2}", "extract", "chatFeed", "boom");

        let log = fs::read_to_string(files.path(ERROR_LOG)).unwrap();
        assert_eq!(
            log,
            "\n\n{'Candid': 1} retrieve - bioData generated an exception: TimeoutError\
             \n\n{'Candid': 2} extract - chatFeed generated an exception: boom"
        );

        fs::write(files.path(SEARCHES), "x").unwrap();
        fs::write(files.path("keep.csv"), "x").unwrap();
        assert_eq!(files.reset().unwrap(), 2);
        assert!(!files.path(ERROR_LOG).exists());
        assert!(files.path("keep.csv").exists());
    }

    #[test]
    fn test_sources_formats() {
        let urls = vec!["https://a".to_string(), "https://b".to_string()];
        assert_eq!(format_sources(&urls), r#"["https://a","https://b"]"#);
        assert_eq!(parse_sources(&format_sources(&urls)), urls);
        assert_eq!(parse_sources("['https://a', 'https://b']"), urls);
        assert_eq!(parse_sources("['']"), vec![""]);
        assert_eq!(parse_sources("[]"), vec![""]);
        assert_eq!(parse_sources(""), vec![""]);
    }

    #[test]
    fn test_combine_aligns_columns() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.csv"), "Name,State\nann,Ohio\n").unwrap();
        fs::write(dir.path().join("b.csv"), "State,Candid\nUtah,7\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        let out = dir.path().join("all.csv");

        assert_eq!(combine_csv(dir.path(), &out).unwrap(), 2);
        assert_eq!(
            fs::read_to_string(&out).unwrap(),
            "Name,State,Candid\nann,Ohio,\n,Utah,7\n"
        );

        // Re-running skips the previous output.
        assert_eq!(combine_csv(dir.path(), &out).unwrap(), 2);
    }
}
