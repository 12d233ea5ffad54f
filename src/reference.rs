//! Streaming readers for IMDb-style reference dumps (`name.basics.tsv`,
//! `title.basics.tsv`).
//!
//! The files are tab separated with a header row, no quoting, and `\N` for
//! null. Rows are read one at a time into a reused buffer; rows that cannot
//! be used are counted and skipped.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord};
use log::{debug, info};

use crate::error::{Error, Result};

const NULL: &str = "\\N";
const PROGRESS_EVERY: u64 = 100_000;

/// One usable row of a reference dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceEntry {
    /// `nconst` or `tconst`
    pub id: String,
    /// `primaryName` or `primaryTitle`, as written in the file
    pub name: String,
    /// `startYear` for titles; always `None` for people
    pub year: Option<i32>,
}

impl ReferenceEntry {
    pub fn new(id: impl Into<String>, name: impl Into<String>, year: Option<i32>) -> Self {
        ReferenceEntry { id: id.into(), name: name.into(), year }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReadStats {
    pub rows: u64,
    pub kept: u64,
    pub skipped: u64,
}

#[derive(Debug)]
struct Columns {
    width: usize,
    id: usize,
    name: usize,
    year: Option<usize>,
    title_type: Option<usize>,
}

/// Iterator over the usable rows of a reference file.
pub struct ReferenceRows<R> {
    reader: csv::Reader<R>,
    record: StringRecord,
    columns: Columns,
    allowed_types: Vec<String>,
    source: PathBuf,
    stats: ReadStats,
}

impl ReferenceRows<BufReader<File>> {
    /// Open a people file; needs `nconst` and `primaryName`.
    pub fn open_people(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        Self::people(BufReader::new(file), path)
    }

    /// Open a titles file; needs `tconst`, `primaryTitle` and `startYear`.
    ///
    /// When the file has a `titleType` column, only rows whose type is in
    /// `allowed_types` are kept. An empty list keeps every type.
    pub fn open_titles(path: &Path, allowed_types: &[String]) -> Result<Self> {
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        Self::titles(BufReader::new(file), path, allowed_types)
    }
}

impl<R: Read> ReferenceRows<R> {
    pub fn people(input: R, source: &Path) -> Result<Self> {
        Self::new(input, source, "nconst", "primaryName", None, Vec::new())
    }

    pub fn titles(input: R, source: &Path, allowed_types: &[String]) -> Result<Self> {
        Self::new(
            input,
            source,
            "tconst",
            "primaryTitle",
            Some("startYear"),
            allowed_types.to_vec(),
        )
    }

    fn new(
        input: R,
        source: &Path,
        id: &str,
        name: &str,
        year: Option<&str>,
        allowed_types: Vec<String>,
    ) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .quoting(false)
            .flexible(true)
            .has_headers(true)
            .from_reader(input);

        let headers = reader.headers()?.clone();
        let position = |column: &str| headers.iter().position(|h| h.trim() == column);

        let mut missing = Vec::new();
        let mut require = |column: &str| {
            let found = position(column);
            if found.is_none() {
                missing.push(column.to_string());
            }
            found.unwrap_or_default()
        };
        let id = require(id);
        let name = require(name);
        let year = year.map(&mut require);

        if !missing.is_empty() {
            return Err(Error::MissingColumns { path: source.to_path_buf(), missing });
        }

        let title_type = if allowed_types.is_empty() { None } else { position("titleType") };

        Ok(ReferenceRows {
            reader,
            record: StringRecord::new(),
            columns: Columns { width: headers.len(), id, name, year, title_type },
            allowed_types,
            source: source.to_path_buf(),
            stats: ReadStats::default(),
        })
    }

    pub fn stats(&self) -> ReadStats {
        self.stats
    }

    /// Turn the current record into an entry, or `None` if it has to be skipped.
    fn parse_current(&self) -> Option<ReferenceEntry> {
        let record = &self.record;
        let columns = &self.columns;

        if record.len() != columns.width {
            debug!("row {}: expected {} columns, got {}", self.stats.rows, columns.width, record.len());
            return None;
        }

        if let Some(index) = columns.title_type {
            let title_type = record[index].trim();
            if !self.allowed_types.iter().any(|t| t == title_type) {
                return None;
            }
        }

        let id = non_null(&record[columns.id])?;
        let name = non_null(&record[columns.name])?;

        let year = match columns.year.map(|index| record[index].trim()) {
            None | Some(NULL) | Some("") => None,
            Some(raw) => match raw.parse::<i32>() {
                Ok(year) => Some(year),
                Err(_) => {
                    debug!("row {}: non-numeric year {raw:?} for {id}", self.stats.rows);
                    return None;
                }
            },
        };

        Some(ReferenceEntry::new(id, name, year))
    }
}

fn non_null(field: &str) -> Option<&str> {
    let field = field.trim();
    (!field.is_empty() && field != NULL).then_some(field)
}

impl<R: Read> Iterator for ReferenceRows<R> {
    type Item = Result<ReferenceEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.reader.read_record(&mut self.record) {
                Ok(false) => {
                    info!(
                        "Finished {}: {} rows, {} kept, {} skipped",
                        self.source.display(),
                        self.stats.rows,
                        self.stats.kept,
                        self.stats.skipped
                    );
                    return None;
                }
                Ok(true) => {
                    self.stats.rows += 1;
                    if self.stats.rows % PROGRESS_EVERY == 0 {
                        info!("  Processed {} lines of {}...", self.stats.rows, self.source.display());
                    }
                    match self.parse_current() {
                        Some(entry) => {
                            self.stats.kept += 1;
                            return Some(Ok(entry));
                        }
                        None => self.stats.skipped += 1,
                    }
                }
                Err(e) if is_row_error(&e) => {
                    self.stats.rows += 1;
                    self.stats.skipped += 1;
                    debug!("row {}: {e}", self.stats.rows);
                }
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}

/// Errors that only concern the row just read; the reader can move on.
fn is_row_error(error: &csv::Error) -> bool {
    match error.kind() {
        csv::ErrorKind::Utf8 { .. } | csv::ErrorKind::UnequalLengths { .. } => true,
        csv::ErrorKind::Io(e) => e.kind() == io::ErrorKind::InvalidData,
        _ => false,
    }
}
