use std::fs;
use std::path::{Path, PathBuf};

use csv::WriterBuilder;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::resolve::ResolvedRow;

/// A row type of one of the mapping files.
pub trait OutputRecord: Serialize {
    /// Column names, written even when there are no rows.
    const HEADER: &'static [&'static str];
}

#[derive(Debug, Hash, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRecord {
    pub primary_name: String,
    pub nconst: String,
}

impl OutputRecord for PersonRecord {
    const HEADER: &'static [&'static str] = &["primaryName", "nconst"];
}

#[derive(Debug, Hash, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilmRecord {
    pub primary_title: String,
    pub tconst: String,
}

impl OutputRecord for FilmRecord {
    const HEADER: &'static [&'static str] = &["primaryTitle", "tconst"];
}

impl From<ResolvedRow> for PersonRecord {
    fn from(row: ResolvedRow) -> Self {
        PersonRecord { primary_name: row.display, nconst: row.id }
    }
}

impl From<ResolvedRow> for FilmRecord {
    fn from(row: ResolvedRow) -> Self {
        FilmRecord { primary_title: row.display, tconst: row.id }
    }
}

/// Write `records` as CSV under their header row.
///
/// The file is written next to `path` first and renamed into place, so
/// `path` either keeps its old contents or holds the complete mapping.
pub fn write_records<T, I>(path: &Path, records: I) -> Result<()>
where
    T: OutputRecord,
    I: IntoIterator<Item = T>,
{
    let tmp = tmp_path(path);
    if let Err(e) = write_csv(&tmp, records) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    fs::rename(&tmp, path).map_err(|e| Error::io(path, e))
}

fn write_csv<T, I>(path: &Path, records: I) -> Result<()>
where
    T: OutputRecord,
    I: IntoIterator<Item = T>,
{
    let file = fs::File::create(path).map_err(|e| Error::io(path, e))?;
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);

    writer.write_record(T::HEADER)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush().map_err(|e| Error::io(path, e))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
