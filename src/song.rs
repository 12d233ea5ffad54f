use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};
use crate::normalize::normalize_key;

/// One song page worth of facts, as written to `all_songs.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub film: Option<String>,
    pub year: Option<i32>,
    #[serde(default)]
    pub people: Vec<String>,
}

impl SongRecord {
    /// Build a record, deduplicating `people` by normalized key.
    ///
    /// The first spelling of a name is the one kept; blank names are dropped.
    /// The result is sorted so the JSON output is stable.
    pub fn new(
        id: impl Into<String>,
        film: Option<String>,
        year: Option<i32>,
        people: impl IntoIterator<Item = String>,
    ) -> Self {
        let mut seen = HashSet::new();
        let mut people: Vec<String> = people
            .into_iter()
            .map(|name| name.trim().to_string())
            .filter(|name| {
                let key = normalize_key(name);
                !key.is_empty() && seen.insert(key)
            })
            .collect();
        people.sort();

        SongRecord {
            id: id.into(),
            film: film.map(|f| f.trim().to_string()).filter(|f| !f.is_empty()),
            year,
            people,
        }
    }
}

/// Older dumps carry numeric ids.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(u64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

/// Read the JSON array of song records.
pub fn load_songs(path: &Path) -> Result<Vec<SongRecord>> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Write the song records as pretty JSON.
pub fn save_songs(path: &Path, songs: &[SongRecord]) -> Result<()> {
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, songs).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(|e| Error::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_people_deduplicated_and_sorted() {
        let song = SongRecord::new(
            "7",
            Some(" Sholay ".to_string()),
            Some(1975),
            vec![
                "R. D. Burman".to_string(),
                "Kishore Kumar".to_string(),
                "kishore  kumar".to_string(),
                "  ".to_string(),
                "Anand Bakshi".to_string(),
            ],
        );
        assert_eq!(song.film.as_deref(), Some("Sholay"));
        assert_eq!(song.people, vec!["Anand Bakshi", "Kishore Kumar", "R. D. Burman"]);
    }

    #[test]
    fn test_blank_film_is_absent() {
        let song = SongRecord::new("1", Some("   ".to_string()), None, Vec::new());
        assert_eq!(song.film, None);
    }

    #[test]
    fn test_numeric_and_string_ids() {
        let json = r#"[
            {"id": 12, "film": "Sholay", "year": 1975, "people": ["Lata Mangeshkar"]},
            {"id": "13", "film": null, "year": null, "people": []}
        ]"#;
        let songs: Vec<SongRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(songs[0].id, "12");
        assert_eq!(songs[1].id, "13");
        assert_eq!(songs[1].film, None);
        assert_eq!(songs[1].year, None);
    }

    #[test]
    fn test_missing_people_field_defaults_empty() {
        let songs: Vec<SongRecord> =
            serde_json::from_str(r#"[{"id": "1", "film": null, "year": null}]"#).unwrap();
        assert!(songs[0].people.is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("all_songs.json");
        let songs = vec![SongRecord::new(
            "1",
            Some("Mughal-E-Azam".to_string()),
            Some(1960),
            vec!["Lata Mangeshkar".to_string()],
        )];
        save_songs(&path, &songs).unwrap();
        assert_eq!(load_songs(&path).unwrap(), songs);
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_songs(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_invalid_json_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("all_songs.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(load_songs(&path).unwrap_err(), Error::Json { .. }));
    }
}
