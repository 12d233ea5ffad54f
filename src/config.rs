use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;

use crate::film::FilmPolicy;
use crate::resolve::AmbiguityPolicy;

/// Paths and knobs for the three stages. `Default` matches the file names
/// the stages expect in the working directory.
#[derive(Debug, Clone)]
pub struct Config {
    pub songs_file: PathBuf,
    pub name_basics_file: PathBuf,
    pub title_basics_file: PathBuf,
    pub people_output: PathBuf,
    pub film_output: PathBuf,

    /// Song documents are fetched from `<base_url><id>.isb.txt`.
    pub base_url: String,
    pub file_ids: RangeInclusive<u32>,
    pub concurrency: usize,
    pub request_timeout: Duration,

    /// `titleType` values kept from the titles file; empty keeps all.
    pub title_types: Vec<String>,
    pub person_policy: AmbiguityPolicy,
    pub film_policy: FilmPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            songs_file: "all_songs.json".into(),
            name_basics_file: "name.basics.tsv".into(),
            title_basics_file: "title.basics.tsv".into(),
            people_output: "people_nconsts.csv".into(),
            film_output: "film_tconsts.csv".into(),
            base_url: "https://raw.githubusercontent.com/v9y/giit/master/docs/".to_string(),
            file_ids: 1..=3500,
            concurrency: 16,
            request_timeout: Duration::from_secs(10),
            title_types: vec!["movie".to_string()],
            person_policy: AmbiguityPolicy::default(),
            film_policy: FilmPolicy::default(),
        }
    }
}

impl Config {
    /// Config whose files all live in `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let defaults = Config::default();
        Config {
            songs_file: dir.join(&defaults.songs_file),
            name_basics_file: dir.join(&defaults.name_basics_file),
            title_basics_file: dir.join(&defaults.title_basics_file),
            people_output: dir.join(&defaults.people_output),
            film_output: dir.join(&defaults.film_output),
            ..defaults
        }
    }

    pub fn song_url(&self, id: u32) -> String {
        format!("{}{id}.isb.txt", self.base_url)
    }
}
