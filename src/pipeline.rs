//! The three stages, each reading its inputs from and writing its output to
//! the paths in [`Config`].
//!
//! Every input is read in full before the output file is touched, so a
//! missing or unreadable input aborts the stage without writing anything.

use std::collections::HashSet;

use log::info;

use crate::config::Config;
use crate::error::Result;
use crate::extract::fetch_songs;
use crate::film::{film_mentions, FilmResolver};
use crate::index::NormalizedIndex;
use crate::output_record::{write_records, FilmRecord, PersonRecord};
use crate::person::{person_keys, PersonResolver};
use crate::reference::{ReferenceEntry, ReferenceRows};
use crate::resolve::Resolution;
use crate::song::{load_songs, save_songs, SongRecord};

/// Fetch all song documents and write `config.songs_file`.
pub async fn run_fetch(config: &Config) -> Result<Vec<SongRecord>> {
    info!("Fetching songs {:?} from {}", config.file_ids, config.base_url);
    let songs = fetch_songs(config).await?;

    info!("Saving all collected data to {}...", config.songs_file.display());
    save_songs(&config.songs_file, &songs)?;
    Ok(songs)
}

/// Map people named in the songs to `nconst`s and write `config.people_output`.
pub fn run_people(config: &Config) -> Result<Resolution> {
    let songs = read_songs(config)?;
    let wanted = person_keys(&songs);
    info!("Found {} unique names in song data.", wanted.len());

    info!("Reading {} and mapping names to IDs...", config.name_basics_file.display());
    let rows = ReferenceRows::open_people(&config.name_basics_file)?;
    let index = build_index(rows, |key| wanted.contains(key))?;

    let resolution = PersonResolver::new(&index, config.person_policy).resolve(&songs);
    resolution.log_summary("names");

    info!("Writing results to {}...", config.people_output.display());
    write_records(
        &config.people_output,
        resolution.rows.iter().cloned().map(PersonRecord::from),
    )?;
    Ok(resolution)
}

/// Map films named in the songs to `tconst`s and write `config.film_output`.
pub fn run_films(config: &Config) -> Result<Resolution> {
    let songs = read_songs(config)?;
    let mentions = film_mentions(&songs);
    info!("Found {} unique (film, year) combinations.", mentions.len());

    info!("Reading {} and mapping films to IDs...", config.title_basics_file.display());
    let rows = ReferenceRows::open_titles(&config.title_basics_file, &config.title_types)?;
    let titles: HashSet<&str> = mentions.iter().map(|(title, _)| title.as_str()).collect();
    let index = build_index(rows, |key| titles.contains(key))?;

    let resolution = FilmResolver::new(&index, config.film_policy).resolve(&songs);
    resolution.log_summary("films");

    info!("Writing results to {}...", config.film_output.display());
    write_records(
        &config.film_output,
        resolution.rows.iter().cloned().map(FilmRecord::from),
    )?;
    Ok(resolution)
}

fn read_songs(config: &Config) -> Result<Vec<SongRecord>> {
    info!("Loading song data from {}...", config.songs_file.display());
    load_songs(&config.songs_file)
}

/// Stream `rows` into an index holding only the keys `keep` accepts.
/// A read error part way through aborts the build.
fn build_index<I, F>(rows: I, keep: F) -> Result<NormalizedIndex>
where
    I: Iterator<Item = Result<ReferenceEntry>>,
    F: FnMut(&str) -> bool,
{
    let mut failure = None;
    let entries = rows.map_while(|row| match row {
        Ok(entry) => Some(entry),
        Err(e) => {
            failure = Some(e);
            None
        }
    });
    let index = NormalizedIndex::build_filtered(entries, keep);

    match failure {
        Some(e) => Err(e),
        None => Ok(index),
    }
}
