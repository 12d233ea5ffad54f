//! Song extraction from Giitaayan ISB documents.
//!
//! An ISB file is TeX-like text where each fact sits in a macro such as
//! `\film{Sholay}%` or `\singer{Lata Mangeshkar, Kishore Kumar}%`.

use std::sync::LazyLock;

use futures::stream::{self, StreamExt};
use log::{info, warn};
use regex::Regex;

use crate::config::Config;
use crate::error::Result;
use crate::song::SongRecord;

static FILM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\film\{(.+?)\}%").unwrap());
static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\year\{(.+?)\}%").unwrap());

/// People fields, in the order their names are collected.
static PEOPLE_RES: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    [
        Regex::new(r"\\starring\{(.+?)\}%").unwrap(),
        Regex::new(r"\\singer\{(.+?)\}%").unwrap(),
        Regex::new(r"\\music\{(.+?)\}%").unwrap(),
        Regex::new(r"\\lyrics\{(.+?)\}%").unwrap(),
    ]
});

/// Pull film, year and people out of one document.
pub fn parse_song(id: &str, text: &str) -> SongRecord {
    let film = capture(&FILM_RE, text);

    let year = capture(&YEAR_RE, text).and_then(|raw| {
        let year = raw
            .chars()
            .all(|c| c.is_ascii_digit())
            .then(|| raw.parse::<i32>().ok())
            .flatten();
        if year.is_none() {
            warn!("Non-digit year found for ID {id}: '{raw}'");
        }
        year
    });

    let people = PEOPLE_RES
        .iter()
        .filter_map(|pattern| capture(pattern, text))
        .flat_map(|names| names.split(',').map(str::to_string).collect::<Vec<_>>());

    SongRecord::new(id, film, year, people)
}

fn capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Fetch and parse every document in `config.file_ids`.
///
/// Documents that fail to download are logged and left out. The result is
/// sorted by id, whatever order the requests finish in.
pub async fn fetch_songs(config: &Config) -> Result<Vec<SongRecord>> {
    let client = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()?;

    let mut fetched: Vec<(u32, SongRecord)> = stream::iter(config.file_ids.clone())
        .map(|id| {
            let client = &client;
            async move {
                let url = config.song_url(id);
                match fetch_text(client, &url).await {
                    Ok(text) => Some((id, parse_song(&id.to_string(), &text))),
                    Err(e) => {
                        warn!("Failed to fetch {url}. Error: {e}");
                        None
                    }
                }
            }
        })
        .buffer_unordered(config.concurrency.max(1))
        .filter_map(|song| async move { song })
        .collect()
        .await;

    fetched.sort_by_key(|(id, _)| *id);
    info!("Finished processing {} files.", fetched.len());

    Ok(fetched.into_iter().map(|(_, song)| song).collect())
}

async fn fetch_text(client: &reqwest::Client, url: &str) -> reqwest::Result<String> {
    client.get(url).send().await?.error_for_status()?.text().await
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r"
\stitle{Mere Sapnon Ki Rani}%
\film{Aradhana}%
\year{1969}%
\starring{Rajesh Khanna, Sharmila Tagore}%
\singer{Kishore Kumar}%
\music{S. D. Burman}%
\lyrics{Anand Bakshi}%
";

    #[test]
    fn test_parse_full_document() {
        let song = parse_song("7", SAMPLE);
        assert_eq!(song.id, "7");
        assert_eq!(song.film.as_deref(), Some("Aradhana"));
        assert_eq!(song.year, Some(1969));
        assert_eq!(
            song.people,
            vec![
                "Anand Bakshi",
                "Kishore Kumar",
                "Rajesh Khanna",
                "S. D. Burman",
                "Sharmila Tagore",
            ]
        );
    }

    #[test]
    fn test_non_digit_year_is_absent() {
        let song = parse_song("1", "\\film{Sholay}%\n\\year{1975?}%\n");
        assert_eq!(song.film.as_deref(), Some("Sholay"));
        assert_eq!(song.year, None);
    }

    #[test]
    fn test_missing_fields() {
        let song = parse_song("2", "\\stitle{Untitled}%\n");
        assert_eq!(song, SongRecord::new("2", None, None, Vec::new()));
    }

    #[test]
    fn test_every_field_pattern_matches_its_macro() {
        assert!(FILM_RE.is_match(SAMPLE));
        assert!(YEAR_RE.is_match(SAMPLE));
        assert!(PEOPLE_RES.iter().all(|pattern| pattern.is_match(SAMPLE)));
    }

    #[test]
    fn test_same_person_in_two_roles_listed_once() {
        let text = "\\singer{Kishore Kumar}%\n\\music{kishore kumar, R. D. Burman}%\n";
        let song = parse_song("3", text);
        assert_eq!(song.people, vec!["Kishore Kumar", "R. D. Burman"]);
    }
}
