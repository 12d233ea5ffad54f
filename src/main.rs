use std::env;
use std::error::Error;
use std::path::PathBuf;

use giit_linker::pipeline::{run_fetch, run_films, run_people};
use giit_linker::Config;

use log::info;

const USAGE: &str = "usage: giit-linker <fetch|people|films> [paths...]

  fetch  [songs.json]
  people [songs.json] [name.basics.tsv] [people_nconsts.csv]
  films  [songs.json] [title.basics.tsv] [film_tconsts.csv]";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize the logger, RUST_LOG still wins
    pretty_env_logger::formatted_builder()
        .filter(None, log::LevelFilter::Info)
        .parse_filters(&env::var("RUST_LOG").unwrap_or_default())
        .init();

    let stage = get_arg(1).map_err(|e| format!("{e}\n{USAGE}"))?;
    let mut config = Config::default();

    match stage.as_str() {
        "fetch" => {
            override_path(&mut config.songs_file, 2);
            run_fetch(&config).await?;
        }
        "people" => {
            override_path(&mut config.songs_file, 2);
            override_path(&mut config.name_basics_file, 3);
            override_path(&mut config.people_output, 4);
            run_people(&config)?;
        }
        "films" => {
            override_path(&mut config.songs_file, 2);
            override_path(&mut config.title_basics_file, 3);
            override_path(&mut config.film_output, 4);
            run_films(&config)?;
        }
        other => return Err(From::from(format!("unknown stage '{other}'\n{USAGE}"))),
    }

    info!("Script finished.");
    Ok(())
}

/// Get the nth command line argument
fn get_arg(index: usize) -> Result<String, Box<dyn Error>> {
    env::args().nth(index)
        .ok_or_else(|| From::from(format!("less than {index} arguments provided")))
}

/// Replace `path` with the nth argument when one was given
fn override_path(path: &mut PathBuf, index: usize) {
    if let Ok(arg) = get_arg(index) {
        *path = PathBuf::from(arg);
    }
}
