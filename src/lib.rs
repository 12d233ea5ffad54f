pub mod config;
pub mod error;
pub mod extract;
pub mod film;
pub mod index;
pub mod normalize;
pub mod output_record;
pub mod person;
pub mod pipeline;
pub mod reference;
pub mod resolve;
pub mod song;

pub use config::Config;
pub use error::{Error, Result};
