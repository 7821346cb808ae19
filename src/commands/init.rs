use std::fs;

use crate::config::Config;
use crate::error::Result;
use crate::store::JsonFileStore;

pub fn run(config: &Config) -> Result<()> {
    let store = JsonFileStore::init(config.settings_path())?;
    fs::create_dir_all(config.snippets_dir())?;

    eprintln!("Initialized snippetor settings at {}", store.path().display());
    Ok(())
}
