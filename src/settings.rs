use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::money::DEFAULT_CURRENCY_SYMBOL;

const CLIENT_NAME: &str = "debt-reckoning";
const DEFAULT_CONFIG_NAME: &str = "debt-reckoning.toml";
const ENV_PREFIX: &str = "DEBT_RECKONING";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Directory holding the persisted ledger.
    pub data_dir: PathBuf,
    pub currency_symbol: String,
}

impl Settings {
    /// Loads settings from defaults, then the TOML file at `config_path` (or
    /// `debt-reckoning.toml` in the working directory when present), then
    /// `DEBT_RECKONING_*` environment variables.
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("data_dir", default_data_dir().display().to_string())?
            .set_default("currency_symbol", DEFAULT_CURRENCY_SYMBOL)?;

        builder = match config_path {
            Some(path) => builder.add_source(File::from(path)),
            None => builder.add_source(File::with_name(DEFAULT_CONFIG_NAME).required(false)),
        };
        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX));

        Ok(builder.build()?.try_deserialize()?)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(CLIENT_NAME))
        .unwrap_or_else(|| PathBuf::from("data"))
}
