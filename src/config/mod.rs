// src/config/mod.rs
mod models;

pub use models::*;

use anyhow::{Context, Result};
use ::config::{Environment, File};
use std::path::Path;

/// Load configuration: built-in defaults, then an optional file (YAML, JSON
/// or TOML by extension), then `COCOON__SECTION__KEY` variables, then the
/// conventional `DATABASE_URL` / `NEO4J_*` variables.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut builder = ::config::Config::builder().add_source(
        ::config::Config::try_from(&Config::default()).context("Failed to seed default config")?,
    );

    if let Some(path) = path {
        builder = builder.add_source(File::from(path).required(true));
    }

    builder = builder
        .add_source(
            Environment::with_prefix("COCOON")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("status.frontend.candidates"),
        )
        .set_override_option("postgres.url", std::env::var("DATABASE_URL").ok())?
        .set_override_option("neo4j.uri", std::env::var("NEO4J_URI").ok())?
        .set_override_option("neo4j.user", std::env::var("NEO4J_USER").ok())?
        .set_override_option("neo4j.password", std::env::var("NEO4J_PASSWORD").ok())?;

    let config: Config = builder
        .build()
        .context("Failed to read configuration")?
        .try_deserialize()
        .context("Failed to parse configuration")?;

    config.validate()?;
    Ok(config)
}
