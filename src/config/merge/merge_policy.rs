//! Built-in defaults every load starts from.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// Builder pre-seeded with the scalar defaults.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("server.bind", "127.0.0.1:8787")?
        .set_default("server.enrichment_timeout_ms", 2000)?
        .set_default("storage.temporary", false)?
        .set_default("logging.level", "info")?
        .set_default("access.mode", "open")
}
