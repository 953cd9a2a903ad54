//! Configuration persistence
//!
//! Load order at boot:
//! 1. the settings store (postcard, version checked)
//! 2. the embedded `machine.toml`
//! 3. compiled-in defaults
//!
//! Whatever is loaded is validated; a configuration that fails validation
//! is skipped like a missing one. When the store held nothing usable, the
//! chosen configuration is written back so the next boot finds it there.

use defmt::*;

use syzygy_core::config::{parse_config, ConfigIssue, MachineConfig, ParseError, CONFIG_VERSION};
use syzygy_core::storage::{load_blob, save_blob, StoreError};
use syzygy_hal::{FlashError, SettingsStore};

/// Maximum serialized config size (binary)
const MAX_CONFIG_SIZE: usize = 256;

/// Configuration persistence errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Settings store operation failed
    Store(StoreError),
    /// Deserialization failed
    Deserialize,
    /// Serialization failed
    Serialize,
    /// TOML parsing failed
    TomlParse(ParseError),
    /// Configuration failed validation
    Invalid(ConfigIssue),
    /// Config version mismatch
    VersionMismatch,
}

impl From<StoreError> for ConfigError {
    fn from(e: StoreError) -> Self {
        ConfigError::Store(e)
    }
}

impl From<FlashError> for ConfigError {
    fn from(e: FlashError) -> Self {
        ConfigError::Store(StoreError::Flash(e))
    }
}

/// Where the active configuration came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigSource {
    /// Settings store
    Store,
    /// Embedded machine.toml
    Embedded,
    /// Compiled-in defaults
    Defaults,
}

/// Configuration persistence manager
pub struct ConfigPersistence<S> {
    store: S,
}

impl<S: SettingsStore> ConfigPersistence<S> {
    /// Create a new config persistence manager
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Load configuration from the store
    pub fn load(&mut self) -> Result<MachineConfig, ConfigError> {
        let mut buffer = [0u8; MAX_CONFIG_SIZE];
        let len = load_blob(&mut self.store, &mut buffer)?;

        debug!("Read {} bytes of binary config from store", len);

        let config: MachineConfig =
            postcard::from_bytes(&buffer[..len]).map_err(|_| ConfigError::Deserialize)?;

        if config.version != CONFIG_VERSION {
            warn!(
                "Config version mismatch: found {}, expected {}",
                config.version, CONFIG_VERSION
            );
            return Err(ConfigError::VersionMismatch);
        }

        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    /// Save configuration to the store
    ///
    /// The store only erases flash if the bytes actually changed.
    pub fn save(&mut self, config: &MachineConfig) -> Result<(), ConfigError> {
        let mut buffer = [0u8; MAX_CONFIG_SIZE];
        let bytes = postcard::to_slice(config, &mut buffer).map_err(|_| ConfigError::Serialize)?;
        save_blob(&mut self.store, bytes)?;
        debug!("Saved {} bytes of binary config", bytes.len());
        Ok(())
    }
}

/// Parse and validate the embedded TOML
fn load_embedded(toml: &str) -> Result<MachineConfig, ConfigError> {
    let config = parse_config(toml).map_err(ConfigError::TomlParse)?;
    config.validate().map_err(ConfigError::Invalid)?;
    Ok(config)
}

/// Load the active configuration, falling back as needed
pub fn load_config<S: SettingsStore>(
    persistence: &mut ConfigPersistence<S>,
    embedded_toml: &str,
) -> (MachineConfig, ConfigSource) {
    let stored_error = match persistence.load() {
        Ok(config) => {
            info!("Loaded configuration from settings store");
            log_config_summary(&config);
            return (config, ConfigSource::Store);
        }
        Err(ConfigError::Store(StoreError::Empty)) => {
            info!("Settings store is empty");
            None
        }
        Err(e) => {
            warn!("Stored configuration unusable: {:?}", e);
            Some(e)
        }
    };

    let (config, source) = match load_embedded(embedded_toml) {
        Ok(config) => {
            info!("Parsed embedded configuration successfully");
            (config, ConfigSource::Embedded)
        }
        Err(e) => {
            error!("Embedded configuration rejected: {:?}", e);
            error!("Using compiled-in defaults");
            (MachineConfig::default(), ConfigSource::Defaults)
        }
    };

    // Don't overwrite a store we failed to read
    if !matches!(stored_error, Some(ConfigError::Store(StoreError::Flash(_)))) {
        if let Err(e) = persistence.save(&config) {
            warn!("Failed to persist configuration: {:?}", e);
        }
    }

    log_config_summary(&config);
    (config, source)
}

/// Log a summary of the loaded configuration
fn log_config_summary(config: &MachineConfig) {
    info!("Board: {}", config.board.name.as_str());
    debug!(
        "  acquisition: oversample={} settle={}us sweep_delay={}ms",
        config.acquisition.oversample,
        config.acquisition.settle_us,
        config.acquisition.sweep_delay_ms
    );
    debug!(
        "  watchdog: enabled={} timeout={}ms window={}ms",
        config.watchdog.enabled,
        config.watchdog.timeout_ms,
        config.watchdog.liveness_window_ms
    );
    debug!("  analog channels: {}", config.board.analog);
}
