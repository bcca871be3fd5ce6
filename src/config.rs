//! Module configuration
//!
//! The host owns the configuration file and hands the raw values of the
//! `ffmpeg.*` entries to [`ModuleConfig::from_entries`].

use crate::error::Error;

/// INI key selecting the diagnostic policy
pub const SHOW_WARNINGS_KEY: &str = "ffmpeg.show_warnings";

/// INI key reserved for host-side persistence
pub const ALLOW_PERSISTENT_KEY: &str = "ffmpeg.allow_persistent";

/// An INI entry declared to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IniEntry {
    /// Fully qualified key
    pub name: &'static str,

    /// Default value as the host sees it
    pub default: &'static str,
}

/// INI entries this module declares, in registration order
pub const INI_ENTRIES: [IniEntry; 2] = [
    IniEntry {
        name: ALLOW_PERSISTENT_KEY,
        default: "0",
    },
    IniEntry {
        name: SHOW_WARNINGS_KEY,
        default: "0",
    },
];

/// Module configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleConfig {
    /// Forward FFmpeg log output to the host warning channel
    pub show_warnings: bool,

    /// Declared for the host; no core logic reads it
    pub allow_persistent: bool,
}

impl ModuleConfig {
    /// Verbose preset
    pub fn verbose() -> Self {
        Self {
            show_warnings: true,
            ..Self::default()
        }
    }

    /// Build from host-supplied key/value pairs.
    ///
    /// Malformed values fall back to the default for that key and are
    /// logged. Unknown keys are ignored.
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();

        for (key, value) in entries {
            let key = key.as_ref();
            let slot = match key {
                SHOW_WARNINGS_KEY => &mut config.show_warnings,
                ALLOW_PERSISTENT_KEY => &mut config.allow_persistent,
                _ => continue,
            };

            match parse_bool(key, value.as_ref()) {
                Ok(flag) => *slot = flag,
                Err(e) => {
                    log::warn!("{}; using default", e);
                    *slot = false;
                }
            }
        }

        config
    }
}

/// Parse an INI boolean the way hosts commonly spell them
pub fn parse_bool(key: &str, value: &str) -> Result<bool, Error> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "on" | "true" | "yes" => Ok(true),
        "" | "0" | "off" | "false" | "no" => Ok(false),
        _ => Err(Error::Configuration {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}
