//! Services the scripting host provides to the module
//!
//! The host owns its class model, INI machinery, constant table and info
//! page renderer. The module only calls into them through [`HostBindings`].

use crate::config::IniEntry;
use crate::features::FeatureSet;
use crate::library::LibraryVersions;

/// Class names the module registers with the host
pub const HOST_CLASSES: [&str; 2] = ["ffmpeg_movie", "ffmpeg_frame"];

/// Value of an exported host constant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstantValue {
    Str(String),
    Long(i64),
}

/// Registration and rendering services of the host runtime
pub trait HostBindings {
    /// Declare the module's INI entries
    fn register_ini_entries(&mut self, entries: &[IniEntry]);

    /// Release the module's INI entries
    fn unregister_ini_entries(&mut self);

    /// Register a script-visible class
    fn register_class(&mut self, name: &str);

    /// Register a persistent, case-sensitive constant
    fn register_constant(&mut self, name: &str, value: ConstantValue);

    fn info_table_start(&mut self);

    /// Emit one label/value row of the info table
    fn info_row(&mut self, label: &str, value: &str);

    fn info_table_end(&mut self);

    /// Show the module's INI entries below the info table
    fn display_ini_entries(&mut self);
}

/// Constants exported to the host, in registration order
pub fn exported_constants(
    versions: &LibraryVersions,
    features: FeatureSet,
) -> Vec<(&'static str, ConstantValue)> {
    vec![
        (
            "FFMPEG_PHP_VERSION_STRING",
            ConstantValue::Str(crate::VERSION.to_string()),
        ),
        (
            "FFMPEG_PHP_BUILD_DATE_STRING",
            ConstantValue::Str(crate::BUILD_DATE.to_string()),
        ),
        (
            "LIBAVCODEC_VERSION_NUMBER",
            ConstantValue::Long(i64::from(versions.codec_version)),
        ),
        (
            "LIBAVCODEC_BUILD_NUMBER",
            ConstantValue::Long(i64::from(versions.codec_build)),
        ),
        (
            "FFMPEG_PHP_GD_ENABLED",
            ConstantValue::Long(i64::from(features.image_support)),
        ),
    ]
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Host double that records every call in order
    #[derive(Debug, Default)]
    pub(crate) struct RecordingHost {
        pub calls: Vec<String>,
        pub ini_entries: Vec<IniEntry>,
        pub classes: Vec<String>,
        pub constants: Vec<(String, ConstantValue)>,
        pub rows: Vec<(String, String)>,
    }

    impl HostBindings for RecordingHost {
        fn register_ini_entries(&mut self, entries: &[IniEntry]) {
            self.calls.push("register_ini_entries".into());
            self.ini_entries.extend_from_slice(entries);
        }

        fn unregister_ini_entries(&mut self) {
            self.calls.push("unregister_ini_entries".into());
            self.ini_entries.clear();
        }

        fn register_class(&mut self, name: &str) {
            self.calls.push(format!("register_class {}", name));
            self.classes.push(name.to_string());
        }

        fn register_constant(&mut self, name: &str, value: ConstantValue) {
            self.calls.push(format!("register_constant {}", name));
            self.constants.push((name.to_string(), value));
        }

        fn info_table_start(&mut self) {
            self.calls.push("info_table_start".into());
        }

        fn info_row(&mut self, label: &str, value: &str) {
            self.calls.push("info_row".into());
            self.rows.push((label.to_string(), value.to_string()));
        }

        fn info_table_end(&mut self) {
            self.calls.push("info_table_end".into());
        }

        fn display_ini_entries(&mut self) {
            self.calls.push("display_ini_entries".into());
        }
    }

    fn versions() -> LibraryVersions {
        LibraryVersions {
            codec_version: 0x3d1364,
            codec_build: 0x3d1364,
            codec_license: "LGPL".into(),
            format_version: 0x3d0764,
            format_license: "LGPL".into(),
            scaler: None,
        }
    }

    #[test]
    fn test_exported_constants() {
        let features = FeatureSet {
            image_support: true,
            scaler: false,
        };
        let constants = exported_constants(&versions(), features);
        let names: Vec<_> = constants.iter().map(|(n, _)| *n).collect();
        assert_eq!(
            names,
            [
                "FFMPEG_PHP_VERSION_STRING",
                "FFMPEG_PHP_BUILD_DATE_STRING",
                "LIBAVCODEC_VERSION_NUMBER",
                "LIBAVCODEC_BUILD_NUMBER",
                "FFMPEG_PHP_GD_ENABLED",
            ]
        );
        assert_eq!(constants[0].1, ConstantValue::Str(crate::VERSION.to_string()));
        assert_eq!(constants[2].1, ConstantValue::Long(0x3d1364));
        assert_eq!(constants[4].1, ConstantValue::Long(1));
    }

    #[test]
    fn test_gd_disabled_constant() {
        let features = FeatureSet {
            image_support: false,
            scaler: true,
        };
        let constants = exported_constants(&versions(), features);
        assert_eq!(constants[4].1, ConstantValue::Long(0));
    }
}
