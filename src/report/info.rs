//! Info page rows handed to the host renderer

use crate::features::FeatureSet;
use crate::host::HostBindings;
use crate::library::LibraryVersions;

use super::CodecReport;

/// One label/value row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoRow {
    pub label: &'static str,
    pub value: String,
}

impl InfoRow {
    fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
        }
    }
}

/// The module's section of the host info page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoPage {
    rows: Vec<InfoRow>,
}

impl InfoPage {
    pub fn build(versions: &LibraryVersions, features: FeatureSet, codecs: &CodecReport) -> Self {
        let mut rows = vec![
            InfoRow::new("ffmpeg-php version", crate::VERSION),
            InfoRow::new("ffmpeg-php built on", crate::BUILD_DATE),
            // trailing space is part of the label hosts have always shown
            InfoRow::new(
                "ffmpeg-php gd support ",
                FeatureSet::label(features.image_support),
            ),
            InfoRow::new("ffmpeg libavcodec version", versions.codec_ident()),
            InfoRow::new("ffmpeg libavcodec license", versions.codec_license.as_str()),
            InfoRow::new("ffmpeg libavformat version", versions.format_ident()),
            InfoRow::new("ffmpeg libavformat license", versions.format_license.as_str()),
        ];

        match (features.scaler, versions.scaler.as_ref()) {
            (true, Some((_, license))) => {
                rows.push(InfoRow::new(
                    "ffmpeg swscaler version",
                    versions.scaler_ident().unwrap_or_default(),
                ));
                rows.push(InfoRow::new("ffmpeg swscaler license", license.as_str()));
            }
            _ => rows.push(InfoRow::new("ffmpeg swscaler", FeatureSet::label(false))),
        }

        rows.push(InfoRow::new("ffmpeg codec_list", codecs.as_str()));

        Self { rows }
    }

    pub fn rows(&self) -> &[InfoRow] {
        &self.rows
    }

    /// Render as a table followed by the INI entries
    pub fn render(&self, host: &mut dyn HostBindings) {
        host.info_table_start();
        for row in &self.rows {
            host.info_row(row.label, &row.value);
        }
        host.info_table_end();
        host.display_ini_entries();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::tests::RecordingHost;
    use crate::library::{CodecDescriptor, MediaType};
    use crate::report::build_report;

    fn versions(scaler: bool) -> LibraryVersions {
        LibraryVersions {
            codec_version: (61 << 16) | (19 << 8) | 100,
            codec_build: (61 << 16) | (19 << 8) | 100,
            codec_license: "LGPL version 2.1 or later".into(),
            format_version: (61 << 16) | (7 << 8) | 100,
            format_license: "GPL version 2 or later".into(),
            scaler: scaler.then(|| ((8 << 16) | (3 << 8) | 100, "LGPL version 2.1 or later".into())),
        }
    }

    fn codecs() -> CodecReport {
        build_report(&vec![
            CodecDescriptor::new("h264", MediaType::Video),
            CodecDescriptor::new("mp3", MediaType::Audio),
        ])
        .unwrap()
    }

    #[test]
    fn test_rows_with_scaler() {
        let features = FeatureSet {
            image_support: false,
            scaler: true,
        };
        let page = InfoPage::build(&versions(true), features, &codecs());
        let labels: Vec<_> = page.rows().iter().map(|r| r.label).collect();

        assert_eq!(
            labels,
            [
                "ffmpeg-php version",
                "ffmpeg-php built on",
                "ffmpeg-php gd support ",
                "ffmpeg libavcodec version",
                "ffmpeg libavcodec license",
                "ffmpeg libavformat version",
                "ffmpeg libavformat license",
                "ffmpeg swscaler version",
                "ffmpeg swscaler license",
                "ffmpeg codec_list",
            ]
        );
        assert_eq!(page.rows()[2].value, "disabled");
        assert_eq!(page.rows()[3].value, "Lavc61.19.100");
        assert_eq!(page.rows()[6].value, "GPL version 2 or later");
        assert_eq!(page.rows()[7].value, "SwS8.3.100");
        assert_eq!(page.rows()[9].value, "h264(v), mp3(a), ");
    }

    #[test]
    fn test_rows_without_scaler() {
        let features = FeatureSet {
            image_support: true,
            scaler: false,
        };
        let page = InfoPage::build(&versions(false), features, &codecs());

        assert_eq!(page.rows().len(), 9);
        assert_eq!(page.rows()[2].value, "enabled");
        assert_eq!(page.rows()[7], InfoRow::new("ffmpeg swscaler", "disabled"));
    }

    #[test]
    fn test_render_order() {
        let page = InfoPage::build(&versions(false), FeatureSet::current(), &codecs());
        let mut host = RecordingHost::default();
        page.render(&mut host);

        assert_eq!(host.calls.first().map(String::as_str), Some("info_table_start"));
        assert_eq!(host.calls.last().map(String::as_str), Some("display_ini_entries"));
        assert_eq!(host.calls[host.calls.len() - 2], "info_table_end");
        assert_eq!(host.rows.len(), page.rows().len());
    }
}
