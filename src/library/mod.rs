//! Native codec library abstraction
//!
//! [`NativeLibrary`] is the seam between the module and FFmpeg. The
//! production implementation lives in [`ffmpeg`]; tests substitute a fake.

use std::sync::Arc;

use crate::diagnostics::DiagnosticRouter;
use crate::error::Result;

pub mod ffmpeg;

pub use self::ffmpeg::FfmpegLibrary;

/// Media category of a codec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Video,
    Audio,
    Subtitle,
    Unknown,
}

impl MediaType {
    /// Single-character tag used in the codec listing
    pub const fn type_char(self) -> char {
        match self {
            MediaType::Video => 'v',
            MediaType::Audio => 'a',
            MediaType::Subtitle => 's',
            MediaType::Unknown => 'u',
        }
    }
}

impl From<ffmpeg_next::media::Type> for MediaType {
    fn from(t: ffmpeg_next::media::Type) -> Self {
        use ffmpeg_next::media::Type;

        match t {
            Type::Video => MediaType::Video,
            Type::Audio => MediaType::Audio,
            Type::Subtitle => MediaType::Subtitle,
            _ => MediaType::Unknown,
        }
    }
}

/// A codec known to the native library.
///
/// Borrows its name from the library's own codec table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecDescriptor<'a> {
    /// Short name (e.g., "h264")
    pub name: &'a str,

    /// Media category
    pub media_type: MediaType,
}

impl<'a> CodecDescriptor<'a> {
    pub const fn new(name: &'a str, media_type: MediaType) -> Self {
        Self { name, media_type }
    }
}

/// Read-only, registration-ordered view of the codec table
pub trait CodecRegistry {
    /// Iterate descriptors in registration order
    fn codecs(&self) -> Box<dyn Iterator<Item = CodecDescriptor<'_>> + '_>;
}

impl<'a> CodecRegistry for [CodecDescriptor<'a>] {
    fn codecs(&self) -> Box<dyn Iterator<Item = CodecDescriptor<'_>> + '_> {
        Box::new(
            self.iter()
                .map(|c| CodecDescriptor::new(c.name, c.media_type)),
        )
    }
}

impl<'a> CodecRegistry for Vec<CodecDescriptor<'a>> {
    fn codecs(&self) -> Box<dyn Iterator<Item = CodecDescriptor<'_>> + '_> {
        self.as_slice().codecs()
    }
}

/// Version and license information of the native libraries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryVersions {
    /// libavcodec version as `AV_VERSION_INT`
    pub codec_version: u32,

    /// libavcodec build number
    pub codec_build: u32,

    /// libavcodec license
    pub codec_license: String,

    /// libavformat version as `AV_VERSION_INT`
    pub format_version: u32,

    /// libavformat license
    pub format_license: String,

    /// libswscale version and license, when linked
    pub scaler: Option<(u32, String)>,
}

impl LibraryVersions {
    /// libavcodec identifier (e.g., "Lavc61.19.100")
    pub fn codec_ident(&self) -> String {
        version_ident("Lavc", self.codec_version)
    }

    /// libavformat identifier (e.g., "Lavf61.7.100")
    pub fn format_ident(&self) -> String {
        version_ident("Lavf", self.format_version)
    }

    /// libswscale identifier, when linked
    pub fn scaler_ident(&self) -> Option<String> {
        self.scaler
            .as_ref()
            .map(|(version, _)| version_ident("SwS", *version))
    }
}

/// Format an `AV_VERSION_INT` with a library prefix
pub fn version_ident(prefix: &str, version: u32) -> String {
    format!(
        "{}{}.{}.{}",
        prefix,
        version >> 16,
        (version >> 8) & 0xff,
        version & 0xff
    )
}

/// Operations the module needs from the native codec library
pub trait NativeLibrary: CodecRegistry + Send + Sync {
    /// Perform the library's global codec/format registration
    fn register_all(&self) -> Result<()>;

    /// Make `router` the library's sole log sink, replacing any previous one
    fn install_log_router(&self, router: Arc<DiagnosticRouter>);

    /// Version and license information
    fn versions(&self) -> LibraryVersions;
}
