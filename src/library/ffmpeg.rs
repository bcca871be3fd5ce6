//! FFmpeg-backed native library using ffmpeg-next
//!
//! Owns the process-wide log-callback slot. FFmpeg accepts a single
//! `av_log_set_callback` function, so the installed [`DiagnosticRouter`] is
//! kept here and looked up on every callback.

use std::ffi::{c_char, c_int, c_void, CStr};
use std::marker::PhantomData;
use std::ptr;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use ffmpeg_next as ffmpeg;
use ffmpeg_next::ffi;
use parking_lot::RwLock;

use super::{CodecDescriptor, CodecRegistry, LibraryVersions, MediaType, NativeLibrary};
use crate::diagnostics::{DiagnosticRouter, LogSeverityPolicy, NativeLogEvent};
use crate::error::Result;

/// Router the FFmpeg log callback forwards to
static ACTIVE_ROUTER: RwLock<Option<Arc<DiagnosticRouter>>> = parking_lot::const_rwlock(None);

/// Line buffer size for a single formatted log message.
///
/// The `va_list` can be walked only once, so a line is formatted in a single
/// pass; FFmpeg's own default callback stops at 1024 bytes.
const LOG_LINE_SIZE: usize = 16 * 1024;

/// Whether the next fragment starts a new line and gets the context prefix.
/// Shared across calls like the static in `av_log_default_callback`.
static PRINT_PREFIX: AtomicI32 = AtomicI32::new(1);

/// Log callback registered with FFmpeg.
///
/// Every call becomes exactly one [`NativeLogEvent`], including
/// newline-only fragments.
///
/// # Safety
/// Called by FFmpeg's logging system. Uses `av_log_format_line2` to
/// format the variadic arguments into a heap buffer.
unsafe extern "C" fn ffmpeg_log_callback(
    avcl: *mut c_void,
    level: c_int,
    fmt: *const c_char,
    vl: ffi::va_list,
) {
    let router = match ACTIVE_ROUTER.read().as_ref() {
        Some(router) => router.clone(),
        None => return,
    };

    // Nothing to format when the event is going to be dropped anyway
    if router.policy() == LogSeverityPolicy::Suppressed {
        return;
    }

    let mut buf = vec![0u8; LOG_LINE_SIZE];
    let mut print_prefix = PRINT_PREFIX.load(Ordering::Acquire);
    let written = unsafe {
        ffi::av_log_format_line2(
            avcl,
            level,
            fmt,
            vl,
            buf.as_mut_ptr() as *mut c_char,
            buf.len() as c_int,
            &mut print_prefix,
        )
    };
    PRINT_PREFIX.store(print_prefix, Ordering::Release);
    if written < 0 {
        return;
    }

    let len = (written as usize).min(buf.len() - 1);
    let message = String::from_utf8_lossy(&buf[..len]);
    // Only the line terminator is dropped
    let message = message.strip_suffix('\n').unwrap_or(&message);

    router.route(&NativeLogEvent::new(level, message));
}

/// Iterator over FFmpeg's registered codecs, in registration order
struct CodecIter<'a> {
    opaque: *mut c_void,
    _registry: PhantomData<&'a FfmpegLibrary>,
}

impl<'a> Iterator for CodecIter<'a> {
    type Item = CodecDescriptor<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        // The codec table is static for the lifetime of the process
        unsafe {
            let codec = ffi::av_codec_iterate(&mut self.opaque);
            if codec.is_null() {
                return None;
            }

            let name = if (*codec).name.is_null() {
                "unknown"
            } else {
                CStr::from_ptr((*codec).name).to_str().unwrap_or("unknown")
            };
            let media_type = MediaType::from(ffmpeg::media::Type::from((*codec).type_));

            Some(CodecDescriptor::new(name, media_type))
        }
    }
}

/// FFmpeg native library
#[derive(Debug, Default)]
pub struct FfmpegLibrary;

impl FfmpegLibrary {
    pub fn new() -> Self {
        Self
    }
}

impl CodecRegistry for FfmpegLibrary {
    fn codecs(&self) -> Box<dyn Iterator<Item = CodecDescriptor<'_>> + '_> {
        Box::new(CodecIter {
            opaque: ptr::null_mut(),
            _registry: PhantomData,
        })
    }
}

impl NativeLibrary for FfmpegLibrary {
    fn register_all(&self) -> Result<()> {
        ffmpeg::init()?;
        Ok(())
    }

    fn install_log_router(&self, router: Arc<DiagnosticRouter>) {
        log::debug!("Installing FFmpeg log router: {:?}", router.policy());
        *ACTIVE_ROUTER.write() = Some(router);

        unsafe {
            ffi::av_log_set_callback(Some(ffmpeg_log_callback));
        }
    }

    fn versions(&self) -> LibraryVersions {
        let codec_version = ffmpeg::codec::version();

        #[cfg(feature = "swscale")]
        let scaler = Some((
            ffmpeg::software::scaling::version(),
            ffmpeg::software::scaling::license().to_string(),
        ));
        #[cfg(not(feature = "swscale"))]
        let scaler = None;

        LibraryVersions {
            codec_version,
            // LIBAVCODEC_BUILD has been an alias of the version int since avcodec_build() was removed
            codec_build: codec_version,
            codec_license: ffmpeg::codec::license().to_string(),
            format_version: ffmpeg::format::version(),
            format_license: ffmpeg::format::license().to_string(),
            scaler,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::ChannelSink;
    use crate::report::build_report;

    fn log_native(level: c_int, line: &[u8]) {
        unsafe { ffi::av_log(ptr::null_mut(), level, line.as_ptr() as *const c_char) }
    }

    #[test]
    fn test_register_and_enumerate() {
        let library = FfmpegLibrary::new();
        library.register_all().unwrap();

        let count = library.codecs().count();
        assert!(count > 0);

        let report = build_report(&library).unwrap();
        assert_eq!(report.as_str().matches("), ").count(), count);
        assert!(report.as_str().ends_with("), "));
    }

    #[test]
    fn test_versions() {
        let versions = FfmpegLibrary::new().versions();
        assert!(versions.codec_ident().starts_with("Lavc"));
        assert!(versions.format_ident().starts_with("Lavf"));
        assert_eq!(versions.codec_build, versions.codec_version);
        assert!(!versions.codec_license.is_empty());
        assert_eq!(versions.scaler.is_some(), cfg!(feature = "swscale"));
    }

    #[test]
    fn test_log_bridge() {
        let library = FfmpegLibrary::new();
        library.register_all().unwrap();

        let (sink, rx) = ChannelSink::channel();
        library.install_log_router(Arc::new(DiagnosticRouter::configure(true, Box::new(sink))));

        log_native(ffi::AV_LOG_WARNING, b"first\n\0");
        log_native(ffi::AV_LOG_INFO, b"\n\0");
        log_native(ffi::AV_LOG_INFO, b"partial \0");
        assert_eq!(PRINT_PREFIX.load(Ordering::Acquire), 0);
        log_native(ffi::AV_LOG_INFO, b"line\n\0");
        assert_eq!(PRINT_PREFIX.load(Ordering::Acquire), 1);

        let long = "x".repeat(4000);
        let fmt = b"%s\n\0";
        let arg = std::ffi::CString::new(long.clone()).unwrap();
        unsafe {
            ffi::av_log(
                ptr::null_mut(),
                ffi::AV_LOG_ERROR,
                fmt.as_ptr() as *const c_char,
                arg.as_ptr(),
            )
        };

        let events: Vec<_> = rx.try_iter().collect();
        let messages: Vec<_> = events.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, ["first", "", "partial ", "line", long.as_str()]);
        assert_eq!(events[0].level, ffi::AV_LOG_WARNING);

        // Suppressed: nothing reaches either sink
        let (quiet, quiet_rx) = ChannelSink::channel();
        library.install_log_router(Arc::new(DiagnosticRouter::configure(false, Box::new(quiet))));
        log_native(ffi::AV_LOG_WARNING, b"dropped\n\0");
        assert!(quiet_rx.try_recv().is_err());
        assert!(rx.try_recv().is_err());

        *ACTIVE_ROUTER.write() = None;
    }
}
