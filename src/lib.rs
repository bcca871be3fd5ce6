//! ffmpeg-module-core - FFmpeg glue for scripting-host extensions
//!
//! This crate provides the process-lifecycle core of an FFmpeg host
//! extension:
//! - One-time FFmpeg registration with an explicit lifecycle state
//! - Routing of FFmpeg's log stream by the `show_warnings` flag
//! - Library constants and info page rows for the host
//! - The `name(t), ` codec registry listing
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │           FFI Layer                  │
//! │  (C exports via #[no_mangle])        │
//! └─────────────────────────────────────┘
//!                  │
//!                  ▼
//! ┌─────────────────────────────────────┐
//! │          FfmpegModule                │
//! │  (startup / shutdown / info hooks)   │
//! └─────────────────────────────────────┘
//!          │                  │
//!          ▼                  ▼
//! ┌──────────────────┐ ┌────────────────┐
//! │    Lifecycle     │ │     Report     │
//! │ (init + router)  │ │ (codec list)   │
//! └──────────────────┘ └────────────────┘
//!          │                  │
//!          ▼                  ▼
//! ┌─────────────────────────────────────┐
//! │         NativeLibrary                │
//! │  (ffmpeg-next wrapper)               │
//! └─────────────────────────────────────┘
//! ```

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod features;
pub mod ffi;
pub mod host;
pub mod library;
pub mod lifecycle;
pub mod module;
pub mod report;

// Re-export main types
pub use config::ModuleConfig;
pub use diagnostics::{DiagnosticRouter, DiagnosticSink, LogSeverityPolicy, NativeLogEvent};
pub use error::{Error, Result};
pub use features::FeatureSet;
pub use host::{ConstantValue, HostBindings};
pub use library::{CodecDescriptor, CodecRegistry, FfmpegLibrary, MediaType, NativeLibrary};
pub use lifecycle::{LibraryLifecycleManager, LibraryState};
pub use module::FfmpegModule;
pub use report::{build_report, CodecReport, ReportBuffer};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build timestamp, stamped by build.rs
pub const BUILD_DATE: &str = env!("FFMPEG_MODULE_BUILD_DATE");

/// Initialize Rust-side logging (safe to call more than once)
pub fn init_logging() {
    // Initialize logging with info level by default if RUST_LOG is not set
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).try_init();

    log::debug!("ffmpeg-module-core {} logging ready", VERSION);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert!(!BUILD_DATE.is_empty());
    }

    #[test]
    fn test_init_logging_twice() {
        init_logging();
        init_logging();
    }
}
