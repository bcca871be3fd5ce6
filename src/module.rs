//! Host extension hooks: startup, shutdown and info
//!
//! [`FfmpegModule`] is the process-scoped service object. The host creates
//! one, passes it to every hook, and keeps it for the life of the process.

use std::sync::Arc;

use crate::config::{ModuleConfig, INI_ENTRIES};
use crate::diagnostics::{DiagnosticSink, LogCrateSink};
use crate::error::{Error, Result};
use crate::features::FeatureSet;
use crate::host::{exported_constants, HostBindings, HOST_CLASSES};
use crate::library::{FfmpegLibrary, NativeLibrary};
use crate::lifecycle::{LibraryLifecycleManager, LibraryState, Transition};
use crate::report::{build_report, CodecReport, InfoPage};

/// The extension module
pub struct FfmpegModule {
    config: ModuleConfig,
    features: FeatureSet,
    lifecycle: LibraryLifecycleManager,
}

impl FfmpegModule {
    /// Module backed by FFmpeg
    pub fn new(config: ModuleConfig) -> Self {
        Self::with_library(config, Arc::new(FfmpegLibrary::new()))
    }

    /// Module backed by any native library
    pub fn with_library(config: ModuleConfig, library: Arc<dyn NativeLibrary>) -> Self {
        Self {
            config,
            features: FeatureSet::current(),
            lifecycle: LibraryLifecycleManager::new(library),
        }
    }

    /// Override the compiled-in feature set
    pub fn with_features(mut self, features: FeatureSet) -> Self {
        self.features = features;
        self
    }

    /// Start the module, forwarding FFmpeg warnings to the `log` facade
    pub fn startup(&self, host: &mut dyn HostBindings) -> Result<()> {
        self.startup_with_sink(host, Box::new(LogCrateSink))
    }

    /// Start the module with a host-supplied warning channel.
    ///
    /// Registers the native library, installs the diagnostic policy, then
    /// declares INI entries, classes and constants. A repeated call while
    /// started registers nothing.
    pub fn startup_with_sink(
        &self,
        host: &mut dyn HostBindings,
        sink: Box<dyn DiagnosticSink>,
    ) -> Result<()> {
        if self.lifecycle.init(self.config.show_warnings, sink)? == Transition::NoOp {
            return Ok(());
        }

        host.register_ini_entries(&INI_ENTRIES);
        for class in HOST_CLASSES {
            host.register_class(class);
        }

        let versions = self.lifecycle.library().versions();
        for (name, value) in exported_constants(&versions, self.features) {
            host.register_constant(name, value);
        }

        log::info!("ffmpeg module {} started", crate::VERSION);
        Ok(())
    }

    /// Stop the module, releasing its INI entries
    pub fn shutdown(&self, host: &mut dyn HostBindings) {
        if self.lifecycle.shutdown() == Transition::Performed {
            host.unregister_ini_entries();
        }
    }

    /// Codec listing of the live registry
    pub fn codec_report(&self) -> Result<CodecReport> {
        if !self.lifecycle.is_initialized() {
            return Err(Error::NotInitialized);
        }
        build_report(self.lifecycle.library().as_ref())
    }

    /// Assemble the info page without rendering it
    pub fn info_page(&self) -> Result<InfoPage> {
        let codecs = self.codec_report()?;
        let versions = self.lifecycle.library().versions();
        Ok(InfoPage::build(&versions, self.features, &codecs))
    }

    /// Render the module's info page section
    pub fn info(&self, host: &mut dyn HostBindings) -> Result<()> {
        self.info_page()?.render(host);
        Ok(())
    }

    pub fn state(&self) -> LibraryState {
        self.lifecycle.state()
    }

    pub fn config(&self) -> &ModuleConfig {
        &self.config
    }

    pub fn features(&self) -> FeatureSet {
        self.features
    }
}
