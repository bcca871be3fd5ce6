//! One-time native library initialization and teardown

use std::sync::Arc;

use parking_lot::Mutex;

use crate::diagnostics::{DiagnosticRouter, DiagnosticSink, LogSeverityPolicy};
use crate::error::{Error, Result};
use crate::library::NativeLibrary;

/// Process-wide state of the native library
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibraryState {
    Uninitialized,
    Initialized,
    ShutDown,
}

/// Whether a lifecycle call changed state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// State changed; callers perform their side of the transition
    Performed,
    /// Already in the target state
    NoOp,
}

/// Owns the one-time registration/teardown sequence
pub struct LibraryLifecycleManager {
    library: Arc<dyn NativeLibrary>,
    state: Mutex<LibraryState>,
    policy: Mutex<Option<LogSeverityPolicy>>,
}

impl LibraryLifecycleManager {
    pub fn new(library: Arc<dyn NativeLibrary>) -> Self {
        Self {
            library,
            state: Mutex::new(LibraryState::Uninitialized),
            policy: Mutex::new(None),
        }
    }

    /// Register the native library and install the diagnostic router.
    ///
    /// A second call while initialized does nothing. Calling after
    /// [`shutdown`](Self::shutdown) is an error. If registration fails the
    /// state stays `Uninitialized`.
    pub fn init(&self, show_warnings: bool, sink: Box<dyn DiagnosticSink>) -> Result<Transition> {
        let mut state = self.state.lock();

        match *state {
            LibraryState::Initialized => {
                log::debug!("Native library already initialized, skipping registration");
                return Ok(Transition::NoOp);
            }
            LibraryState::ShutDown => {
                return Err(Error::Lifecycle(
                    "cannot initialize after shutdown".to_string(),
                ));
            }
            LibraryState::Uninitialized => {}
        }

        self.library.register_all()?;

        let router = Arc::new(DiagnosticRouter::configure(show_warnings, sink));
        let policy = router.policy();
        self.library.install_log_router(router);

        *self.policy.lock() = Some(policy);
        *state = LibraryState::Initialized;
        log::info!("Native library initialized (diagnostics: {:?})", policy);

        Ok(Transition::Performed)
    }

    /// Move to `ShutDown`.
    ///
    /// Returns `Performed` only when leaving `Initialized`; that is when
    /// host-side configuration has to be released. The native registry is
    /// left to the library.
    pub fn shutdown(&self) -> Transition {
        let mut state = self.state.lock();
        let previous = std::mem::replace(&mut *state, LibraryState::ShutDown);

        match previous {
            LibraryState::Initialized => {
                log::info!("Native library shut down");
                Transition::Performed
            }
            LibraryState::Uninitialized | LibraryState::ShutDown => Transition::NoOp,
        }
    }

    /// Current state
    pub fn state(&self) -> LibraryState {
        *self.state.lock()
    }

    /// Check if initialized
    pub fn is_initialized(&self) -> bool {
        self.state() == LibraryState::Initialized
    }

    /// Policy installed by `init`, if it ran
    pub fn policy(&self) -> Option<LogSeverityPolicy> {
        *self.policy.lock()
    }

    /// The managed library
    pub fn library(&self) -> &Arc<dyn NativeLibrary> {
        &self.library
    }
}
