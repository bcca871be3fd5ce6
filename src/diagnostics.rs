//! Diagnostic routing for FFmpeg's internal log stream
//!
//! The router is built once from configuration and installed as the native
//! library's only log sink. It is a binary switch: under
//! [`LogSeverityPolicy::Verbose`] every event reaches the host sink as-is,
//! under [`LogSeverityPolicy::Suppressed`] every event is dropped.

use crossbeam_channel::{unbounded, Receiver, Sender};

/// Whether native log events are forwarded or dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSeverityPolicy {
    /// Forward every event to the host warning channel
    Verbose,
    /// Drop every event
    Suppressed,
}

impl LogSeverityPolicy {
    /// Policy for the `show_warnings` flag
    pub const fn from_show_warnings(show_warnings: bool) -> Self {
        if show_warnings {
            Self::Verbose
        } else {
            Self::Suppressed
        }
    }
}

impl Default for LogSeverityPolicy {
    fn default() -> Self {
        Self::Suppressed
    }
}

/// One formatted log line from the native library
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeLogEvent {
    /// Raw FFmpeg severity (`AV_LOG_*`), not used for routing
    pub level: i32,

    /// Formatted message without trailing newline
    pub message: String,
}

impl NativeLogEvent {
    pub fn new(level: i32, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

/// The host's visible error/warning channel
pub trait DiagnosticSink: Send + Sync {
    fn forward(&self, event: &NativeLogEvent);
}

/// Forwards events to the `log` facade under the `ffmpeg` target
#[derive(Debug, Default)]
pub struct LogCrateSink;

impl DiagnosticSink for LogCrateSink {
    fn forward(&self, event: &NativeLogEvent) {
        log::warn!(target: "ffmpeg", "{}", event.message);
    }
}

/// Queues events for a host that drains them on its own thread.
///
/// FFmpeg may log from its worker threads; the queue preserves emission
/// order across them.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: Sender<NativeLogEvent>,
}

impl ChannelSink {
    /// Create a sink and the receiver the host drains
    pub fn channel() -> (Self, Receiver<NativeLogEvent>) {
        let (tx, rx) = unbounded();
        (Self { tx }, rx)
    }
}

impl DiagnosticSink for ChannelSink {
    fn forward(&self, event: &NativeLogEvent) {
        // Receiver gone means the host stopped listening
        let _ = self.tx.send(event.clone());
    }
}

/// Applies a [`LogSeverityPolicy`] to native log events
pub struct DiagnosticRouter {
    policy: LogSeverityPolicy,
    sink: Box<dyn DiagnosticSink>,
}

impl DiagnosticRouter {
    /// Build the router for the `show_warnings` flag
    pub fn configure(show_warnings: bool, sink: Box<dyn DiagnosticSink>) -> Self {
        Self {
            policy: LogSeverityPolicy::from_show_warnings(show_warnings),
            sink,
        }
    }

    /// Active policy
    pub fn policy(&self) -> LogSeverityPolicy {
        self.policy
    }

    /// Route one event according to the policy
    pub fn route(&self, event: &NativeLogEvent) {
        match self.policy {
            LogSeverityPolicy::Verbose => self.sink.forward(event),
            LogSeverityPolicy::Suppressed => {}
        }
    }
}

impl std::fmt::Debug for DiagnosticRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagnosticRouter")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
