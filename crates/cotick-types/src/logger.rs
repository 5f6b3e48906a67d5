//! Optional human-readable diagnostic sink.
//!
//! The scheduler and the dispatcher both report what they do through a
//! [`Logger`]. Every line is emitted as a `tracing` event; when a sink
//! closure is attached it also receives the plain text, which is how a
//! host prints command output to its console.

use std::fmt;
use std::rc::Rc;

/// Sink closure receiving one diagnostic line at a time.
pub type LogSink = Rc<dyn Fn(&str)>;

/// Cloneable handle to an optional [`LogSink`].
#[derive(Clone, Default)]
pub struct Logger {
    sink: Option<LogSink>,
}

impl Logger {
    /// Creates a logger forwarding to `sink`.
    pub fn new(sink: impl Fn(&str) + 'static) -> Self {
        Self {
            sink: Some(Rc::new(sink)),
        }
    }

    /// Creates a logger without sink. Lines still reach `tracing`.
    #[must_use]
    pub fn silent() -> Self {
        Self::default()
    }

    /// Returns `true` if a sink is attached.
    #[must_use]
    pub fn has_sink(&self) -> bool {
        self.sink.is_some()
    }

    /// Emits one line.
    pub fn log(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        tracing::info!(target: "cotick::log", "{message}");
        if let Some(sink) = &self.sink {
            sink(message);
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("has_sink", &self.sink.is_some())
            .finish()
    }
}
