use std::sync::Mutex;

/// Sink for the handler's per-invocation diagnostic messages.
pub trait Diagnostics: Send + Sync {
    fn log(&self, message: &str);
}

/// Forwards every message to `tracing` at info level.
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn log(&self, message: &str) {
        tracing::info!(target: "ec2_owner_tagger", "{message}");
    }
}

/// Keeps messages in memory; used by tests and dry runs.
#[derive(Default)]
pub struct RecordingDiagnostics {
    lines: Mutex<Vec<String>>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.messages().iter().any(|m| m.contains(needle))
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn log(&self, message: &str) {
        if let Ok(mut l) = self.lines.lock() {
            l.push(message.to_string());
        }
    }
}
