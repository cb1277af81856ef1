//! Structured pipeline events.
//!
//! The orchestrator reports progress through an [`EventSink`] it is handed,
//! rather than logging directly. The default sink forwards to `tracing`; the
//! CLI can layer an `indicatif` spinner on top.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Extraction,
    Transcription,
    Diarization,
    Alignment,
    Synthesis,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Extraction => "audio extraction",
            Stage::Transcription => "transcription",
            Stage::Diarization => "diarization",
            Stage::Alignment => "alignment",
            Stage::Synthesis => "subtitle generation",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    StageStarted { stage: Stage },
    StageCompleted { stage: Stage, detail: String },
    OutputWritten { path: PathBuf, segments: usize },
    ArtifactsRemoved { path: PathBuf },
    Warning { message: String },
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: &PipelineEvent);
}

/// Forwards events to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::StageStarted { stage } => info!("Starting {}...", stage),
            PipelineEvent::StageCompleted { stage, detail } => {
                info!("Completed {}: {}", stage, detail)
            }
            PipelineEvent::OutputWritten { path, segments } => {
                info!("Wrote {} subtitle entries to {}", segments, path.display())
            }
            PipelineEvent::ArtifactsRemoved { path } => {
                debug!("Removed temporary artifacts in {}", path.display())
            }
            PipelineEvent::Warning { message } => warn!("{}", message),
        }
    }
}

/// Shows the current stage on a terminal spinner and forwards every event
pub struct ProgressSink {
    bar: ProgressBar,
    inner: Arc<dyn EventSink>,
}

impl ProgressSink {
    pub fn new(inner: Arc<dyn EventSink>) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.enable_steady_tick(Duration::from_millis(120));
        Self { bar, inner }
    }
}

impl EventSink for ProgressSink {
    fn emit(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::StageStarted { stage } => self.bar.set_message(format!("{}...", stage)),
            PipelineEvent::OutputWritten { path, .. } => {
                self.bar.set_message(format!("Wrote {}", path.display()))
            }
            _ => {}
        }
        self.inner.emit(event);
    }
}

impl Drop for ProgressSink {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}

/// Collects events for assertions
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingSink {
    events: std::sync::Mutex<Vec<PipelineEvent>>,
}

#[cfg(test)]
impl RecordingSink {
    pub(crate) fn events(&self) -> Vec<PipelineEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl EventSink for RecordingSink {
    fn emit(&self, event: &PipelineEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_sink_forwards_events() {
        let recorder = Arc::new(RecordingSink::default());
        let sink = ProgressSink::new(recorder.clone());
        sink.emit(&PipelineEvent::StageStarted { stage: Stage::Transcription });
        sink.emit(&PipelineEvent::Warning { message: "skipped".to_string() });
        drop(sink);

        assert_eq!(
            recorder.events(),
            vec![
                PipelineEvent::StageStarted { stage: Stage::Transcription },
                PipelineEvent::Warning { message: "skipped".to_string() },
            ]
        );
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(Stage::Synthesis.to_string(), "subtitle generation");
        assert_eq!(Stage::Extraction.to_string(), "audio extraction");
    }
}
