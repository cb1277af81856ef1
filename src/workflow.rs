use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::align::{AlignOptions, align_with};
use crate::config::Config;
use crate::diarize::Diarizer;
use crate::error::{DiasubError, Result};
use crate::events::{EventSink, PipelineEvent, Stage};
use crate::media::{MediaProcessorFactory, MediaProcessorTrait};
use crate::segment::Segment;
use crate::subtitle::{self, SubtitleFormat};
use crate::transcribe::{Transcriber, TranscriberFactory};
use crate::transcript::{load_transcript, save_transcript};

const VIDEO_EXTENSIONS: [&str; 7] = ["mp4", "avi", "mov", "mkv", "wmv", "flv", "webm"];

#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    pub format: SubtitleFormat,
    /// Also keep the labeled transcript as JSON
    pub transcript_out: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub processed: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

pub struct Workflow {
    media: Box<dyn MediaProcessorTrait>,
    transcriber: Box<dyn Transcriber>,
    diarizer: Option<Box<dyn Diarizer>>,
    align_options: AlignOptions,
    events: Arc<dyn EventSink>,
}

impl Workflow {
    pub fn new(
        config: &Config,
        diarizer: Option<Box<dyn Diarizer>>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self::from_parts(
            MediaProcessorFactory::create_processor(config.media.clone()),
            TranscriberFactory::create_transcriber(config.transcriber.clone()),
            diarizer,
            AlignOptions::with_unknown_label(config.diarizer.unknown_speaker.clone()),
            events,
        )
    }

    pub fn from_parts(
        media: Box<dyn MediaProcessorTrait>,
        transcriber: Box<dyn Transcriber>,
        diarizer: Option<Box<dyn Diarizer>>,
        align_options: AlignOptions,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            media,
            transcriber,
            diarizer,
            align_options,
            events,
        }
    }

    /// Make sure the media processor can be executed
    pub async fn check_dependencies(&self) -> Result<()> {
        self.media.check_availability().await?;
        let version = self.media.get_version_info().await?;
        debug!("Media processor: {}", version);
        Ok(())
    }

    /// Turn one video into a subtitle file.
    ///
    /// Intermediate audio lives in a temporary directory owned by this call
    /// and is removed on every exit path. The subtitle file only appears once
    /// it has been rendered completely. Returns the number of entries written.
    pub async fn process_video<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        video_path: P,
        output_path: Q,
        options: &ProcessOptions,
    ) -> Result<usize> {
        let video_path = video_path.as_ref();
        let output_path = output_path.as_ref();
        info!("Processing video: {}", video_path.display());

        if !video_path.exists() {
            return Err(DiasubError::FileNotFound(video_path.display().to_string()));
        }

        let workspace = tempfile::Builder::new().prefix("diasub-").tempdir()?;
        let audio_path = workspace.path().join("audio.wav");

        self.stage(Stage::Extraction);
        self.media.extract_audio(video_path, &audio_path).await?;
        self.completed(Stage::Extraction, audio_path.display().to_string());

        let segments = self.transcribe(&audio_path).await?;
        let segments = match &self.diarizer {
            Some(diarizer) => self.label(diarizer.as_ref(), &audio_path, &segments).await?,
            None => segments,
        };

        if let Some(transcript_path) = &options.transcript_out {
            save_transcript(transcript_path, &segments).await?;
            info!("Transcript saved to {}", transcript_path.display());
        }

        self.stage(Stage::Synthesis);
        let written = write_subtitles(output_path, options.format, &segments).await?;
        self.completed(Stage::Synthesis, format!("{} {} entries", written, options.format));
        self.events.emit(&PipelineEvent::OutputWritten {
            path: output_path.to_path_buf(),
            segments: written,
        });

        let workspace_path = workspace.path().to_path_buf();
        workspace.close()?;
        self.events.emit(&PipelineEvent::ArtifactsRemoved { path: workspace_path });

        Ok(written)
    }

    /// Process every video under a directory, continuing past failures
    pub async fn process_directory<P: AsRef<Path>>(
        &self,
        input_dir: P,
        output_dir: Option<&Path>,
        format: SubtitleFormat,
    ) -> Result<BatchReport> {
        let input_dir = input_dir.as_ref();
        info!("Processing directory: {}", input_dir.display());

        if !input_dir.is_dir() {
            return Err(DiasubError::Config("Input path is not a directory".to_string()));
        }

        let output_dir = output_dir.unwrap_or(input_dir);
        fs::create_dir_all(output_dir).await?;

        let video_files = find_videos(input_dir);
        info!("Found {} video files to process", video_files.len());

        let options = ProcessOptions {
            format,
            transcript_out: None,
        };
        let mut report = BatchReport::default();

        for video_path in video_files {
            let Some(stem) = video_path.file_stem() else {
                continue;
            };
            let output_path =
                output_dir.join(format!("{}.{}", stem.to_string_lossy(), format.extension()));

            match self.process_video(&video_path, &output_path, &options).await {
                Ok(_) => {
                    info!("Successfully processed: {}", video_path.display());
                    report.processed.push(video_path);
                }
                Err(e) => {
                    self.events.emit(&PipelineEvent::Warning {
                        message: format!("Failed to process {}: {}", video_path.display(), e),
                    });
                    report.failed.push((video_path, e.to_string()));
                }
            }
        }

        Ok(report)
    }

    /// Extract audio from video file
    pub async fn extract_audio<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        video_path: P,
        audio_path: Q,
    ) -> Result<()> {
        self.stage(Stage::Extraction);
        self.media.extract_audio(video_path.as_ref(), audio_path.as_ref()).await?;
        self.completed(Stage::Extraction, audio_path.as_ref().display().to_string());
        Ok(())
    }

    /// Transcribe audio to a transcript JSON, or straight to subtitles when
    /// the output has a subtitle extension
    pub async fn transcribe_audio<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        audio_path: P,
        output_path: Q,
    ) -> Result<usize> {
        let output_path = output_path.as_ref();
        let segments = self.transcribe(audio_path.as_ref()).await?;
        write_transcript_or_subtitles(output_path, &segments).await
    }

    /// Label an existing transcript with speakers from the audio it came from
    pub async fn label_speakers<P: AsRef<Path>, Q: AsRef<Path>, R: AsRef<Path>>(
        &self,
        audio_path: P,
        transcript_path: Q,
        output_path: R,
    ) -> Result<usize> {
        let diarizer = self
            .diarizer
            .as_deref()
            .ok_or_else(|| DiasubError::Config("Diarization is not configured".to_string()))?;

        let segments = load_transcript(transcript_path).await?;
        if segments.is_empty() {
            return Err(DiasubError::Transcriber("No transcript segments found".to_string()));
        }

        let labeled = self.label(diarizer, audio_path.as_ref(), &segments).await?;
        write_transcript_or_subtitles(output_path.as_ref(), &labeled).await
    }

    async fn transcribe(&self, audio_path: &Path) -> Result<Vec<Segment>> {
        self.stage(Stage::Transcription);
        let segments = self.transcriber.transcribe(audio_path).await?;
        if segments.is_empty() {
            return Err(DiasubError::Transcriber("No transcription segments found".to_string()));
        }
        self.completed(
            Stage::Transcription,
            format!("{} segments from {}", segments.len(), self.transcriber.name()),
        );
        Ok(segments)
    }

    async fn label(
        &self,
        diarizer: &dyn Diarizer,
        audio_path: &Path,
        segments: &[Segment],
    ) -> Result<Vec<Segment>> {
        self.stage(Stage::Diarization);
        let turns = diarizer.diarize(audio_path).await?;
        if turns.is_empty() {
            return Err(DiasubError::Diarizer("No diarization turns were generated".to_string()));
        }
        self.completed(
            Stage::Diarization,
            format!("{} turns from {}", turns.len(), diarizer.name()),
        );

        self.stage(Stage::Alignment);
        let labeled = align_with(segments, &turns, &self.align_options)?;
        let mut speakers: Vec<&str> = labeled.iter().filter_map(|s| s.speaker.as_deref()).collect();
        speakers.sort_unstable();
        speakers.dedup();
        self.completed(Stage::Alignment, format!("{} speakers", speakers.len()));

        Ok(labeled)
    }

    fn stage(&self, stage: Stage) {
        self.events.emit(&PipelineEvent::StageStarted { stage });
    }

    fn completed(&self, stage: Stage, detail: String) {
        self.events.emit(&PipelineEvent::StageCompleted { stage, detail });
    }
}

/// Render a transcript JSON or SRT file into another subtitle format
pub async fn render_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input_path: P,
    output_path: Q,
    format: SubtitleFormat,
) -> Result<usize> {
    let input_path = input_path.as_ref();
    let is_srt = input_path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("srt"));

    let segments = if is_srt {
        if !input_path.exists() {
            return Err(DiasubError::FileNotFound(input_path.display().to_string()));
        }
        subtitle::parse_srt(&fs::read_to_string(input_path).await?)?
    } else {
        load_transcript(input_path).await?
    };

    write_subtitles(output_path.as_ref(), format, &segments).await
}

async fn write_transcript_or_subtitles(output_path: &Path, segments: &[Segment]) -> Result<usize> {
    let is_json = output_path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        save_transcript(output_path, segments).await?;
        Ok(segments.len())
    } else {
        write_subtitles(output_path, SubtitleFormat::from_path(output_path)?, segments).await
    }
}

/// Render, then atomically replace `output_path` with the result
async fn write_subtitles(output_path: &Path, format: SubtitleFormat, segments: &[Segment]) -> Result<usize> {
    let content = subtitle::render(format, segments)?;

    let parent = match output_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent).await?;

    let target = output_path.to_path_buf();
    tokio::task::spawn_blocking(move || -> Result<()> {
        let mut staged = tempfile::NamedTempFile::new_in(&parent)?;
        staged.write_all(content.as_bytes())?;
        staged.persist(&target).map_err(|e| DiasubError::Io(e.error))?;
        Ok(())
    })
    .await
    .map_err(|e| DiasubError::Io(std::io::Error::other(e)))??;

    info!("Subtitle file generated: {}", output_path.display());
    Ok(segments.len())
}

fn find_videos(input_dir: &Path) -> Vec<PathBuf> {
    let mut video_files: Vec<PathBuf> = WalkDir::new(input_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| VIDEO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        })
        .map(|entry| entry.path().to_path_buf())
        .collect();
    video_files.sort();
    video_files
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diarize::MockDiarizer;
    use crate::events::RecordingSink;
    use crate::media::MockMediaProcessorTrait;
    use crate::segment::DiarizationTurn;
    use crate::transcribe::MockTranscriber;
    use assert_fs::prelude::*;

    fn media_ok() -> Box<dyn MediaProcessorTrait> {
        let mut media = MockMediaProcessorTrait::new();
        media.expect_extract_audio().returning(|_, _| Ok(()));
        Box::new(media)
    }

    fn transcriber_returning(segments: Vec<Segment>) -> Box<dyn Transcriber> {
        let mut transcriber = MockTranscriber::new();
        transcriber
            .expect_transcribe()
            .returning(move |_| Ok(segments.clone()));
        transcriber.expect_name().return_const("mock transcriber");
        Box::new(transcriber)
    }

    fn diarizer_returning(turns: Vec<DiarizationTurn>) -> Box<dyn Diarizer> {
        let mut diarizer = MockDiarizer::new();
        diarizer.expect_diarize().returning(move |_| Ok(turns.clone()));
        diarizer.expect_name().return_const("mock diarizer");
        Box::new(diarizer)
    }

    fn transcript() -> Vec<Segment> {
        vec![
            Segment::new(0.0, 3.2, " Hello, world!"),
            Segment::new(3.3, 5.0, " This is a test."),
        ]
    }

    fn turns() -> Vec<DiarizationTurn> {
        vec![
            DiarizationTurn::new(0.0, 3.25, "Speaker 1"),
            DiarizationTurn::new(3.25, 5.0, "Speaker 2"),
        ]
    }

    fn workflow(
        transcriber: Box<dyn Transcriber>,
        diarizer: Option<Box<dyn Diarizer>>,
        events: Arc<dyn EventSink>,
    ) -> Workflow {
        Workflow::from_parts(media_ok(), transcriber, diarizer, AlignOptions::default(), events)
    }

    #[tokio::test]
    async fn test_process_video_with_diarization() {
        let temp = assert_fs::TempDir::new().unwrap();
        let video = temp.child("talk.mp4");
        video.touch().unwrap();
        let output = temp.child("subs/talk.srt");

        let events = Arc::new(RecordingSink::default());
        let workflow = workflow(
            transcriber_returning(transcript()),
            Some(diarizer_returning(turns())),
            events.clone(),
        );

        let written = workflow
            .process_video(video.path(), output.path(), &ProcessOptions::default())
            .await
            .unwrap();

        assert_eq!(written, 2);
        assert_eq!(
            std::fs::read_to_string(output.path()).unwrap(),
            "1\n00:00:00,000 --> 00:00:03,200\nSpeaker 1: Hello, world!\n\n\
             2\n00:00:03,300 --> 00:00:05,000\nSpeaker 2: This is a test.\n"
        );

        let started: Vec<Stage> = events
            .events()
            .into_iter()
            .filter_map(|event| match event {
                PipelineEvent::StageStarted { stage } => Some(stage),
                _ => None,
            })
            .collect();
        assert_eq!(
            started,
            vec![
                Stage::Extraction,
                Stage::Transcription,
                Stage::Diarization,
                Stage::Alignment,
                Stage::Synthesis,
            ]
        );

        // the temporary workspace is gone once the run is over
        let removed = events.events().into_iter().find_map(|event| match event {
            PipelineEvent::ArtifactsRemoved { path } => Some(path),
            _ => None,
        });
        assert!(!removed.unwrap().exists());
    }

    #[tokio::test]
    async fn test_process_video_without_diarization_as_ass() {
        let temp = assert_fs::TempDir::new().unwrap();
        let video = temp.child("talk.mkv");
        video.touch().unwrap();
        let output = temp.child("talk.ass");
        let transcript_out = temp.child("talk.json");

        let workflow = workflow(
            transcriber_returning(transcript()),
            None,
            Arc::new(RecordingSink::default()),
        );
        let options = ProcessOptions {
            format: SubtitleFormat::Ass,
            transcript_out: Some(transcript_out.path().to_path_buf()),
        };
        workflow.process_video(video.path(), output.path(), &options).await.unwrap();

        let ass = std::fs::read_to_string(output.path()).unwrap();
        assert!(ass.ends_with(
            "Dialogue: 0,0:00:03.30,0:00:05.00,Default,,0000,0000,0000,,This is a test.\n"
        ));
        assert_eq!(load_transcript(transcript_out.path()).await.unwrap(), transcript());
    }

    #[tokio::test]
    async fn test_failed_stage_leaves_no_output() {
        let temp = assert_fs::TempDir::new().unwrap();
        let video = temp.child("talk.mp4");
        video.touch().unwrap();
        let output = temp.child("talk.srt");

        let mut transcriber = MockTranscriber::new();
        transcriber
            .expect_transcribe()
            .returning(|_| Err(DiasubError::Transcriber("model crashed".to_string())));
        let workflow = workflow(Box::new(transcriber), None, Arc::new(RecordingSink::default()));

        let result = workflow
            .process_video(video.path(), output.path(), &ProcessOptions::default())
            .await;
        assert!(matches!(result, Err(DiasubError::Transcriber(_))));
        assert!(!output.path().exists());
    }

    #[tokio::test]
    async fn test_empty_results_fail_the_run() {
        let temp = assert_fs::TempDir::new().unwrap();
        let video = temp.child("talk.mp4");
        video.touch().unwrap();
        let output = temp.child("talk.srt");

        let silent = workflow(transcriber_returning(vec![]), None, Arc::new(RecordingSink::default()));
        let result = silent
            .process_video(video.path(), output.path(), &ProcessOptions::default())
            .await;
        assert!(matches!(result, Err(DiasubError::Transcriber(_))));

        let no_turns = workflow(
            transcriber_returning(transcript()),
            Some(diarizer_returning(vec![])),
            Arc::new(RecordingSink::default()),
        );
        let result = no_turns
            .process_video(video.path(), output.path(), &ProcessOptions::default())
            .await;
        assert!(matches!(result, Err(DiasubError::Diarizer(_))));
        assert!(!output.path().exists());
    }

    #[tokio::test]
    async fn test_invalid_timing_is_reported_by_the_right_stage() {
        let temp = assert_fs::TempDir::new().unwrap();
        let video = temp.child("talk.mp4");
        video.touch().unwrap();
        let output = temp.child("talk.srt");
        let backwards = vec![Segment::new(2.0, 1.0, "backwards")];

        let with_diarizer = workflow(
            transcriber_returning(backwards.clone()),
            Some(diarizer_returning(turns())),
            Arc::new(RecordingSink::default()),
        );
        let result = with_diarizer
            .process_video(video.path(), output.path(), &ProcessOptions::default())
            .await;
        assert!(matches!(result, Err(DiasubError::InvalidInterval { .. })));

        let without = workflow(transcriber_returning(backwards), None, Arc::new(RecordingSink::default()));
        let result = without
            .process_video(video.path(), output.path(), &ProcessOptions::default())
            .await;
        assert!(matches!(result, Err(DiasubError::MalformedSegment { .. })));
        assert!(!output.path().exists());
    }

    #[tokio::test]
    async fn test_missing_video() {
        let workflow = workflow(transcriber_returning(transcript()), None, Arc::new(RecordingSink::default()));
        let result = workflow
            .process_video("/nonexistent/talk.mp4", "/tmp/never.srt", &ProcessOptions::default())
            .await;
        assert!(matches!(result, Err(DiasubError::FileNotFound(_))));
    }

    #[tokio::test]
    async fn test_process_directory_skips_non_videos() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("a.mp4").touch().unwrap();
        temp.child("nested/b.MOV").touch().unwrap();
        temp.child("notes.txt").touch().unwrap();
        let out = temp.child("out");

        let workflow = workflow(transcriber_returning(transcript()), None, Arc::new(RecordingSink::default()));
        let report = workflow
            .process_directory(temp.path(), Some(out.path()), SubtitleFormat::Srt)
            .await
            .unwrap();

        assert_eq!(report.processed.len(), 2);
        assert!(report.failed.is_empty());
        assert!(out.child("a.srt").path().exists());
        assert!(out.child("b.srt").path().exists());
    }

    #[tokio::test]
    async fn test_label_speakers_writes_json() {
        let temp = assert_fs::TempDir::new().unwrap();
        let transcript_in = temp.child("transcript.json");
        transcript_in
            .write_str(r#"{"segments": [{"start": 0.0, "end": 3.2, "text": "Hello, world!"}]}"#)
            .unwrap();
        let labeled_out = temp.child("labeled.json");

        let workflow = workflow(
            transcriber_returning(vec![]),
            Some(diarizer_returning(turns())),
            Arc::new(RecordingSink::default()),
        );
        workflow
            .label_speakers(temp.child("audio.wav").path(), transcript_in.path(), labeled_out.path())
            .await
            .unwrap();

        let labeled = load_transcript(labeled_out.path()).await.unwrap();
        assert_eq!(labeled[0].speaker.as_deref(), Some("Speaker 1"));
    }

    #[tokio::test]
    async fn test_label_speakers_requires_diarizer() {
        let workflow = workflow(transcriber_returning(vec![]), None, Arc::new(RecordingSink::default()));
        let result = workflow.label_speakers("a.wav", "t.json", "o.json").await;
        assert!(matches!(result, Err(DiasubError::Config(_))));
    }

    #[tokio::test]
    async fn test_write_subtitles_replaces_existing_file() {
        let temp = assert_fs::TempDir::new().unwrap();
        let output = temp.child("nested/talk.srt");
        std::fs::create_dir_all(temp.child("nested").path()).unwrap();
        std::fs::write(output.path(), "stale").unwrap();

        let written = write_subtitles(output.path(), SubtitleFormat::Srt, &transcript())
            .await
            .unwrap();

        assert_eq!(written, 2);
        assert!(std::fs::read_to_string(output.path()).unwrap().starts_with("1\n00:00:00,000"));
        // the staged file was renamed into place, nothing else is left behind
        let entries = std::fs::read_dir(temp.child("nested").path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[tokio::test]
    async fn test_render_srt_to_ass() {
        let temp = assert_fs::TempDir::new().unwrap();
        let srt = temp.child("in.srt");
        srt.write_str("1\n00:00:00,000 --> 00:00:01,500\nHi there\n").unwrap();
        let ass = temp.child("out.ass");

        let count = render_file(srt.path(), ass.path(), SubtitleFormat::Ass).await.unwrap();
        assert_eq!(count, 1);
        let content = std::fs::read_to_string(ass.path()).unwrap();
        assert!(content.contains("Dialogue: 0,0:00:00.00,0:00:01.50,Default,,0000,0000,0000,,Hi there\n"));
    }
}
