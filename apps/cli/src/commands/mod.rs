use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use konspekt_core::{
    AnyTranscriber, Credentials, ExportFormat, HostedWhisper, LocalWhisper, Provider,
    paths::{get_config_dir, get_credentials_path, get_export_path, get_root_cache_dir},
    transcribe::ensure_model,
};

use crate::{CliTranscriber, TranscriptionArgs, ui};

pub mod login;
pub mod process;
pub mod transcribe;

pub async fn load_credentials() -> Result<Credentials> {
    let path = get_credentials_path(&get_config_dir());
    Credentials::load(&path)
        .await
        .with_context(|| format!("reading {}", path.display()))
}

/// Builds the speech-recognition engine, downloading the local model if needed.
pub async fn build_transcriber(
    args: &TranscriptionArgs,
    openai_key: Option<&str>,
    credentials: &Credentials,
) -> Result<AnyTranscriber> {
    match args.transcriber {
        CliTranscriber::Local => {
            let step = ui::Step::start("Checking Whisper model...");
            let model_path = ensure_model(&get_root_cache_dir(), &args.whisper_model).await?;
            step.done(format!("Model ready: {}", style(&args.whisper_model).dim()));
            Ok(AnyTranscriber::Local(LocalWhisper::new(model_path)))
        }
        CliTranscriber::Hosted => {
            let key = Provider::Openai.resolve_api_key(openai_key, credentials)?;
            Ok(AnyTranscriber::Hosted(HostedWhisper::new(key)))
        }
    }
}

/// Writes `text` once per format. Every format is attempted; the first
/// failure is returned after the rest have been written.
pub async fn write_exports(
    text: &str,
    formats: &[ExportFormat],
    out_dir: &Path,
    stem: &str,
) -> Result<()> {
    let mut first_error = None;

    for format in formats {
        let path = get_export_path(out_dir, stem, format.extension());
        let written = match format.encode(text) {
            Ok(artifact) => artifact.write_to(&path).await,
            Err(e) => Err(e),
        };
        match written {
            Ok(()) => ui::ok(format!("Saved {}", style(path.display()).cyan())),
            Err(e) => {
                ui::failed(format!("{} export failed: {}", format, e));
                first_error.get_or_insert(
                    anyhow::Error::new(e).context(format!("exporting {}", path.display())),
                );
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn exports_are_written_next_to_each_other() {
        let dir = tempfile::tempdir().unwrap();
        write_exports(
            "Key points",
            &[ExportFormat::Text, ExportFormat::Docx, ExportFormat::Pdf],
            dir.path(),
            "talk summary",
        )
        .await
        .unwrap();

        for ext in ["txt", "docx", "pdf"] {
            assert!(dir.path().join(format!("talk_summary.{ext}")).exists(), "{ext}");
        }
    }

    #[tokio::test]
    async fn a_failing_format_does_not_stop_the_others() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_exports(
            "要点",
            &[ExportFormat::Pdf, ExportFormat::Text],
            dir.path(),
            "notes",
        )
        .await
        .unwrap_err();

        assert!(format!("{err:#}").contains("cannot be written to pdf"));
        assert!(dir.path().join("notes.txt").exists());
        assert!(!dir.path().join("notes.pdf").exists());
    }
}
