use std::path::Path;

use anyhow::Result;
use console::style;
use konspekt_core::{
    KonspektError, Transcriber, Upload, format::format_duration_minutes,
    format_transcript_plain, format_transcript_with_timestamps,
};

use super::{build_transcriber, load_credentials, write_exports};
use crate::{TranscribeArgs, ui};

pub async fn run(args: TranscribeArgs) -> Result<()> {
    let upload = Upload::from_path(&args.file).await?;
    if upload.bytes.is_empty() {
        return Err(KonspektError::EmptyMedia.into());
    }

    let credentials = load_credentials().await?;
    let transcriber =
        build_transcriber(&args.transcription, args.api_key.as_deref(), &credentials).await?;

    ui::header("Transcription");
    ui::rule();

    let step = ui::Step::start(&format!("Transcribing with {}...", transcriber.name()));
    let transcript = transcriber.transcribe(&upload).await?;
    step.done(format!(
        "Transcribed: {}, {}",
        format_duration_minutes(transcript.duration_seconds()),
        style(&transcript.language).yellow()
    ));

    let text = if args.timestamps && !transcript.segments.is_empty() {
        format_transcript_with_timestamps(&transcript)
    } else {
        format_transcript_plain(&transcript)
    };

    ui::rule();
    println!("{}", text);
    ui::rule();

    let formats = args.output.formats();
    if !formats.is_empty() {
        let stem = args.output.name.clone().unwrap_or_else(|| {
            let source = Path::new(&upload.file_name)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| upload.file_name.clone());
            format!("{}-transcript", source)
        });
        write_exports(&text, &formats, &args.output.out_dir, &stem).await?;
    }

    Ok(())
}
