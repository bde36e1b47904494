use std::path::Path;

use anyhow::Result;
use console::style;
use konspekt_core::{
    GenerativeModel, KonspektError, MediaReference, Provider, RemoteMedia, RequestContent, Retrying,
    SummaryRequest, TaskSelection, Transcriber, Upload, fetch::fetch_upload,
    format::format_duration_minutes, orchestrator, resolve_url,
};

use super::{build_transcriber, load_credentials, write_exports};
use crate::{ProcessArgs, ui};

pub async fn run(args: ProcessArgs) -> Result<()> {
    let provider: Provider = args.provider.into();
    let credentials = load_credentials().await?;
    let api_key = provider.resolve_api_key(args.api_key.as_deref(), &credentials)?;
    let client = Retrying::new(provider.client(&api_key, args.model.as_deref()));

    let task = TaskSelection::from_label_or_default(&args.task);

    // Validate the source before anything slow happens.
    let source = match (&args.url, &args.file) {
        (Some(url), _) => Source::Remote {
            media: resolve_url(url)?,
            url: url.clone(),
        },
        (None, Some(path)) => {
            let upload = Upload::from_path(path).await?;
            if upload.bytes.is_empty() {
                return Err(KonspektError::EmptyMedia.into());
            }
            Source::File(upload)
        }
        (None, None) => anyhow::bail!("either a URL or --file is required"),
    };
    let stem = args
        .output
        .name
        .clone()
        .unwrap_or_else(|| default_stem(&source, task));

    ui::header(task.label());
    ui::rule();

    let content = if args.transcribe_first || !client.supports_media() {
        let openai_key = match provider {
            Provider::Openai => Some(api_key.as_str()),
            _ => None,
        };
        let transcriber =
            build_transcriber(&args.transcription, openai_key, &credentials).await?;

        let work_dir = tempfile::tempdir()?;
        let upload = match source {
            Source::Remote { media, .. } => download(&media, work_dir.path()).await?,
            Source::File(upload) => upload,
        };

        let step = ui::Step::start(&format!("Transcribing with {}...", transcriber.name()));
        let transcript = transcriber.transcribe(&upload).await?;
        step.done(format!(
            "Transcribed: {}, {}",
            format_duration_minutes(transcript.duration_seconds()),
            style(&transcript.language).yellow()
        ));
        RequestContent::Transcript(transcript.text)
    } else {
        RequestContent::Media(into_model_media(source).await?)
    };

    let request = SummaryRequest::new(task, content).with_language(args.lang);
    let language = args
        .lang
        .map(|l| format!(" in {}", l.name()))
        .unwrap_or_default();

    let step = ui::Step::start(&format!(
        "Generating {}{} with {}...",
        task.label().to_lowercase(),
        language,
        provider.name()
    ));
    let result = orchestrator::run(&client, &request).await?;
    step.done(format!("Done ({})", provider.name()));

    ui::rule();
    println!("{}", result);
    ui::rule();

    let formats = args.output.formats();
    if !formats.is_empty() {
        write_exports(result.as_str(), &formats, &args.output.out_dir, &stem).await?;
    }

    Ok(())
}

/// Where the media comes from, validated.
enum Source {
    Remote { url: String, media: RemoteMedia },
    File(Upload),
}

impl Source {
    fn into_reference(self) -> MediaReference {
        match self {
            Source::Remote { url, .. } => MediaReference::Url(url),
            Source::File(upload) => MediaReference::Upload(upload),
        }
    }
}

/// Links the model cannot fetch itself (Drive files) are downloaded and sent inline.
async fn into_model_media(source: Source) -> Result<MediaReference> {
    match source {
        Source::Remote { media, .. } if !media.is_model_readable() => {
            let work_dir = tempfile::tempdir()?;
            Ok(MediaReference::Upload(download(&media, work_dir.path()).await?))
        }
        source => Ok(source.into_reference()),
    }
}

async fn download(remote: &RemoteMedia, work_dir: &Path) -> Result<Upload> {
    let step = ui::Step::start("Downloading media...");
    let upload = fetch_upload(&reqwest::Client::new(), remote, work_dir).await?;
    step.done(format!("Downloaded: {}", style(&upload.file_name).dim()));
    Ok(upload)
}

/// `<video id or file stem>-<task>`, e.g. `dQw4w9WgXcQ-main-points`.
fn default_stem(source: &Source, task: TaskSelection) -> String {
    let name = match source {
        Source::Remote {
            media: RemoteMedia::YouTube { video_id },
            ..
        } => video_id.clone(),
        Source::Remote {
            media: RemoteMedia::Drive { file_id },
            ..
        } => file_id.clone(),
        Source::File(upload) => Path::new(&upload.file_name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| upload.file_name.clone()),
    };
    format!("{}-{}", name, task.label().to_lowercase().replace(' ', "-"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stem_uses_video_id_and_task() {
        let source = Source::Remote {
            url: "https://youtu.be/dQw4w9WgXcQ".into(),
            media: RemoteMedia::YouTube {
                video_id: "dQw4w9WgXcQ".into(),
            },
        };
        assert_eq!(
            default_stem(&source, TaskSelection::MainPoints),
            "dQw4w9WgXcQ-main-points"
        );
    }

    #[tokio::test]
    async fn youtube_links_stay_links_for_media_models() {
        let source = Source::Remote {
            url: "https://youtu.be/dQw4w9WgXcQ".into(),
            media: RemoteMedia::YouTube {
                video_id: "dQw4w9WgXcQ".into(),
            },
        };
        let media = into_model_media(source).await.unwrap();
        assert!(
            matches!(media, MediaReference::Url(url) if url == "https://youtu.be/dQw4w9WgXcQ")
        );
    }

    #[test]
    fn stem_uses_file_name_for_uploads() {
        let source = Source::File(Upload::new("lecture 3.mp4", vec![0; 4]));
        assert_eq!(
            default_stem(&source, TaskSelection::Summary),
            "lecture 3-summary"
        );
    }
}
