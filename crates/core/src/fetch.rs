use std::path::{Path, PathBuf};

use tokio::process::Command;

use crate::{
    audio::{ensure_binary, last_lines},
    error::{KonspektError, Result},
    media::{RemoteMedia, Upload},
};

/// Downloads a remote reference so it can go through local transcription.
pub async fn fetch_upload(
    client: &reqwest::Client,
    media: &RemoteMedia,
    work_dir: &Path,
) -> Result<Upload> {
    match media {
        RemoteMedia::YouTube { .. } => {
            let path = download_youtube_audio(&media.uri(), work_dir).await?;
            Upload::from_path(&path).await
        }
        RemoteMedia::Drive { file_id } => download_drive_file(client, &media.uri(), file_id).await,
    }
}

/// Download the audio track of a YouTube video using yt-dlp
pub async fn download_youtube_audio(url: &str, work_dir: &Path) -> Result<PathBuf> {
    let yt_dlp = ensure_binary("yt-dlp")?;
    let output_template = work_dir.join("audio.%(ext)s");
    tracing::debug!(url, "Downloading audio with yt-dlp");

    let output = Command::new(yt_dlp)
        .arg(url)
        .arg("--print")
        .arg("after_move:filepath")
        .arg("--extractor-args")
        .arg("youtube:player_client=android,web")
        .arg("-f")
        .arg("bestaudio/best")
        .arg("-o")
        .arg(&output_template)
        .output()
        .await?;

    if !output.status.success() {
        return Err(KonspektError::DownloadFailed {
            url: url.to_string(),
            reason: last_lines(&String::from_utf8_lossy(&output.stderr), 5),
        });
    }

    let stdout_str = String::from_utf8_lossy(output.stdout.as_slice());
    let filepath = stdout_str.lines().last().unwrap_or_default().trim();
    if filepath.is_empty() {
        return Err(KonspektError::DownloadFailed {
            url: url.to_string(),
            reason: "yt-dlp did not report an output file".into(),
        });
    }
    Ok(PathBuf::from(filepath))
}

/// Fetch a shared Drive file through its direct-download URL
pub async fn download_drive_file(
    client: &reqwest::Client,
    url: &str,
    file_id: &str,
) -> Result<Upload> {
    tracing::debug!(url, "Downloading Drive file");
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(KonspektError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", status),
        });
    }

    let file_name = response
        .headers()
        .get(reqwest::header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .and_then(disposition_file_name)
        .unwrap_or_else(|| format!("drive-{}", file_id));
    let bytes = response.bytes().await?.to_vec();
    let upload = Upload::new(file_name, bytes);

    // Private or oversized files come back as an HTML interstitial.
    if upload.mime == "text/html" || upload.bytes.starts_with(b"<!DOCTYPE html") {
        return Err(KonspektError::DownloadFailed {
            url: url.to_string(),
            reason: "Drive returned a web page; is the file shared publicly?".into(),
        });
    }

    Ok(upload)
}

fn disposition_file_name(header: &str) -> Option<String> {
    header.split(';').find_map(|part| {
        let part = part.trim();
        let value = part.strip_prefix("filename=")?;
        let value = value.trim_matches('"');
        (!value.is_empty()).then(|| value.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_comes_from_content_disposition() {
        assert_eq!(
            disposition_file_name(r#"attachment; filename="talk.mp4"; filename*=UTF-8''talk.mp4"#)
                .as_deref(),
            Some("talk.mp4")
        );
        assert_eq!(disposition_file_name("inline"), None);
    }
}
