use std::{
    path::{Path, PathBuf},
    sync::{Arc, OnceLock},
};

use tokio::{fs, io::AsyncWriteExt, task};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use super::Transcriber;
use crate::{
    audio::{convert_to_wav, ensure_binary, read_wav_samples},
    error::{KonspektError, Result},
    media::Upload,
    paths::{get_model_dir, get_model_path, sanitize_file_stem},
    types::{Segment, Transcript},
};

pub const MODEL_NAME: &str = "ggml-base.bin";

/// Download the whisper.cpp model into the cache if it is not there yet
pub async fn ensure_model(cache_dir: &Path, model_name: &str) -> Result<PathBuf> {
    let model_path = get_model_path(cache_dir, model_name);
    if model_path.exists() {
        return Ok(model_path);
    }

    let download_url = format!(
        "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/{}",
        model_name
    );
    fs::create_dir_all(get_model_dir(cache_dir)).await?;
    tracing::info!(url = %download_url, "Downloading Whisper model");
    download_to_file(&reqwest::Client::new(), &download_url, &model_path).await?;

    Ok(model_path)
}

/// Streams `url` into `dest` chunk by chunk. The body goes to `<dest>.part`
/// first so an interrupted download is never mistaken for a model.
pub(crate) async fn download_to_file(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
) -> Result<u64> {
    let mut response = client.get(url).send().await?;
    if !response.status().is_success() {
        return Err(KonspektError::ModelDownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let partial = dest.with_extension("part");
    let mut file = fs::File::create(&partial).await?;
    let mut written = 0u64;
    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    drop(file);

    fs::rename(&partial, dest).await?;
    tracing::debug!(bytes = written, path = %dest.display(), "Model download complete");
    Ok(written)
}

/// Whisper running on this machine. The model is loaded on first use and kept.
pub struct LocalWhisper {
    model_path: PathBuf,
    use_gpu: bool,
    context: OnceLock<Arc<WhisperContext>>,
}

impl LocalWhisper {
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            use_gpu: cfg!(feature = "cuda"),
            context: OnceLock::new(),
        }
    }

    pub fn with_gpu(mut self, use_gpu: bool) -> Self {
        self.use_gpu = use_gpu;
        self
    }

    pub fn is_loaded(&self) -> bool {
        self.context.get().is_some()
    }

    async fn context(&self) -> Result<Arc<WhisperContext>> {
        if let Some(ctx) = self.context.get() {
            return Ok(ctx.clone());
        }

        let model_path = self.model_path.clone();
        let use_gpu = self.use_gpu;
        tracing::info!(model = %model_path.display(), "Loading Whisper model");
        let loaded = task::spawn_blocking(move || load_context(&model_path, use_gpu))
            .await
            .map_err(|e| KonspektError::TranscriptionFailed {
                reason: e.to_string(),
            })??;

        Ok(self.context.get_or_init(|| Arc::new(loaded)).clone())
    }
}

fn load_context(model_path: &Path, use_gpu: bool) -> Result<WhisperContext> {
    let model_path_str = model_path
        .to_str()
        .ok_or_else(|| KonspektError::TranscriptionFailed {
            reason: format!("model path is not UTF-8: {}", model_path.display()),
        })?;
    let ctx_params = WhisperContextParameters {
        use_gpu,
        flash_attn: use_gpu,
        ..Default::default()
    };
    WhisperContext::new_with_params(model_path_str, ctx_params).map_err(|e| {
        KonspektError::TranscriptionFailed {
            reason: format!("failed to load model {}: {}", model_path.display(), e),
        }
    })
}

fn run_whisper(ctx: &WhisperContext, samples: &[f32]) -> Result<Transcript> {
    let failed = |e: whisper_rs::WhisperError| KonspektError::TranscriptionFailed {
        reason: e.to_string(),
    };

    let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 5 });
    params.set_language(Some("auto"));
    params.set_print_progress(false);
    params.set_print_realtime(false);
    params.set_print_special(false);

    let mut state = ctx.create_state().map_err(failed)?;
    state.full(params, samples).map_err(failed)?;

    let mut text = String::new();
    let mut segments: Vec<Segment> = Vec::new();

    for segment in state.as_iter() {
        let Ok(seg_text) = segment.to_str() else {
            continue;
        };
        segments.push(Segment {
            start: segment.start_timestamp() as f64 / 100.0,
            end: segment.end_timestamp() as f64 / 100.0,
            text: seg_text.to_string(),
        });
        text.push_str(seg_text);
    }

    let language_index = state.full_lang_id_from_state();
    let language = whisper_rs::get_lang_str(language_index);

    Ok(Transcript {
        text: text.trim().to_string(),
        segments,
        language: language.unwrap_or("unknown").to_string(),
    })
}

impl Transcriber for LocalWhisper {
    fn name(&self) -> &str {
        "Whisper (local)"
    }

    async fn transcribe(&self, upload: &Upload) -> Result<Transcript> {
        if upload.bytes.is_empty() {
            return Err(KonspektError::EmptyMedia);
        }
        ensure_binary("ffmpeg")?;

        let work_dir = tempfile::tempdir()?;
        let input = work_dir
            .path()
            .join(format!("input-{}", sanitize_file_stem(&upload.file_name)));
        let wav = work_dir.path().join("audio.wav");
        fs::write(&input, &upload.bytes).await?;
        convert_to_wav(&input, &wav).await?;

        let samples = read_wav_samples(&wav)?;
        tracing::debug!(seconds = samples.len() / 16_000, "Audio decoded");

        let ctx = self.context().await?;
        task::spawn_blocking(move || run_whisper(&ctx, &samples))
            .await
            .map_err(|e| KonspektError::TranscriptionFailed {
                reason: e.to_string(),
            })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_is_not_loaded_until_used() {
        let whisper = LocalWhisper::new("/nonexistent/ggml-base.bin");
        assert!(!whisper.is_loaded());
    }

    #[tokio::test]
    async fn empty_upload_fails_before_any_work() {
        let whisper = LocalWhisper::new("/nonexistent/ggml-base.bin");
        let err = whisper
            .transcribe(&Upload::new("a.mp3", Vec::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, KonspektError::EmptyMedia));
        assert!(!whisper.is_loaded());
    }

    /// Serves one HTTP response on a local port and returns its URL.
    async fn serve_once(status: &'static str, body: Vec<u8>) -> String {
        use tokio::io::AsyncReadExt;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 2048];
            let _ = socket.read(&mut request).await;
            let head = format!(
                "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                status,
                body.len()
            );
            socket.write_all(head.as_bytes()).await.unwrap();
            for chunk in body.chunks(64 * 1024) {
                socket.write_all(chunk).await.unwrap();
            }
        });
        format!("http://{}/ggml-test.bin", addr)
    }

    #[tokio::test]
    async fn model_download_is_written_to_disk() {
        let body: Vec<u8> = (0..300_000u32).map(|i| (i % 251) as u8).collect();
        let url = serve_once("200 OK", body.clone()).await;
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("ggml-test.bin");

        let written = download_to_file(&reqwest::Client::new(), &url, &dest)
            .await
            .unwrap();

        assert_eq!(written, body.len() as u64);
        assert_eq!(std::fs::read(&dest).unwrap(), body);
        assert!(!dest.with_extension("part").exists());
    }

    #[tokio::test]
    async fn failed_model_download_leaves_nothing_behind() {
        let url = serve_once("404 Not Found", b"missing".to_vec()).await;
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("ggml-test.bin");

        let err = download_to_file(&reqwest::Client::new(), &url, &dest)
            .await
            .unwrap_err();

        assert!(matches!(err, KonspektError::ModelDownloadFailed { .. }));
        assert!(!dest.exists());
        assert!(!dest.with_extension("part").exists());
    }

    #[tokio::test]
    async fn existing_model_is_not_downloaded_again() {
        let dir = tempfile::tempdir().unwrap();
        let path = get_model_path(dir.path(), "ggml-tiny.bin");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"model").unwrap();
        assert_eq!(ensure_model(dir.path(), "ggml-tiny.bin").await.unwrap(), path);
    }
}
