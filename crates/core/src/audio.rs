use std::path::{Path, PathBuf};

use tokio::process::Command;

use crate::error::{KonspektError, Result};

/// Looks `name` up on PATH without running it.
pub fn find_binary(name: &str) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    find_binary_in(name, std::env::split_paths(&paths))
}

fn find_binary_in(name: &str, dirs: impl IntoIterator<Item = PathBuf>) -> Option<PathBuf> {
    dirs.into_iter().find_map(|dir| {
        let candidate = dir.join(name);
        if is_executable(&candidate) {
            return Some(candidate);
        }
        if cfg!(windows) {
            let exe = dir.join(format!("{}.exe", name));
            if exe.is_file() {
                return Some(exe);
            }
        }
        None
    })
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

pub fn ensure_binary(name: &str) -> Result<PathBuf> {
    find_binary(name).ok_or_else(|| KonspektError::BinaryNotFound {
        name: name.to_string(),
    })
}

/// Convert any audio or video file to 16 kHz mono PCM WAV using ffmpeg
pub async fn convert_to_wav(input: &Path, output: &Path) -> Result<()> {
    let ffmpeg = ensure_binary("ffmpeg")?;
    tracing::debug!(input = %input.display(), output = %output.display(), "Converting audio");

    let result = Command::new(ffmpeg)
        .arg("-y")
        .arg("-i")
        .arg(input)
        .arg("-vn")
        .arg("-acodec")
        .arg("pcm_s16le")
        .arg("-ar")
        .arg("16000")
        .arg("-ac")
        .arg("1")
        .arg(output)
        .output()
        .await?;

    if !result.status.success() {
        return Err(KonspektError::AudioConversionFailed {
            input: input.to_path_buf(),
            reason: last_lines(&String::from_utf8_lossy(&result.stderr), 5),
        });
    }

    Ok(())
}

/// Read 16-bit PCM samples from a WAV file as f32 in [-1, 1]
pub fn read_wav_samples(path: &Path) -> Result<Vec<f32>> {
    let mut reader =
        hound::WavReader::open(path).map_err(|e| KonspektError::TranscriptionFailed {
            reason: format!("cannot open {}: {}", path.display(), e),
        })?;
    reader
        .samples::<i16>()
        .map(|s| {
            s.map(|s| s as f32 / i16::MAX as f32)
                .map_err(|e| KonspektError::TranscriptionFailed {
                    reason: format!("bad sample in {}: {}", path.display(), e),
                })
        })
        .collect()
}

pub(crate) fn last_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    lines[lines.len().saturating_sub(n)..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_binary_is_reported() {
        let err = ensure_binary("definitely-not-a-real-binary-konspekt").unwrap_err();
        assert!(matches!(err, KonspektError::BinaryNotFound { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn non_executable_files_on_path_are_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let plain = tempfile::tempdir().unwrap();
        let runnable = tempfile::tempdir().unwrap();
        for (dir, mode) in [(&plain, 0o644), (&runnable, 0o755)] {
            let path = dir.path().join("ffmpeg");
            std::fs::write(&path, b"#!/bin/sh\n").unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode)).unwrap();
        }

        let dirs = [plain.path().to_path_buf(), runnable.path().to_path_buf()];
        assert_eq!(
            find_binary_in("ffmpeg", dirs.clone()),
            Some(runnable.path().join("ffmpeg"))
        );
        assert_eq!(find_binary_in("ffmpeg", [dirs[0].clone()]), None);
    }

    #[test]
    fn wav_samples_are_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for s in [0i16, i16::MAX, -i16::MAX] {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();

        let samples = read_wav_samples(&path).unwrap();
        assert_eq!(samples, [0.0, 1.0, -1.0]);
    }

    #[test]
    fn only_the_tail_of_stderr_is_kept() {
        assert_eq!(last_lines("a\nb\n\nc\nd", 2), "c\nd");
        assert_eq!(last_lines("", 3), "");
    }
}
