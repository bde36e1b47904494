use std::path::{Path, PathBuf};

pub const APP_DIR: &str = "konspekt";

pub fn get_root_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR)
}

pub fn get_model_dir(cache_dir: &Path) -> PathBuf {
    cache_dir.join("models")
}

/// Path of a whisper.cpp model file, e.g. `ggml-base.bin`
pub fn get_model_path(cache_dir: &Path, model_name: &str) -> PathBuf {
    get_model_dir(cache_dir).join(model_name)
}

pub fn get_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| get_root_cache_dir().join("config"))
        .join(APP_DIR)
}

pub fn get_credentials_path(config_dir: &Path) -> PathBuf {
    config_dir.join("credentials.toml")
}

/// Output path for an export: `<dir>/<stem>.<ext>`
pub fn get_export_path(out_dir: &Path, stem: &str, extension: &str) -> PathBuf {
    out_dir.join(format!("{}.{}", sanitize_file_stem(stem), extension))
}

/// Replaces characters that are awkward in file names.
pub fn sanitize_file_stem(stem: &str) -> String {
    let cleaned: String = stem
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches(|c| c == '.' || c == '_');
    if cleaned.is_empty() {
        "konspekt".to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_path_is_sanitized() {
        let path = get_export_path(Path::new("/out"), "Main points: talk/1", "pdf");
        assert_eq!(path, PathBuf::from("/out/Main_points__talk_1.pdf"));
    }

    #[test]
    fn empty_stem_gets_a_name() {
        assert_eq!(sanitize_file_stem(" ../ "), "konspekt");
    }
}
