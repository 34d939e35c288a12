// ABOUTME: Extension-based MIME category resolution for the content policy
// Only the top-level category matters: media is never inlined into events

use std::path::Path;

/// Top-level MIME classification of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MimeCategory {
    Audio,
    Video,
    Image,
    Text,
    Application,
}

impl MimeCategory {
    /// Binary media categories whose bytes are never inlined.
    pub fn is_media(self) -> bool {
        matches!(self, Self::Audio | Self::Video | Self::Image)
    }
}

/// Resolve the MIME category for a path from its extension.
///
/// Unknown extensions classify as application: non-media, so still subject to
/// the size ceiling.
pub fn category_for_path(path: &Path) -> MimeCategory {
    category_from_extension(&get_extension(path))
}

fn get_extension(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn category_from_extension(ext: &str) -> MimeCategory {
    match ext {
        "png" | "jpg" | "jpeg" | "gif" | "webp" | "svg" | "bmp" | "ico" | "tif" | "tiff"
        | "heic" | "avif" => MimeCategory::Image,
        "mp3" | "wav" | "ogg" | "oga" | "flac" | "aac" | "m4a" | "opus" | "mid" | "midi" => {
            MimeCategory::Audio
        }
        "mp4" | "mov" | "avi" | "mkv" | "webm" | "m4v" | "wmv" | "flv" | "mpg" | "mpeg" => {
            MimeCategory::Video
        }
        "txt" | "md" | "js" | "mjs" | "cjs" | "ts" | "mts" | "cts" | "jsx" | "tsx" | "html"
        | "htm" | "css" | "xml" | "yaml" | "yml" | "toml" | "rs" | "py" | "go" | "java" | "c"
        | "h" | "cpp" | "hpp" | "cc" | "cxx" | "sh" | "bash" | "zsh" | "sql" | "csv" | "log" => {
            MimeCategory::Text
        }
        _ => MimeCategory::Application,
    }
}
