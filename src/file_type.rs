//! Coarse file classification used to annotate decoded entries.
//!
//! Classification is a pure extension lookup: the client only needs to know
//! whether a file can be shown as a text diff, previewed as an image, or must
//! be treated as opaque bytes.
//!
//! # Examples
//!
//! ```
//! use git_scribe::FileType;
//!
//! assert_eq!(FileType::classify("logo.PNG"), FileType::Image);
//! assert_eq!(FileType::classify("src/main.rs"), FileType::Text);
//! assert_eq!(FileType::classify("release.tar.gz"), FileType::Binary);
//! assert_eq!(FileType::classify("Makefile"), FileType::Text);
//! ```

use serde::Serialize;
use std::fmt;

const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "ico", "webp", "tif", "tiff",
];

const BINARY_EXTENSIONS: &[&str] = &[
    "exe", "dll", "so", "dylib", "a", "o", "obj", "lib", "bin", "class", "jar", "pyc", "wasm",
    "zip", "gz", "tgz", "bz2", "xz", "7z", "rar", "pdf", "woff", "woff2", "ttf", "otf", "eot",
    "mp3", "mp4", "ogg", "wav", "avi", "mov", "sqlite", "db",
];

/// Coarse category of a file, decided by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// Anything diffable as text, including files without an extension
    #[default]
    Text,
    /// Raster images the client can preview
    Image,
    /// Archives, executables, media and other opaque formats
    Binary,
}

impl FileType {
    /// Classify a file name (or path) by its extension. Never fails: unknown
    /// extensions are [`FileType::Text`].
    #[must_use]
    pub fn classify(file_name: &str) -> Self {
        let base = file_name.rsplit('/').next().unwrap_or(file_name);
        let Some((stem, ext)) = base.rsplit_once('.') else {
            return FileType::Text;
        };
        // dotfiles like `.gitignore` have no extension
        if stem.is_empty() {
            return FileType::Text;
        }

        let ext = ext.to_ascii_lowercase();
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            FileType::Image
        } else if BINARY_EXTENSIONS.contains(&ext.as_str()) {
            FileType::Binary
        } else {
            FileType::Text
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileType::Text => "text",
            FileType::Image => "image",
            FileType::Binary => "binary",
        };
        f.write_str(name)
    }
}
