// ABOUTME: Locates and reads the monospace font the painter rasterizes with.
// ABOUTME: Uses the configured path, or the first common system monospace font found.

use std::path::{Path, PathBuf};

/// Monospace fonts commonly installed on Linux, macOS and Windows
const SYSTEM_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "/usr/share/fonts/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/dejavu-sans-mono-fonts/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
    "/usr/share/fonts/liberation-mono/LiberationMono-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSansMono-Regular.ttf",
    "/usr/share/fonts/noto/NotoSansMono-Regular.ttf",
    "/Library/Fonts/Andale Mono.ttf",
    "/System/Library/Fonts/Supplemental/Andale Mono.ttf",
    "/System/Library/Fonts/Monaco.ttf",
    "C:\\Windows\\Fonts\\consola.ttf",
    "C:\\Windows\\Fonts\\cour.ttf",
];

#[derive(Debug, thiserror::Error)]
pub enum FontError {
    #[error("No monospace font found; set terminal.font_path in the config")]
    NotFound,

    #[error("Failed to read font {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to load font: {0}")]
    Parse(String),
}

/// Read the font at `configured`, or search the system candidates
pub fn load_font_data(configured: Option<&Path>) -> Result<(PathBuf, Vec<u8>), FontError> {
    if let Some(path) = configured {
        return read(path);
    }

    let path = SYSTEM_CANDIDATES
        .iter()
        .map(Path::new)
        .find(|p| p.is_file())
        .ok_or(FontError::NotFound)?;
    read(path)
}

fn read(path: &Path) -> Result<(PathBuf, Vec<u8>), FontError> {
    let data = std::fs::read(path).map_err(|source| FontError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!("Loaded font {} ({} bytes)", path.display(), data.len());
    Ok((path.to_path_buf(), data))
}
