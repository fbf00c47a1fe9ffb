// ABOUTME: Application configuration handling.
// ABOUTME: Loads and saves settings from TOML config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::{ColorScheme, GlitchProfile, Variant};

/// Options handed to the terminal engine as-is
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalOptions {
    /// TTF/OTF font to render with; a system monospace font is searched when unset
    pub font_path: Option<PathBuf>,

    /// Font size in pixels (before the display scale factor)
    pub font_size: f32,

    /// Lines of scrollback history kept by the engine
    pub scrollback_lines: usize,

    /// Color scheme (16 ANSI colors + fg/bg)
    pub color_scheme: ColorScheme,

    /// Shell program; the user's login shell when unset
    pub shell: Option<String>,

    /// Grid size used until the fit addon measures the container
    pub columns: u16,
    pub rows: u16,
}

impl Default for TerminalOptions {
    fn default() -> Self {
        Self {
            font_path: None,
            font_size: 16.0,
            scrollback_lines: 10_000,
            color_scheme: ColorScheme::default(),
            shell: None,
            columns: 80,
            rows: 24,
        }
    }
}

/// Terminal extensions loaded at mount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddonKind {
    /// Size the grid to the container
    Fit,
    /// Detect, underline, and open URLs
    Links,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GlitchSettings {
    pub variant: Variant,

    /// Override the variant's target frames per second
    pub frame_rate: Option<f32>,
}

impl GlitchSettings {
    pub fn profile(&self) -> GlitchProfile {
        let mut profile = self.variant.profile();
        if let Some(rate) = self.frame_rate {
            profile.frame_rate = rate;
        }
        profile
    }
}

/// Size of the terminal content box in logical pixels
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub width: u32,
    pub height: u32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: 960,
            height: 600,
        }
    }
}

/// Behavior settings (non-visual preferences)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorSettings {
    /// Automatically copy selected text to clipboard on mouse release
    pub auto_copy_selection: bool,
    /// Steps of the fade-in played right after the terminal appears
    pub fade_in_steps: u32,
    /// Steps of the fade-out played before the window closes
    pub fade_out_steps: u32,
}

impl Default for BehaviorSettings {
    fn default() -> Self {
        Self {
            auto_copy_selection: true,
            fade_in_steps: 10,
            fade_out_steps: 6,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Class name applied to the container window
    pub class_name: Option<String>,

    pub terminal: TerminalOptions,

    pub addons: Vec<AddonKind>,

    pub glitch: GlitchSettings,

    pub window: WindowSettings,

    pub behavior: BehaviorSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            class_name: Some("glitchterm".to_string()),
            terminal: TerminalOptions::default(),
            addons: vec![AddonKind::Fit, AddonKind::Links],
            glitch: GlitchSettings::default(),
            window: WindowSettings::default(),
            behavior: BehaviorSettings::default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Could not determine config directory")]
    NoConfigDir,
}

impl Config {
    /// Get the default config file path (~/.config/glitchterm/config.toml)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("glitchterm").join("config.toml"))
    }

    /// Load config from a path
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load config from default path, or return default config if not found
    pub fn load_or_default() -> Self {
        Self::default_path()
            .and_then(|path| Self::load(&path).ok())
            .unwrap_or_default()
    }

    /// Save config to a path
    pub fn save(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Save config to default path
    pub fn save_to_default(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::default_path().ok_or(ConfigError::NoConfigDir)?;
        self.save(&path)?;
        Ok(path)
    }
}
