// ABOUTME: Terminal color schemes and palette lookups.
// ABOUTME: 16 ANSI colors plus foreground/background, and the 256-color cube.

use serde::{Deserialize, Serialize};

/// A 16-color terminal palette plus foreground/background
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorScheme {
    pub name: String,
    pub foreground: [f32; 4],
    pub background: [f32; 4],
    /// ANSI colors 0-15 (8 normal + 8 bright)
    pub colors: [[f32; 4]; 16],
}

impl ColorScheme {
    /// Amber monochrome phosphor
    pub fn amber() -> Self {
        let bg = [0.05, 0.02, 0.0, 1.0];
        let dark = [0.4, 0.2, 0.0, 1.0];
        let medium = [0.7, 0.35, 0.0, 1.0];
        let bright = [1.0, 0.506, 0.0, 1.0];
        let full = [1.0, 0.7, 0.2, 1.0];

        Self {
            name: "Amber".to_string(),
            foreground: bright,
            background: bg,
            colors: [
                bg, dark, medium, medium, dark, dark, medium, bright,
                dark, medium, bright, bright, medium, medium, bright, full,
            ],
        }
    }

    /// Terminal green
    pub fn green() -> Self {
        let bg = [0.0, 0.02, 0.01, 1.0];
        let dark = [0.05, 0.26, 0.15, 1.0];
        let medium = [0.09, 0.46, 0.26, 1.0];
        let bright = [0.133, 0.655, 0.373, 1.0];
        let full = [0.2, 0.85, 0.5, 1.0];

        Self {
            name: "Green".to_string(),
            foreground: bright,
            background: bg,
            colors: [
                bg, dark, medium, medium, dark, dark, medium, bright,
                dark, medium, bright, bright, medium, medium, bright, full,
            ],
        }
    }

    /// White/gray monochrome
    pub fn white() -> Self {
        let bg = [0.0, 0.0, 0.0, 1.0];
        let dark = [0.3, 0.3, 0.3, 1.0];
        let medium = [0.6, 0.6, 0.6, 1.0];
        let bright = [1.0, 1.0, 1.0, 1.0];

        Self {
            name: "White".to_string(),
            foreground: bright,
            background: bg,
            colors: [
                bg, dark, medium, medium, dark, dark, medium, bright,
                dark, medium, bright, bright, medium, medium, bright, bright,
            ],
        }
    }

    /// Full color scheme with actual ANSI colors
    pub fn ansi() -> Self {
        Self {
            name: "ANSI".to_string(),
            foreground: [0.85, 0.85, 0.85, 1.0],
            background: [0.1, 0.1, 0.1, 1.0],
            colors: [
                [0.0, 0.0, 0.0, 1.0],       // 0: black
                [0.8, 0.2, 0.2, 1.0],       // 1: red
                [0.2, 0.8, 0.2, 1.0],       // 2: green
                [0.8, 0.8, 0.2, 1.0],       // 3: yellow
                [0.2, 0.2, 0.8, 1.0],       // 4: blue
                [0.8, 0.2, 0.8, 1.0],       // 5: magenta
                [0.2, 0.8, 0.8, 1.0],       // 6: cyan
                [0.75, 0.75, 0.75, 1.0],    // 7: white
                [0.4, 0.4, 0.4, 1.0],       // 8: bright black
                [1.0, 0.4, 0.4, 1.0],       // 9: bright red
                [0.4, 1.0, 0.4, 1.0],       // 10: bright green
                [1.0, 1.0, 0.4, 1.0],       // 11: bright yellow
                [0.4, 0.4, 1.0, 1.0],       // 12: bright blue
                [1.0, 0.4, 1.0, 1.0],       // 13: bright magenta
                [0.4, 1.0, 1.0, 1.0],       // 14: bright cyan
                [1.0, 1.0, 1.0, 1.0],       // 15: bright white
            ],
        }
    }

    pub fn presets() -> Vec<ColorScheme> {
        vec![Self::amber(), Self::green(), Self::white(), Self::ansi()]
    }

    /// Highlight drawn over selected cells
    pub fn selection(&self) -> [f32; 4] {
        [self.foreground[0], self.foreground[1], self.foreground[2], 0.35]
    }

    /// Convert a 256-color palette index to RGBA
    /// - 0-15: use the scheme's ANSI colors
    /// - 16-231: 6x6x6 color cube
    /// - 232-255: grayscale ramp
    pub fn indexed_color(&self, index: u8) -> [f32; 4] {
        match index {
            0..=15 => self.colors[index as usize],
            16..=231 => {
                let idx = index - 16;
                let r = (idx / 36) % 6;
                let g = (idx / 6) % 6;
                let b = idx % 6;
                // 0 -> 0, 1..=5 -> 95, 135, 175, 215, 255
                let to_unit = |v: u8| -> f32 {
                    if v == 0 {
                        0.0
                    } else {
                        (55.0 + v as f32 * 40.0) / 255.0
                    }
                };
                [to_unit(r), to_unit(g), to_unit(b), 1.0]
            }
            232..=255 => {
                let gray = (8.0 + (index - 232) as f32 * 10.0) / 255.0;
                [gray, gray, gray, 1.0]
            }
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::ansi()
    }
}
