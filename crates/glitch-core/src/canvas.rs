// ABOUTME: CPU-side RGBA pixel surface painted by the terminal.
// ABOUTME: Each terminal layer (screen, cursor, link) draws into its own canvas.

/// What a canvas shows. The terminal element owns one canvas per role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerRole {
    /// Cell backgrounds and glyphs
    Screen,
    /// The cursor block
    Cursor,
    /// Selection highlight and hovered link decoration
    Link,
}

impl LayerRole {
    pub fn label(&self) -> &'static str {
        match self {
            LayerRole::Screen => "screen",
            LayerRole::Cursor => "cursor",
            LayerRole::Link => "link",
        }
    }
}

/// Straight-alpha RGBA8 pixel buffer
#[derive(Debug, Clone)]
pub struct Canvas {
    role: LayerRole,
    width: u32,
    height: u32,
    /// Stacking order, `None` behaves like `auto`
    z_index: Option<i32>,
    pixels: Vec<u8>,
}

impl Canvas {
    pub fn new(role: LayerRole, width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            role,
            width,
            height,
            z_index: None,
            pixels: vec![0; (width * height * 4) as usize],
        }
    }

    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = Some(z_index);
        self
    }

    pub fn role(&self) -> LayerRole {
        self.role
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn z_index(&self) -> Option<i32> {
        self.z_index
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = ((y * self.width + x) * 4) as usize;
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }

    /// Reset every pixel to transparent black
    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    /// Overwrite every pixel with a color
    pub fn fill(&mut self, color: [f32; 4]) {
        let rgba = to_rgba8(color);
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
    }

    /// Composite a solid rectangle over the canvas, clipped to its bounds
    pub fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: [f32; 4]) {
        let Some((x0, y0, x1, y1)) = self.clip(x, y, width, height) else {
            return;
        };
        for py in y0..y1 {
            for px in x0..x1 {
                self.blend_pixel(px, py, color, 1.0);
            }
        }
    }

    /// Composite an 8-bit coverage mask (a rasterized glyph) tinted with `color`
    pub fn draw_coverage(
        &mut self,
        x: i32,
        y: i32,
        mask_width: usize,
        mask_height: usize,
        coverage: &[u8],
        color: [f32; 4],
    ) {
        for my in 0..mask_height {
            let py = y + my as i32;
            if py < 0 || py >= self.height as i32 {
                continue;
            }
            for mx in 0..mask_width {
                let px = x + mx as i32;
                if px < 0 || px >= self.width as i32 {
                    continue;
                }
                let alpha = coverage[my * mask_width + mx];
                if alpha == 0 {
                    continue;
                }
                self.blend_pixel(px as u32, py as u32, color, alpha as f32 / 255.0);
            }
        }
    }

    fn clip(&self, x: f32, y: f32, width: f32, height: f32) -> Option<(u32, u32, u32, u32)> {
        let x0 = x.max(0.0).round() as u32;
        let y0 = y.max(0.0).round() as u32;
        let x1 = ((x + width).round().max(0.0) as u32).min(self.width);
        let y1 = ((y + height).round().max(0.0) as u32).min(self.height);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0, y0, x1, y1))
    }

    // Source-over with straight alpha
    fn blend_pixel(&mut self, x: u32, y: u32, color: [f32; 4], coverage: f32) {
        let idx = ((y * self.width + x) * 4) as usize;
        let src_a = (color[3] * coverage).clamp(0.0, 1.0);
        if src_a <= 0.0 {
            return;
        }
        let dst = &mut self.pixels[idx..idx + 4];
        let dst_a = dst[3] as f32 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        for c in 0..3 {
            let src_c = color[c].clamp(0.0, 1.0);
            let dst_c = dst[c] as f32 / 255.0;
            let out_c = (src_c * src_a + dst_c * dst_a * (1.0 - src_a)) / out_a;
            dst[c] = (out_c * 255.0).round() as u8;
        }
        dst[3] = (out_a * 255.0).round() as u8;
    }
}

fn to_rgba8(color: [f32; 4]) -> [u8; 4] {
    [
        (color[0].clamp(0.0, 1.0) * 255.0).round() as u8,
        (color[1].clamp(0.0, 1.0) * 255.0).round() as u8,
        (color[2].clamp(0.0, 1.0) * 255.0).round() as u8,
        (color[3].clamp(0.0, 1.0) * 255.0).round() as u8,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_canvas_is_transparent() {
        let canvas = Canvas::new(LayerRole::Cursor, 4, 3);
        assert_eq!(canvas.pixels().len(), 4 * 3 * 4);
        assert!(canvas.pixels().iter().all(|&b| b == 0));
        assert_eq!(canvas.z_index(), None);
    }

    #[test]
    fn fill_rect_is_clipped() {
        let mut canvas = Canvas::new(LayerRole::Screen, 4, 4);
        canvas.fill_rect(2.0, 2.0, 10.0, 10.0, [1.0, 0.0, 0.0, 1.0]);

        assert_eq!(canvas.pixel(3, 3), [255, 0, 0, 255]);
        assert_eq!(canvas.pixel(2, 2), [255, 0, 0, 255]);
        assert_eq!(canvas.pixel(1, 1), [0, 0, 0, 0]);
    }

    #[test]
    fn fill_rect_outside_bounds_is_ignored() {
        let mut canvas = Canvas::new(LayerRole::Screen, 4, 4);
        canvas.fill_rect(-10.0, -10.0, 5.0, 5.0, [1.0, 1.0, 1.0, 1.0]);
        assert!(canvas.pixels().iter().all(|&b| b == 0));
    }

    #[test]
    fn translucent_fill_blends_over_opaque() {
        let mut canvas = Canvas::new(LayerRole::Screen, 1, 1);
        canvas.fill([0.0, 0.0, 0.0, 1.0]);
        canvas.fill_rect(0.0, 0.0, 1.0, 1.0, [1.0, 1.0, 1.0, 0.5]);

        let [r, g, b, a] = canvas.pixel(0, 0);
        assert_eq!(a, 255);
        assert!((r as i32 - 128).abs() <= 1);
        assert_eq!(r, g);
        assert_eq!(g, b);
    }

    #[test]
    fn coverage_mask_tints_pixels() {
        let mut canvas = Canvas::new(LayerRole::Screen, 3, 1);
        canvas.draw_coverage(0, 0, 3, 1, &[0, 255, 0], [0.0, 1.0, 0.0, 1.0]);

        assert_eq!(canvas.pixel(0, 0), [0, 0, 0, 0]);
        assert_eq!(canvas.pixel(1, 0), [0, 255, 0, 255]);
        assert_eq!(canvas.pixel(2, 0), [0, 0, 0, 0]);
    }

    #[test]
    fn clear_resets_pixels() {
        let mut canvas = Canvas::new(LayerRole::Link, 2, 2).with_z_index(2);
        canvas.fill([1.0, 1.0, 1.0, 1.0]);
        canvas.clear();
        assert!(canvas.pixels().iter().all(|&b| b == 0));
        assert_eq!(canvas.z_index(), Some(2));
    }
}
