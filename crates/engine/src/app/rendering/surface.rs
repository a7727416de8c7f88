use crate::sprite::Sprite;

/// Threshold above which a pixel counts as covered when building a silhouette.
pub const MASK_ALPHA_THRESHOLD: u8 = 127;

/// Owned RGBA8 drawing target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            rgba: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<[u8; 4]> {
        let offset = self.offset_of(x, y)?;
        let mut out = [0u8; 4];
        out.copy_from_slice(&self.rgba[offset..offset + 4]);
        Some(out)
    }

    pub fn clear(&mut self) {
        self.fill([0, 0, 0, 0]);
    }

    pub fn fill(&mut self, color: [u8; 4]) {
        for chunk in self.rgba.chunks_exact_mut(4) {
            chunk.copy_from_slice(&color);
        }
    }

    /// Overwrites a clipped rectangle with `color`.
    pub fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: [u8; 4]) {
        let left = x.max(0);
        let top = y.max(0);
        let right = x.saturating_add(w as i32).min(self.width as i32);
        let bottom = y.saturating_add(h as i32).min(self.height as i32);
        for py in top..bottom {
            for px in left..right {
                self.write_pixel_clipped(px, py, color);
            }
        }
    }

    /// Paints everything outside the circle at `center` with `color` and leaves
    /// the inside as it was.
    pub fn fill_outside_circle(&mut self, center: (i32, i32), radius: i32, color: [u8; 4]) {
        if radius <= 0 {
            self.fill(color);
            return;
        }
        let radius = radius as i64;
        let radius_sq = radius * radius;
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                let dx = (x - center.0) as i64;
                let dy = (y - center.1) as i64;
                if dx * dx + dy * dy > radius_sq {
                    self.write_pixel_clipped(x, y, color);
                }
            }
        }
    }

    /// Copy where every covered pixel becomes `color` and the rest is clear.
    pub fn silhouette(&self, color: [u8; 4]) -> Surface {
        let mut out = Surface::new(self.width, self.height);
        for (src, dst) in self
            .rgba
            .chunks_exact(4)
            .zip(out.rgba.chunks_exact_mut(4))
        {
            if src[3] > MASK_ALPHA_THRESHOLD {
                dst.copy_from_slice(&color);
            }
        }
        out
    }

    /// Alpha-blends `source` with its top-left at `(x, y)`.
    pub fn blit(&mut self, source: &Surface, x: i32, y: i32) {
        self.blit_rgba(source.width, source.height, &source.rgba, x, y, false);
    }

    /// Alpha-blends a sprite, optionally mirrored left to right.
    pub fn blit_sprite(&mut self, sprite: &Sprite, x: i32, y: i32, flip_x: bool) {
        self.blit_rgba(sprite.width(), sprite.height(), sprite.rgba(), x, y, flip_x);
    }

    fn blit_rgba(&mut self, width: u32, height: u32, rgba: &[u8], x: i32, y: i32, flip_x: bool) {
        if width == 0 || height == 0 || rgba.len() < width as usize * height as usize * 4 {
            return;
        }
        let draw_left = x.max(0);
        let draw_top = y.max(0);
        let draw_right = x.saturating_add(width as i32).min(self.width as i32);
        let draw_bottom = y.saturating_add(height as i32).min(self.height as i32);
        if draw_left >= draw_right || draw_top >= draw_bottom {
            return;
        }

        let src_width = width as usize;
        for out_y in draw_top..draw_bottom {
            let src_y = (out_y - y) as usize;
            for out_x in draw_left..draw_right {
                let dx = (out_x - x) as usize;
                let src_x = if flip_x { src_width - 1 - dx } else { dx };
                let src_offset = (src_y * src_width + src_x) * 4;
                let mut src = [0u8; 4];
                src.copy_from_slice(&rgba[src_offset..src_offset + 4]);
                if src[3] == 0 {
                    continue;
                }
                let Some(dst_offset) = self.offset_of(out_x, out_y) else {
                    continue;
                };
                let dst = &mut self.rgba[dst_offset..dst_offset + 4];
                let blended = blend_over(src, [dst[0], dst[1], dst[2], dst[3]]);
                dst.copy_from_slice(&blended);
            }
        }
    }

    fn write_pixel_clipped(&mut self, x: i32, y: i32, color: [u8; 4]) {
        if let Some(offset) = self.offset_of(x, y) {
            self.rgba[offset..offset + 4].copy_from_slice(&color);
        }
    }

    fn offset_of(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * 4)
    }
}

/// Straight-alpha "source over destination".
fn blend_over(src: [u8; 4], dst: [u8; 4]) -> [u8; 4] {
    let sa = src[3] as u32;
    if sa == 255 {
        return src;
    }
    let da = dst[3] as u32;
    let out_a = sa * 255 + da * (255 - sa);
    if out_a == 0 {
        return [0, 0, 0, 0];
    }
    let channel = |s: u8, d: u8| -> u8 {
        let numerator = s as u32 * sa * 255 + d as u32 * da * (255 - sa);
        ((numerator + out_a / 2) / out_a) as u8
    };
    [
        channel(src[0], dst[0]),
        channel(src[1], dst[1]),
        channel(src[2], dst[2]),
        ((out_a + 127) / 255) as u8,
    ]
}
