use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture, TextureError};
use tracing::warn;
use winit::window::Window;

use super::surface::Surface;

/// Uploads a fixed-size frame to the window, scaled to fit.
pub struct Renderer {
    pixels: Pixels<'static>,
    display_width: u32,
    display_height: u32,
}

impl Renderer {
    pub fn new(window: Arc<Window>, display_width: u32, display_height: u32) -> Result<Self, Error> {
        let size = window.inner_size();
        let surface = SurfaceTexture::new(size.width.max(1), size.height.max(1), window);
        let pixels = Pixels::new(display_width, display_height, surface)?;
        Ok(Self {
            pixels,
            display_width,
            display_height,
        })
    }

    pub fn display_size(&self) -> (u32, u32) {
        (self.display_width, self.display_height)
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), TextureError> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels.resize_surface(width, height)
    }

    pub fn present(&mut self, frame: &Surface) -> Result<(), Error> {
        let target = self.pixels.frame_mut();
        if !copy_frame(target, frame) {
            warn!(
                frame_width = frame.width(),
                frame_height = frame.height(),
                display_width = self.display_width,
                display_height = self.display_height,
                "renderer_frame_size_mismatch"
            );
        }
        self.pixels.render()
    }
}

/// Copies as much of `frame` as fits. Returns `false` on a size mismatch.
fn copy_frame(target: &mut [u8], frame: &Surface) -> bool {
    let source = frame.rgba();
    let len = target.len().min(source.len());
    target[..len].copy_from_slice(&source[..len]);
    for byte in &mut target[len..] {
        *byte = 0;
    }
    target.len() == source.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_frame_reports_mismatch_and_zero_fills() {
        let mut frame = Surface::new(1, 1);
        frame.fill([1, 2, 3, 4]);
        let mut target = vec![9u8; 8];

        assert!(!copy_frame(&mut target, &frame));
        assert_eq!(target, vec![1, 2, 3, 4, 0, 0, 0, 0]);

        let mut exact = vec![0u8; 4];
        assert!(copy_frame(&mut exact, &frame));
    }
}
