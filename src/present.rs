//! Frame presentation.
//!
//! The loop treats rendering as an opaque service: once per iteration it asks
//! the [`RenderContext`] to present a frame. What sits behind the context is a
//! [`FramePresenter`]; the binary uses [`HeadlessSurface`], a software target
//! that clears a back buffer to the configured color and swaps it to the front.
//!
//! The context is created in `main` and borrowed by the loop. Dropping it
//! releases the presenter, on success and error paths alike.

use crate::config::RenderConfig;
use crate::error::{Error, Result};
use log::{debug, info};

/// One-frame render service.
pub trait FramePresenter {
    /// Clear, draw and present one frame.
    fn present_frame(&mut self);

    /// Tear down the surface. Called once, from [`RenderContext`]'s drop.
    fn release(&mut self) {}
}

/// Owns the presenter for the lifetime of the program.
pub struct RenderContext {
    presenter: Box<dyn FramePresenter>,
    frames: u64,
}

impl RenderContext {
    pub fn new(presenter: impl FramePresenter + 'static) -> Self {
        Self {
            presenter: Box::new(presenter),
            frames: 0,
        }
    }

    /// Headless context sized by `config`.
    pub fn headless(config: &RenderConfig) -> Result<Self> {
        Ok(Self::new(HeadlessSurface::new(config)?))
    }

    pub fn present(&mut self) {
        self.presenter.present_frame();
        self.frames += 1;
    }

    /// Frames presented so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Drop for RenderContext {
    fn drop(&mut self) {
        self.presenter.release();
        debug!("render context released after {} frame(s)", self.frames);
    }
}

/// Double-buffered RGBA8 software surface.
pub struct HeadlessSurface {
    width: u32,
    height: u32,
    clear: [u8; 4],
    back: Vec<u8>,
    front: Vec<u8>,
}

impl HeadlessSurface {
    pub fn new(config: &RenderConfig) -> Result<Self> {
        if config.width == 0 || config.height == 0 {
            return Err(Error::Surface(format!(
                "invalid surface size {}x{}",
                config.width, config.height
            )));
        }
        let len = config.width as usize * config.height as usize * 4;
        info!("headless surface {}x{}", config.width, config.height);

        Ok(Self {
            width: config.width,
            height: config.height,
            clear: config.clear_color.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8),
            back: vec![0; len],
            front: vec![0; len],
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Last presented frame.
    pub fn front(&self) -> &[u8] {
        &self.front
    }
}

impl FramePresenter for HeadlessSurface {
    fn present_frame(&mut self) {
        for px in self.back.chunks_exact_mut(4) {
            px.copy_from_slice(&self.clear);
        }
        std::mem::swap(&mut self.back, &mut self.front);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Probe {
        presented: Rc<Cell<u32>>,
        released: Rc<Cell<u32>>,
    }

    impl FramePresenter for Probe {
        fn present_frame(&mut self) {
            self.presented.set(self.presented.get() + 1);
        }

        fn release(&mut self) {
            self.released.set(self.released.get() + 1);
        }
    }

    #[test]
    fn context_counts_frames_and_releases_once() {
        let presented = Rc::new(Cell::new(0));
        let released = Rc::new(Cell::new(0));
        {
            let mut ctx = RenderContext::new(Probe {
                presented: presented.clone(),
                released: released.clone(),
            });
            ctx.present();
            ctx.present();
            assert_eq!(ctx.frames(), 2);
        }
        assert_eq!(presented.get(), 2);
        assert_eq!(released.get(), 1);
    }

    #[test]
    fn headless_clears_to_color() {
        let cfg = RenderConfig {
            width: 2,
            height: 1,
            clear_color: [1.0, 0.0, 0.5, 1.0],
        };
        let mut surface = HeadlessSurface::new(&cfg).unwrap();
        surface.present_frame();
        assert_eq!(surface.front(), &[255, 0, 128, 255, 255, 0, 128, 255]);
    }

    #[test]
    fn zero_sized_surface_is_fatal() {
        let cfg = RenderConfig {
            width: 0,
            ..Default::default()
        };
        assert!(matches!(HeadlessSurface::new(&cfg), Err(Error::Surface(_))));
    }
}
