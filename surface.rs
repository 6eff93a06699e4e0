//! surface - Host collaborators for the particle field
//! Drawing surface, frame scheduling, and an embedded-graphics adapter

use heapless::Vec;

/// 8-bit RGB colour, independent of any graphics backend.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Mix `self` over `background` at `alpha` (0 = background, 1 = self).
    pub fn over(self, background: Rgb, alpha: f32) -> Rgb {
        let a = alpha.clamp(0.0, 1.0);
        let mix = |fg: u8, bg: u8| -> u8 {
            let v = bg as f32 + (fg as f32 - bg as f32) * a;
            libm::roundf(v).clamp(0.0, 255.0) as u8
        };
        Rgb::new(mix(self.r, background.r), mix(self.g, background.g), mix(self.b, background.b))
    }
}

/// A 2D drawing context over a pixel buffer (the hero canvas).
pub trait Surface {
    /// Size of the rendered box the surface occupies in the layout.
    fn rendered_size(&self) -> (u32, u32);

    /// Reallocate the backing pixel buffer.
    fn set_buffer_size(&mut self, width: u32, height: u32);

    /// Clear the whole backing buffer.
    fn clear(&mut self);

    /// Filled circle at `alpha` opacity.
    fn fill_circle(&mut self, center: (f32, f32), radius: f32, color: Rgb, alpha: f32);

    /// Stroked segment at `alpha` opacity.
    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), color: Rgb, alpha: f32, width: f32);
}

/// Handle for one requested animation frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FrameId(pub u32);

/// requestAnimationFrame / cancelAnimationFrame.
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameId;
    fn cancel_frame(&mut self, frame: FrameId);
}

/// Max requests that can be outstanding in a [`FrameQueue`].
pub const MAX_PENDING_FRAMES: usize = 8;

/// In-process frame scheduler: requests are queued until the host calls [`FrameQueue::due`].
///
/// Nothing stops a caller from requesting twice, so a bug that stacks two
/// animation loops shows up as two pending frames.
#[derive(Debug, Default)]
pub struct FrameQueue {
    next_id: u32,
    pending: Vec<FrameId, MAX_PENDING_FRAMES>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> &[FrameId] {
        &self.pending
    }

    /// Take every frame that should fire now, in request order.
    pub fn due(&mut self) -> Vec<FrameId, MAX_PENDING_FRAMES> {
        core::mem::take(&mut self.pending)
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&mut self) -> FrameId {
        let id = FrameId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        if self.pending.push(id).is_err() {
            log::warn!("frame queue full, dropping request {:?}", id);
        }
        id
    }

    fn cancel_frame(&mut self, frame: FrameId) {
        self.pending.retain(|pending| *pending != frame);
    }
}

#[cfg(feature = "embedded-graphics")]
pub use eg::EgSurface;

#[cfg(feature = "embedded-graphics")]
mod eg {
    use super::{Rgb, Surface};
    use embedded_graphics::{
        pixelcolor::Rgb888,
        prelude::*,
        primitives::{Circle, Line, PrimitiveStyle, Rectangle},
    };

    /// [`Surface`] over any embedded-graphics RGB888 draw target.
    ///
    /// There is no read-back on a `DrawTarget`, so alpha is applied by blending
    /// with the known background colour rather than with what is underneath.
    pub struct EgSurface<D> {
        target: D,
        rendered: Size,
        buffer: Size,
        background: Rgb,
    }

    impl<D> EgSurface<D>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        pub fn new(target: D, background: Rgb) -> Self {
            let size = target.bounding_box().size;
            Self {
                target,
                rendered: size,
                buffer: size,
                background,
            }
        }

        /// Host layout changed; the next measurement will see the new box.
        pub fn set_rendered_size(&mut self, width: u32, height: u32) {
            self.rendered = Size::new(width, height);
        }

        pub fn target(&self) -> &D {
            &self.target
        }

        pub fn target_mut(&mut self) -> &mut D {
            &mut self.target
        }

        fn blend(&self, color: Rgb, alpha: f32) -> Rgb888 {
            let c = color.over(self.background, alpha);
            Rgb888::new(c.r, c.g, c.b)
        }
    }

    fn point(p: (f32, f32)) -> Point {
        Point::new(libm::roundf(p.0) as i32, libm::roundf(p.1) as i32)
    }

    impl<D> Surface for EgSurface<D>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        fn rendered_size(&self) -> (u32, u32) {
            (self.rendered.width, self.rendered.height)
        }

        fn set_buffer_size(&mut self, width: u32, height: u32) {
            self.buffer = Size::new(width, height);
        }

        fn clear(&mut self) {
            let bg = self.blend(self.background, 1.0);
            // Only the old buffer region; the rest of the target belongs to the host
            let _ = self.target.fill_solid(&Rectangle::new(Point::zero(), self.buffer), bg);
        }

        fn fill_circle(&mut self, center: (f32, f32), radius: f32, color: Rgb, alpha: f32) {
            let diameter = libm::roundf(radius * 2.0).max(1.0) as u32;
            let style = PrimitiveStyle::with_fill(self.blend(color, alpha));
            let _ = Circle::with_center(point(center), diameter)
                .into_styled(style)
                .draw(&mut self.target);
        }

        fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), color: Rgb, alpha: f32, width: f32) {
            let width = libm::roundf(width).max(1.0) as u32;
            let style = PrimitiveStyle::with_stroke(self.blend(color, alpha), width);
            let _ = Line::new(point(from), point(to))
                .into_styled(style)
                .draw(&mut self.target);
        }
    }
}
