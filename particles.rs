//! particles - Ambient particle field for the hero canvas
//! Fixed-capacity pool, toroidal wrap, proximity links

use heapless::Vec;

use crate::rng::XorShift32;
use crate::surface::{FrameId, FrameScheduler, Rgb, Surface};

/// Hard cap on the pool, whatever the canvas area.
pub const MAX_PARTICLES: usize = 100;

/// Every tunable of the field in one place.
#[derive(Copy, Clone, Debug)]
pub struct ParticleSettings {
    // Population
    pub area_per_particle: u32,
    pub max_particles: usize,

    // Motion
    pub speed: f32,
    pub radius_min: f32,
    pub radius_max: f32,

    // Opacity breathing
    pub opacity_min: f32,
    pub opacity_max: f32,
    pub initial_opacity_min: f32,
    pub initial_opacity_max: f32,
    pub opacity_step: f32,

    // Glow
    pub glow_radius: f32,
    pub glow_alpha: f32,

    // Links
    pub link_distance: f32,
    pub link_alpha: f32,
    pub link_width: f32,
    pub link_color: Rgb,

    pub palette: [Rgb; 4],

    pub rng_seed: u32,
}

impl Default for ParticleSettings {
    fn default() -> Self {
        Self {
            area_per_particle: 9000,
            max_particles: MAX_PARTICLES,
            speed: 0.4,
            radius_min: 0.3,
            radius_max: 2.1,
            opacity_min: 0.05,
            opacity_max: 0.5,
            initial_opacity_min: 0.1,
            initial_opacity_max: 0.5,
            opacity_step: 0.005,
            glow_radius: 4.0,
            glow_alpha: 0.5,
            link_distance: 110.0,
            link_alpha: 0.08,
            link_width: 0.6,
            link_color: Rgb::new(99, 102, 241),
            palette: [
                Rgb::new(99, 102, 241),
                Rgb::new(6, 182, 212),
                Rgb::new(236, 72, 153),
                Rgb::new(168, 85, 247),
            ],
            rng_seed: 0x12345678,
        }
    }
}

/// One simulated point.
///
/// Plain record: all motion goes through [`advance`], all drawing through [`render`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Particle {
    /// Unique within a field, never reused across rebuilds.
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
    pub radius: f32,
    pub opacity: f32,
    /// Signed per-frame opacity change; flips at either bound.
    pub opacity_drift: f32,
    pub color: Rgb,
}

/// Canvas extent the particles live in.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

/// A line to draw between two particles.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Link {
    pub a: usize,
    pub b: usize,
    pub distance: f32,
    pub alpha: f32,
}

/// Particles for a canvas: one per `area_per_particle` pixels, capped.
pub fn particle_count(width: u32, height: u32, settings: &ParticleSettings) -> usize {
    let area = width as u64 * height as u64;
    let per = settings.area_per_particle.max(1) as u64;
    let cap = settings.max_particles.min(MAX_PARTICLES);
    ((area / per) as usize).min(cap)
}

/// One frame of motion for a single particle.
pub fn advance(particle: Particle, bounds: Bounds, settings: &ParticleSettings) -> Particle {
    let mut p = particle;
    p.x += p.dx;
    p.y += p.dy;

    // CHANGE: Reflect any overshoot back inside and reverse the drift
    // REASON: Opacity stays within [opacity_min, opacity_max] on every frame
    p.opacity += p.opacity_drift;
    if p.opacity >= settings.opacity_max {
        p.opacity = (2.0 * settings.opacity_max - p.opacity).max(settings.opacity_min);
        p.opacity_drift = -libm::fabsf(p.opacity_drift);
    } else if p.opacity <= settings.opacity_min {
        p.opacity = (2.0 * settings.opacity_min - p.opacity).min(settings.opacity_max);
        p.opacity_drift = libm::fabsf(p.opacity_drift);
    }

    // Toroidal wrap
    if p.x < 0.0 {
        p.x = bounds.width;
    } else if p.x > bounds.width {
        p.x = 0.0;
    }
    if p.y < 0.0 {
        p.y = bounds.height;
    } else if p.y > bounds.height {
        p.y = 0.0;
    }

    p
}

/// Soft glow, then the solid dot on top.
pub fn render<S: Surface>(particle: &Particle, surface: &mut S, settings: &ParticleSettings) {
    let center = (particle.x, particle.y);
    surface.fill_circle(
        center,
        particle.radius + settings.glow_radius * 0.5,
        particle.color,
        particle.opacity * settings.glow_alpha * 0.5,
    );
    surface.fill_circle(center, particle.radius, particle.color, particle.opacity);
}

/// Every unordered pair closer than `max_distance`, alpha falling off linearly to zero.
// PERF: O(n²), at most 4950 checks with the pool capped at 100
pub fn links(
    particles: &[Particle],
    max_distance: f32,
    max_alpha: f32,
) -> impl Iterator<Item = Link> + '_ {
    let n = particles.len();
    (0..n).flat_map(move |a| {
        ((a + 1)..n).filter_map(move |b| {
            let dx = particles[a].x - particles[b].x;
            let dy = particles[a].y - particles[b].y;
            let distance = libm::sqrtf(dx * dx + dy * dy);
            if distance < max_distance {
                Some(Link {
                    a,
                    b,
                    distance,
                    alpha: (1.0 - distance / max_distance) * max_alpha,
                })
            } else {
                None
            }
        })
    })
}

/// Lifecycle of the field.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FieldState {
    Uninitialized,
    Running,
}

/// The hero-canvas simulator.
pub struct ParticleField {
    particles: Vec<Particle, MAX_PARTICLES>,
    bounds: Bounds,
    state: FieldState,
    pending_frame: Option<FrameId>,
    next_id: u32,
    frames_drawn: u64,
    rng: XorShift32,
    settings: ParticleSettings,
}

impl ParticleField {
    pub fn new(settings: ParticleSettings) -> Self {
        Self {
            particles: Vec::new(),
            bounds: Bounds { width: 0.0, height: 0.0 },
            state: FieldState::Uninitialized,
            pending_frame: None,
            next_id: 0,
            frames_drawn: 0,
            rng: XorShift32::new(settings.rng_seed),
            settings,
        }
    }

    fn spawn(&mut self) -> Particle {
        let s = self.settings;
        let rng = &mut self.rng;
        let x = rng.range(0.0, self.bounds.width);
        let y = rng.range(0.0, self.bounds.height);
        let radius = rng.range(s.radius_min, s.radius_max);
        let dx = (rng.next_f32() - 0.5) * s.speed;
        let dy = (rng.next_f32() - 0.5) * s.speed;
        let opacity = rng
            .range(s.initial_opacity_min, s.initial_opacity_max)
            .clamp(s.opacity_min, s.opacity_max);
        let opacity_drift = if rng.next_f32() > 0.5 { s.opacity_step } else { -s.opacity_step };
        let color = s.palette[rng.index(s.palette.len())];

        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);

        Particle {
            id,
            x,
            y,
            dx,
            dy,
            radius,
            opacity,
            opacity_drift,
            color,
        }
    }

    /// Size the canvas to its box, populate it and start the loop.
    ///
    /// A missing surface is not an error: the field stays uninitialized and no
    /// frame is requested. Calling this again replaces the running loop.
    pub fn initialize<S, F>(&mut self, surface: Option<&mut S>, frames: &mut F) -> bool
    where
        S: Surface,
        F: FrameScheduler,
    {
        let Some(surface) = surface else {
            log::debug!("particle field disabled: no canvas");
            return false;
        };

        if let Some(frame) = self.pending_frame.take() {
            frames.cancel_frame(frame);
        }

        let (width, height) = surface.rendered_size();
        surface.set_buffer_size(width, height);
        self.bounds = Bounds {
            width: width as f32,
            height: height as f32,
        };

        let count = particle_count(width, height, &self.settings);
        self.particles.clear();
        for _ in 0..count {
            let particle = self.spawn();
            // Cannot fail, count is capped at MAX_PARTICLES
            let _ = self.particles.push(particle);
        }

        self.state = FieldState::Running;
        self.pending_frame = Some(frames.request_frame());
        log::info!("particle field {}x{} with {} particles", width, height, count);
        true
    }

    /// Viewport changed: drop everything and rebuild against the new box.
    pub fn on_resize<S, F>(&mut self, surface: Option<&mut S>, frames: &mut F) -> bool
    where
        S: Surface,
        F: FrameScheduler,
    {
        if let Some(frame) = self.pending_frame.take() {
            frames.cancel_frame(frame);
        }
        if surface.is_none() {
            // Canvas gone: nothing survives, back to the pre-init state
            self.particles.clear();
            self.state = FieldState::Uninitialized;
        }
        self.initialize(surface, frames)
    }

    /// Animation-frame callback. Frames from a cancelled loop are ignored.
    pub fn on_frame<S, F>(&mut self, frame: FrameId, surface: &mut S, frames: &mut F) -> bool
    where
        S: Surface,
        F: FrameScheduler,
    {
        if self.pending_frame != Some(frame) {
            log::trace!("ignoring stale frame {:?}", frame);
            return false;
        }
        self.tick(surface);
        self.pending_frame = Some(frames.request_frame());
        true
    }

    /// Advance every particle one step and redraw the whole canvas.
    pub fn tick<S: Surface>(&mut self, surface: &mut S) {
        surface.clear();

        for p in self.particles.iter_mut() {
            *p = advance(*p, self.bounds, &self.settings);
            render(p, surface, &self.settings);
        }

        let s = &self.settings;
        for link in links(&self.particles, s.link_distance, s.link_alpha) {
            let a = &self.particles[link.a];
            let b = &self.particles[link.b];
            surface.stroke_line((a.x, a.y), (b.x, b.y), s.link_color, link.alpha, s.link_width);
        }

        self.frames_drawn += 1;
    }

    /// Stop the loop without touching the particles.
    pub fn stop<F: FrameScheduler>(&mut self, frames: &mut F) {
        if let Some(frame) = self.pending_frame.take() {
            frames.cancel_frame(frame);
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn state(&self) -> FieldState {
        self.state
    }

    pub fn pending_frame(&self) -> Option<FrameId> {
        self.pending_frame
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    pub fn settings(&self) -> &ParticleSettings {
        &self.settings
    }

    /// New settings apply from the next (re)initialisation.
    pub fn update_settings(&mut self, settings: ParticleSettings) {
        self.settings = settings;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::FrameQueue;

    #[derive(Default)]
    struct FakeCanvas {
        size: (u32, u32),
        buffer: (u32, u32),
        clears: usize,
        circles: usize,
        lines: std::vec::Vec<((f32, f32), (f32, f32), f32)>,
    }

    impl FakeCanvas {
        fn sized(width: u32, height: u32) -> Self {
            Self {
                size: (width, height),
                ..Default::default()
            }
        }
    }

    impl Surface for FakeCanvas {
        fn rendered_size(&self) -> (u32, u32) {
            self.size
        }
        fn set_buffer_size(&mut self, width: u32, height: u32) {
            self.buffer = (width, height);
        }
        fn clear(&mut self) {
            self.clears += 1;
            self.circles = 0;
            self.lines.clear();
        }
        fn fill_circle(&mut self, _center: (f32, f32), _radius: f32, _color: Rgb, _alpha: f32) {
            self.circles += 1;
        }
        fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), _color: Rgb, alpha: f32, _width: f32) {
            self.lines.push((from, to, alpha));
        }
    }

    fn particle_at(id: u32, x: f32, y: f32) -> Particle {
        Particle {
            id,
            x,
            y,
            dx: 0.0,
            dy: 0.0,
            radius: 1.0,
            opacity: 0.3,
            opacity_drift: 0.005,
            color: Rgb::new(99, 102, 241),
        }
    }

    #[test]
    fn test_particle_count_scales_with_area() {
        let s = ParticleSettings::default();
        assert_eq!(particle_count(0, 0, &s), 0);
        assert_eq!(particle_count(100, 89, &s), 0);
        assert_eq!(particle_count(300, 300, &s), 10);
        assert_eq!(particle_count(640, 360, &s), 25);
        assert_eq!(particle_count(1000, 899, &s), 99);
        assert_eq!(particle_count(1920, 1080, &s), 100);
        for (w, h) in [(1u32, 1u32), (123, 456), (800, 600), (3000, 3000)] {
            let n = particle_count(w, h, &s);
            let raw = (w as u64 * h as u64 / 9000) as usize;
            assert!(n <= 100);
            if raw < 100 {
                assert_eq!(n, raw);
            }
        }
    }

    #[test]
    fn test_opacity_and_position_stay_in_bounds() {
        let mut field = ParticleField::new(ParticleSettings::default());
        let mut canvas = FakeCanvas::sized(400, 300);
        let mut frames = FrameQueue::new();
        field.initialize(Some(&mut canvas), &mut frames);
        assert_eq!(field.particles().len(), 13);

        for _ in 0..3000 {
            field.tick(&mut canvas);
            for p in field.particles() {
                assert!(p.opacity >= 0.05 && p.opacity <= 0.5, "opacity {}", p.opacity);
                assert!(p.x >= 0.0 && p.x <= 400.0, "x {}", p.x);
                assert!(p.y >= 0.0 && p.y <= 300.0, "y {}", p.y);
            }
        }
    }

    #[test]
    fn test_opacity_bounces_instead_of_sticking() {
        let s = ParticleSettings::default();
        let bounds = Bounds { width: 100.0, height: 100.0 };
        let mut p = particle_at(0, 50.0, 50.0);
        p.opacity = 0.498;
        p.opacity_drift = 0.005;

        let p = advance(p, bounds, &s);
        assert!(p.opacity <= 0.5);
        assert!(p.opacity_drift < 0.0);

        let next = advance(p, bounds, &s);
        assert!(next.opacity < p.opacity);
    }

    #[test]
    fn test_wrap_is_toroidal() {
        let s = ParticleSettings::default();
        let bounds = Bounds { width: 100.0, height: 50.0 };

        let mut left = particle_at(0, 0.05, 25.0);
        left.dx = -0.1;
        assert_eq!(advance(left, bounds, &s).x, 100.0);

        let mut bottom = particle_at(1, 10.0, 49.95);
        bottom.dy = 0.1;
        assert_eq!(advance(bottom, bounds, &s).y, 0.0);
    }

    #[test]
    fn test_links_only_below_threshold() {
        let particles = [
            particle_at(0, 0.0, 0.0),
            particle_at(1, 109.9, 0.0),
            particle_at(2, 0.0, 110.0),
            particle_at(3, 300.0, 300.0),
        ];
        let found: std::vec::Vec<Link> = links(&particles, 110.0, 0.08).collect();
        assert_eq!(found.len(), 1);
        assert_eq!((found[0].a, found[0].b), (0, 1));
        assert!(found[0].alpha > 0.0 && found[0].alpha < 0.001);

        // Same pairs, exhaustively against the distance
        for a in 0..particles.len() {
            for b in (a + 1)..particles.len() {
                let dx = particles[a].x - particles[b].x;
                let dy = particles[a].y - particles[b].y;
                let close = (dx * dx + dy * dy).sqrt() < 110.0;
                assert_eq!(close, found.iter().any(|l| l.a == a && l.b == b));
            }
        }
    }

    #[test]
    fn test_link_alpha_falls_off_linearly() {
        let particles = [particle_at(0, 0.0, 0.0), particle_at(1, 55.0, 0.0)];
        let link = links(&particles, 110.0, 0.08).next().unwrap();
        assert!((link.alpha - 0.04).abs() < 1e-6);
    }

    #[test]
    fn test_tick_draws_particles_and_links() {
        let mut field = ParticleField::new(ParticleSettings::default());
        let mut canvas = FakeCanvas::sized(300, 300);
        let mut frames = FrameQueue::new();
        field.initialize(Some(&mut canvas), &mut frames);

        field.tick(&mut canvas);
        assert_eq!(canvas.clears, 1);
        // glow + dot
        assert_eq!(canvas.circles, 2 * field.particles().len());
        let expected = links(field.particles(), 110.0, 0.08).count();
        assert_eq!(canvas.lines.len(), expected);
    }

    #[test]
    fn test_resize_replaces_every_particle() {
        let mut field = ParticleField::new(ParticleSettings::default());
        let mut canvas = FakeCanvas::sized(600, 400);
        let mut frames = FrameQueue::new();
        field.initialize(Some(&mut canvas), &mut frames);
        let before: std::vec::Vec<u32> = field.particles().iter().map(|p| p.id).collect();
        assert!(!before.is_empty());

        canvas.size = (900, 500);
        field.on_resize(Some(&mut canvas), &mut frames);
        assert_eq!(canvas.buffer, (900, 500));
        assert_eq!(field.particles().len(), 50);
        assert!(field.particles().iter().all(|p| !before.contains(&p.id)));
    }

    #[test]
    fn test_resize_never_stacks_loops() {
        let mut field = ParticleField::new(ParticleSettings::default());
        let mut canvas = FakeCanvas::sized(300, 300);
        let mut frames = FrameQueue::new();
        field.initialize(Some(&mut canvas), &mut frames);
        let first = field.pending_frame().unwrap();

        field.on_resize(Some(&mut canvas), &mut frames);
        field.on_resize(Some(&mut canvas), &mut frames);
        assert_eq!(frames.pending().len(), 1);

        // The cancelled loop must not draw even if its callback still arrives
        assert!(!field.on_frame(first, &mut canvas, &mut frames));
        assert_eq!(field.frames_drawn(), 0);

        for frame in frames.due() {
            assert!(field.on_frame(frame, &mut canvas, &mut frames));
        }
        assert_eq!(field.frames_drawn(), 1);
        assert_eq!(frames.pending().len(), 1);
    }

    #[test]
    fn test_missing_canvas_is_silent_noop() {
        let mut field = ParticleField::new(ParticleSettings::default());
        let mut frames = FrameQueue::new();
        assert!(!field.initialize::<FakeCanvas, _>(None, &mut frames));
        assert_eq!(field.state(), FieldState::Uninitialized);
        assert!(frames.pending().is_empty());
        assert!(field.particles().is_empty());
    }

    #[test]
    fn test_resize_without_canvas_stops_and_empties() {
        let mut field = ParticleField::new(ParticleSettings::default());
        let mut canvas = FakeCanvas::sized(600, 400);
        let mut frames = FrameQueue::new();
        field.initialize(Some(&mut canvas), &mut frames);
        assert_eq!(field.particles().len(), 26);

        assert!(!field.on_resize::<FakeCanvas, _>(None, &mut frames));
        assert_eq!(field.state(), FieldState::Uninitialized);
        assert_eq!(field.pending_frame(), None);
        assert!(frames.pending().is_empty());
        assert!(field.particles().is_empty());

        // Canvas back: a fresh batch, none of the old ids
        field.on_resize(Some(&mut canvas), &mut frames);
        assert_eq!(field.state(), FieldState::Running);
        assert!(field.particles().iter().all(|p| p.id >= 26));
    }

    #[test]
    fn test_colors_come_from_palette() {
        let settings = ParticleSettings::default();
        let mut field = ParticleField::new(settings);
        let mut canvas = FakeCanvas::sized(1920, 1080);
        let mut frames = FrameQueue::new();
        field.initialize(Some(&mut canvas), &mut frames);
        assert_eq!(field.particles().len(), 100);
        for p in field.particles() {
            assert!(settings.palette.contains(&p.color));
            assert!(p.radius >= 0.3 && p.radius <= 2.1 + 1e-5);
            assert!(p.dx.abs() <= 0.2 && p.dy.abs() <= 0.2);
        }
    }
}
