//! page - Application start: wires every feature against the elements that exist
//!
//! Each feature declares the elements it needs. If any is missing the feature
//! is skipped (logged at debug) and the rest of the page starts normally.

use heapless::Vec;

use crate::contact::{ContactForm, Delivery, FormSettings};
use crate::effects::{
    navbar_state, scroll_progress, scroll_top_visible, CursorTrail, MobileMenu, NavbarState,
    ScrollReveal, Section, SkillBar,
};
use crate::particles::{ParticleField, ParticleSettings};
use crate::surface::{FrameQueue, Surface};
use crate::typing::{TypingEffect, TypingSettings, ROLES};

pub const MAX_SECTIONS: usize = 16;
pub const MAX_SKILL_BARS: usize = 16;

/// Which optional elements the host page actually has.
#[derive(Debug, Clone, Default)]
pub struct Elements {
    pub cursor_dot: bool,
    pub cursor_ring: bool,
    pub scroll_progress: bool,
    pub navbar: bool,
    pub sections: Vec<Section, MAX_SECTIONS>,
    pub hamburger: bool,
    pub nav_links: bool,
    pub typed_text: bool,
    pub reveal_targets: usize,
    /// `data-width` of every skill bar, in percent.
    pub skill_bars: Vec<f32, MAX_SKILL_BARS>,
    pub contact_form: bool,
    pub submit_button: bool,
    pub success_banner: bool,
    pub scroll_top_button: bool,
}

impl Elements {
    /// Everything present, as on the real portfolio page.
    pub fn full() -> Self {
        let mut sections = Vec::new();
        for (id, top, height) in [
            ("home", 0.0, 900.0),
            ("about", 900.0, 800.0),
            ("skills", 1700.0, 700.0),
            ("projects", 2400.0, 1000.0),
            ("contact", 3400.0, 800.0),
        ] {
            let _ = sections.push(Section { id, top, height });
        }
        let mut skill_bars = Vec::new();
        for width in [90.0, 80.0, 75.0, 70.0] {
            let _ = skill_bars.push(width);
        }
        Self {
            cursor_dot: true,
            cursor_ring: true,
            scroll_progress: true,
            navbar: true,
            sections,
            hamburger: true,
            nav_links: true,
            typed_text: true,
            reveal_targets: 12,
            skill_bars,
            contact_form: true,
            submit_button: true,
            success_banner: true,
            scroll_top_button: true,
        }
    }
}

/// Settings for every feature on the page.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageSettings {
    pub particles: ParticleSettings,
    pub form: FormSettings,
    pub typing: TypingSettings,
}

/// Run `init` only when every required element is present.
fn optional<T>(feature: &str, present: bool, init: impl FnOnce() -> Option<T>) -> Option<T> {
    if !present {
        log::debug!("{} disabled: required elements missing", feature);
        return None;
    }
    let started = init();
    if started.is_none() {
        log::debug!("{} disabled: nothing to drive", feature);
    }
    started
}

/// Scroll-linked state, recomputed on every scroll event.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollChrome {
    pub progress: Option<f32>,
    pub navbar: Option<NavbarState>,
    pub scroll_top_visible: Option<bool>,
}

/// The running page. Features whose elements were missing are `None`.
pub struct Page<S, D> {
    canvas: Option<S>,
    frames: FrameQueue,
    pub particles: Option<ParticleField>,
    pub contact: Option<ContactForm<D>>,
    pub cursor: Option<CursorTrail>,
    pub menu: Option<MobileMenu>,
    pub typing: Option<TypingEffect>,
    pub reveal: Option<ScrollReveal>,
    pub skill_bars: Vec<SkillBar, MAX_SKILL_BARS>,
    pub chrome: ScrollChrome,
    sections: Vec<Section, MAX_SECTIONS>,
}

impl<S: Surface, D: Delivery> Page<S, D> {
    /// Start every feature independently.
    pub fn start(elements: Elements, canvas: Option<S>, delivery: D, settings: PageSettings) -> Self {
        let mut canvas = canvas;
        let mut frames = FrameQueue::new();

        let particles = {
            let mut field = ParticleField::new(settings.particles);
            field.initialize(canvas.as_mut(), &mut frames).then_some(field)
        };

        let contact = optional(
            "contact form",
            elements.contact_form && elements.submit_button && elements.success_banner,
            || Some(ContactForm::new(delivery, settings.form)),
        );

        let cursor = optional("custom cursor", elements.cursor_dot && elements.cursor_ring, || {
            Some(CursorTrail::default())
        });

        let menu = optional("mobile menu", elements.hamburger && elements.nav_links, || {
            Some(MobileMenu::default())
        });

        let typing = optional("typing effect", elements.typed_text, || {
            TypingEffect::new(&ROLES, settings.typing)
        });

        let reveal = optional("scroll reveal", elements.reveal_targets > 0, || {
            ScrollReveal::new(elements.reveal_targets)
        });

        let skill_bars = elements.skill_bars.iter().map(|w| SkillBar::new(*w)).collect();

        let chrome = ScrollChrome {
            progress: elements.scroll_progress.then_some(0.0),
            navbar: elements.navbar.then(|| navbar_state(0.0, &elements.sections, NavbarState::default())),
            scroll_top_visible: elements.scroll_top_button.then_some(false),
        };

        log::info!(
            "page started: particles={} contact={} cursor={} typing={}",
            particles.is_some(),
            contact.is_some(),
            cursor.is_some(),
            typing.is_some()
        );

        Self {
            canvas,
            frames,
            particles,
            contact,
            cursor,
            menu,
            typing,
            reveal,
            skill_bars,
            chrome,
            sections: elements.sections,
        }
    }

    /// Display refresh: fire every due animation frame.
    pub fn on_animation_frame(&mut self) {
        let due = self.frames.due();
        if let (Some(field), Some(canvas)) = (self.particles.as_mut(), self.canvas.as_mut()) {
            for frame in due {
                field.on_frame(frame, canvas, &mut self.frames);
            }
        }
        if let Some(cursor) = self.cursor.as_mut() {
            cursor.tick();
        }
    }

    /// Viewport resize signal.
    pub fn on_resize(&mut self) {
        if let Some(field) = self.particles.as_mut() {
            field.on_resize(self.canvas.as_mut(), &mut self.frames);
        }
    }

    pub fn on_scroll(&mut self, scroll_y: f32, document_height: f32, viewport_height: f32) {
        let chrome = &mut self.chrome;
        if chrome.progress.is_some() {
            chrome.progress = Some(scroll_progress(scroll_y, document_height, viewport_height));
        }
        if let Some(navbar) = chrome.navbar {
            chrome.navbar = Some(navbar_state(scroll_y, &self.sections, navbar));
        }
        if chrome.scroll_top_visible.is_some() {
            chrome.scroll_top_visible = Some(scroll_top_visible(scroll_y));
        }
    }

    /// Wall-clock timers: typing cadence, banner hide, skill bar delay.
    pub fn update(&mut self, dt: f32) {
        if let Some(typing) = self.typing.as_mut() {
            typing.update(dt);
        }
        if let Some(contact) = self.contact.as_mut() {
            contact.update(dt);
        }
        for bar in self.skill_bars.iter_mut() {
            bar.update(dt);
        }
    }

    pub fn canvas(&self) -> Option<&S> {
        self.canvas.as_ref()
    }

    /// Host hook for layout changes on the canvas before calling [`Page::on_resize`].
    pub fn canvas_mut(&mut self) -> Option<&mut S> {
        self.canvas.as_mut()
    }

    pub fn frames(&self) -> &FrameQueue {
        &self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::{Field, SubmissionRequest, SubmitOutcome};
    use crate::error::DeliveryError;
    use crate::surface::Rgb;

    struct Canvas {
        size: (u32, u32),
        clears: usize,
    }

    impl Surface for Canvas {
        fn rendered_size(&self) -> (u32, u32) {
            self.size
        }
        fn set_buffer_size(&mut self, _width: u32, _height: u32) {}
        fn clear(&mut self) {
            self.clears += 1;
        }
        fn fill_circle(&mut self, _: (f32, f32), _: f32, _: Rgb, _: f32) {}
        fn stroke_line(&mut self, _: (f32, f32), _: (f32, f32), _: Rgb, _: f32, _: f32) {}
    }

    struct Accept;

    impl Delivery for Accept {
        async fn send(&self, _: &str, _: &str, _: &SubmissionRequest) -> Result<(), DeliveryError> {
            Ok(())
        }
    }

    fn canvas() -> Option<Canvas> {
        Some(Canvas { size: (640, 360), clears: 0 })
    }

    #[test]
    fn test_full_page_starts_everything() {
        let page = Page::start(Elements::full(), canvas(), Accept, PageSettings::default());
        assert_eq!(page.particles.as_ref().unwrap().particles().len(), 25);
        assert!(page.contact.is_some());
        assert!(page.cursor.is_some());
        assert!(page.menu.is_some());
        assert!(page.typing.is_some());
        assert!(page.reveal.is_some());
        assert_eq!(page.skill_bars.len(), 4);
        assert_eq!(page.chrome.navbar.unwrap().active, Some("home"));
        assert_eq!(page.frames().pending().len(), 1);
    }

    #[test]
    fn test_missing_canvas_leaves_other_features_running() {
        let page: Page<Canvas, Accept> =
            Page::start(Elements::full(), None, Accept, PageSettings::default());
        assert!(page.particles.is_none());
        assert!(page.frames().pending().is_empty());
        assert!(page.contact.is_some());
        assert!(page.typing.is_some());
    }

    #[test]
    fn test_contact_needs_all_its_elements() {
        let elements = Elements {
            success_banner: false,
            ..Elements::full()
        };
        let page = Page::start(elements, canvas(), Accept, PageSettings::default());
        assert!(page.contact.is_none());
        assert!(page.particles.is_some());
        assert!(page.cursor.is_some());
    }

    #[test]
    fn test_empty_page_starts_nothing() {
        let mut page: Page<Canvas, Accept> =
            Page::start(Elements::default(), None, Accept, PageSettings::default());
        assert!(page.contact.is_none() && page.cursor.is_none() && page.menu.is_none());
        assert!(page.typing.is_none() && page.reveal.is_none());

        // Events on a bare page are harmless
        page.on_scroll(500.0, 2000.0, 800.0);
        page.on_resize();
        page.on_animation_frame();
        page.update(1.0);
        assert_eq!(page.chrome, ScrollChrome::default());
    }

    #[test]
    fn test_frames_resize_and_scroll() {
        let mut page = Page::start(Elements::full(), canvas(), Accept, PageSettings::default());
        page.on_animation_frame();
        page.on_animation_frame();
        assert_eq!(page.canvas().unwrap().clears, 2);
        assert_eq!(page.particles.as_ref().unwrap().frames_drawn(), 2);

        page.canvas_mut().unwrap().size = (1280, 720);
        page.on_resize();
        assert_eq!(page.particles.as_ref().unwrap().particles().len(), 100);
        assert_eq!(page.frames().pending().len(), 1);

        page.on_scroll(1000.0, 4200.0, 900.0);
        let chrome = page.chrome;
        assert_eq!(chrome.navbar.unwrap().active, Some("about"));
        assert!(chrome.navbar.unwrap().scrolled);
        assert_eq!(chrome.scroll_top_visible, Some(true));
        assert!((chrome.progress.unwrap() - 30.30303).abs() < 1e-3);
    }

    #[test]
    fn test_update_drives_form_and_typing() {
        let mut page = Page::start(Elements::full(), canvas(), Accept, PageSettings::default());
        let form = page.contact.as_mut().unwrap();
        form.edit(Field::Name, "Al");
        form.edit(Field::Email, "al@example.com");
        form.edit(Field::Message, "Let's build something.");
        assert_eq!(pollster::block_on(form.submit()), SubmitOutcome::Delivered);

        page.update(1.3);
        assert_eq!(page.typing.as_ref().unwrap().text(), "C");
        assert!(page.contact.as_ref().unwrap().success_visible());
        page.update(4.0);
        assert!(!page.contact.as_ref().unwrap().success_visible());
    }
}
