//! effects - Small page embellishments
//! Cursor, scroll-driven chrome, menu, reveal, ripple, tilt

use heapless::Vec;

/// Axis-aligned box in viewport pixels (`getBoundingClientRect`).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

// ---------------------------------------------------------------------------
// Cursor

/// Dot follows the pointer exactly, ring eases towards it every frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CursorTrail {
    pub pointer: (f32, f32),
    pub ring: (f32, f32),
    pub hovering: bool,
    pub easing: f32,
}

impl Default for CursorTrail {
    fn default() -> Self {
        Self {
            pointer: (0.0, 0.0),
            ring: (0.0, 0.0),
            hovering: false,
            easing: 0.14,
        }
    }
}

impl CursorTrail {
    pub fn on_mouse_move(&mut self, x: f32, y: f32) {
        self.pointer = (x, y);
    }

    /// Per-frame lerp of the ring.
    pub fn tick(&mut self) {
        self.ring.0 += (self.pointer.0 - self.ring.0) * self.easing;
        self.ring.1 += (self.pointer.1 - self.ring.1) * self.easing;
    }

    pub fn set_hovering(&mut self, hovering: bool) {
        self.hovering = hovering;
    }

    /// The dot dims over links and buttons.
    pub fn dot_opacity(&self) -> f32 {
        if self.hovering {
            0.5
        } else {
            1.0
        }
    }

    pub fn dot(&self) -> (f32, f32) {
        self.pointer
    }
}

// ---------------------------------------------------------------------------
// Scroll-driven chrome

/// Percentage of the document scrolled, 0 to 100.
pub fn scroll_progress(scroll_y: f32, document_height: f32, viewport_height: f32) -> f32 {
    let scrollable = document_height - viewport_height;
    if scrollable <= 0.0 {
        return 0.0;
    }
    (scroll_y / scrollable * 100.0).clamp(0.0, 100.0)
}

pub const NAVBAR_SCROLLED_AFTER: f32 = 60.0;
pub const ACTIVE_SECTION_OFFSET: f32 = 120.0;
pub const SCROLL_TOP_VISIBLE_AFTER: f32 = 400.0;
pub const DEFAULT_NAVBAR_HEIGHT: f32 = 80.0;

/// A page section the navbar links to.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Section {
    pub id: &'static str,
    pub top: f32,
    pub height: f32,
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct NavbarState {
    pub scrolled: bool,
    pub active: Option<&'static str>,
}

/// Navbar style and the highlighted link for a scroll position.
///
/// When no section contains the probe line the previous highlight is kept.
pub fn navbar_state(scroll_y: f32, sections: &[Section], previous: NavbarState) -> NavbarState {
    let probe = scroll_y + ACTIVE_SECTION_OFFSET;
    let active = sections
        .iter()
        .filter(|s| probe >= s.top && probe < s.top + s.height)
        .map(|s| s.id)
        .last()
        .or(previous.active);
    NavbarState {
        scrolled: scroll_y > NAVBAR_SCROLLED_AFTER,
        active,
    }
}

pub fn scroll_top_visible(scroll_y: f32) -> bool {
    scroll_y > SCROLL_TOP_VISIBLE_AFTER
}

/// Where an in-page anchor should scroll to so the fixed navbar does not cover it.
pub fn anchor_scroll_target(target_top: f32, scroll_y: f32, navbar_height: Option<f32>) -> f32 {
    let offset = navbar_height.filter(|h| *h > 0.0).unwrap_or(DEFAULT_NAVBAR_HEIGHT);
    target_top + scroll_y - offset
}

// ---------------------------------------------------------------------------
// Mobile menu

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MobileMenu {
    pub open: bool,
}

impl MobileMenu {
    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    /// A nav link was followed, or the click landed outside the menu.
    pub fn close(&mut self) {
        self.open = false;
    }

    /// Page scrolling is locked while the menu covers it.
    pub fn body_scroll_locked(&self) -> bool {
        self.open
    }
}

// ---------------------------------------------------------------------------
// Reveal on scroll

pub const MAX_REVEAL_TARGETS: usize = 64;

/// Elements that fade in the first time they intersect the viewport, then stay.
#[derive(Debug, Default)]
pub struct ScrollReveal {
    revealed: Vec<bool, MAX_REVEAL_TARGETS>,
}

impl ScrollReveal {
    /// `None` when the page has no reveal targets.
    pub fn new(targets: usize) -> Option<Self> {
        if targets == 0 {
            return None;
        }
        if targets > MAX_REVEAL_TARGETS {
            log::warn!(
                "{} reveal targets, only the first {} will animate",
                targets,
                MAX_REVEAL_TARGETS
            );
        }
        let mut revealed = Vec::new();
        for _ in 0..targets.min(MAX_REVEAL_TARGETS) {
            let _ = revealed.push(false);
        }
        Some(Self { revealed })
    }

    /// Intersection report; returns true the one time a target becomes visible.
    pub fn on_intersect(&mut self, target: usize, ratio: f32, threshold: f32) -> bool {
        match self.revealed.get_mut(target) {
            Some(seen) if !*seen && ratio >= threshold => {
                *seen = true;
                true
            }
            _ => false,
        }
    }

    pub fn is_revealed(&self, target: usize) -> bool {
        self.revealed.get(target).copied().unwrap_or(false)
    }
}

pub const REVEAL_THRESHOLD: f32 = 0.15;
pub const SKILL_BAR_THRESHOLD: f32 = 0.5;
pub const SKILL_BAR_DELAY: f32 = 0.2;

/// A progress bar that grows to its `data-width` shortly after first coming into view.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SkillBar {
    pub target_percent: f32,
    pub width_percent: f32,
    // Seconds until the fill starts, once armed
    countdown: Option<f32>,
    seen: bool,
}

impl SkillBar {
    pub fn new(target_percent: f32) -> Self {
        Self {
            target_percent: target_percent.clamp(0.0, 100.0),
            width_percent: 0.0,
            countdown: None,
            seen: false,
        }
    }

    pub fn on_intersect(&mut self, ratio: f32) {
        if !self.seen && ratio >= SKILL_BAR_THRESHOLD {
            self.seen = true;
            self.countdown = Some(SKILL_BAR_DELAY);
        }
    }

    pub fn update(&mut self, dt: f32) {
        if let Some(remaining) = self.countdown.as_mut() {
            *remaining -= dt;
            if *remaining <= 0.0 {
                self.countdown = None;
                self.width_percent = self.target_percent;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Pointer effects

/// Square ripple span centred on the click, twice the button's larger side.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ripple {
    pub size: f32,
    pub left: f32,
    pub top: f32,
}

pub fn ripple(button: Rect, click: (f32, f32)) -> Ripple {
    let size = button.width.max(button.height) * 2.0;
    let x = click.0 - button.left;
    let y = click.1 - button.top;
    Ripple {
        size,
        left: x - size / 2.0,
        top: y - size / 2.0,
    }
}

pub const TILT_MAX_DEGREES: f32 = 5.0;

/// Card rotation for a pointer position over it, in degrees.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Tilt {
    pub rotate_x: f32,
    pub rotate_y: f32,
}

/// Touch devices get no tilt at all.
pub fn tilt(card: Rect, pointer: (f32, f32), touch_device: bool) -> Option<Tilt> {
    if touch_device || card.width <= 0.0 || card.height <= 0.0 {
        return None;
    }
    let x = (pointer.0 - card.left) / card.width - 0.5;
    let y = (pointer.1 - card.top) / card.height - 0.5;
    Some(Tilt {
        rotate_x: -y * TILT_MAX_DEGREES,
        rotate_y: x * TILT_MAX_DEGREES,
    })
}
