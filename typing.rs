//! typing - Hero subtitle that types and deletes a rotating list of roles

use crate::rng::XorShift32;

pub const ROLES: [&str; 6] = [
    "CSE Student 🎓",
    "Web Developer 💻",
    "Java Learner ☕",
    "Frontend Builder 🎨",
    "App Developer 📱",
    "Problem Solver 🧠",
];

/// Delays in seconds.
#[derive(Copy, Clone, Debug)]
pub struct TypingSettings {
    pub start_delay: f32,
    pub type_delay: f32,
    pub type_jitter: f32,
    pub hold_delay: f32,
    pub delete_delay: f32,
    pub next_word_delay: f32,
    pub rng_seed: u32,
}

impl Default for TypingSettings {
    fn default() -> Self {
        Self {
            start_delay: 1.2,
            type_delay: 0.09,
            type_jitter: 0.04,
            hold_delay: 1.8,
            delete_delay: 0.05,
            next_word_delay: 0.3,
            rng_seed: 0x9E3779B9,
        }
    }
}

/// What to show now and how long until the next step.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TypingStep {
    pub text: &'static str,
    pub delay: f32,
}

/// First `n` characters of `s`.
fn prefix(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

pub struct TypingEffect {
    roles: &'static [&'static str],
    role: usize,
    chars: usize,
    deleting: bool,
    // Seconds until the next step
    next_in: f32,
    text: &'static str,
    rng: XorShift32,
    settings: TypingSettings,
}

impl TypingEffect {
    /// `None` when there is nothing to type.
    pub fn new(roles: &'static [&'static str], settings: TypingSettings) -> Option<Self> {
        if roles.is_empty() {
            return None;
        }
        Some(Self {
            roles,
            role: 0,
            chars: 0,
            deleting: false,
            next_in: settings.start_delay,
            text: "",
            rng: XorShift32::new(settings.rng_seed),
            settings,
        })
    }

    /// One keystroke forwards or backwards.
    pub fn step(&mut self) -> TypingStep {
        let s = self.settings;
        let current = self.roles[self.role];
        let len = current.chars().count();

        let delay = if !self.deleting {
            self.chars += 1;
            self.text = prefix(current, self.chars);
            if self.chars >= len {
                self.deleting = true;
                s.hold_delay
            } else {
                s.type_delay + self.rng.next_f32() * s.type_jitter
            }
        } else {
            self.chars = self.chars.saturating_sub(1);
            self.text = prefix(current, self.chars);
            if self.chars == 0 {
                self.deleting = false;
                self.role = (self.role + 1) % self.roles.len();
                s.next_word_delay
            } else {
                s.delete_delay
            }
        };

        TypingStep { text: self.text, delay }
    }

    /// Advance the clock by `dt` seconds; returns the new text when it changed.
    pub fn update(&mut self, dt: f32) -> Option<&'static str> {
        self.next_in -= dt;
        if self.next_in > 0.0 {
            return None;
        }
        let step = self.step();
        // Keep leftover time so a long frame does not stretch the cadence
        self.next_in += step.delay;
        Some(step.text)
    }

    pub fn text(&self) -> &'static str {
        self.text
    }

    pub fn role_index(&self) -> usize {
        self.role
    }
}
