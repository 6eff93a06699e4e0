//! portfolio-fx - Behavior layer of a personal portfolio page
//! no_std (+ alloc) core: particle backdrop, contact form, page effects
//!
//! Every host capability is passed in explicitly: a [`Surface`] to draw on, a
//! [`FrameScheduler`] for animation frames, a [`Delivery`] to send messages.
//! [`Page::start`] wires them together.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod contact;
pub mod effects;
pub mod error;
pub mod page;
pub mod particles;
pub mod rng;
pub mod surface;
pub mod typing;

pub use contact::{ContactForm, Delivery, Field, FormSettings, HideTimerPolicy, SubmissionRequest, SubmitOutcome};
pub use error::{DeliveryError, ValidationError};
pub use page::{Elements, Page, PageSettings};
pub use particles::{ParticleField, ParticleSettings};
pub use surface::{FrameId, FrameQueue, FrameScheduler, Rgb, Surface};
pub use typing::{TypingEffect, TypingSettings};

#[cfg(feature = "embedded-graphics")]
pub use surface::EgSurface;
