//! Error types for the page behavior layer.
//!
//! Only two things can go wrong: a form field fails validation, or the email
//! relay rejects a message. Neither is allowed to take the page down.

use alloc::string::String;
use core::fmt;

use crate::contact::Field;

/// A single field failing validation.
///
/// This never propagates out of the form controller; it is stored against the
/// field and shown inline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// The trimmed value is empty.
    Missing(Field),
    /// The name is shorter than two characters.
    NameTooShort,
    /// The email does not look like `local@domain.tld`.
    InvalidEmail,
    /// The message is shorter than ten characters.
    MessageTooShort,
}

impl ValidationError {
    /// Inline text shown under the offending input.
    pub fn message(&self) -> &'static str {
        match self {
            ValidationError::Missing(Field::Name) => "Please enter your name.",
            ValidationError::Missing(Field::Email) => "Please enter your email address.",
            ValidationError::Missing(Field::Message) => "Please enter your message.",
            ValidationError::NameTooShort => "Name must be at least 2 characters.",
            ValidationError::InvalidEmail => "Please enter a valid email address.",
            ValidationError::MessageTooShort => "Message must be at least 10 characters.",
        }
    }

    /// The field this error belongs to.
    pub fn field(&self) -> Field {
        match self {
            ValidationError::Missing(field) => *field,
            ValidationError::NameTooShort => Field::Name,
            ValidationError::InvalidEmail => Field::Email,
            ValidationError::MessageTooShort => Field::Message,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl core::error::Error for ValidationError {}

/// Errors reported by a [`Delivery`](crate::contact::Delivery) implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// The relay answered but refused the message (bad template, quota, ...).
    Rejected(String),
    /// The relay could not be reached at all.
    Unreachable(String),
}

impl DeliveryError {
    pub fn reason(&self) -> &str {
        match self {
            DeliveryError::Rejected(reason) | DeliveryError::Unreachable(reason) => reason,
        }
    }
}

impl fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryError::Rejected(reason) => write!(f, "Relay rejected the message: {}", reason),
            DeliveryError::Unreachable(reason) => write!(f, "Relay unreachable: {}", reason),
        }
    }
}

impl core::error::Error for DeliveryError {}
