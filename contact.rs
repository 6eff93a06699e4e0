//! contact - Contact form validation and submission
//! Three fields, single-flight submit, outcome shown inline

use alloc::string::{String, ToString};
use heapless::Vec;

use crate::error::{DeliveryError, ValidationError};

/// Inputs on the contact form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Email,
    Message,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Name, Field::Email, Field::Message];

    /// Element id of the input.
    pub fn id(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Message => "message",
        }
    }

    fn index(&self) -> usize {
        match self {
            Field::Name => 0,
            Field::Email => 1,
            Field::Message => 2,
        }
    }
}

pub const NAME_MIN_CHARS: usize = 2;
pub const MESSAGE_MIN_CHARS: usize = 10;

/// Whitespace as browsers see it for `\s` and `String.prototype.trim`.
// COMPAT: includes U+FEFF, excludes U+0085, unlike `char::is_whitespace`
pub fn is_js_space(c: char) -> bool {
    matches!(
        c,
        '\u{0009}'..='\u{000D}'
            | '\u{0020}'
            | '\u{00A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}

/// Strip leading and trailing [`is_js_space`] characters.
pub fn trim_input(value: &str) -> &str {
    value.trim_matches(is_js_space)
}

// CHANGE: Length rules count characters, not UTF-16 units
// REASON: An emoji or accented name counts once
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        Err(ValidationError::Missing(Field::Name))
    } else if name.chars().count() < NAME_MIN_CHARS {
        Err(ValidationError::NameTooShort)
    } else {
        Ok(())
    }
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        Err(ValidationError::Missing(Field::Email))
    } else if !is_valid_email(email) {
        Err(ValidationError::InvalidEmail)
    } else {
        Ok(())
    }
}

pub fn validate_message(message: &str) -> Result<(), ValidationError> {
    if message.is_empty() {
        Err(ValidationError::Missing(Field::Message))
    } else if message.chars().count() < MESSAGE_MIN_CHARS {
        Err(ValidationError::MessageTooShort)
    } else {
        Ok(())
    }
}

/// `local@domain.tld`: no whitespace, exactly one `@`, something on both sides
/// of it, and a dot in the domain with something on both sides of the dot.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(is_js_space) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// One input and its inline error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldState {
    pub value: String,
    pub error: Option<ValidationError>,
}

/// What gets handed to the relay. Only built when every field validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// The external "send message" capability (an email relay, a queue, a mock).
///
/// Resolves once, with no timeout imposed by the caller.
#[allow(async_fn_in_trait)]
pub trait Delivery {
    async fn send(
        &self,
        service_id: &str,
        template_id: &str,
        request: &SubmissionRequest,
    ) -> Result<(), DeliveryError>;
}

/// How the success banner's hide timer behaves when a second success lands
/// before the first timer ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HideTimerPolicy {
    /// One timer; re-arming replaces the pending one.
    Restart,
    /// Every success arms its own timer and the first to expire hides the banner.
    Overlapping,
}

#[derive(Debug, Clone, Copy)]
pub struct FormSettings {
    pub service_id: &'static str,
    pub template_id: &'static str,
    /// Seconds the success banner stays up.
    pub success_duration: f32,
    pub hide_timer_policy: HideTimerPolicy,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            service_id: "service_8181",
            template_id: "template_tn8evar",
            success_duration: 5.0,
            hide_timer_policy: HideTimerPolicy::Restart,
        }
    }
}

pub const SEND_LABEL: &str = "Send Message";
pub const SENDING_LABEL: &str = "Sending...";
pub const FAILURE_NOTICE: &str = "Message failed. Check console.";

/// Submit button: enabled flag plus its current label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitButton {
    pub enabled: bool,
    pub label: &'static str,
}

impl Default for SubmitButton {
    fn default() -> Self {
        Self {
            enabled: true,
            label: SEND_LABEL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    Idle,
    Sending,
}

/// Result of one press of the submit button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Button was disabled, nothing happened.
    Ignored,
    /// At least one field failed; errors are on the fields.
    Rejected,
    Delivered,
    Failed(DeliveryError),
}

const MAX_HIDE_TIMERS: usize = 8;

pub struct ContactForm<D> {
    fields: [FieldState; 3],
    button: SubmitButton,
    phase: FormPhase,
    success_visible: bool,
    // Remaining seconds per armed hide timer
    hide_timers: Vec<f32, MAX_HIDE_TIMERS>,
    notice: Option<&'static str>,
    delivery: D,
    settings: FormSettings,
}

impl<D: Delivery> ContactForm<D> {
    pub fn new(delivery: D, settings: FormSettings) -> Self {
        Self {
            fields: Default::default(),
            button: SubmitButton::default(),
            phase: FormPhase::Idle,
            success_visible: false,
            hide_timers: Vec::new(),
            notice: None,
            delivery,
            settings,
        }
    }

    /// Input event: store the new text and drop any stale error on that field.
    pub fn edit(&mut self, field: Field, value: &str) {
        let state = &mut self.fields[field.index()];
        state.value.clear();
        state.value.push_str(value);
        state.error = None;
    }

    /// Validate everything and, if it all passes, lock the button and build the request.
    ///
    /// Returns `Err(Ignored)` while the button is disabled and `Err(Rejected)`
    /// when any field failed. All three fields are always checked.
    pub fn begin_submit(&mut self) -> Result<SubmissionRequest, SubmitOutcome> {
        if !self.button.enabled {
            log::debug!("submit ignored, button disabled");
            return Err(SubmitOutcome::Ignored);
        }

        let name = trim_input(&self.fields[0].value).to_string();
        let email = trim_input(&self.fields[1].value).to_string();
        let message = trim_input(&self.fields[2].value).to_string();

        self.fields[0].error = validate_name(&name).err();
        self.fields[1].error = validate_email(&email).err();
        self.fields[2].error = validate_message(&message).err();

        if self.fields.iter().any(|f| f.error.is_some()) {
            log::debug!("submit rejected: {:?}", self.errors().collect::<Vec<_, 3>>());
            return Err(SubmitOutcome::Rejected);
        }

        self.button = SubmitButton {
            enabled: false,
            label: SENDING_LABEL,
        };
        self.phase = FormPhase::Sending;

        Ok(SubmissionRequest { name, email, message })
    }

    /// Apply the relay's answer to an in-flight submission.
    pub fn finish(&mut self, result: Result<(), DeliveryError>) -> SubmitOutcome {
        if self.phase != FormPhase::Sending {
            log::warn!("delivery result arrived with nothing in flight");
            return SubmitOutcome::Ignored;
        }
        self.phase = FormPhase::Idle;
        // COMPAT: label restored on both outcomes, not only on success
        self.button = SubmitButton::default();

        match result {
            Ok(()) => {
                log::info!("message delivered");
                for field in self.fields.iter_mut() {
                    *field = FieldState::default();
                }
                self.success_visible = true;
                self.arm_hide_timer();
                SubmitOutcome::Delivered
            }
            Err(err) => {
                log::error!("email relay error: {}", err);
                self.notice = Some(FAILURE_NOTICE);
                SubmitOutcome::Failed(err)
            }
        }
    }

    /// Full submit: validate, hand off to the relay, wait for it, show the outcome.
    pub async fn submit(&mut self) -> SubmitOutcome {
        let request = match self.begin_submit() {
            Ok(request) => request,
            Err(outcome) => return outcome,
        };
        let result = self
            .delivery
            .send(self.settings.service_id, self.settings.template_id, &request)
            .await;
        self.finish(result)
    }

    fn arm_hide_timer(&mut self) {
        let duration = self.settings.success_duration;
        match self.settings.hide_timer_policy {
            HideTimerPolicy::Restart => {
                self.hide_timers.clear();
                let _ = self.hide_timers.push(duration);
            }
            HideTimerPolicy::Overlapping => {
                // The earliest timer decides when the banner hides, so a full
                // set can drop the newest arm without changing the outcome
                if self.hide_timers.push(duration).is_err() {
                    log::warn!("hide timers full, not arming another");
                }
            }
        }
    }

    /// Advance hide timers by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        if self.hide_timers.is_empty() {
            return;
        }
        for remaining in self.hide_timers.iter_mut() {
            *remaining -= dt;
        }
        let armed = self.hide_timers.len();
        self.hide_timers.retain(|remaining| *remaining > 0.0);
        if self.hide_timers.len() < armed {
            self.success_visible = false;
        }
    }

    /// User acknowledged the failure alert.
    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn field(&self, field: Field) -> &FieldState {
        &self.fields[field.index()]
    }

    pub fn errors(&self) -> impl Iterator<Item = ValidationError> + '_ {
        self.fields.iter().filter_map(|f| f.error)
    }

    pub fn button(&self) -> SubmitButton {
        self.button
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn success_visible(&self) -> bool {
        self.success_visible
    }

    pub fn pending_hide_timers(&self) -> usize {
        self.hide_timers.len()
    }

    pub fn notice(&self) -> Option<&'static str> {
        self.notice
    }

    pub fn delivery(&self) -> &D {
        &self.delivery
    }

    pub fn settings(&self) -> &FormSettings {
        &self.settings
    }

    pub fn update_settings(&mut self, settings: FormSettings) {
        self.settings = settings;
    }
}
