use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Default phrase the user must type for a text-confirmed wipe
pub const DEFAULT_CONFIRMATION_PHRASE: &str = "DESTROY ALL DATA";

/// Default minimum hold for a key-combo trigger
pub const DEFAULT_MIN_HOLD: Duration = Duration::from_secs(3);

/// How a wipe was initiated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerMethod {
    /// Three rapid clicks on the wipe affordance
    TripleClick,
    /// Dedicated panic button
    PanicButton,
    /// Check-in timer expired
    DeadManSwitch,
    /// Backend pushed a wipe command
    RemoteTrigger,
    /// User typed the confirmation phrase
    TextConfirmation,
    /// User held a key combination
    KeyCombo,
}

impl TriggerMethod {
    /// All trigger methods
    pub const ALL: [Self; 6] = [
        Self::TripleClick,
        Self::PanicButton,
        Self::DeadManSwitch,
        Self::RemoteTrigger,
        Self::TextConfirmation,
        Self::KeyCombo,
    ];
}

impl std::fmt::Display for TriggerMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TripleClick => write!(f, "triple_click"),
            Self::PanicButton => write!(f, "panic_button"),
            Self::DeadManSwitch => write!(f, "dead_man_switch"),
            Self::RemoteTrigger => write!(f, "remote_trigger"),
            Self::TextConfirmation => write!(f, "text_confirmation"),
            Self::KeyCombo => write!(f, "key_combo"),
        }
    }
}

impl std::str::FromStr for TriggerMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "triple_click" => Ok(Self::TripleClick),
            "panic_button" | "panic" => Ok(Self::PanicButton),
            "dead_man_switch" | "deadman" => Ok(Self::DeadManSwitch),
            "remote_trigger" | "remote" => Ok(Self::RemoteTrigger),
            "text_confirmation" | "text" => Ok(Self::TextConfirmation),
            "key_combo" | "keys" => Ok(Self::KeyCombo),
            _ => Err(format!("unknown trigger method: {s}")),
        }
    }
}

/// Method-specific confirmation data supplied by the trigger layer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerContext {
    /// Phrase typed by the user (text confirmation)
    pub phrase: Option<String>,
    /// How long the key combination was held (key combo)
    pub held_for: Option<Duration>,
}

impl TriggerContext {
    /// Context with no confirmation payload
    #[must_use]
    pub const fn none() -> Self {
        Self {
            phrase: None,
            held_for: None,
        }
    }

    /// Context carrying a typed phrase
    #[must_use]
    pub fn with_phrase(phrase: impl Into<String>) -> Self {
        Self {
            phrase: Some(phrase.into()),
            held_for: None,
        }
    }

    /// Context carrying a key hold duration
    #[must_use]
    pub const fn with_hold(held_for: Duration) -> Self {
        Self {
            phrase: None,
            held_for: Some(held_for),
        }
    }
}

/// Why the trigger layer refused to hand a trigger to the orchestrator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TriggerRejection {
    /// Text confirmation without a phrase
    #[error("confirmation phrase is required")]
    MissingPhrase,

    /// Typed phrase does not match exactly
    #[error("confirmation phrase does not match")]
    PhraseMismatch,

    /// Key combo without a hold duration
    #[error("key hold duration is required")]
    MissingHold,

    /// Key combo released too early
    #[error("key combination held for {held:?}, {required:?} required")]
    HoldTooShort {
        /// Observed hold
        held: Duration,
        /// Configured minimum
        required: Duration,
    },
}

/// Confirmation rules applied by the trigger layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerPolicy {
    /// Exact phrase required for [`TriggerMethod::TextConfirmation`]
    pub confirmation_phrase: String,
    /// Minimum hold for [`TriggerMethod::KeyCombo`]
    pub min_hold: Duration,
    /// Methods that also request server-side destruction
    pub remote_wipe_on: Vec<TriggerMethod>,
}

impl Default for TriggerPolicy {
    fn default() -> Self {
        Self {
            confirmation_phrase: DEFAULT_CONFIRMATION_PHRASE.to_string(),
            min_hold: DEFAULT_MIN_HOLD,
            // A remote trigger already came from the backend.
            remote_wipe_on: TriggerMethod::ALL
                .into_iter()
                .filter(|m| *m != TriggerMethod::RemoteTrigger)
                .collect(),
        }
    }
}

impl TriggerPolicy {
    /// Check the confirmation predicate for `method`.
    ///
    /// This is the only way to obtain a [`ValidatedTrigger`], which is what
    /// the orchestrator requires to start.
    pub fn validate(
        &self,
        method: TriggerMethod,
        context: TriggerContext,
    ) -> Result<ValidatedTrigger, TriggerRejection> {
        match method {
            TriggerMethod::TextConfirmation => {
                let phrase = context
                    .phrase
                    .as_deref()
                    .ok_or(TriggerRejection::MissingPhrase)?;
                if phrase != self.confirmation_phrase {
                    return Err(TriggerRejection::PhraseMismatch);
                }
            }
            TriggerMethod::KeyCombo => {
                let held = context.held_for.ok_or(TriggerRejection::MissingHold)?;
                if held < self.min_hold {
                    return Err(TriggerRejection::HoldTooShort {
                        held,
                        required: self.min_hold,
                    });
                }
            }
            _ => {}
        }

        Ok(ValidatedTrigger {
            method,
            context,
            remote_wipe: self.remote_wipe_on.contains(&method),
        })
    }
}

/// A trigger whose confirmation predicate has already been checked.
///
/// Constructed only by [`TriggerPolicy::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTrigger {
    method: TriggerMethod,
    context: TriggerContext,
    remote_wipe: bool,
}

impl ValidatedTrigger {
    /// How the wipe was initiated
    #[must_use]
    pub const fn method(&self) -> TriggerMethod {
        self.method
    }

    /// The confirmation payload that passed validation
    #[must_use]
    pub const fn context(&self) -> &TriggerContext {
        &self.context
    }

    /// Whether this trigger's policy asks for a remote wipe
    #[must_use]
    pub const fn remote_wipe(&self) -> bool {
        self.remote_wipe
    }

    /// Drop the remote wipe request (local-only run)
    #[must_use]
    pub fn local_only(mut self) -> Self {
        self.remote_wipe = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_phrase_is_rejected() {
        let policy = TriggerPolicy::default();
        let err = policy
            .validate(
                TriggerMethod::TextConfirmation,
                TriggerContext::with_phrase("destroy all data"),
            )
            .unwrap_err();
        assert_eq!(err, TriggerRejection::PhraseMismatch);
    }

    #[test]
    fn missing_phrase_is_rejected() {
        let policy = TriggerPolicy::default();
        let err = policy
            .validate(TriggerMethod::TextConfirmation, TriggerContext::none())
            .unwrap_err();
        assert_eq!(err, TriggerRejection::MissingPhrase);
    }

    #[test]
    fn exact_phrase_is_accepted() {
        let policy = TriggerPolicy::default();
        let trigger = policy
            .validate(
                TriggerMethod::TextConfirmation,
                TriggerContext::with_phrase(DEFAULT_CONFIRMATION_PHRASE),
            )
            .unwrap();
        assert_eq!(trigger.method(), TriggerMethod::TextConfirmation);
        assert!(trigger.remote_wipe());
    }

    #[test]
    fn short_hold_is_rejected() {
        let policy = TriggerPolicy::default();
        let err = policy
            .validate(
                TriggerMethod::KeyCombo,
                TriggerContext::with_hold(Duration::from_millis(2999)),
            )
            .unwrap_err();
        assert!(matches!(err, TriggerRejection::HoldTooShort { .. }));

        assert!(policy
            .validate(
                TriggerMethod::KeyCombo,
                TriggerContext::with_hold(Duration::from_secs(3)),
            )
            .is_ok());
    }

    #[test]
    fn unconfirmed_methods_pass_without_payload() {
        let policy = TriggerPolicy::default();
        for method in [
            TriggerMethod::TripleClick,
            TriggerMethod::PanicButton,
            TriggerMethod::DeadManSwitch,
            TriggerMethod::RemoteTrigger,
        ] {
            assert!(policy.validate(method, TriggerContext::none()).is_ok());
        }
    }

    #[test]
    fn remote_trigger_does_not_request_remote_wipe() {
        let policy = TriggerPolicy::default();
        let trigger = policy
            .validate(TriggerMethod::RemoteTrigger, TriggerContext::none())
            .unwrap();
        assert!(!trigger.remote_wipe());

        let panic = policy
            .validate(TriggerMethod::PanicButton, TriggerContext::none())
            .unwrap();
        assert!(panic.remote_wipe());
        assert!(!panic.local_only().remote_wipe());
    }

    #[test]
    fn method_parsing() {
        assert_eq!("panic-button".parse::<TriggerMethod>(), Ok(TriggerMethod::PanicButton));
        assert_eq!("KEY_COMBO".parse::<TriggerMethod>(), Ok(TriggerMethod::KeyCombo));
        assert!("shake".parse::<TriggerMethod>().is_err());
        for m in TriggerMethod::ALL {
            assert_eq!(m.to_string().parse::<TriggerMethod>(), Ok(m));
        }
    }
}
