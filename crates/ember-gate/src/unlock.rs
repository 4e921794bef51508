#![forbid(unsafe_code)]

//! Unlock phrase input: the shell that opens the gate.
//!
//! The input fires its callback the first time its value matches the target
//! phrase, ignoring case and surrounding whitespace. Later matches are
//! ignored for the lifetime of the input.

use std::fmt;

use tracing::info;

/// A text input guarding the gate.
pub struct UnlockInput {
    value: String,
    target: String,
    unlocked: bool,
    on_unlock: Option<Box<dyn FnMut()>>,
}

impl fmt::Debug for UnlockInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnlockInput")
            .field("value", &self.value)
            .field("target", &self.target)
            .field("unlocked", &self.unlocked)
            .finish_non_exhaustive()
    }
}

impl UnlockInput {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            value: String::new(),
            target: target.into(),
            unlocked: false,
            on_unlock: None,
        }
    }

    /// Set the unlock callback (builder pattern).
    #[must_use]
    pub fn on_unlock(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_unlock = Some(Box::new(callback));
        self
    }

    /// Current input value.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// Replace the input value. Returns `true` if this call unlocked.
    pub fn set_value(&mut self, value: impl Into<String>) -> bool {
        self.value = value.into();
        self.check()
    }

    /// Append a typed character.
    pub fn push(&mut self, c: char) -> bool {
        self.value.push(c);
        self.check()
    }

    /// Delete the last character.
    pub fn backspace(&mut self) {
        self.value.pop();
    }

    /// Whether `candidate` matches the target phrase.
    pub fn matches(&self, candidate: &str) -> bool {
        phrase_matches(candidate, &self.target)
    }

    fn check(&mut self) -> bool {
        if self.unlocked || !self.matches(&self.value) {
            return false;
        }
        self.unlocked = true;
        info!(target_phrase = %self.target, "gate unlocked");
        if let Some(callback) = self.on_unlock.as_mut() {
            callback();
        }
        true
    }
}

/// Case-insensitive comparison of trimmed phrases.
pub fn phrase_matches(candidate: &str, target: &str) -> bool {
    candidate.trim().to_lowercase() == target.trim().to_lowercase()
}
