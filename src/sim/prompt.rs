//! Stage one: the question with a "no" button that gives up over time

use crate::config::PromptConfig;

/// Accept/reject prompt state
#[derive(Debug, Clone)]
pub struct PromptStage {
    config: PromptConfig,
    rejections: u32,
    reject_disabled: bool,
    accepted: bool,
}

impl PromptStage {
    pub fn new(config: &PromptConfig) -> Self {
        Self {
            config: config.clone(),
            rejections: 0,
            reject_disabled: false,
            accepted: false,
        }
    }

    /// Register a press of the reject button. Returns false once the button is disabled.
    pub fn reject(&mut self) -> bool {
        if self.reject_disabled || self.accepted {
            return false;
        }
        self.rejections += 1;
        let limit = self.config.phrases.len() as u32 + self.config.extra_rejections;
        if self.rejections >= limit {
            self.reject_disabled = true;
            log::debug!("Reject button disabled after {} presses", self.rejections);
        }
        true
    }

    /// Register a press of the accept button. Only the first press counts.
    pub fn accept(&mut self) -> bool {
        if self.accepted {
            return false;
        }
        self.accepted = true;
        true
    }

    pub fn rejections(&self) -> u32 {
        self.rejections
    }

    pub fn is_reject_disabled(&self) -> bool {
        self.reject_disabled
    }

    /// Index of the phrase on the reject button (None before the first rejection)
    pub fn phrase_index(&self) -> Option<usize> {
        phrase_index(self.rejections, self.config.phrases.len())
    }

    pub fn phrase(&self) -> Option<&str> {
        self.phrase_index().map(|i| self.config.phrases[i].as_str())
    }

    pub fn reject_scale(&self) -> f32 {
        reject_scale(self.rejections, &self.config)
    }

    pub fn accept_scale(&self) -> f32 {
        accept_scale(self.rejections, &self.config)
    }
}

/// `min(n - 1, last)`, clamped to the final phrase once the list runs out
pub fn phrase_index(rejections: u32, phrase_count: usize) -> Option<usize> {
    if rejections == 0 || phrase_count == 0 {
        return None;
    }
    Some((rejections as usize - 1).min(phrase_count - 1))
}

/// Reject button scale: shrinks toward the floor
pub fn reject_scale(rejections: u32, config: &PromptConfig) -> f32 {
    if rejections < config.scale_from {
        return 1.0;
    }
    let steps = rejections.saturating_sub(1) as f32;
    (1.0 - steps * config.shrink_step).max(config.reject_floor)
}

/// Accept button scale: grows toward the ceiling
pub fn accept_scale(rejections: u32, config: &PromptConfig) -> f32 {
    if rejections < config.scale_from {
        return 1.0;
    }
    let steps = rejections.saturating_sub(1) as f32;
    1.0 + (steps * config.grow_step).min(config.accept_ceiling - 1.0)
}
