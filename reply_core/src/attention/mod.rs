//! Attention - decides how likely the agent is to speak on each stimulus.
//!
//! The running probability starts at the mode's default, jumps to the
//! maximum when the conversation turns to the agent (it is addressed, or
//! someone picks up words it just said) and decays toward the minimum
//! otherwise. Being addressed returns the mode's `called` value directly.

mod mode;

pub use mode::*;

use std::fmt;

/// Fraction of the `max - min` span the probability loses per unrelated utterance.
const DECAY_STEP: f64 = 0.1;

/// Engagement state for the current talkativeness mode.
#[derive(Debug, Clone)]
pub struct AttentionModel {
    params: AttentionParams,
    probability: f64,

    /// Words of the agent's last utterance, until someone speaks.
    echo_words: Vec<String>,

    /// Nickname of whoever last addressed the agent.
    partner: Option<String>,

    /// Whether the agent's own utterance was the last thing said.
    spoke_last: bool,
}

impl AttentionModel {
    /// Create a model for the given mode.
    pub fn new(mode: TalkMode) -> Self {
        let params = mode.params();
        Self {
            params,
            probability: params.default,
            echo_words: Vec::new(),
            partner: None,
            spoke_last: false,
        }
    }

    /// Replace the parameter bounds and reset to their default probability.
    pub fn set_params(&mut self, params: AttentionParams) {
        self.params = params;
        self.probability = params.default;
    }

    /// Current parameter bounds.
    pub fn params(&self) -> &AttentionParams {
        &self.params
    }

    /// Current running probability.
    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Someone else spoke. Returns the probability of replying.
    pub fn on_other_speak(&mut self, nick: &str, text: &str, called: bool) -> f64 {
        self.spoke_last = false;
        let echoed = self.echo_words.iter().any(|w| text.contains(w.as_str()));
        self.echo_words.clear();

        if called {
            self.partner = Some(nick.to_string());
            self.probability = self.params.max;
            return self.params.called;
        }

        let floor = if self.partner.as_deref() == Some(nick) {
            self.params.default
        } else {
            self.params.min
        };

        self.probability = if echoed {
            self.params.max
        } else {
            let step = (self.params.max - self.params.min) * DECAY_STEP;
            (self.probability - step).max(floor)
        };
        self.probability = self.probability.clamp(self.params.min, self.params.max);
        self.probability
    }

    /// Nobody has spoken for a while. Returns the probability of speaking up.
    pub fn on_silent(&mut self) -> f64 {
        if self.spoke_last {
            self.params.ignored
        } else {
            self.params.self_initiated
        }
    }

    /// The agent spoke, using the given known words.
    pub fn on_self_speak(&mut self, words: Vec<String>) {
        self.echo_words = words;
        self.spoke_last = true;
    }
}

impl fmt::Display for AttentionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "p={:.3} [{:.3}..{:.3}] partner={}",
            self.probability,
            self.params.min,
            self.params.max,
            self.partner.as_deref().unwrap_or("-")
        )
    }
}
