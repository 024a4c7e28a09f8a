//! Talkativeness modes and their attention parameters.

use serde::{Deserialize, Serialize};

/// Bounds the attention model works within.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttentionParams {
    /// Lowest response probability for ordinary input.
    pub min: f64,

    /// Highest response probability for ordinary input.
    pub max: f64,

    /// Probability right after the mode is entered.
    pub default: f64,

    /// Probability when addressed by name.
    pub called: f64,

    /// Probability of speaking up during silence after others spoke.
    #[serde(rename = "self")]
    pub self_initiated: f64,

    /// Probability of speaking up during silence after the agent was ignored.
    pub ignored: f64,
}

/// How talkative the agent is. Values above 1.0 mean a reply is mandatory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TalkMode {
    Silent,
    Reticent,
    #[default]
    Normal,
    Talkative,
    AlwaysRespond,
}

impl TalkMode {
    /// All modes in index order.
    pub const ALL: [TalkMode; 5] = [
        TalkMode::Silent,
        TalkMode::Reticent,
        TalkMode::Normal,
        TalkMode::Talkative,
        TalkMode::AlwaysRespond,
    ];

    /// Mode for a settings index (0-4).
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    /// Settings index of this mode.
    pub fn index(self) -> u8 {
        self as u8
    }

    /// User-visible name.
    pub fn label(self) -> &'static str {
        match self {
            TalkMode::Silent => "沈黙モード",
            TalkMode::Reticent => "寡黙モード",
            TalkMode::Normal => "通常モード",
            TalkMode::Talkative => "饒舌モード",
            TalkMode::AlwaysRespond => "必ず応答モード",
        }
    }

    /// Status shown by the transport, if any.
    pub fn status_label(self) -> Option<&'static str> {
        match self {
            TalkMode::Silent => Some("沈黙"),
            TalkMode::Reticent => Some("寡黙"),
            TalkMode::Talkative => Some("饒舌"),
            TalkMode::Normal | TalkMode::AlwaysRespond => None,
        }
    }

    /// Attention parameters for this mode.
    pub fn params(self) -> AttentionParams {
        match self {
            TalkMode::Silent => AttentionParams {
                min: 0.001,
                max: 0.001,
                default: 0.001,
                called: 0.001,
                self_initiated: 0.0,
                ignored: 0.0,
            },
            TalkMode::Reticent => AttentionParams {
                min: 0.1,
                max: 0.3,
                default: 0.1,
                called: 1.1,
                self_initiated: 0.005,
                ignored: 0.002,
            },
            TalkMode::Normal => AttentionParams {
                min: 0.5,
                max: 1.1,
                default: 0.5,
                called: 1.1,
                self_initiated: 0.3,
                ignored: 0.002,
            },
            TalkMode::Talkative => AttentionParams {
                min: 0.8,
                max: 1.1,
                default: 0.8,
                called: 1.1,
                self_initiated: 0.8,
                ignored: 0.01,
            },
            TalkMode::AlwaysRespond => AttentionParams {
                min: 1.1,
                max: 1.1,
                default: 1.1,
                called: 1.1,
                self_initiated: 0.8,
                ignored: 0.003,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_round_trip() {
        for mode in TalkMode::ALL {
            assert_eq!(TalkMode::from_index(mode.index()), Some(mode));
        }
        assert_eq!(TalkMode::from_index(5), None);
    }

    #[test]
    fn test_params_are_ordered() {
        for mode in TalkMode::ALL {
            let p = mode.params();
            assert!(p.min <= p.default && p.default <= p.max, "{:?}", mode);
        }
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(TalkMode::Silent.status_label(), Some("沈黙"));
        assert_eq!(TalkMode::Normal.status_label(), None);
        assert_eq!(TalkMode::AlwaysRespond.status_label(), None);
    }

    #[test]
    fn test_params_serde_uses_self_key() {
        let json = serde_json::to_value(TalkMode::Normal.params()).unwrap();
        assert_eq!(json["self"], 0.3);
    }
}
