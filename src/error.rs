use thiserror::Error;

/// Anomalies surfaced by the battle core.
///
/// None of these are fatal to a match: selections are re-prompted, untrusted
/// text is replaced by a random legal move and a short pool yields a shorter
/// roster. Only `InputClosed` ends the interactive loop.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BattleError {
    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    #[error("generated move text {text:?} matches no legal move")]
    UntrustedTextMismatch { text: String },

    #[error("pool exhausted: wanted {requested} combatants, only {available} available")]
    EmptyPool { requested: usize, available: usize },

    #[error("invalid combatant {name}: {reason}")]
    InvalidCombatant { name: String, reason: String },

    #[error("unknown type {0:?}")]
    UnknownType(String),

    #[error("the match is already over")]
    MatchOver,

    #[error("input closed")]
    InputClosed,
}
