use std::time::Duration;

use thiserror::Error;

/// Failures of the external engine subprocess or its wire protocol.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine executable could not be launched or never completed the
    /// UCI handshake. Fatal - no strategy can work without an engine.
    #[error("engine unavailable: {0}")]
    Unavailable(String),

    /// The subprocess died or closed its pipes mid-session. The session is
    /// unusable until a new one is opened.
    #[error("engine crashed: {0}")]
    Crashed(String),

    /// No result arrived within the allotted budget.
    #[error("evaluation timed out after {0:?}")]
    EvaluationTimeout(Duration),

    /// The engine answered, but not with anything we can use.
    #[error("unexpected engine reply: {0}")]
    Protocol(String),
}

/// Failures of a single strategy search call.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The framework is expected to filter out finished games before
    /// calling search, so this indicates a broken invariant upstream.
    #[error("position has no legal moves")]
    NoLegalMoves,

    /// Every candidate was dropped during evaluation, leaving nothing to
    /// choose from.
    #[error("no candidate moves survived evaluation")]
    NoCandidates,

    #[error(transparent)]
    Engine(#[from] EngineError),
}
