//! Move-selection strategies for a chess bot that outsources all positional
//! judgement to an external UCI engine (e.g. Stockfish).
//!
//! The surrounding bot framework owns the game loop and the clock; it calls
//! [`strategy::Strategy::search`] once per ply and
//! [`strategy::Strategy::shutdown`] once at game end.

pub mod classify;
pub mod clock;
pub mod error;
pub mod score;
pub mod session;
pub mod strategy;

pub use classify::MoveCategory;
pub use clock::ClockState;
pub use error::{EngineError, SearchError};
pub use score::Score;
pub use session::{AnalysisEngine, EngineSession};
pub use strategy::{MoveDecision, Strategy, StrategyKind, init_strategy};
