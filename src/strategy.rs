mod best;
mod blended;
mod worst;

use std::path::Path;

use async_trait::async_trait;
pub use best::BestStrategy;
pub use blended::BlendedStrategy;
use log::{info, warn};
use rand::Rng;
use rand::rngs::StdRng;
use shakmaty::{Chess, Move, Position};
pub use worst::WorstStrategy;

use crate::classify::{FALLBACK_ORDER, MoveCategory, classify};
use crate::clock::{self, ClockState};
use crate::error::{EngineError, SearchError};
use crate::score::Score;
use crate::session::{AnalysisEngine, EngineSession};

/// What a search call hands back to the framework. `ponder` is a
/// principal-variation placeholder; none of these strategies ponder.
#[derive(Debug, Clone)]
pub struct MoveDecision {
    pub chosen: Move,
    pub ponder: Option<Move>,
}

impl MoveDecision {
    fn of(chosen: Move) -> MoveDecision {
        MoveDecision {
            chosen,
            ponder: None,
        }
    }
}

/// One move-selection policy bound to a live engine session.
///
/// The framework calls `search` once per ply and `shutdown` once at game
/// end. A search that fails is reported as-is; no strategy ever covers an
/// engine failure with a made-up move.
#[async_trait]
pub trait Strategy: Send + Sync {
    async fn search(
        &mut self,
        position: &Chess,
        clock: ClockState,
    ) -> Result<MoveDecision, SearchError>;

    /// Difficulty knob for the blended strategy; a no-op everywhere else.
    fn set_worst_move_percent(&self, _percent: u8) {}

    /// Releases the engine session. Idempotent.
    async fn shutdown(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    Best,
    Worst,
    Blended,
}

/// Opens an engine session and wraps it in the requested strategy.
pub async fn init_strategy(
    kind: StrategyKind,
    engine_path: impl AsRef<Path>,
) -> Result<Box<dyn Strategy>, EngineError> {
    let session = EngineSession::open(engine_path).await?;
    Ok(match kind {
        StrategyKind::Best => Box::new(BestStrategy::new(session)),
        StrategyKind::Worst => Box::new(WorstStrategy::new(session)),
        StrategyKind::Blended => Box::new(BlendedStrategy::new(session)),
    })
}

/// The pessimal search shared by [`WorstStrategy`] and [`BlendedStrategy`].
///
/// Every legal move is played on a copy of the position and the successor
/// is evaluated from the opponent's perspective within the allocated slice.
/// The moves tied at the maximum of those evaluations (the ones that leave
/// the opponent best off) form the tie set; one is drawn uniformly,
/// preferring quiet moves, then checks, then captures.
///
/// A candidate whose evaluation times out is dropped rather than failing
/// the whole search; every other engine error aborts immediately.
pub(crate) async fn search_worst_move<E: AnalysisEngine>(
    engine: &mut E,
    position: &Chess,
    clock: ClockState,
    rng: &mut StdRng,
) -> Result<Move, SearchError> {
    let legal_moves = position.legal_moves();
    let budget = clock::allocate(clock, legal_moves.len(), clock::DEFAULT_BASE_SLICE)?;

    info!(
        "Hunting the worst of {} legal moves at {:?} per candidate",
        legal_moves.len(),
        budget
    );

    let mut worst_eval: Option<Score> = None;
    let mut tie_set: Vec<(Move, MoveCategory)> = Vec::new();

    for candidate in &legal_moves {
        let mut successor = position.clone();
        successor.play_unchecked(*candidate);
        let category = classify(*candidate, &successor);

        let eval = match engine.evaluate(&successor, budget).await {
            Ok(eval) => eval,
            Err(EngineError::EvaluationTimeout(_)) => {
                warn!("no evaluation for {candidate} within {budget:?}, dropping the candidate");
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        match worst_eval {
            Some(current) if eval < current => {}
            Some(current) if eval == current => tie_set.push((*candidate, category)),
            _ => {
                worst_eval = Some(eval);
                tie_set = vec![(*candidate, category)];
            }
        }
    }

    // An evaluation was recorded iff at least one candidate survived.
    let Some(worst_eval) = worst_eval else {
        return Err(SearchError::NoCandidates);
    };

    for preferred in FALLBACK_ORDER {
        let pool: Vec<Move> = tie_set
            .iter()
            .filter(|(_, category)| *category == preferred)
            .map(|(candidate, _)| *candidate)
            .collect();
        if !pool.is_empty() {
            let chosen = pool[rng.random_range(0..pool.len())];
            info!(
                "Chose {chosen} ({preferred:?}, eval {worst_eval} shared by {} of {} tied candidates)",
                pool.len(),
                tie_set.len()
            );
            return Ok(chosen);
        }
    }

    Err(SearchError::NoCandidates)
}
