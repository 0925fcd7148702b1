use async_trait::async_trait;
use rand::SeedableRng;
use rand::rngs::StdRng;
use shakmaty::Chess;

use super::{MoveDecision, Strategy, search_worst_move};
use crate::clock::ClockState;
use crate::error::SearchError;
use crate::session::AnalysisEngine;

/// Plays the move the engine hates most, with tie-breaks that avoid
/// giving checks or captures away when equally bad quiet moves exist.
pub struct WorstStrategy<E: AnalysisEngine> {
    engine: E,
    rng: StdRng,
}

impl<E: AnalysisEngine> WorstStrategy<E> {
    pub fn new(engine: E) -> WorstStrategy<E> {
        WorstStrategy {
            engine,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic tie-breaking, mainly for tests.
    pub fn seeded(engine: E, seed: u64) -> WorstStrategy<E> {
        WorstStrategy {
            engine,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

#[async_trait]
impl<E: AnalysisEngine> Strategy for WorstStrategy<E> {
    async fn search(
        &mut self,
        position: &Chess,
        clock: ClockState,
    ) -> Result<MoveDecision, SearchError> {
        let chosen = search_worst_move(&mut self.engine, position, clock, &mut self.rng).await?;
        Ok(MoveDecision::of(chosen))
    }

    async fn shutdown(&mut self) {
        self.engine.close().await;
    }
}
