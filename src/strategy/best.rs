use std::time::Duration;

use async_trait::async_trait;
use log::info;
use shakmaty::Chess;

use super::{MoveDecision, Strategy};
use crate::clock::ClockState;
use crate::error::SearchError;
use crate::session::AnalysisEngine;

// A thousandth of the remaining clock per move; the engine's own move
// ordering is trusted, so there is nothing to enumerate locally.
const CLOCK_DIVISOR: f64 = 1000.0;
const FALLBACK_BUDGET: Duration = Duration::from_millis(100);
const MIN_BUDGET: Duration = Duration::from_millis(1);

/// Plays whatever the external engine considers best.
pub struct BestStrategy<E: AnalysisEngine> {
    engine: E,
}

impl<E: AnalysisEngine> BestStrategy<E> {
    pub fn new(engine: E) -> BestStrategy<E> {
        BestStrategy { engine }
    }
}

#[async_trait]
impl<E: AnalysisEngine> Strategy for BestStrategy<E> {
    async fn search(
        &mut self,
        position: &Chess,
        clock: ClockState,
    ) -> Result<MoveDecision, SearchError> {
        let budget = match clock {
            ClockState::Unknown => FALLBACK_BUDGET,
            ClockState::Remaining(left) => {
                Duration::from_secs_f64(left.as_secs_f64() / CLOCK_DIVISOR).max(MIN_BUDGET)
            }
        };

        let chosen = self.engine.best_move(position, budget).await?;
        info!("Engine picked {chosen} within {budget:?}");

        Ok(MoveDecision::of(chosen))
    }

    async fn shutdown(&mut self) {
        self.engine.close().await;
    }
}
