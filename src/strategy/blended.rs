use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use shakmaty::Chess;

use super::{MoveDecision, Strategy, search_worst_move};
use crate::clock::ClockState;
use crate::error::SearchError;
use crate::session::AnalysisEngine;

/// How often the pessimal branch fires, in percent.
const DEFAULT_WORST_MOVE_PERCENT: u8 = 7;

// The optimal branch here gets a more generous slice than BestStrategy
// uses (1/400th of the clock instead of 1/1000th). Both literals are kept
// as-is; they are tuning defaults, not derived quantities.
const RELAXED_CLOCK_DIVISOR: f64 = 400.0;
const RELAXED_FALLBACK_BUDGET: Duration = Duration::from_secs(1);
const MIN_BUDGET: Duration = Duration::from_millis(1);

/// Mostly plays well, occasionally plays the worst move it can find.
///
/// Each call rolls once: below the configured percentage it runs the full
/// pessimal search, otherwise it asks the engine for its best move.
pub struct BlendedStrategy<E: AnalysisEngine> {
    engine: E,
    rng: StdRng,
    // Shared difficulty knob; loaded once per call, so a concurrent update
    // affects the next search, never the one in flight.
    worst_move_percent: AtomicU8,
}

impl<E: AnalysisEngine> BlendedStrategy<E> {
    pub fn new(engine: E) -> BlendedStrategy<E> {
        BlendedStrategy::with_rng(engine, StdRng::from_os_rng())
    }

    /// Deterministic rolls and tie-breaking, mainly for tests.
    pub fn seeded(engine: E, seed: u64) -> BlendedStrategy<E> {
        BlendedStrategy::with_rng(engine, StdRng::seed_from_u64(seed))
    }

    fn with_rng(engine: E, rng: StdRng) -> BlendedStrategy<E> {
        BlendedStrategy {
            engine,
            rng,
            worst_move_percent: AtomicU8::new(DEFAULT_WORST_MOVE_PERCENT),
        }
    }
}

#[async_trait]
impl<E: AnalysisEngine> Strategy for BlendedStrategy<E> {
    async fn search(
        &mut self,
        position: &Chess,
        clock: ClockState,
    ) -> Result<MoveDecision, SearchError> {
        let percent = self.worst_move_percent.load(Ordering::Relaxed);
        let roll: f64 = self.rng.random_range(0.0..100.0);

        if roll < f64::from(percent) {
            debug!("roll {roll:.1} < {percent}: sabotage ply");
            let chosen =
                search_worst_move(&mut self.engine, position, clock, &mut self.rng).await?;
            return Ok(MoveDecision::of(chosen));
        }

        let budget = match clock {
            ClockState::Unknown => RELAXED_FALLBACK_BUDGET,
            ClockState::Remaining(left) => {
                Duration::from_secs_f64(left.as_secs_f64() / RELAXED_CLOCK_DIVISOR).max(MIN_BUDGET)
            }
        };

        let chosen = self.engine.best_move(position, budget).await?;
        info!("Engine picked {chosen} within {budget:?}");

        Ok(MoveDecision::of(chosen))
    }

    fn set_worst_move_percent(&self, percent: u8) {
        self.worst_move_percent
            .store(percent.min(100), Ordering::Relaxed);
    }

    async fn shutdown(&mut self) {
        self.engine.close().await;
    }
}
