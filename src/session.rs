use std::path::Path;
use std::process::Stdio;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use shakmaty::fen::Fen;
use shakmaty::uci::UciMove;
use shakmaty::{Chess, EnPassantMode, Move};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::time::timeout;

use crate::error::EngineError;
use crate::score::Score;

/// The two analysis capabilities strategies consume. [`EngineSession`] is
/// the real implementation; tests substitute a stub.
#[async_trait]
pub trait AnalysisEngine: Send + Sync {
    /// Evaluates `position` from the perspective of its side to move,
    /// returning within `budget`.
    async fn evaluate(&mut self, position: &Chess, budget: Duration)
    -> Result<Score, EngineError>;

    /// Asks the engine for its preferred move in `position` within `budget`.
    async fn best_move(&mut self, position: &Chess, budget: Duration)
    -> Result<Move, EngineError>;

    /// Releases the underlying engine. Idempotent.
    async fn close(&mut self);
}

const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);
const QUIT_GRACE: Duration = Duration::from_secs(2);
const RESYNC_GRACE: Duration = Duration::from_secs(1);

/// Shaved off the movetime we hand the engine so it reliably answers
/// before our own deadline fires.
const SAFETY_MARGIN: Duration = Duration::from_millis(10);
const MIN_MOVETIME: Duration = Duration::from_millis(1);

/// One live UCI engine subprocess, reused across many search calls.
///
/// Exactly one request may be in flight at a time; `&mut self` on every
/// operation enforces that. Concurrent strategies need one session each.
pub struct EngineSession {
    proc: Option<EngineProc>,
}

struct EngineProc {
    child: Child,
    stdin: ChildStdin,
    lines: Lines<BufReader<ChildStdout>>,
}

impl EngineSession {
    /// Launches the engine executable and completes the UCI handshake.
    pub async fn open(engine_path: impl AsRef<Path>) -> Result<EngineSession, EngineError> {
        let path = engine_path.as_ref();
        let mut child = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                EngineError::Unavailable(format!("failed to launch {}: {e}", path.display()))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| EngineError::Unavailable("engine stdin not captured".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| EngineError::Unavailable("engine stdout not captured".into()))?;

        let mut proc = EngineProc {
            child,
            stdin,
            lines: BufReader::new(stdout).lines(),
        };

        match timeout(HANDSHAKE_TIMEOUT, proc.handshake()).await {
            Ok(Ok(())) => Ok(EngineSession { proc: Some(proc) }),
            Ok(Err(e)) => Err(EngineError::Unavailable(format!("handshake failed: {e}"))),
            Err(_) => Err(EngineError::Unavailable(format!(
                "handshake timed out after {HANDSHAKE_TIMEOUT:?}"
            ))),
        }
    }

    async fn request(
        &mut self,
        position: &Chess,
        budget: Duration,
    ) -> Result<(Option<Score>, String), EngineError> {
        let proc = self
            .proc
            .as_mut()
            .ok_or_else(|| EngineError::Crashed("session already closed".into()))?;

        let movetime = budget.saturating_sub(SAFETY_MARGIN).max(MIN_MOVETIME);
        let fen = Fen::from_position(position, EnPassantMode::Legal);
        proc.send(&format!("position fen {fen}")).await?;
        proc.send(&format!("go movetime {}", movetime.as_millis()))
            .await?;

        match timeout(budget, proc.read_until_bestmove()).await {
            Ok(result) => result,
            Err(_) => {
                // The engine will still print its bestmove eventually; drain
                // it so the next request starts on a clean stream.
                if !proc.resync().await {
                    warn!("engine did not recover after a missed deadline, dropping session");
                    self.close().await;
                }
                Err(EngineError::EvaluationTimeout(budget))
            }
        }
    }

    /// Idempotent shutdown: asks the engine to quit, then kills it if it
    /// lingers. Safe to call again after a crash or a prior close.
    pub async fn close(&mut self) {
        if let Some(mut proc) = self.proc.take() {
            let _ = proc.send("quit").await;
            if timeout(QUIT_GRACE, proc.child.wait()).await.is_err() {
                debug!("engine ignored quit, killing it");
                let _ = proc.child.start_kill();
                let _ = proc.child.wait().await;
            }
        }
    }
}

#[async_trait]
impl AnalysisEngine for EngineSession {
    async fn evaluate(
        &mut self,
        position: &Chess,
        budget: Duration,
    ) -> Result<Score, EngineError> {
        // The score travels on info lines; the last one seen before
        // bestmove is the engine's final verdict.
        let (score, _) = self.request(position, budget).await?;
        score.ok_or_else(|| {
            EngineError::Protocol("engine finished without reporting a score".into())
        })
    }

    async fn best_move(&mut self, position: &Chess, budget: Duration) -> Result<Move, EngineError> {
        let (_, bestmove_line) = self.request(position, budget).await?;
        let uci = parse_bestmove(&bestmove_line)
            .ok_or_else(|| EngineError::Protocol(bestmove_line.clone()))?;
        if uci == "(none)" {
            return Err(EngineError::Protocol(
                "engine reported no playable move".into(),
            ));
        }
        let uci_move = UciMove::from_str(uci)
            .map_err(|_| EngineError::Protocol(format!("unparseable bestmove: {uci}")))?;
        uci_move
            .to_move(position)
            .map_err(|_| EngineError::Protocol(format!("bestmove {uci} is illegal here")))
    }

    async fn close(&mut self) {
        EngineSession::close(self).await;
    }
}

impl EngineProc {
    async fn handshake(&mut self) -> Result<(), EngineError> {
        self.send("uci").await?;
        loop {
            let line = self.next_line().await?;
            if line.trim() == "uciok" {
                break;
            }
        }
        self.send("isready").await?;
        loop {
            let line = self.next_line().await?;
            if line.trim() == "readyok" {
                return Ok(());
            }
        }
    }

    async fn send(&mut self, command: &str) -> Result<(), EngineError> {
        let write = async {
            self.stdin.write_all(command.as_bytes()).await?;
            self.stdin.write_all(b"\n").await?;
            self.stdin.flush().await
        };
        write
            .await
            .map_err(|e| EngineError::Crashed(format!("engine pipe closed: {e}")))
    }

    async fn next_line(&mut self) -> Result<String, EngineError> {
        match self.lines.next_line().await {
            Ok(Some(line)) => Ok(line),
            Ok(None) => Err(EngineError::Crashed(
                "engine closed its output stream".into(),
            )),
            Err(e) => Err(EngineError::Crashed(format!("engine pipe error: {e}"))),
        }
    }

    async fn read_until_bestmove(&mut self) -> Result<(Option<Score>, String), EngineError> {
        let mut last_score = None;
        loop {
            let line = self.next_line().await?;
            if line.starts_with("info ") {
                if let Some(score) = parse_score(&line) {
                    last_score = Some(score);
                }
            } else if line.starts_with("bestmove") {
                return Ok((last_score, line));
            }
        }
    }

    async fn resync(&mut self) -> bool {
        if self.send("stop").await.is_err() {
            return false;
        }
        matches!(
            timeout(RESYNC_GRACE, self.read_until_bestmove()).await,
            Ok(Ok(_))
        )
    }
}

fn parse_score(info_line: &str) -> Option<Score> {
    let mut tokens = info_line.split_whitespace();
    while let Some(token) = tokens.next() {
        if token == "score" {
            return match (tokens.next()?, tokens.next()?) {
                ("cp", value) => value.parse().ok().map(Score::Cp),
                ("mate", value) => value.parse().ok().map(Score::Mate),
                _ => None,
            };
        }
    }
    None
}

fn parse_bestmove(line: &str) -> Option<&str> {
    let mut tokens = line.split_whitespace();
    match tokens.next()? {
        "bestmove" => tokens.next(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_centipawn_score() {
        let line = "info depth 12 seldepth 16 multipv 1 score cp -31 nodes 30785 pv e7e5";
        assert_eq!(parse_score(line), Some(Score::Cp(-31)));
    }

    #[test]
    fn parses_mate_score() {
        let line = "info depth 24 score mate -3 nodes 1024 pv h7h8";
        assert_eq!(parse_score(line), Some(Score::Mate(-3)));
    }

    #[test]
    fn ignores_lines_without_score() {
        assert_eq!(parse_score("info depth 5 currmove e2e4 currmovenumber 1"), None);
        assert_eq!(parse_score("readyok"), None);
    }

    #[test]
    fn parses_bestmove_with_and_without_ponder() {
        assert_eq!(parse_bestmove("bestmove e2e4 ponder e7e5"), Some("e2e4"));
        assert_eq!(parse_bestmove("bestmove g1f3"), Some("g1f3"));
        assert_eq!(parse_bestmove("bestmove (none)"), Some("(none)"));
        assert_eq!(parse_bestmove("info string hello"), None);
    }
}
