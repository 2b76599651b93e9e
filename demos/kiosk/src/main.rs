use std::collections::HashSet;

use minigame::games::{Board, ComboRound, Field, PatternRound, Question, SortBoard};
use minigame::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

// ---------------------------------------------------------------------------
// Bots
// ---------------------------------------------------------------------------

/// Plays a game by watching its snapshots.
trait Bot<G: GameAdapter> {
    /// Inputs to send in reaction to `frame`.
    fn react(&mut self, frame: &Snapshot<G::Content>) -> Vec<G::Input>;
}

/// Content of a round that just opened for input and has not been played.
fn fresh_round<'a, C>(played: &mut Option<u32>, frame: &'a Snapshot<C>) -> Option<&'a C> {
    if frame.phase != Some(Phase::AwaitingInput) || *played == Some(frame.round_index) {
        return None;
    }
    let content = frame.content.as_ref()?;
    *played = Some(frame.round_index);
    Some(content)
}

#[derive(Default)]
struct PatternBot {
    played: Option<u32>,
}

impl Bot<PatternRecall> for PatternBot {
    fn react(&mut self, frame: &Snapshot<PatternRound>) -> Vec<Pad> {
        fresh_round(&mut self.played, frame)
            .map(|round| round.pattern.iter().map(|&p| Pad(p)).collect())
            .unwrap_or_default()
    }
}

#[derive(Default)]
struct ComboBot {
    played: Option<u32>,
}

impl Bot<ComboMatch> for ComboBot {
    fn react(&mut self, frame: &Snapshot<ComboRound>) -> Vec<Pick> {
        fresh_round(&mut self.played, frame)
            .map(|round| round.target.iter().map(|&s| Pick(s)).collect())
            .unwrap_or_default()
    }
}

#[derive(Default)]
struct MathBot {
    played: Option<u32>,
}

impl Bot<MathQuiz> for MathBot {
    fn react(&mut self, frame: &Snapshot<Question>) -> Vec<Answer> {
        fresh_round(&mut self.played, frame)
            .map(|q| vec![Answer(q.problem.answer)])
            .unwrap_or_default()
    }
}

#[derive(Default)]
struct SortBot {
    played: Option<u32>,
}

impl Bot<SortOrder> for SortBot {
    fn react(&mut self, frame: &Snapshot<SortBoard>) -> Vec<Tap> {
        let Some(board) = fresh_round(&mut self.played, frame) else {
            return Vec::new();
        };
        let mut order: Vec<usize> = (0..board.values.len()).collect();
        order.sort_by_key(|&pos| board.values[pos]);
        order.into_iter().map(Tap).collect()
    }
}

#[derive(Default)]
struct SlidingBot {
    played: Option<u32>,
}

impl Bot<SlidingPuzzle> for SlidingBot {
    fn react(&mut self, frame: &Snapshot<Board>) -> Vec<Swap> {
        fresh_round(&mut self.played, frame)
            .map(solve_along_snake)
            .unwrap_or_default()
    }
}

/// Bubble sort along a boustrophedon path, so every swap is between grid
/// neighbours.
fn solve_along_snake(board: &Board) -> Vec<Swap> {
    let side = board.side;
    let mut path = Vec::with_capacity(side * side);
    for row in 0..side {
        let cells = row * side..(row + 1) * side;
        if row % 2 == 0 {
            path.extend(cells);
        } else {
            path.extend(cells.rev());
        }
    }
    let mut rank = vec![0; path.len()];
    for (r, &cell) in path.iter().enumerate() {
        rank[cell] = r;
    }

    let mut tiles = board.tiles.clone();
    let mut swaps = Vec::new();
    let mut swapped = true;
    while swapped {
        swapped = false;
        for w in path.windows(2) {
            if rank[tiles[w[0]]] > rank[tiles[w[1]]] {
                tiles.swap(w[0], w[1]);
                swaps.push(Swap(w[0], w[1]));
                swapped = true;
            }
        }
    }
    swaps
}

/// Catches every good item once and leaves hazards alone.
#[derive(Default)]
struct CollectorBot {
    caught: HashSet<u64>,
}

impl Bot<Collector> for CollectorBot {
    fn react(&mut self, frame: &Snapshot<Field>) -> Vec<Catch> {
        let Some(field) = &frame.content else {
            return Vec::new();
        };
        field
            .items
            .iter()
            .filter(|i| i.item.desirable && self.caught.insert(i.id))
            .map(|i| Catch(i.id))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Session driver
// ---------------------------------------------------------------------------

/// Runs one session of `G` on the tokio clock with `bot` at the controls.
async fn play<G: GameAdapter>(
    id: SessionId,
    config: RawSessionConfig,
    seed: u64,
    mut bot: impl Bot<G>,
) -> Result<SessionResult, MinigameError> {
    let (handle, result) = spawn_session::<G>(id, config, StdRng::seed_from_u64(seed), 64)?;
    let mut frames = handle.subscribe();

    loop {
        let inputs = {
            let frame = frames.borrow_and_update();
            if frame.lifecycle.is_terminal() {
                break;
            }
            bot.react(&frame)
        };
        for input in inputs {
            if handle.send_input(input).await.is_err() {
                break;
            }
        }
        if frames.changed().await.is_err() {
            break;
        }
    }

    let result = result
        .await
        .map_err(|_| minigame::runtime::RuntimeError::Unavailable(id))?;
    Ok(result)
}

async fn play_kind(kind: GameKind, seed: u64) -> Result<SessionResult, MinigameError> {
    let id = SessionId(seed);
    let config = kind.default_config();
    match kind {
        GameKind::PatternRecall => play::<PatternRecall>(id, config, seed, PatternBot::default()).await,
        GameKind::ComboMatch => play::<ComboMatch>(id, config, seed, ComboBot::default()).await,
        GameKind::MathQuiz => play::<MathQuiz>(id, config, seed, MathBot::default()).await,
        GameKind::SortOrder => play::<SortOrder>(id, config, seed, SortBot::default()).await,
        GameKind::SlidingPuzzle => play::<SlidingPuzzle>(id, config, seed, SlidingBot::default()).await,
        GameKind::Collector => play::<Collector>(id, config, seed, CollectorBot::default()).await,
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    minigame::init_tracing();

    let mut args = std::env::args().skip(1);
    let kinds = match args.next() {
        Some(name) => vec![name.parse::<GameKind>().map_err(MinigameError::from)?],
        None => GameKind::ALL.to_vec(),
    };
    let seed: u64 = args.next().map(|s| s.parse()).transpose()?.unwrap_or(7);

    eprintln!("kiosk: playing {} game(s) with seed {seed}", kinds.len());

    for kind in kinds {
        info!(game = %kind, "{}", kind.description());
        let result = play_kind(kind, seed).await?;
        println!("{kind}: {}", serde_json::to_string(&result)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // =====================================================================
    // Full sessions on paused time
    // =====================================================================

    #[tokio::test(start_paused = true)]
    async fn test_pattern_bot_scores_every_round() {
        let result = play_kind(GameKind::PatternRecall, 1).await.unwrap();
        assert_eq!(result.final_score, 100);
        assert_eq!(result.rounds_played, 5);
        assert_eq!(result.reason, Completion::Finished);
    }

    #[tokio::test(start_paused = true)]
    async fn test_combo_bot_scores_every_round() {
        let result = play_kind(GameKind::ComboMatch, 2).await.unwrap();
        assert_eq!(result.final_score, 150);
    }

    #[tokio::test(start_paused = true)]
    async fn test_math_bot_answers_everything() {
        let result = play_kind(GameKind::MathQuiz, 3).await.unwrap();
        assert_eq!(result.final_score, 100);
        assert_eq!(result.rounds_played, 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sort_bot_earns_clean_bonus() {
        let result = play_kind(GameKind::SortOrder, 4).await.unwrap();
        assert_eq!(result.final_score, 3 * 35);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sliding_bot_solves_the_board() {
        let result = play_kind(GameKind::SlidingPuzzle, 5).await.unwrap();
        assert_eq!(result.rounds_played, 1);
        assert_eq!(result.reason, Completion::Finished);
        assert!(result.final_score >= 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_collector_bot_only_catches_good_items() {
        let result = play_kind(GameKind::Collector, 6).await.unwrap();
        assert_eq!(result.reason, Completion::Finished);
        assert!(result.final_score > 0);
        assert_eq!(result.final_score % 10, 0, "no hazard was caught");
    }

    // =====================================================================
    // Solver
    // =====================================================================

    #[test]
    fn test_snake_solver_uses_neighbour_swaps() {
        let board = Board {
            side: 3,
            tiles: vec![8, 7, 6, 5, 4, 3, 2, 1, 0],
            moves: 0,
        };
        let swaps = solve_along_snake(&board);
        let mut tiles = board.tiles.clone();
        for Swap(a, b) in &swaps {
            let (ra, ca) = (a / 3, a % 3);
            let (rb, cb) = (b / 3, b % 3);
            assert_eq!(ra.abs_diff(rb) + ca.abs_diff(cb), 1, "{a} and {b} are not neighbours");
            tiles.swap(*a, *b);
        }
        assert_eq!(tiles, (0..9).collect::<Vec<_>>());
    }
}
