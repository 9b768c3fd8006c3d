use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::str::FromStr;
use std::time::Instant;

use log::{debug, warn};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod connect4;
pub use connect4::*;
mod othello;
pub use othello::*;

use crate::env::{GameKind, MoveRequest, MoveResponse};
use crate::game::{Connect4, Game, GameError, Othello, Player};
use crate::search::{alphabeta, Heuristic, SearchConfig};

/// How deep an agent searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Depth {
    Fixed(usize),
    /// Starts with `base` plies and searches one ply deeper every
    /// `stones_per_ply` placed stones, up to `ceiling`.
    Phased {
        base: usize,
        stones_per_ply: usize,
        ceiling: usize,
    },
}

impl Depth {
    /// Search depth for a board with `stones` occupied cells, at least 1.
    pub fn resolve(&self, stones: usize) -> usize {
        match *self {
            Depth::Fixed(depth) => depth.max(1),
            Depth::Phased {
                base,
                stones_per_ply,
                ceiling,
            } => (base + stones / stones_per_ply.max(1)).min(ceiling).max(1),
        }
    }
}

/// Reasons for a search to fail. Handled by falling back to a random move.
#[derive(Debug, Error)]
pub enum SearchFailure {
    #[error(transparent)]
    Game(#[from] GameError),
    #[error("search panicked: {0}")]
    Panic(String),
    #[error("search returned the illegal move {0}")]
    IllegalResult(String),
    #[error("search returned no move")]
    NoResult,
}

/// Selects the best move of `player` with a plain tree search over all legal moves.
///
/// Returns `None` if `player` has no legal move. The result is always legal:
/// if the search fails a random legal move is returned instead.
pub fn select_move<G, H>(game: &G, player: Player, config: &SearchConfig<H>) -> Option<G::Move>
where
    G: Game,
    H: Heuristic<G>,
{
    let legal = game.legal_moves(player);
    search_guarded(game, player, &legal, &legal, config)
}

/// Searches the best of `candidates`, falling back to a random move of `legal`
/// if anything goes wrong.
pub fn search_guarded<G, H>(
    game: &G,
    player: Player,
    candidates: &[G::Move],
    legal: &[G::Move],
    config: &SearchConfig<H>,
) -> Option<G::Move>
where
    G: Game,
    H: Heuristic<G>,
{
    if legal.is_empty() {
        return None;
    }
    match search(game, player, candidates, config) {
        Ok(mv) if legal.contains(&mv) => Some(mv),
        Ok(mv) => fallback_move(legal, SearchFailure::IllegalResult(format!("{mv:?}"))),
        Err(failure) => fallback_move(legal, failure),
    }
}

fn search<G, H>(
    game: &G,
    player: Player,
    candidates: &[G::Move],
    config: &SearchConfig<H>,
) -> Result<G::Move, SearchFailure>
where
    G: Game,
    H: Heuristic<G>,
{
    let start = Instant::now();
    let config = SearchConfig {
        depth: config.depth.max(1),
        ..*config
    };
    let (mv, value) = panic::catch_unwind(AssertUnwindSafe(|| {
        alphabeta(game, player, candidates, &config)
    }))
    .map_err(|payload| SearchFailure::Panic(panic_message(payload)))??;

    debug!(
        ">>> alphabeta {} {:?}ms {:?} {}",
        config.depth,
        start.elapsed().as_millis(),
        mv,
        value
    );
    mv.ok_or(SearchFailure::NoResult)
}

/// Fault path: a uniformly random legal move.
pub fn fallback_move<M: Copy>(legal: &[M], failure: SearchFailure) -> Option<M> {
    warn!("{failure}, falling back to a random move");
    let mut rng = SmallRng::from_entropy();
    legal.choose(&mut rng).copied()
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".into()
    }
}

/// Configured agent for one of the games.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Agent {
    Connect4(Connect4Agent),
    Othello(OthelloAgent),
}

impl Agent {
    /// Agent with the default configuration for `game`.
    pub fn for_game(game: GameKind) -> Agent {
        match game {
            GameKind::Connect4 => Agent::Connect4(Connect4Agent::default()),
            GameKind::Othello => Agent::Othello(OthelloAgent::default()),
        }
    }

    pub fn game(&self) -> GameKind {
        match self {
            Agent::Connect4(_) => GameKind::Connect4,
            Agent::Othello(_) => GameKind::Othello,
        }
    }

    /// Answers a move request, `pass` is set if there is no legal move.
    pub fn select_move(&self, request: &MoveRequest) -> Result<MoveResponse, GameError> {
        match (self, request.game) {
            (Agent::Connect4(agent), GameKind::Connect4) => {
                let board = Connect4::from_data(&request.board)?;
                Ok(agent
                    .select_move(&board, request.player)
                    .map_or_else(MoveResponse::pass, MoveResponse::column))
            }
            (Agent::Othello(agent), GameKind::Othello) => {
                let board = Othello::from_data(&request.board)?;
                Ok(agent
                    .select_move(&board, request.player)
                    .map_or_else(MoveResponse::pass, MoveResponse::cell))
            }
            (agent, game) => Err(GameError::WrongGame {
                agent: agent.game(),
                request: game,
            }),
        }
    }
}

impl FromStr for Agent {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s)
    }
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", serde_json::to_string(self).unwrap_or_default())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::env::{pos, BoardData};
    use crate::logging;

    #[derive(Debug)]
    struct PanicH;

    impl Heuristic<Othello> for PanicH {
        fn eval(&self, _game: &Othello, _player: Player) -> f64 {
            panic!("broken heuristic")
        }
    }

    #[derive(Debug)]
    struct DiscH;

    impl Heuristic<Othello> for DiscH {
        fn eval(&self, game: &Othello, player: Player) -> f64 {
            game.count(player) as f64 - game.count(player.opponent()) as f64
        }
    }

    #[test]
    fn depth_policy() {
        assert_eq!(Depth::Fixed(4).resolve(30), 4);
        assert_eq!(Depth::Fixed(0).resolve(0), 1);

        let phased = Depth::Phased {
            base: 4,
            stones_per_ply: 8,
            ceiling: 7,
        };
        assert_eq!(phased.resolve(0), 4);
        assert_eq!(phased.resolve(7), 4);
        assert_eq!(phased.resolve(8), 5);
        assert_eq!(phased.resolve(20), 6);
        assert_eq!(phased.resolve(42), 7);

        let depth: Depth = serde_json::from_str(r#"{"fixed":3}"#).unwrap();
        assert_eq!(depth, Depth::Fixed(3));
        let depth: Depth =
            serde_json::from_str(r#"{"phased":{"base":2,"stones_per_ply":0,"ceiling":5}}"#)
                .unwrap();
        assert_eq!(depth.resolve(100), 5);
    }

    #[test]
    fn panicking_search_falls_back() {
        logging();
        let board = Othello::new();
        let legal = board.legal_moves(Player::One);
        let config = SearchConfig::new(2, &PanicH);
        for _ in 0..10 {
            let mv = select_move(&board, Player::One, &config).unwrap();
            assert!(legal.contains(&mv));
        }
    }

    #[test]
    fn failing_search_falls_back() {
        logging();
        let board = Othello::new();
        let legal = board.legal_moves(Player::One);
        let config = SearchConfig::new(2, &DiscH);
        // An illegal candidate makes the search fail
        let mv = search_guarded(&board, Player::One, &[pos(0, 0)], &legal, &config).unwrap();
        assert!(legal.contains(&mv));

        assert_eq!(
            search_guarded(&board, Player::One, &legal, &[], &config),
            None
        );
    }

    #[test]
    fn fallback_picks_from_legal() {
        let legal = [pos(1, 1), pos(2, 2)];
        for _ in 0..20 {
            let mv = fallback_move(&legal, SearchFailure::NoResult).unwrap();
            assert!(legal.contains(&mv));
        }
        assert_eq!(fallback_move::<usize>(&[], SearchFailure::NoResult), None);
    }

    #[test]
    fn agent_config_from_json() {
        let agent: Agent = r#"{"othello":{"depth":{"fixed":2},"weights":{"corner":50.0}}}"#
            .parse()
            .unwrap();
        let Agent::Othello(othello) = &agent else {
            panic!("wrong agent {agent}");
        };
        assert_eq!(othello.depth, Depth::Fixed(2));
        assert_eq!(othello.weights.corner, 50.0);
        assert_eq!(othello.weights.edge, OthelloHeuristic::default().edge);
        assert!(othello.pruning);

        let copy: Agent = agent.to_string().parse().unwrap();
        assert_eq!(copy.game(), GameKind::Othello);
        assert!("{\"chess\":{}}".parse::<Agent>().is_err());
    }

    #[test]
    fn agent_answers_requests() {
        let agent = Agent::for_game(GameKind::Connect4);
        let mut rows = vec![vec![0; 7]; 6];
        rows[5] = vec![0, 1, 1, 1, 0, 2, 2];
        let request = MoveRequest {
            game: GameKind::Connect4,
            player: Player::One,
            board: BoardData::Rows(rows),
            agent: None,
        };
        let response = agent.select_move(&request).unwrap();
        assert!(response.column == Some(0) || response.column == Some(4));
        assert!(!response.pass);

        let request = MoveRequest {
            game: GameKind::Othello,
            player: Player::One,
            board: BoardData::Flat(Othello::new().grid.to_flat()),
            agent: None,
        };
        assert!(matches!(
            agent.select_move(&request),
            Err(GameError::WrongGame { .. })
        ));
        let response = Agent::for_game(GameKind::Othello).select_move(&request).unwrap();
        let mv = pos(response.row.unwrap(), response.column.unwrap());
        assert!(Othello::new().is_legal(mv, Player::One));

        // Nobody can move on a full board
        let request = MoveRequest {
            game: GameKind::Othello,
            player: Player::Two,
            board: BoardData::Flat(vec![1; 64]),
            agent: None,
        };
        let response = Agent::for_game(GameKind::Othello).select_move(&request).unwrap();
        assert_eq!(response, MoveResponse::pass());

        let request = MoveRequest {
            game: GameKind::Othello,
            player: Player::Two,
            board: BoardData::Flat(vec![1; 42]),
            agent: None,
        };
        assert!(Agent::for_game(GameKind::Othello).select_move(&request).is_err());
    }
}
