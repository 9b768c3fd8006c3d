use super::{Heuristic, SearchConfig, DRAW, LOSS, WIN};
use crate::game::{Game, GameError, Outcome, Player};

/// Alpha-Beta tree search.
///
/// @see https://en.wikipedia.org/wiki/Alpha%E2%80%93beta_pruning
/// - `player` is the maximizing player and moves first
/// - Only `moves` are considered at the root, deeper levels use all legal moves
/// - Finished games are scored with `WIN`, `LOSS` or `DRAW` regardless of the remaining depth,
///   wins lose and losses gain one point per ply so that faster wins and slower losses are preferred
/// - Returns no move if `moves` is empty or the depth is zero
pub fn alphabeta<G, H>(
    game: &G,
    player: Player,
    moves: &[G::Move],
    config: &SearchConfig<H>,
) -> Result<(Option<G::Move>, f64), GameError>
where
    G: Game,
    H: Heuristic<G>,
{
    if config.depth == 0 || moves.is_empty() {
        return Ok((None, config.heuristic.eval(game, player)));
    }
    alphabeta_moves(
        game,
        moves,
        player,
        player,
        config.depth,
        f64::NEG_INFINITY,
        f64::INFINITY,
        config,
    )
}

/// Exhaustive minimax, the same search as `alphabeta` without pruning.
pub fn minimax<G, H>(
    game: &G,
    player: Player,
    moves: &[G::Move],
    config: &SearchConfig<H>,
) -> Result<(Option<G::Move>, f64), GameError>
where
    G: Game,
    H: Heuristic<G>,
{
    alphabeta(game, player, moves, &config.pruning(false))
}

fn alphabeta_rec<G, H>(
    game: &G,
    turn: Player,
    player: Player,
    depth: usize,
    alpha: f64,
    beta: f64,
    config: &SearchConfig<H>,
) -> Result<f64, GameError>
where
    G: Game,
    H: Heuristic<G>,
{
    if depth == 0 {
        return Ok(config.heuristic.eval(game, player));
    }
    let moves = game.legal_moves(turn);
    if moves.is_empty() {
        return Ok(config.heuristic.eval(game, player));
    }
    alphabeta_moves(game, &moves, turn, player, depth, alpha, beta, config).map(|(_, v)| v)
}

#[allow(clippy::too_many_arguments)]
fn alphabeta_moves<G, H>(
    game: &G,
    moves: &[G::Move],
    turn: Player,
    player: Player,
    depth: usize,
    mut alpha: f64,
    mut beta: f64,
    config: &SearchConfig<H>,
) -> Result<(Option<G::Move>, f64), GameError>
where
    G: Game,
    H: Heuristic<G>,
{
    let maximizing = turn == player;
    // Plies played since the root
    let distance = (config.depth - depth) as f64;
    let mut value = (None, if maximizing { f64::NEG_INFINITY } else { f64::INFINITY });

    for &mv in moves {
        let child = game.apply(mv, turn)?;
        let newval = match child.outcome() {
            Outcome::Winner(winner) if winner == player => WIN - distance,
            Outcome::Winner(_) => LOSS + distance,
            Outcome::Match => DRAW,
            Outcome::None => alphabeta_rec(
                &child,
                turn.opponent(),
                player,
                depth - 1,
                alpha,
                beta,
                config,
            )?,
        };

        if maximizing {
            if newval > value.1 {
                value = (Some(mv), newval);
            }
            if newval > alpha {
                alpha = newval;
            }
        } else {
            if newval < value.1 {
                value = (Some(mv), newval);
            }
            if newval < beta {
                beta = newval;
            }
        }
        if config.pruning && beta <= alpha {
            break;
        }
    }
    Ok(value)
}

#[cfg(test)]
mod test {
    use std::cell::Cell;

    use rand::rngs::SmallRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::env::pos;
    use crate::game::{Connect4, Othello};

    /// Game tree with pseudo random leaf values.
    #[derive(Debug, Clone)]
    struct HashTree {
        seed: u64,
        branching: usize,
        path: Vec<usize>,
    }

    impl Game for HashTree {
        type Move = usize;

        fn legal_moves(&self, _player: Player) -> Vec<usize> {
            (0..self.branching).collect()
        }

        fn apply(&self, mv: usize, _player: Player) -> Result<HashTree, GameError> {
            if mv >= self.branching {
                return Err(GameError::illegal(mv, "no such branch"));
            }
            let mut path = self.path.clone();
            path.push(mv);
            Ok(HashTree { path, ..*self })
        }

        fn outcome(&self) -> Outcome {
            Outcome::None
        }

        fn stones(&self) -> usize {
            self.path.len()
        }
    }

    #[derive(Debug, Default)]
    struct TreeH {
        evals: Cell<usize>,
    }

    impl Heuristic<HashTree> for TreeH {
        fn eval(&self, game: &HashTree, player: Player) -> f64 {
            self.evals.set(self.evals.get() + 1);
            let mut h = game.seed;
            for &mv in &game.path {
                h = (h ^ mv as u64).wrapping_mul(0x9e3779b97f4a7c15);
                h ^= h >> 29;
            }
            let value = (h % 2001) as f64 - 1000.0;
            if player == Player::One {
                value
            } else {
                -value
            }
        }
    }

    /// Center control for connect four.
    #[derive(Debug)]
    struct CenterH;

    impl Heuristic<Connect4> for CenterH {
        fn eval(&self, game: &Connect4, player: Player) -> f64 {
            game.grid
                .positions()
                .filter_map(|p| game.grid[p].player().map(|owner| (p, owner)))
                .map(|(p, owner)| {
                    let weight = 4.0 - (p.col as f64 - 3.0).abs();
                    if owner == player {
                        weight
                    } else {
                        -weight
                    }
                })
                .sum()
        }
    }

    /// Disc difference for othello.
    #[derive(Debug)]
    struct DiscH;

    impl Heuristic<Othello> for DiscH {
        fn eval(&self, game: &Othello, player: Player) -> f64 {
            game.count(player) as f64 - game.count(player.opponent()) as f64
        }
    }

    #[test]
    fn pruning_matches_minimax_on_trees() {
        let mut pruned_evals = 0;
        let mut full_evals = 0;
        for seed in 0..40 {
            for depth in 1..=5 {
                for player in [Player::One, Player::Two] {
                    let game = HashTree {
                        seed,
                        branching: 3 + seed as usize % 3,
                        path: Vec::new(),
                    };
                    let moves = game.legal_moves(player);

                    let pruned_h = TreeH::default();
                    let config = SearchConfig::new(depth, &pruned_h);
                    let pruned = alphabeta(&game, player, &moves, &config).unwrap();

                    let full_h = TreeH::default();
                    let config = SearchConfig::new(depth, &full_h);
                    let full = minimax(&game, player, &moves, &config).unwrap();

                    assert_eq!(pruned, full, "seed={seed} depth={depth}");
                    assert!(pruned_h.evals.get() <= full_h.evals.get());
                    pruned_evals += pruned_h.evals.get();
                    full_evals += full_h.evals.get();
                }
            }
        }
        assert!(pruned_evals < full_evals);
    }

    #[test]
    fn pruning_matches_minimax_on_games() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..6 {
            // Random connect four position
            let mut board = Connect4::new();
            let mut turn = Player::One;
            for _ in 0..rng.gen_range(4..12) {
                let moves = board.legal_moves(turn);
                let Some(&col) = moves.choose(&mut rng) else {
                    break;
                };
                board = board.play(col, turn).unwrap();
                turn = turn.opponent();
            }
            if board.outcome() == Outcome::None {
                let moves = board.legal_moves(turn);
                let config = SearchConfig::new(4, &CenterH);
                assert_eq!(
                    alphabeta(&board, turn, &moves, &config).unwrap(),
                    minimax(&board, turn, &moves, &config).unwrap(),
                    "{board:?}"
                );
            }

            // Random othello position
            let mut board = Othello::new();
            let mut turn = Player::One;
            for _ in 0..rng.gen_range(2..16) {
                let moves = board.legal_moves(turn);
                if let Some(&p) = moves.choose(&mut rng) {
                    board = board.play(p, turn).unwrap();
                }
                turn = turn.opponent();
            }
            let moves = board.legal_moves(turn);
            let config = SearchConfig::new(3, &DiscH);
            assert_eq!(
                alphabeta(&board, turn, &moves, &config).unwrap(),
                minimax(&board, turn, &moves, &config).unwrap(),
                "{board:?}"
            );
        }
    }

    #[test]
    fn leaf_without_moves() {
        let game = Othello::new();
        let config = SearchConfig::new(3, &DiscH);
        assert_eq!(alphabeta(&game, Player::One, &[], &config), Ok((None, 0.0)));

        let config = SearchConfig::new(0, &DiscH);
        let moves = game.legal_moves(Player::One);
        assert_eq!(alphabeta(&game, Player::One, &moves, &config), Ok((None, 0.0)));
    }

    #[test]
    fn finds_immediate_win() {
        let board = Connect4::parse(
            r#"
            . . . . . . .
            . . . . . . .
            . . . . . . .
            . . . . . . .
            . . . . . . .
            . x x x . o o"#,
        )
        .unwrap();
        let moves = board.legal_moves(Player::One);
        // Deeper searches also see the slower win through the center
        for depth in 1..=4 {
            let config = SearchConfig::new(depth, &CenterH);
            let (mv, value) = alphabeta(&board, Player::One, &moves, &config).unwrap();
            assert_eq!(value, WIN, "depth={depth}");
            assert_eq!(mv, Some(4), "depth={depth}");
        }
    }

    #[test]
    fn othello_prefers_winning_now() {
        // (1, 0) ends the game with a win, the corner wins only a few plies later
        let board = Othello::parse(
            r#"
            . x x x x x x x
            . o o o o o x x
            o o x o x x x x
            x x o x x x x x
            x x x o x x x x
            x o x x o x x x
            x x x x x o x x
            x x o o o o o x"#,
        )
        .unwrap();
        let moves = board.legal_moves(Player::One);
        assert_eq!(moves, vec![pos(0, 0), pos(1, 0)]);
        assert_eq!(
            board.play(pos(1, 0), Player::One).unwrap().outcome(),
            Outcome::Winner(Player::One)
        );
        for depth in 1..=3 {
            let config = SearchConfig::new(depth, &DiscH);
            let (mv, value) = alphabeta(&board, Player::One, &moves, &config).unwrap();
            assert_eq!(mv, Some(pos(1, 0)), "depth={depth}");
            assert_eq!(value, WIN);
            assert_eq!(minimax(&board, Player::One, &moves, &config).unwrap(), (mv, value));
        }
    }

    #[test]
    fn sees_forced_loss() {
        // o threatens both ends, one can only block one of them
        let board = Connect4::parse(
            r#"
            . . . . . . .
            . . . . . . .
            . . . . . . .
            . . . . . . .
            . . x . x . .
            . . o o o . ."#,
        )
        .unwrap();
        let moves = board.legal_moves(Player::One);
        let config = SearchConfig::new(2, &CenterH);
        let (mv, value) = alphabeta(&board, Player::One, &moves, &config).unwrap();
        assert!(mv.is_some());
        // o wins with its first reply
        assert_eq!(value, LOSS + 1.0);
    }

    #[test]
    fn illegal_root_move_is_an_error() {
        let game = Othello::new();
        let config = SearchConfig::new(2, &DiscH);
        assert!(matches!(
            alphabeta(&game, Player::One, &[pos(0, 0)], &config),
            Err(GameError::IllegalMove { .. })
        ));
    }
}
