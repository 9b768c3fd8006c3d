use std::time::Instant;

use clap::Parser;
use log::{error, info};
use owo_colors::OwoColorize;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use gambit::agents::Agent;
use gambit::env::{BoardData, GameKind, MoveRequest, MoveResponse, Pos};
use gambit::game::{Connect4, Game, GameError, Othello, Outcome, Player};
use gambit::logging;

#[derive(Parser)]
#[command(
    name = "gambit simulator",
    about = "Simulate games between different agents."
)]
struct Opts {
    /// Game that is played if no agent is given.
    #[arg(long, value_parser = parse_game, default_value = "connect4")]
    game: GameKind,
    #[arg(short, long, default_value_t = 1)]
    game_count: usize,
    /// Player two moves randomly.
    #[arg(short, long)]
    random: bool,
    #[arg(short, long)]
    verbose: bool,
    /// Seed for the random player.
    #[arg(long)]
    seed: Option<u64>,

    /// Agents of player one and two, the second defaults to the first.
    agents: Vec<Agent>,
}

fn parse_game(s: &str) -> Result<GameKind, serde_json::Error> {
    serde_json::from_value(serde_json::Value::String(s.into()))
}

/// Source of moves for one side.
enum Side {
    Agent(Agent),
    Random,
}

/// Connects a board to the move request protocol.
trait Board: Game {
    const KIND: GameKind;
    fn start() -> Self;
    fn data(&self) -> BoardData;
    fn decode(response: &MoveResponse) -> Option<Self::Move>;
}

impl Board for Connect4 {
    const KIND: GameKind = GameKind::Connect4;

    fn start() -> Self {
        Connect4::new()
    }
    fn data(&self) -> BoardData {
        BoardData::Flat(self.grid.to_flat())
    }
    fn decode(response: &MoveResponse) -> Option<usize> {
        response.column.map(|col| col as usize)
    }
}

impl Board for Othello {
    const KIND: GameKind = GameKind::Othello;

    fn start() -> Self {
        Othello::new()
    }
    fn data(&self) -> BoardData {
        BoardData::Flat(self.grid.to_flat())
    }
    fn decode(response: &MoveResponse) -> Option<Pos> {
        Some(Pos::new(response.row?, response.column?))
    }
}

fn side(player: Player) -> usize {
    match player {
        Player::One => 0,
        Player::Two => 1,
    }
}

/// Plays a game, passing when a side has no move, until nobody can move.
fn play_game<B: Board>(
    sides: &[Side; 2],
    rng: &mut SmallRng,
    verbose: bool,
) -> Result<Outcome, GameError> {
    let mut board = B::start();
    let mut turn = Player::One;

    if verbose {
        println!("init: {board:?}");
    }

    for ply in 0.. {
        if board.outcome() != Outcome::None {
            break;
        }
        let mv = match &sides[side(turn)] {
            Side::Agent(agent) => {
                let request = MoveRequest {
                    game: B::KIND,
                    player: turn,
                    board: board.data(),
                    agent: None,
                };
                B::decode(&agent.select_move(&request)?)
            }
            Side::Random => board.legal_moves(turn).choose(rng).copied(),
        };

        match mv {
            Some(mv) => board = board.apply(mv, turn)?,
            None if verbose => println!("{ply}: {turn:?} passes"),
            None => {}
        }
        if verbose {
            println!("{ply}: {board:?}");
        }
        turn = turn.opponent();
    }
    Ok(board.outcome())
}

fn main() {
    logging();

    let Opts {
        game,
        game_count,
        random,
        verbose,
        seed,
        agents,
    } = Opts::parse();

    let first = agents
        .first()
        .cloned()
        .unwrap_or_else(|| Agent::for_game(game));
    let second = agents.get(1).cloned().unwrap_or_else(|| first.clone());
    if first.game() != second.game() {
        error!("Agents play different games: {first} vs {second}");
        std::process::exit(2);
    }
    let game = first.game();
    info!("{game:?}: {first} vs {}", if random { "random".into() } else { second.to_string() });

    let sides = [
        Side::Agent(first),
        if random {
            Side::Random
        } else {
            Side::Agent(second)
        },
    ];
    let mut rng = match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };

    let start = Instant::now();
    let (mut wins, mut draws, mut losses) = (0, 0, 0);
    for i in 0..game_count {
        let outcome = match game {
            GameKind::Connect4 => play_game::<Connect4>(&sides, &mut rng, verbose),
            GameKind::Othello => play_game::<Othello>(&sides, &mut rng, verbose),
        };
        match outcome {
            Ok(Outcome::Winner(Player::One)) => wins += 1,
            Ok(Outcome::Winner(Player::Two)) => losses += 1,
            Ok(_) => draws += 1,
            Err(e) => {
                error!("Game {i} aborted: {e}");
                continue;
            }
        }
        println!(
            "{}: {} {}ms",
            "Finish Game".bright_green(),
            i,
            start.elapsed().as_millis()
        );
    }

    println!(
        "Result: {}/{}/{} of {}",
        wins.green(),
        draws.yellow(),
        losses.red(),
        game_count
    );
}
