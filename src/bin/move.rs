use std::fs::File;
use std::path::PathBuf;

use clap::Parser;
use log::{error, info};

use gambit::agents::Agent;
use gambit::env::{GameKind, MoveRequest};
use gambit::game::{Connect4, Othello};
use gambit::logging;

#[derive(Parser)]
#[command(name = "gambit move", about = "Select a move for a board.")]
struct Opts {
    /// Agent configuration, overrides the one of the request.
    #[arg(long)]
    config: Option<Agent>,
    /// File containing the JSON move request.
    #[arg(long, conflicts_with = "request")]
    file: Option<PathBuf>,
    /// JSON move request.
    #[arg(value_parser = parse_request)]
    request: Option<MoveRequest>,
}

fn parse_request(s: &str) -> Result<MoveRequest, serde_json::Error> {
    serde_json::from_str(s)
}

fn read_request(opts: &Opts) -> Result<MoveRequest, String> {
    match (&opts.request, &opts.file) {
        (Some(request), _) => Ok(request.clone()),
        (None, Some(file)) => {
            let file = File::open(file).map_err(|e| format!("{}: {e}", file.display()))?;
            serde_json::from_reader(file).map_err(|e| e.to_string())
        }
        (None, None) => Err("either a request or --file is required".into()),
    }
}

fn main() {
    logging();

    let opts = Opts::parse();
    let mut request = match read_request(&opts) {
        Ok(request) => request,
        Err(e) => {
            error!("Invalid request: {e}");
            std::process::exit(2);
        }
    };
    if let Some(config) = opts.config {
        request.agent = Some(config);
    }

    match request.game {
        GameKind::Connect4 => info!("{:?}", Connect4::from_data(&request.board)),
        GameKind::Othello => info!("{:?}", Othello::from_data(&request.board)),
    }

    match request.agent().select_move(&request) {
        Ok(response) => {
            info!("Step: {response:?}");
            println!("{}", serde_json::to_string(&response).unwrap_or_default());
        }
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    }
}
