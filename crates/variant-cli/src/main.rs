//! Variant CLI - move generation, perft and play from the command line.
//!
//! Diagnostics go to stderr and are controlled with `RUST_LOG`, e.g.
//! `RUST_LOG=chess_variants=trace variant-cli -v suicide moves`.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use chess_core::UciMove;
use chess_variants::{
    perft, perft_divide, Game, GameConfig, GameMove, GameResult, GameStatus, Variant,
};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "variant-cli")]
#[command(about = "Move generation and play for chess variants")]
struct Cli {
    /// Rule set: classic or suicide
    #[arg(short, long, default_value = "classic", global = true)]
    variant: Variant,

    /// Starting position in FEN
    #[arg(long, global = true)]
    fen: Option<String>,

    /// Game setup file (TOML); replaces --variant and --fen
    #[arg(long, global = true, conflicts_with = "fen")]
    config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the legal moves in the starting position
    Moves,
    /// Count the leaf nodes of the legal move tree
    Perft {
        depth: u32,
        /// Show the count below each root move
        #[arg(long)]
        divide: bool,
    },
    /// Play moves in SAN or coordinate notation and report the outcome
    Play {
        moves: Vec<String>,
        /// Print the game as PGN
        #[arg(long)]
        pgn: bool,
    },
}

#[derive(Serialize)]
struct MoveJson {
    san: String,
    uci: String,
}

#[derive(Serialize)]
struct PlayJson<'a> {
    variant: Variant,
    fen: String,
    status: GameStatus,
    result: Option<GameResult>,
    moves: &'a [GameMove],
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();
    let mut game = build_game(&cli)?;
    tracing::info!(variant = %game.variant(), fen = %game.to_fen(), "starting position");

    match cli.command {
        Commands::Moves => {
            let position = game.position();
            let rules = game.rules();
            let legal = game.legal_moves();
            let moves: Vec<MoveJson> = legal
                .iter()
                .map(|&m| MoveJson {
                    san: chess_variants::move_to_san(position, rules, m),
                    uci: m.to_uci(),
                })
                .collect();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&moves)?);
            } else {
                for m in &moves {
                    println!("{:<8} {}", m.san, m.uci);
                }
                println!("{} legal moves", moves.len());
            }
        }
        Commands::Perft { depth, divide } => {
            let mut position = game.position().deep_copy(false);
            let rules = game.rules();
            let start = Instant::now();
            if divide {
                let results = perft_divide(&mut position, rules, depth);
                let total: u64 = results.iter().map(|(_, n)| n).sum();
                if cli.json {
                    println!("{}", serde_json::to_string_pretty(&results)?);
                } else {
                    for (m, nodes) in &results {
                        println!("{}: {}", m, nodes);
                    }
                    println!("\nNodes: {}", total);
                }
            } else {
                let nodes = perft(&mut position, rules, depth);
                if cli.json {
                    println!("{}", serde_json::json!({ "depth": depth, "nodes": nodes }));
                } else {
                    println!("Nodes: {}", nodes);
                }
            }
            tracing::info!(depth, elapsed_ms = start.elapsed().as_millis() as u64, "perft done");
        }
        Commands::Play { moves, pgn } => {
            for text in &moves {
                let played = if UciMove::parse(text).is_some() {
                    game.make_move_uci(text)
                } else {
                    game.make_move_san(text)
                };
                played.with_context(|| {
                    format!("cannot play {:?} after {} plies", text, game.ply_count())
                })?;
            }
            if cli.json {
                let report = PlayJson {
                    variant: game.variant(),
                    fen: game.to_fen(),
                    status: game.status(),
                    result: game.result(),
                    moves: game.move_history(),
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else if pgn {
                print!("{}", game.to_pgn());
            } else {
                println!("FEN: {}", game.to_fen());
                println!("Status: {:?}", game.status());
                if let Some(result) = game.result() {
                    println!("Result: {}", result);
                }
            }
        }
    }
    Ok(())
}

fn build_game(cli: &Cli) -> Result<Game> {
    let config = match &cli.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => GameConfig {
            variant: cli.variant,
            fen: cli.fen.clone(),
            ..GameConfig::default()
        },
    };
    Ok(config.into_game()?)
}
