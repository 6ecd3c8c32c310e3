// Simple command-line application to play chess
//
// Enter moves as two squares, e.g. `e2 e4`. Other commands: `undo`, `new`, `moves <square>`
// and `quit`. An optional argument names a layout file to start from.

use gambit::{board::PrettyStyle, Game, Layout, MoveOutcome, PieceKind, Square};
use std::env;
use std::io::{self, BufRead, Write};
use std::process;

fn read_line(stdin: &mut impl BufRead) -> Option<String> {
    let mut s = String::new();
    match stdin.read_line(&mut s).unwrap() {
        0 => None,
        _ => Some(s.trim().to_string()),
    }
}

fn start_layout() -> Layout {
    match env::args().nth(1) {
        Some(path) => Layout::load(&path).unwrap_or_else(|e| {
            eprintln!("Cannot load {}: {}", path, e);
            process::exit(1);
        }),
        None => Layout::initial(),
    }
}

fn parse_move(s: &str) -> Option<(Square, Square)> {
    let mut it = s.split_ascii_whitespace();
    let src = it.next()?.parse().ok()?;
    let dst = it.next()?.parse().ok()?;
    match it.next() {
        Some(_) => None,
        None => Some((src, dst)),
    }
}

fn main() {
    let mut stdin = io::stdin().lock();

    let layout = start_layout();
    let mut game = Game::from_layout(layout).unwrap_or_else(|e| {
        eprintln!("Bad layout: {}", e);
        process::exit(1);
    });

    loop {
        println!("{}", game.board().pretty(PrettyStyle::Ascii));
        if let Some(winner) = game.winner() {
            println!("Checkmate! {} wins.", winner.name());
        } else if !game.has_legal_moves() {
            println!("Stalemate.");
        } else if game.is_check() {
            println!("Check!");
        }

        print!("{} move ({}): ", game.side().name(), game.len() + 1);
        io::stdout().flush().unwrap();
        let Some(s) = read_line(&mut stdin) else {
            break;
        };

        match s.as_str() {
            "quit" => break,
            "undo" => {
                if game.undo_last().is_none() {
                    println!("Nothing to undo");
                }
                println!();
                continue;
            }
            "new" => {
                if let Err(e) = game.new_game(start_layout()) {
                    println!("Bad layout: {}", e);
                }
                println!();
                continue;
            }
            _ => {}
        }

        if let Some(sq) = s.strip_prefix("moves ") {
            match sq.trim().parse::<Square>() {
                Ok(sq) => {
                    let dsts: Vec<_> = game
                        .legal_destinations(sq)
                        .into_iter()
                        .map(|d| d.to_string())
                        .collect();
                    println!("{}: {}", sq, dsts.join(" "));
                }
                Err(e) => println!("Bad square: {}", e),
            }
            println!();
            continue;
        }

        let Some((src, dst)) = parse_move(&s) else {
            println!("Bad move: expected two squares, like `e2 e4`");
            println!();
            continue;
        };

        let mut outcome = game.submit_move(src, dst);
        while let MoveOutcome::PendingPromotion(handle) = outcome {
            print!("Promote to (q, n, r, b): ");
            io::stdout().flush().unwrap();
            let Some(s) = read_line(&mut stdin) else {
                return;
            };
            let kind = s.parse::<PieceKind>().unwrap_or(PieceKind::Pawn);
            outcome = match game.resolve_promotion(handle, kind) {
                Ok(outcome) => outcome,
                Err(e) => {
                    println!("Bad choice: {}", e);
                    MoveOutcome::PendingPromotion(handle)
                }
            };
        }

        if let MoveOutcome::Rejected(reason) = outcome {
            println!("Bad move: {}", reason);
        }
        println!();
    }
}
