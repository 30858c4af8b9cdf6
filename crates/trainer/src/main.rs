//! Terminal front-end for the move trainer.
//!
//! Plays one card from the command line: moves are typed as `e2e4` (or
//! `e7e8q`), plus `undo`, `redo`, `reset`, `status`, `hint` and `quit`.
//! Host answers are printed as `pycmd:<command>`.

use std::io::{ErrorKind, Write};

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::Instant;
use tracing::info;

use move_trainer::board::BoardSink;
use move_trainer::bridge::HostChannel;
use move_trainer::feedback::{move_list, progress_label, render_move_list_text, FeedbackSink};
use move_trainer::{
    BridgeError, CardFields, DropOutcome, ExpectedMove, PendingReply, TrainerOptions,
    TrainerSession,
};

struct TerminalBoard;

impl BoardSink for TerminalBoard {
    fn set_position(&mut self, position: &str) {
        println!("position: {position}");
    }
}

struct TerminalFeedback;

impl FeedbackSink for TerminalFeedback {
    fn flash_wrong(&mut self, hint: Option<&ExpectedMove>) {
        match hint {
            Some(h) => println!("wrong move, expected {} -> {}", h.origin, h.destination),
            None => println!("wrong move"),
        }
    }

    fn progress(&mut self, step: usize, total: usize) {
        println!("{}", progress_label(step, total));
    }

    fn list_played(&mut self, sequence: &[String], step: usize) {
        println!("{}", render_move_list_text(&move_list(sequence, step)));
    }

    fn clear_annotations(&mut self) {}
}

struct StdoutChannel;

impl HostChannel for StdoutChannel {
    fn send(&mut self, command: &'static str) -> Result<(), BridgeError> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "pycmd:{command}").map_err(|e| match e.kind() {
            ErrorKind::BrokenPipe => BridgeError::Closed,
            _ => BridgeError::Command(command, e.to_string()),
        })
    }
}

struct Args {
    fen: String,
    moves: String,
    options: Option<String>,
}

/// Parse `--fen <pos> --moves <field> [--options <json>]` from CLI args
fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let value_of = |flag: &str| {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1))
            .cloned()
    };
    Args {
        fen: value_of("--fen").unwrap_or_default(),
        moves: value_of("--moves").unwrap_or_default(),
        options: value_of("--options"),
    }
}

/// `e2e4`, `e2-e4` or `e7e8q` into (source, target, promotion).
fn parse_drag(input: &str) -> Option<(String, String, Option<char>)> {
    let compact: String = input.chars().filter(|c| *c != '-').collect();
    if !(4..=5).contains(&compact.len()) || !compact.is_ascii() {
        return None;
    }
    let promotion = compact.chars().nth(4);
    Some((compact[0..2].to_string(), compact[2..4].to_string(), promotion))
}

type Session = TrainerSession<TerminalBoard, TerminalFeedback, StdoutChannel>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load .env file for local dev
    let _ = dotenvy::dotenv();

    let args = parse_args();
    let options = match &args.options {
        Some(raw) => TrainerOptions::from_json(raw)?,
        None => TrainerOptions::from_env()?,
    };

    let fields = CardFields::new(args.fen, args.moves);
    let mut session: Session = TrainerSession::init(
        &fields,
        options,
        TerminalBoard,
        TerminalFeedback,
        Some(StdoutChannel),
    )?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let reply_timer = tokio::time::sleep(std::time::Duration::ZERO);
    tokio::pin!(reply_timer);
    let mut pending: Option<PendingReply> = None;

    loop {
        tokio::select! {
            () = &mut reply_timer, if pending.is_some() => {
                if let Some(reply) = pending.take() {
                    if let Some(exp) = session.run_reply(&reply) {
                        println!("opponent: {} ({} -> {})", reply.notation, exp.origin, exp.destination);
                    }
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let command = line.trim();
                match command {
                    "" => {}
                    "quit" | "exit" => break,
                    "undo" => println!("undo: {}", session.undo()),
                    "redo" => println!("redo: {}", session.redo()),
                    "reset" => session.reset(),
                    "status" => println!("status: {}", session.status()),
                    "hint" => match session.engine().expected_move() {
                        Some(exp) => println!("hint: {} -> {}", exp.origin, exp.destination),
                        None => println!("hint: none"),
                    },
                    other => match parse_drag(other) {
                        Some((source, target, promotion)) => {
                            match session.handle_drop(&source, &target, promotion) {
                                DropOutcome::Snapback => {}
                                DropOutcome::Completed => println!("sequence complete"),
                                DropOutcome::Accepted(Some(reply)) => {
                                    reply_timer.as_mut().reset(Instant::now() + reply.delay);
                                    pending = Some(reply);
                                }
                                DropOutcome::Accepted(None) => {}
                            }
                        }
                        None => println!("unrecognized input '{other}'"),
                    },
                }
            }
        }
    }

    info!(
        step = session.engine().step(),
        total = session.engine().total(),
        answered = session.bridge().answered(),
        "Session finished"
    );
    Ok(())
}
