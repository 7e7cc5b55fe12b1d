use super::{route::RouteSubcommand, stop::StopSubcommand};
use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::{BufRead, IsTerminal, Write};
use std::path::Path;
use transit_core::history::UndoOutcome;
use transit_core::session::Session;

/// One line of shell input.
#[derive(Parser)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand)]
enum ShellCommand {
    /// Manage the stop registry
    Stop {
        #[command(subcommand)]
        subcommand: StopSubcommand,
    },
    /// Manage routes and their stop sequences
    Route {
        #[command(subcommand)]
        subcommand: RouteSubcommand,
    },
    /// Reverse the most recent change made in this shell
    Undo,
    /// List undoable changes, newest first
    History,
    /// Leave the shell
    #[command(alias = "quit")]
    Exit,
}

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let mut session = Session::open(root).context("failed to open transit project")?;
    let stdin = std::io::stdin();
    let interactive = stdin.is_terminal();

    let mut lines = stdin.lock().lines();
    loop {
        if interactive {
            print!("transit> ");
            std::io::stdout().flush()?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let words = match split_words(line) {
            Ok(words) => words,
            Err(e) => {
                eprintln!("error: {e}");
                continue;
            }
        };
        let parsed = match ShellLine::try_parse_from(words) {
            Ok(parsed) => parsed,
            Err(e) => {
                // Help and usage text go through clap's own rendering.
                let _ = e.print();
                continue;
            }
        };

        match dispatch(&mut session, parsed.command, json) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Exit) => break,
            Err(e) => eprintln!("error: {e:#}"),
        }
    }
    Ok(())
}

enum Flow {
    Continue,
    Exit,
}

fn dispatch(session: &mut Session, command: ShellCommand, json: bool) -> anyhow::Result<Flow> {
    match command {
        ShellCommand::Stop { subcommand } => {
            let mutates = subcommand.mutates();
            super::stop::exec(session, subcommand, json)?;
            if mutates {
                session.save().context("failed to save transit data")?;
            }
        }
        ShellCommand::Route { subcommand } => {
            let mutates = subcommand.mutates();
            super::route::exec(session, subcommand, json)?;
            if mutates {
                session.save().context("failed to save transit data")?;
            }
        }
        ShellCommand::Undo => undo(session, json)?,
        ShellCommand::History => history(session, json)?,
        ShellCommand::Exit => return Ok(Flow::Exit),
    }
    Ok(Flow::Continue)
}

fn undo(session: &mut Session, json: bool) -> anyhow::Result<()> {
    let outcome = session.undo().context("undo failed")?;
    if outcome.is_success() {
        session.save().context("failed to save transit data")?;
    }

    if json {
        return print_json(&outcome.to_json());
    }
    match outcome {
        UndoOutcome::Undone(action) => println!("Undid {}.", action.kind()),
        UndoOutcome::Empty => println!("{}", transit_core::history::NOTHING_TO_UNDO),
    }
    Ok(())
}

fn history(session: &Session, json: bool) -> anyhow::Result<()> {
    let history = session.history();
    if json {
        let actions: Vec<_> = history.iter().collect();
        return print_json(&actions);
    }
    if history.is_empty() {
        println!("No actions recorded.");
        return Ok(());
    }
    let rows = history
        .iter()
        .enumerate()
        .map(|(i, a)| {
            vec![
                (i + 1).to_string(),
                a.kind().to_string(),
                a.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            ]
        })
        .collect();
    print_table(&["#", "ACTION", "RECORDED"], rows);
    Ok(())
}

/// Split a shell line on whitespace, keeping quoted runs together.
fn split_words(line: &str) -> anyhow::Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if let Some(q) = quote {
        anyhow::bail!("unterminated {q} quote");
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}
