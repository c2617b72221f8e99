//! Command-line interface and REPL
//!
//! Stands in for the sliders: each `set` moves a control, updates its
//! readout, and hands the message to the connection.

use anyhow::{Context, Result};
use colored::*;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::config::AppConfig;
use crate::connection::{ConnectionHandle, ConnectionState};
use crate::control::{Control, ControlBank, HrccValue};
use crate::midi::{format_hex, hrcc_pair};

/// A parsed REPL line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Set { control: String, value: HrccValue },
    Status,
    Controls,
    Help,
    Quit,
    Empty,
}

/// Parse one input line
///
/// Accepts `set <control> <value>` and the shorthand `<control> <value>`.
pub fn parse_command(line: &str) -> Result<ReplCommand> {
    let parts: Vec<&str> = line.split_whitespace().collect();

    let cmd = match parts.as_slice() {
        [] => ReplCommand::Empty,
        ["quit"] | ["exit"] => ReplCommand::Quit,
        ["help"] | ["?"] => ReplCommand::Help,
        ["status"] => ReplCommand::Status,
        ["controls"] | ["ls"] => ReplCommand::Controls,
        ["set", control, value] | [control, value] => ReplCommand::Set {
            control: control.to_string(),
            value: value.parse()?,
        },
        _ => anyhow::bail!("unrecognised command '{}' (try 'help')", line.trim()),
    };

    Ok(cmd)
}

/// Run the interactive loop until `quit` or end of input
///
/// Blocking: call from `spawn_blocking` or a plain thread.
pub fn run_repl(handle: ConnectionHandle, mut bank: ControlBank, config: &AppConfig) -> Result<()> {
    let mut rl = DefaultEditor::new().context("Failed to initialise line editor")?;

    println!("{}", "=== HiRes CC Slider ===".bold().cyan());
    print_controls(&bank, config);
    println!("Type 'help' for commands\n");

    loop {
        let line = match rl.readline("hrcc> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e).context("Failed to read input"),
        };
        let _ = rl.add_history_entry(line.as_str());

        let cmd = match parse_command(&line) {
            Ok(cmd) => cmd,
            Err(e) => {
                println!("{} {}", "error:".red(), e);
                continue;
            }
        };

        match cmd {
            ReplCommand::Empty => {}
            ReplCommand::Quit => break,
            ReplCommand::Help => print_help(),
            ReplCommand::Controls => print_controls(&bank, config),
            ReplCommand::Status => match handle.blocking_status() {
                Some(status) => println!(
                    "{} {} ({} pending)",
                    status.url.white(),
                    format_state(status.state),
                    status.pending
                ),
                None => println!("{}", "connection stopped".red()),
            },
            ReplCommand::Set { control, value } => match bank.set(&control, value) {
                Ok(message) => {
                    if let Some(c) = bank.get(&control) {
                        println!("{}", format_control(c, config));
                    }
                    handle.submit(message);
                }
                Err(e) => println!("{} {}", "error:".red(), e),
            },
        }
    }

    Ok(())
}

fn format_state(state: ConnectionState) -> ColoredString {
    match state {
        ConnectionState::Open => state.to_string().green(),
        ConnectionState::Connecting => state.to_string().yellow(),
        ConnectionState::Closed => state.to_string().red(),
        ConnectionState::Uninitialized => state.to_string().dimmed(),
    }
}

/// Readout line, with the CC pair the device would emit when mapped
fn format_control(control: &Control, config: &AppConfig) -> String {
    let mut line = format!("  {}", control.to_string().bold());
    if let Some(cfg) = config.control(control.name()) {
        if let Some(cc) = cfg.cc {
            let [msb, lsb] = hrcc_pair(cfg.channel, cc, control.value());
            let bytes: Vec<u8> = msb.encode().into_iter().chain(lsb.encode()).collect();
            line.push_str(&format!(" {}", format!("[{}]", format_hex(&bytes)).dimmed()));
        }
    }
    line
}

fn print_controls(bank: &ControlBank, config: &AppConfig) {
    for control in bank.iter() {
        println!("{}", format_control(control, config));
    }
}

fn print_help() {
    println!("{}", "Commands:".bold());
    println!("  set <control> <0-16383>   move a slider (or just '<control> <value>')");
    println!("  controls                  show current values");
    println!("  status                    show connection state");
    println!("  quit                      exit");
}
