//! Command-line access to the lookup services.
//!
//! Runs the same service functions the HTTP routes use, without starting a
//! server. With no subcommand it prompts on stdin for a command and, where
//! needed, its argument.

use clap::{Parser, Subcommand};
use serde_json::Value;
use std::io::{BufRead, Write};
use std::process::ExitCode;
use thiserror::Error;

use crate::services::{all_users, session_by_id, user_by_id};

#[derive(Parser, Debug)]
#[command(name = "anansys-cli")]
#[command(about = "Run Anansys services directly, without the API", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Fetch a player game session by its id
    GetSession { id: String },
    /// Fetch a single user by id
    GetUser { id: String },
    /// List all users
    GetAllUsers,
}

/// Name, description and whether an argument is needed, in menu order.
const MENU: [(&str, &str, bool); 3] = [
    ("get-session", "Fetches a player game session by its unique ID.", true),
    ("get-user", "Fetches a single user by their unique ID.", true),
    ("get-all-users", "Fetches a list of all users in the system.", false),
];

#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not encode result: {0}")]
    Json(#[from] serde_json::Error),

    #[error("input closed before a command was chosen")]
    Aborted,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::GetSession { .. } => "get-session",
            Command::GetUser { .. } => "get-user",
            Command::GetAllUsers => "get-all-users",
        }
    }

    fn from_menu(name: &str, arg: Option<String>) -> Option<Self> {
        match (name, arg) {
            ("get-session", Some(id)) => Some(Command::GetSession { id }),
            ("get-user", Some(id)) => Some(Command::GetUser { id }),
            ("get-all-users", _) => Some(Command::GetAllUsers),
            _ => None,
        }
    }

    /// Run the command. `Ok(None)` means it completed without a result.
    pub fn execute(&self) -> Result<Option<Value>, CliError> {
        let value = match self {
            Command::GetSession { id } => session_by_id(id).map(serde_json::to_value).transpose()?,
            Command::GetUser { id } => user_by_id(id).map(serde_json::to_value).transpose()?,
            Command::GetAllUsers => Some(serde_json::to_value(all_users())?),
        };
        Ok(value)
    }
}

/// Prompt for a command (by number or name) and its argument.
pub fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<Command, CliError> {
    writeln!(output, "Welcome to the Anansys CLI!")?;
    writeln!(output, "You can run services directly without using the API.\n")?;
    for (i, (name, description, _)) in MENU.iter().enumerate() {
        writeln!(output, "  {}. {name} - {description}", i + 1)?;
    }

    let (name, needs_arg) = loop {
        let answer = ask(input, output, "Which command would you like to run? ")?;
        let chosen = MENU.iter().enumerate().find(|(i, (name, _, _))| {
            answer == *name || answer.parse::<usize>().ok() == Some(i + 1)
        });
        match chosen {
            Some((_, (name, _, needs_arg))) => break (*name, *needs_arg),
            None => writeln!(output, "Unknown command '{answer}'.")?,
        }
    };

    let arg = if needs_arg {
        loop {
            let answer = ask(input, output, &format!("Please provide the argument for {name}: "))?;
            if !answer.is_empty() {
                break Some(answer);
            }
            writeln!(output, "This value cannot be empty.")?;
        }
    } else {
        None
    };

    Command::from_menu(name, arg).ok_or(CliError::Aborted)
}

fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> Result<String, CliError> {
    write!(output, "{question}")?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(CliError::Aborted);
    }
    Ok(line.trim().to_string())
}

/// Execute `command` and write the outcome to `out`.
pub fn report<W: Write>(command: &Command, out: &mut W) -> Result<(), CliError> {
    let name = command.name();
    match command.execute()? {
        Some(value) => {
            writeln!(out, "Command {name} finished successfully.")?;
            writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
        }
        None => writeln!(out, "Command {name} completed, but returned no result.")?,
    }
    Ok(())
}

/// Entry point for the `anansys-cli` binary.
pub fn run(cli: Cli) -> ExitCode {
    let command = match cli.command {
        Some(command) => command,
        None => {
            let stdin = std::io::stdin();
            match prompt(&mut stdin.lock(), &mut std::io::stdout()) {
                Ok(command) => command,
                Err(e) => {
                    eprintln!("{e}");
                    return ExitCode::FAILURE;
                }
            }
        }
    };

    match report(&command, &mut std::io::stdout()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Command {} failed.\n{e}", command.name());
            ExitCode::FAILURE
        }
    }
}
