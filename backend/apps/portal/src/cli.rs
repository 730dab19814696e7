//! Command line for the portal binary.
//!
//! With no subcommand the HTTP server starts.

use std::io::{self, BufRead};

use anyhow::Context;
use clap::{Parser, Subcommand};
use platform::password::{ClearTextPassword, generate_secure_password, validate_strength};

use crate::settings::password_pepper;

#[derive(Debug, Parser)]
#[command(name = "portal", about = "NFC access-control admin portal", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Option<Command>,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
pub(crate) enum Command {
    /// Start the HTTP server (default)
    Serve,
    /// Read a password from stdin and print its Argon2id PHC string
    HashPassword,
    /// Print a random password and its PHC string
    GeneratePassword,
}

/// `portal hash-password`
pub(crate) fn hash_password() -> anyhow::Result<()> {
    let hashed = hash_line(io::stdin().lock(), password_pepper().as_deref())?;
    println!("{hashed}");
    Ok(())
}

/// `portal generate-password`
pub(crate) fn generate_password() -> anyhow::Result<()> {
    let (password, hashed) = generate_secure_password(password_pepper().as_deref())?;
    println!("password: {}", password.expose());
    println!("hash:     {}", hashed.as_phc_string());
    Ok(())
}

/// Hash the first line of `input`, warning on stderr when it is weak.
fn hash_line(mut input: impl BufRead, pepper: Option<&[u8]>) -> anyhow::Result<String> {
    let mut line = String::new();
    input
        .read_line(&mut line)
        .context("Failed to read password from stdin")?;

    let password = ClearTextPassword::new(line.trim_end_matches(['\r', '\n']).to_owned())?;
    let strength = validate_strength(password.expose());
    if !strength.is_valid {
        eprintln!("warning: weak password (score {}/5)", strength.score);
        for hint in &strength.feedback {
            eprintln!("  - {hint}");
        }
    }

    Ok(password.hash(pepper)?.as_phc_string().to_owned())
}
