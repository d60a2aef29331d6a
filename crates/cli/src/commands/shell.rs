//! Line-oriented session: every command shares one store.
//!
//! Products created or edited in a session stay visible across later
//! listings even when the catalog service does not persist them.
//!
//! # Usage
//!
//! ```bash
//! printf 'create -t "Phone X" -p 199 -c smartphones\nlist\n' | vitrine shell
//! ```

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use vitrine_client::CatalogStore;

use super::{CommandError, Output};
use crate::Commands;

/// One line of input, parsed like the command line without the binary name.
#[derive(Parser)]
#[command(no_binary_name = true, name = "vitrine")]
struct Line {
    #[command(subcommand)]
    command: Commands,
}

/// Run commands read from stdin until end of input or `quit`.
///
/// A failing command is reported and the session continues.
pub async fn run(store: &CatalogStore, output: Output) -> Result<(), CommandError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if matches!(line, "quit" | "exit") {
            break;
        }

        let words = match split_words(line) {
            Ok(words) => words,
            Err(e) => {
                tracing::error!("{e}");
                continue;
            }
        };
        let command = match Line::try_parse_from(words) {
            Ok(parsed) => parsed.command,
            Err(e) => {
                // Help and usage text
                let _ = e.print();
                continue;
            }
        };

        if let Err(e) = crate::execute(store, command, output).await {
            tracing::error!("Command failed: {e}");
        }
    }

    tracing::debug!("Session ended");
    Ok(())
}

/// Split a line into words, honoring single and double quotes.
fn split_words(line: &str) -> Result<Vec<String>, CommandError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote = None;

    for c in line.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return Err(CommandError::Usage(format!("unterminated quote in: {line}")));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}
