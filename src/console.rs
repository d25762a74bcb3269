//! Optional prompt offering to open the broker's web console.

use std::io::{self, BufRead, Write};
use std::process::Command;

use anyhow::{Context, Result};
use tracing::warn;

const PROMPT: &str = "Would you like to monitor RabbitMQ queues? y or n ";

/// True if the answer means yes.
pub fn is_yes(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}

/// Ask the user whether to open the console. Returns their decision.
pub fn ask<R: BufRead, W: Write>(mut input: R, mut output: W) -> Result<bool> {
    write!(output, "{}", PROMPT)?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    writeln!(output)?;
    Ok(is_yes(&answer))
}

/// Ask on the terminal and open `url` if the user agrees.
///
/// A browser that fails to launch is logged and otherwise ignored.
pub fn offer(url: &str) -> Result<()> {
    let stdin = io::stdin();
    if ask(stdin.lock(), io::stdout())? {
        if let Err(e) = open_browser(url) {
            warn!("Could not open {}: {:#}", url, e);
        }
    }
    Ok(())
}

fn open_browser(url: &str) -> Result<()> {
    let mut command = if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut command = Command::new("cmd");
        command.args(["/C", "start", ""]);
        command
    } else {
        Command::new("xdg-open")
    };

    command
        .arg(url)
        .spawn()
        .with_context(|| format!("Failed to launch browser for {}", url))?;
    Ok(())
}
