use std::io::{self, BufRead, Write};

use secq_logging::secq_warn;

use super::Surface;

/// Draws pages on stdout; alerts and prompts go to stderr.
pub struct TerminalSurface {
    assume_yes: bool,
}

impl TerminalSurface {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Surface for TerminalSurface {
    fn render(&mut self, lines: &[String]) {
        let mut out = io::stdout().lock();
        for line in lines {
            let _ = writeln!(out, "{line}");
        }
        let _ = writeln!(out);
    }

    fn alert(&mut self, message: &str) {
        eprintln!("! {message}");
    }

    fn confirm(&mut self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        eprint!("{prompt} [y/N] ");
        let _ = io::stderr().flush();
        let mut answer = String::new();
        if let Err(err) = io::stdin().lock().read_line(&mut answer) {
            secq_warn!("Could not read confirmation: {}", err);
            return false;
        }
        is_yes(&answer)
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
