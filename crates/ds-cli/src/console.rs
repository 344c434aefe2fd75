//! Console input with non-interactive fallbacks.
//!
//! When stdin is not a TTY (or hits EOF), every prompt returns its
//! default so scripted runs never block. This mirrors how the game is
//! launched from wrappers and tests.

use std::io::{self, BufRead, Write};

pub struct Console {
    interactive: bool,
}

impl Console {
    /// Detect interactivity from stdin.
    pub fn auto() -> Self {
        Self {
            interactive: atty::is(atty::Stream::Stdin),
        }
    }

    /// Force a mode (used by tests and `--load` scripting).
    pub fn with_interactive(interactive: bool) -> Self {
        Self { interactive }
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Read one trimmed line, or `""` when non-interactive / EOF.
    pub fn line(&mut self, prompt: &str) -> String {
        if !self.interactive {
            return String::new();
        }
        print!("{prompt}");
        let _ = io::stdout().flush();
        let mut buf = String::new();
        match io::stdin().lock().read_line(&mut buf) {
            Ok(0) => {
                // stdin closed mid-run: fall back to defaults from here on.
                self.interactive = false;
                String::new()
            }
            Ok(_) => buf.trim().to_string(),
            Err(_) => {
                self.interactive = false;
                String::new()
            }
        }
    }

    /// Prompt for an integer in `lo..=hi`, re-asking on bad input.
    pub fn prompt_int(&mut self, prompt: &str, lo: i64, hi: i64, default: i64) -> i64 {
        loop {
            if !self.interactive {
                return default.clamp(lo, hi);
            }
            let text = self.line(prompt);
            if text.is_empty() && !self.interactive {
                return default.clamp(lo, hi);
            }
            if let Ok(v) = text.parse::<i64>() {
                if (lo..=hi).contains(&v) {
                    return v;
                }
            }
            println!("Enter a number between {lo} and {hi}.");
        }
    }

    /// Numbered menu; returns the chosen index (0-based).
    pub fn prompt_choice(&mut self, prompt: &str, options: &[&str], default: usize) -> usize {
        if self.interactive {
            println!("{prompt}");
            for (i, opt) in options.iter().enumerate() {
                println!("  {}. {opt}", i + 1);
            }
        }
        (self.prompt_int("Select: ", 1, options.len() as i64, default as i64 + 1) - 1) as usize
    }

    /// y/N style confirmation.
    pub fn confirm(&mut self, prompt: &str, default: bool) -> bool {
        if !self.interactive {
            return default;
        }
        let answer = self.line(prompt).to_lowercase();
        if answer.is_empty() {
            default
        } else {
            answer.starts_with('y')
        }
    }

    /// "Press Enter to continue" pause; a no-op when non-interactive.
    pub fn pause(&mut self, prompt: &str) {
        if self.interactive {
            let _ = self.line(prompt);
        }
    }
}
