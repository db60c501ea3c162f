//! Terminal output.
//!
//! In `--json` mode everything except [`Output::json`] and errors is
//! suppressed so stdout stays machine readable.

use std::fmt::Write as _;
use std::time::Duration;

use console::{style, StyledObject};
use indicatif::{ProgressBar, ProgressStyle};
use larek_storefront::{CardView, ItemAction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Info,
    Success,
    Warn,
    Error,
    Trace,
}

impl Tone {
    fn marker(self) -> StyledObject<&'static str> {
        match self {
            Tone::Info => style("ℹ").blue(),
            Tone::Success => style("✓").green(),
            Tone::Warn => style("⚠").yellow(),
            Tone::Error => style("✗").red(),
            Tone::Trace => style("→").dim(),
        }
    }

    fn to_stderr(self) -> bool {
        matches!(self, Tone::Warn | Tone::Error | Tone::Trace)
    }
}

/// Shared printer handed to every command.
#[derive(Debug, Clone)]
pub struct Output {
    verbose: bool,
    json: bool,
}

impl Output {
    pub fn new(verbose: bool, json: bool) -> Self {
        Self { verbose, json }
    }

    fn say(&self, tone: Tone, msg: &str) {
        if self.json {
            return;
        }
        let body = match tone {
            Tone::Error => style(msg).red().to_string(),
            Tone::Trace => style(msg).dim().to_string(),
            _ => msg.to_string(),
        };
        if tone.to_stderr() {
            eprintln!("{} {}", tone.marker(), body);
        } else {
            println!("{} {}", tone.marker(), body);
        }
    }

    pub fn info(&self, msg: &str) {
        self.say(Tone::Info, msg);
    }

    pub fn success(&self, msg: &str) {
        self.say(Tone::Success, msg);
    }

    pub fn warn(&self, msg: &str) {
        self.say(Tone::Warn, msg);
    }

    /// Errors are reported in JSON mode too, as `{"error": ...}` on stderr.
    pub fn error(&self, msg: &str) {
        if self.json {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        } else {
            self.say(Tone::Error, msg);
        }
    }

    /// Only shown with `--verbose`.
    pub fn debug(&self, msg: &str) {
        if self.verbose {
            self.say(Tone::Trace, msg);
        }
    }

    pub fn header(&self, title: &str) {
        if !self.json {
            println!("\n{}", style(title).bold().underlined());
        }
    }

    /// `[n/total] msg`
    pub fn step(&self, n: usize, total: usize, msg: &str) {
        if !self.json {
            println!("{} {}", style(format!("[{}/{}]", n, total)).dim(), msg);
        }
    }

    pub fn kv(&self, key: &str, value: &str) {
        if !self.json {
            println!("  {}: {}", style(key).dim(), value);
        }
    }

    pub fn list_item(&self, item: &str) {
        if !self.json {
            println!("  {} {}", style("•").dim(), item);
        }
    }

    /// Print one row of left-aligned, fixed-width columns.
    pub fn table_row(&self, cols: &[&str], widths: &[usize]) {
        if self.json {
            return;
        }
        let mut line = String::from(" ");
        for (col, width) in cols.iter().zip(widths) {
            let _ = write!(line, " {:<width$}", col, width = *width);
        }
        println!("{}", line.trim_end());
    }

    /// Pretty-printed JSON on stdout, regardless of mode.
    pub fn json<T: serde::Serialize>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(text) => println!("{}", text),
            Err(e) => self.error(&format!("Failed to encode output: {}", e)),
        }
    }

    /// Hidden in JSON mode.
    pub fn spinner(&self, msg: &str) -> ProgressBar {
        if self.json {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new_spinner().with_message(msg.to_string());
        if let Ok(template) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            bar.set_style(template);
        }
        bar.enable_steady_tick(Duration::from_millis(80));
        bar
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn is_json(&self) -> bool {
        self.json
    }
}

/// Action label colored by availability.
pub fn action_badge(action: ItemAction) -> String {
    match action {
        ItemAction::Add => style(action.label()).green().to_string(),
        ItemAction::Remove => style(action.label()).yellow().to_string(),
        ItemAction::Priceless => style(action.label()).dim().to_string(),
    }
}

/// One-line description of a card for menus.
pub fn card_line(card: &CardView) -> String {
    format!("{} ({}) [{}]", card.title, card.price_label, card.action.label())
}

/// Shorten a string to `max` characters, marking the cut.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}
