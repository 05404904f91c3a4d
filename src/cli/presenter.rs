//! CLI presenter for output formatting

use std::io::{self, Write};
use std::time::Duration;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::domain::evaluation::{EvaluationResult, Followup};
use crate::domain::topic::{Mastery, MasteryBand, Topic, TopicSet};

/// Width of the mastery bar in cells
const BAR_WIDTH: usize = 20;

/// Leading glyph for a status line
#[derive(Clone, Copy)]
enum Mark {
    Info,
    Done,
    Warn,
    Failed,
}

impl Mark {
    fn glyph(self) -> ColoredString {
        match self {
            Self::Info => "ℹ".cyan(),
            Self::Done => "✓".green(),
            Self::Warn => "⚠".yellow(),
            Self::Failed => "✗".red(),
        }
    }

    fn line(self, message: &str) -> String {
        format!("{} {}", self.glyph(), message)
    }
}

/// Terminal output for the study commands.
/// Status lines go to stderr; command results go to stdout.
pub struct Presenter {
    spinner: Option<ProgressBar>,
}

impl Presenter {
    pub fn new() -> Self {
        Self { spinner: None }
    }

    /// Show a spinner while a remote call is outstanding
    pub fn busy(&mut self, message: &str) {
        let style = ProgressStyle::default_spinner()
            .tick_chars("◐◓◑◒ ")
            .template("{spinner:.magenta} {msg} {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        let bar = ProgressBar::new_spinner().with_style(style);
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(120));
        self.spinner = Some(bar);
    }

    fn settle(&mut self, mark: Option<Mark>, message: &str) {
        match (self.spinner.take(), mark) {
            (Some(bar), Some(mark)) => bar.finish_with_message(mark.line(message)),
            (Some(bar), None) => bar.finish_and_clear(),
            (None, _) => {}
        }
    }

    pub fn done(&mut self, message: &str) {
        self.settle(Some(Mark::Done), message);
    }

    pub fn failed(&mut self, message: &str) {
        self.settle(Some(Mark::Failed), message);
    }

    /// Drop the spinner without leaving a line behind
    pub fn idle(&mut self) {
        self.settle(None, "");
    }

    pub fn info(&self, message: &str) {
        eprintln!("{}", Mark::Info.line(message));
    }

    pub fn success(&self, message: &str) {
        eprintln!("{}", Mark::Done.line(message));
    }

    pub fn warn(&self, message: &str) {
        eprintln!("{}", Mark::Warn.line(message));
    }

    pub fn error(&self, message: &str) {
        eprintln!("{}", Mark::Failed.line(message));
    }

    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Prompt text without a trailing newline
    pub fn prompt(&self, text: &str) {
        print!("{}", text);
        let _ = io::stdout().flush();
    }

    /// Interim recognition text, shown on stderr and overwritten by the next line
    pub fn interim(&self, text: &str) {
        eprint!("\r{} {}", "…".dimmed(), text.dimmed());
        let _ = io::stderr().flush();
    }

    /// Format a mastery bar, e.g. `[██████░░░░░░░░░░░░░░] 30% Mastery`
    pub fn format_mastery(&self, mastery: Mastery) -> String {
        let filled = mastery_cells(mastery);
        let bar = "█".repeat(filled);
        let bar = match mastery.band() {
            MasteryBand::Weak => bar.red(),
            MasteryBand::Developing => bar.yellow(),
            MasteryBand::Strong => bar.green(),
        };
        format!(
            "[{}{}] {:>3}% Mastery",
            bar,
            "░".repeat(BAR_WIDTH - filled),
            mastery.value()
        )
    }

    /// List every topic with its mastery bar
    pub fn topic_list(&self, topics: &TopicSet) {
        if topics.is_empty() {
            self.info("No topics yet. Upload study material with `study-voice upload <file>`.");
            return;
        }
        let width = topics.iter().map(|t| t.name().chars().count()).max().unwrap_or(0);
        for topic in topics.iter() {
            let name = format!("{:<width$}", topic.name(), width = width);
            println!("{}  {}", name.bold(), self.format_mastery(topic.mastery()));
        }
    }

    /// Show a single topic's name, description and mastery
    pub fn topic_detail(&self, topic: &Topic) {
        println!("{}", topic.name().bold().cyan());
        if !topic.description().is_empty() {
            println!("{}", topic.description());
        }
        println!("{}", self.format_mastery(topic.mastery()));
    }

    /// Show an evaluation verdict and the resulting mastery
    pub fn verdict(&self, result: &EvaluationResult, mastery: Mastery) {
        println!("{} {}/100", "Score:".bold(), result.score);
        if !result.feedback.is_empty() {
            println!("{} {}", "Feedback:".bold(), result.feedback);
        }
        match &result.followup {
            Followup::Mastered => println!("{}", "Mastered! Nothing left to ask.".green().bold()),
            Followup::Prompt(question) => println!("{} {}", "Next:".bold().cyan(), question),
        }
        println!("{}", self.format_mastery(mastery));
    }

    /// Print a key-value pair (for config list)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

fn mastery_cells(mastery: Mastery) -> usize {
    usize::from(mastery.value()) * BAR_WIDTH / 100
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(presenter: &Presenter, value: i64) -> String {
        colored::control::set_override(false);
        presenter.format_mastery(Mastery::clamped(value))
    }

    #[test]
    fn mastery_cells_scale_to_bar_width() {
        assert_eq!(mastery_cells(Mastery::ZERO), 0);
        assert_eq!(mastery_cells(Mastery::clamped(30)), 6);
        assert_eq!(mastery_cells(Mastery::clamped(59)), 11);
        assert_eq!(mastery_cells(Mastery::clamped(100)), BAR_WIDTH);
    }

    #[test]
    fn format_mastery_at_zero() {
        let presenter = Presenter::new();
        let bar = plain(&presenter, 0);
        assert!(bar.contains(&"░".repeat(BAR_WIDTH)));
        assert!(bar.ends_with("0% Mastery"));
    }

    #[test]
    fn format_mastery_partial() {
        let presenter = Presenter::new();
        let bar = plain(&presenter, 75);
        assert!(bar.contains(&format!("{}{}", "█".repeat(15), "░".repeat(5))));
        assert!(bar.contains("75% Mastery"));
    }

    #[test]
    fn format_mastery_full() {
        let presenter = Presenter::new();
        let bar = plain(&presenter, 100);
        assert!(bar.contains(&"█".repeat(BAR_WIDTH)));
        assert!(!bar.contains('░'));
        assert!(bar.contains("100% Mastery"));
    }
}
