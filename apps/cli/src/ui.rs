use std::time::{Duration, Instant};

use console::style;
use indicatif::{ProgressBar, ProgressFinish, ProgressStyle};

pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.0}m {:.0}s", (secs / 60.0).floor(), secs % 60.0)
    }
}

fn create_spinner(msg: &str) -> ProgressBar {
    let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .map(|s| s.tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "))
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    let pb = ProgressBar::new_spinner()
        .with_style(spinner_style)
        .with_finish(ProgressFinish::AbandonWithMessage(
            format!("{} {}", style("✗").red().bold(), msg).into(),
        ));
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// A spinner line that turns into `✓ <summary> [elapsed]` when done.
/// Dropping it unfinished (on an error path) leaves a `✗` line.
pub struct Step {
    pb: ProgressBar,
    started: Instant,
}

impl Step {
    pub fn start(msg: &str) -> Self {
        Self {
            pb: create_spinner(msg),
            started: Instant::now(),
        }
    }

    pub fn done(self, summary: impl std::fmt::Display) {
        self.pb.finish_with_message(format!(
            "{} {} {}",
            style("✓").green().bold(),
            summary,
            style(format!("[{}]", format_duration(self.started.elapsed()))).dim()
        ));
    }
}

pub fn header(subtitle: &str) {
    println!(
        "\n{}  {}\n",
        style("konspekt").cyan().bold(),
        style(subtitle).dim()
    );
}

pub fn rule() {
    println!("{}", style("─".repeat(60)).dim());
}

pub fn ok(msg: impl std::fmt::Display) {
    println!("{} {}", style("✓").green().bold(), msg);
}

pub fn failed(msg: impl std::fmt::Display) {
    eprintln!("{} {}", style("✗").red().bold(), msg);
}
