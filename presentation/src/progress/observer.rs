//! Progress reporting for running sessions

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use synod_application::ports::report::ReportReason;
use synod_application::ports::session_observer::SessionObserver;
use synod_application::SessionStatus;
use synod_domain::{Envelope, NoticeSeverity, SystemNotice};

/// Renders the run as a tick progress bar; warnings and critical notices
/// are printed above the bar.
pub struct ProgressObserver {
    bar: ProgressBar,
}

impl ProgressObserver {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(Self::tick_style());
        bar.set_prefix("PLAYING");
        Self { bar }
    }

    fn tick_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionObserver for ProgressObserver {
    fn on_tick(&self, tick: u64, max_ticks: u64, envelope: &Envelope) {
        self.bar.set_length(max_ticks);
        self.bar.set_position(tick);
        self.bar.set_message(routing_line(envelope));
    }

    fn on_notice(&self, notice: &SystemNotice) {
        if notice.severity != NoticeSeverity::Info {
            self.bar.println(notice_line(notice));
        }
    }

    fn on_status(&self, status: SessionStatus) {
        match status {
            SessionStatus::Frozen => self.bar.set_prefix("FROZEN"),
            SessionStatus::Paused => self.bar.set_prefix("PAUSED"),
            SessionStatus::Playing => self.bar.set_prefix("PLAYING"),
            SessionStatus::Stopped => self.bar.finish_with_message("stopped".to_string()),
            SessionStatus::Idle => self.bar.reset(),
        }
    }

    fn on_report(&self, reason: ReportReason) {
        self.bar
            .println(format!("{} report requested: {}", "->".cyan(), reason));
    }
}

/// Plain line-per-event output (no fancy UI)
pub struct SimpleObserver;

impl SessionObserver for SimpleObserver {
    fn on_tick(&self, tick: u64, max_ticks: u64, envelope: &Envelope) {
        println!("[{}/{}] {}", tick, max_ticks, routing_line(envelope));
    }

    fn on_notice(&self, notice: &SystemNotice) {
        println!("  {}", notice_line(notice));
    }

    fn on_status(&self, status: SessionStatus) {
        println!("{} {}", "status".dimmed(), status);
    }
}

fn routing_line(envelope: &Envelope) -> String {
    let destinations: Vec<&str> = envelope.destinations().iter().map(|r| r.as_str()).collect();
    format!("{} -> {}", envelope.origin(), destinations.join(", "))
}

pub(crate) fn notice_line(notice: &SystemNotice) -> String {
    let label = format!("[{}]", notice.kind);
    let label = match notice.severity {
        NoticeSeverity::Info => label.dimmed(),
        NoticeSeverity::Warning => label.yellow(),
        NoticeSeverity::Critical => label.red().bold(),
    };
    format!("t{} {} {}", notice.tick, label, notice.text)
}
