//! Console output formatter for finished runs

use crate::progress::observer::notice_line;
use colored::Colorize;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use synod_application::{Engine, SessionStatus};
use synod_domain::envelope::signals::Verdict;
use synod_domain::{LogEntry, Mode, NoticeSeverity, Role};

/// Most recent warnings listed in the summary
const RECENT_ALERTS: usize = 10;

/// What the formatter needs to know about a run
#[derive(Debug, Clone, Copy)]
pub struct RunSummary<'a> {
    pub directive: &'a str,
    pub status: SessionStatus,
    pub tick: u64,
    pub max_ticks: u64,
    pub mode: Mode,
    pub log: &'a [LogEntry],
    /// Locations of delivered reports
    pub reports: &'a [String],
}

impl<'a> RunSummary<'a> {
    pub fn from_engine(engine: &'a Engine, reports: &'a [String]) -> Self {
        Self {
            directive: engine.directive(),
            status: engine.status(),
            tick: engine.tick(),
            max_ticks: engine.max_ticks(),
            mode: engine.mode(),
            log: engine.log(),
            reports,
        }
    }

    fn messages_by_origin(&self) -> BTreeMap<Role, usize> {
        let mut counts = BTreeMap::new();
        for envelope in self.log.iter().filter_map(LogEntry::as_message) {
            *counts.entry(envelope.origin()).or_insert(0) += 1;
        }
        counts
    }

    fn notice_counts(&self) -> (usize, usize, usize) {
        self.log
            .iter()
            .filter_map(LogEntry::as_notice)
            .fold((0, 0, 0), |(info, warn, crit), n| match n.severity {
                NoticeSeverity::Info => (info + 1, warn, crit),
                NoticeSeverity::Warning => (info, warn + 1, crit),
                NoticeSeverity::Critical => (info, warn, crit + 1),
            })
    }

    fn verdicts(&self) -> (usize, usize) {
        self.log
            .iter()
            .filter_map(LogEntry::as_message)
            .filter(|m| m.origin() == Role::Ethics)
            .filter_map(|m| m.signals().verdict)
            .fold((0, 0), |(pass, fail), verdict| match verdict {
                Verdict::Pass => (pass + 1, fail),
                Verdict::Fail => (pass, fail + 1),
            })
    }
}

/// Formats run results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Status, counts and recent alerts
    pub fn format(summary: &RunSummary<'_>) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Synod Run"));
        output.push('\n');
        output.push_str(&format!(
            "{} {}\n",
            "Directive:".cyan().bold(),
            summary.directive
        ));
        output.push_str(&format!(
            "{} {}   {} {}   {} {}/{}\n",
            "Mode:".cyan().bold(),
            summary.mode,
            "Status:".cyan().bold(),
            Self::status_label(summary.status),
            "Ticks:".cyan().bold(),
            summary.tick,
            summary.max_ticks
        ));

        let by_origin = summary.messages_by_origin();
        let total: usize = by_origin.values().sum();
        output.push_str(&Self::section_header(&format!("Messages ({})", total)));
        let mut ranked: Vec<(Role, usize)> = by_origin.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        for (role, count) in ranked {
            output.push_str(&format!("  {:<12} {}\n", role.as_str(), count));
        }

        let (pass, fail) = summary.verdicts();
        if pass + fail > 0 {
            output.push_str(&format!(
                "\n{} {} passed, {} failed\n",
                "Ethics:".cyan().bold(),
                pass.to_string().green(),
                fail.to_string().red()
            ));
        }

        let (info, warnings, critical) = summary.notice_counts();
        output.push_str(&Self::section_header(&format!(
            "Notices ({} info, {} warning, {} critical)",
            info, warnings, critical
        )));
        let alerts: Vec<String> = summary
            .log
            .iter()
            .filter_map(LogEntry::as_notice)
            .filter(|n| n.severity != NoticeSeverity::Info)
            .map(notice_line)
            .collect();
        for line in &alerts[alerts.len().saturating_sub(RECENT_ALERTS)..] {
            output.push_str(&format!("  {}\n", line));
        }

        if !summary.reports.is_empty() {
            output.push_str(&Self::section_header("Reports"));
            for report in summary.reports {
                output.push_str(&format!("  * {}\n", report));
            }
        }

        output.push_str(&Self::footer());
        output
    }

    /// Summary followed by the complete message log
    pub fn format_full(summary: &RunSummary<'_>) -> String {
        let mut output = Self::format(summary);
        output.push_str(&Self::section_header("Message Log"));
        for entry in summary.log {
            match entry {
                LogEntry::Message(envelope) => {
                    let text = envelope
                        .payload()
                        .get("summary")
                        .and_then(Value::as_str)
                        .unwrap_or("");
                    output.push_str(&format!(
                        "{} {}\n",
                        envelope.summary().yellow(),
                        Self::indent(text, "    ").trim_start()
                    ));
                }
                LogEntry::Notice(notice) => {
                    output.push_str(&format!("  {}\n", notice_line(notice)));
                }
            }
        }
        output
    }

    /// Format as JSON
    pub fn format_json(summary: &RunSummary<'_>) -> String {
        let (info, warnings, critical) = summary.notice_counts();
        let (pass, fail) = summary.verdicts();
        let messages: BTreeMap<&str, usize> = summary
            .messages_by_origin()
            .into_iter()
            .map(|(role, count)| (role.as_str(), count))
            .collect();
        let value = json!({
            "directive": summary.directive,
            "mode": summary.mode,
            "status": summary.status.as_str(),
            "tick": summary.tick,
            "max_ticks": summary.max_ticks,
            "messages": messages,
            "notices": { "info": info, "warning": warnings, "critical": critical },
            "ethics": { "pass": pass, "fail": fail },
            "reports": summary.reports,
        });
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
    }

    fn status_label(status: SessionStatus) -> colored::ColoredString {
        match status {
            SessionStatus::Stopped => status.as_str().green(),
            SessionStatus::Frozen => status.as_str().red(),
            _ => status.as_str().yellow(),
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
