use crate::core::data::{RepositorySummary, Submission, SyncOutcome, SyncSummary};
use crate::utils::format::{format_epoch, format_local, truncate_string};
use colored::*;

pub struct OutputStyle;

impl OutputStyle {
    pub fn command(text: &str) -> ColoredString {
        text.bright_yellow()
    }

    pub fn content(text: &str) -> ColoredString {
        text.clear()
    }

    pub fn title(text: &str) -> ColoredString {
        text.bright_blue().bold()
    }

    pub fn header(text: &str) -> ColoredString {
        text.bold()
    }

    pub fn label(text: &str) -> ColoredString {
        text.cyan()
    }

    pub fn success(text: &str) -> ColoredString {
        text.green()
    }

    pub fn error(text: &str) -> ColoredString {
        text.red()
    }

    pub fn warning(text: &str) -> ColoredString {
        text.yellow()
    }

    pub fn info(text: &str) -> ColoredString {
        text.blue()
    }

    pub fn muted(text: &str) -> ColoredString {
        text.dimmed()
    }

    /// Verdict colored the way the judge shows it.
    pub fn verdict(result: &str) -> ColoredString {
        match result {
            "AC" => result.green().bold(),
            "WJ" | "WR" => result.dimmed(),
            r if r.chars().all(|c| c.is_ascii_digit() || c == '/' || c == ' ') => result.dimmed(),
            _ => result.yellow().bold(),
        }
    }

    pub fn separator() -> String {
        "─".repeat(50)
    }

    pub fn header_separator() -> String {
        "═".repeat(50)
    }

    pub fn print_header(title: &str) {
        println!("{}", Self::title(title));
        println!("{}", Self::header_separator());
    }

    pub fn print_field_colored(label: &str, value: &str, color_fn: impl Fn(&str) -> ColoredString) {
        println!("{:>16}: {}", Self::label(label), color_fn(value));
    }

    pub fn field_line(label: &str, value: &str) -> String {
        format!("{:>16}: {}", Self::label(label), value)
    }
}

/// One-line label of a submission: `[problem] - verdict`.
pub fn submission_label(submission: &Submission) -> String {
    format!("[{}] - {}", submission.problem_id, submission.result)
}

fn submission_icon(submission: &Submission) -> &'static str {
    if submission.is_accepted() { "✔" } else { "✘" }
}

/// Compact list: icon, label and local submission time.
pub fn render_simple(submissions: &[Submission]) -> String {
    let mut out = String::new();
    for submission in submissions {
        let icon = if submission.is_accepted() {
            OutputStyle::success(submission_icon(submission))
        } else {
            OutputStyle::warning(submission_icon(submission))
        };
        out.push_str(&format!(
            "{} [{}] - {}  {}\n",
            icon,
            submission.problem_id,
            OutputStyle::verdict(&submission.result),
            OutputStyle::muted(&format_local(&submission.submitted_at()))
        ));
    }
    out
}

/// Full details for each submission.
pub fn render_detailed(submissions: &[Submission]) -> String {
    let mut out = String::new();
    for (i, submission) in submissions.iter().enumerate() {
        if i > 0 {
            out.push_str(&format!("{}\n", OutputStyle::muted(&OutputStyle::separator())));
        }
        out.push_str(&format!("{}\n", OutputStyle::header(&submission_label(submission))));
        out.push_str(&format!("{}\n", OutputStyle::field_line("Contest", &submission.contest_id)));
        out.push_str(&format!("{}\n", OutputStyle::field_line("Problem", &submission.problem_id)));
        out.push_str(&format!(
            "{}\n",
            OutputStyle::field_line("Result", &OutputStyle::verdict(&submission.result).to_string())
        ));
        out.push_str(&format!("{}\n", OutputStyle::field_line("Language", &submission.language)));
        out.push_str(&format!("{}\n", OutputStyle::field_line("Point", &submission.point.to_string())));
        let execution = submission
            .execution_time
            .map(|ms| format!("{} [ms]", ms))
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!("{}\n", OutputStyle::field_line("Execution time", &execution)));
        out.push_str(&format!(
            "{}\n",
            OutputStyle::field_line("Submitted at", &format_local(&submission.submitted_at()))
        ));
    }
    out
}

pub fn render_repositories(repos: &[RepositorySummary]) -> String {
    let mut out = String::new();
    for (i, repo) in repos.iter().enumerate() {
        let visibility = if repo.private { "private" } else { "public" };
        let description = repo
            .description
            .as_deref()
            .map(|d| truncate_string(d, 50))
            .unwrap_or_default();
        out.push_str(&format!(
            "{:>3}. {} {} {}\n",
            i + 1,
            OutputStyle::header(&repo.full_name),
            OutputStyle::muted(&format!("({})", visibility)),
            OutputStyle::content(&description)
        ));
    }
    out
}

fn print_summary_counts(summary: &SyncSummary) {
    OutputStyle::print_field_colored("Fetched", &summary.fetched.to_string(), OutputStyle::info);
    OutputStyle::print_field_colored("Accepted", &summary.accepted.to_string(), OutputStyle::info);
    OutputStyle::print_field_colored("Committed", &summary.committed.to_string(), OutputStyle::success);
    if summary.skipped > 0 {
        OutputStyle::print_field_colored("Skipped", &summary.skipped.to_string(), OutputStyle::warning);
        for skipped in &summary.skipped_details {
            println!(
                "    {} [{}] {} (#{}): {}",
                OutputStyle::warning("•"),
                skipped.contest_id,
                skipped.problem_id,
                skipped.id,
                OutputStyle::muted(&skipped.reason)
            );
        }
    }
    OutputStyle::print_field_colored("Synced up to", &format_epoch(summary.watermark), OutputStyle::muted);
}

pub fn print_sync_outcome(outcome: &SyncOutcome) {
    match outcome {
        SyncOutcome::NothingNew => {
            println!("✅ {}", OutputStyle::success("Nothing new to sync."));
        }
        SyncOutcome::NoAccepted(summary) => {
            println!(
                "ℹ️  {}",
                OutputStyle::info(&format!(
                    "Fetched {} submission(s), none accepted. Nothing to commit.",
                    summary.fetched
                ))
            );
            print_summary_counts(summary);
        }
        SyncOutcome::Committed(summary) => {
            if summary.skipped == 0 {
                println!("🎉 {}", OutputStyle::success("Sync completed successfully!"));
            } else {
                println!("⚠️  {}", OutputStyle::warning("Sync completed with skipped submissions."));
            }
            print_summary_counts(summary);
        }
    }
}
