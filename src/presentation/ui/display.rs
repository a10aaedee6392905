use colored::{Color, Colorize};
use console::Term;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::application::services::events::{PoolEvent, ProgressObserver};
use crate::application::use_cases::MigrationReport;
use crate::domain::entities::migration_settings::ProxySettings;
use crate::domain::value_objects::host_target::HostTarget;

const SPINNER_TICKS: &[&str] = &["⠁", "⠂", "⠄", "⡀", "⢀", "⠠", "⠐", "⠈"];

/// Display utilities for the CLI interface
#[derive(Debug, Clone)]
pub struct DisplayHelper {
    pub use_color: bool,
    pub terminal: Term,
}

impl DisplayHelper {
    /// Create a new DisplayHelper
    pub fn new(use_color: bool) -> Self {
        Self {
            use_color,
            terminal: Term::stdout(),
        }
    }

    /// Whether animated output (the spinner) should be drawn
    pub fn is_interactive(&self) -> bool {
        self.use_color && self.terminal.is_term()
    }

    pub fn success(&self, message: &str) {
        self.print_status(StatusType::Success, message);
    }

    pub fn warning(&self, message: &str) {
        self.print_status(StatusType::Warning, message);
    }

    pub fn info(&self, message: &str) {
        self.print_status(StatusType::Info, message);
    }

    /// Print a section header
    pub fn section_header(&self, title: &str) {
        if self.use_color {
            println!("\n{}", title.bold().underline());
        } else {
            println!("\n=== {} ===", title);
        }
    }

    /// Format a file path with appropriate styling
    pub fn format_path(&self, path: &str) -> String {
        if self.use_color {
            path.cyan().to_string()
        } else {
            format!("'{}'", path)
        }
    }

    /// Format a repository name with appropriate styling
    pub fn format_repo(&self, repo: &str) -> String {
        if self.use_color {
            repo.cyan().bold().to_string()
        } else {
            repo.to_string()
        }
    }

    /// Create a spinner for the worker pool
    ///
    /// The spinner is hidden when output is not interactive.
    pub fn create_spinner(&self, message: &str) -> ProgressBar {
        if !self.is_interactive() {
            return ProgressBar::with_draw_target(None, ProgressDrawTarget::hidden());
        }

        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_strings(SPINNER_TICKS)
            .template("{spinner:.green} {msg}")
        {
            pb.set_style(style);
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    }

    /// Print a status line. Errors go to stderr.
    pub fn print_status(&self, status: StatusType, message: &str) {
        let line = self.status_line(status, message);
        if status == StatusType::Error {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }

    fn status_line(&self, status: StatusType, message: &str) -> String {
        if self.use_color {
            let (icon, color) = status.icon();
            format!("{} {}", icon.color(color).bold(), message)
        } else {
            format!("{} {}", status.label(), message)
        }
    }

    /// Format a duration in human-readable format
    pub fn format_duration(&self, duration: Duration) -> String {
        let secs = duration.as_secs();
        let millis = duration.subsec_millis();

        if secs >= 60 {
            format!("{}m {}s", secs / 60, secs % 60)
        } else if secs > 0 {
            format!("{}.{}s", secs, millis / 100)
        } else {
            format!("{}ms", millis)
        }
    }

    /// Print the run banner: phase, target host and proxy status
    ///
    /// Proxy credentials are masked.
    pub fn print_banner(&self, phase: &str, host: &HostTarget, proxy: &ProxySettings) {
        self.section_header(phase);
        if host.is_enterprise() {
            self.info(&format!("Using GitHub Enterprise Server: {}", host.api_url()));
        } else {
            self.info("Using GitHub.com");
        }

        if proxy.is_configured() {
            let proxy = proxy.redacted();
            if let Some(http) = &proxy.http_proxy {
                self.info(&format!("HTTP proxy: {}", http));
            }
            if let Some(https) = &proxy.https_proxy {
                self.info(&format!("HTTPS proxy: {}", https));
            }
            if let Some(no_proxy) = &proxy.no_proxy {
                self.info(&format!("No proxy: {}", no_proxy));
            }
        }
    }

    /// Print the summary of a finished phase
    pub fn print_report(&self, report: &MigrationReport, show_work_dir: bool) {
        let mut items = vec![
            (
                "Repositories processed".to_string(),
                report.outcome.processed.to_string(),
            ),
            (
                "Repositories failed".to_string(),
                report.outcome.failed.to_string(),
            ),
        ];
        if !report.enqueue.duplicates.is_empty() {
            items.push((
                "Duplicates skipped".to_string(),
                report.enqueue.duplicates.len().to_string(),
            ));
        }
        if show_work_dir {
            items.push((
                "Output directory".to_string(),
                self.format_path(&report.work_dir.display().to_string()),
            ));
        }
        items.push((
            "Total time".to_string(),
            self.format_duration(report.outcome.elapsed),
        ));

        self.print_summary("Summary", &items);

        if report.has_failures() {
            self.warning(&format!(
                "{} of {} repositories failed",
                report.outcome.failed,
                report.outcome.total()
            ));
        } else {
            self.success("All repositories processed successfully");
        }
    }

    /// Print a summary box
    pub fn print_summary(&self, title: &str, items: &[(String, String)]) {
        if self.use_color {
            println!("\n┌─ {} ─┐", title.bold());
            for (key, value) in items {
                println!("│ {}: {}", key.bold(), value);
            }
            println!("└{:─<width$}┘", "", width = title.len() + 4);
        } else {
            println!("\n=== {} ===", title);
            for (key, value) in items {
                println!("{}: {}", key, value);
            }
        }
    }
}

/// Status types for display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusType {
    Success,
    Error,
    Warning,
    Info,
    Working,
}

impl StatusType {
    fn icon(self) -> (&'static str, Color) {
        match self {
            StatusType::Success => ("✓", Color::Green),
            StatusType::Error => ("✗", Color::Red),
            StatusType::Warning => ("⚠", Color::Yellow),
            StatusType::Info => ("::", Color::Blue),
            StatusType::Working => ("→", Color::Cyan),
        }
    }

    fn label(self) -> &'static str {
        match self {
            StatusType::Success => "[OK]",
            StatusType::Error => "[ERROR]",
            StatusType::Warning => "[WARN]",
            StatusType::Info => "[INFO]",
            StatusType::Working => "[WORK]",
        }
    }
}

/// Prints worker pool events to the terminal
///
/// Lines are printed above the spinner while it is drawn.
pub struct ConsoleObserver {
    display: DisplayHelper,
    spinner: ProgressBar,
    verbose: bool,
    finished: AtomicUsize,
}

impl ConsoleObserver {
    pub fn new(display: DisplayHelper, verbose: bool) -> Self {
        let spinner = display.create_spinner("Starting workers...");
        Self {
            display,
            spinner,
            verbose,
            finished: AtomicUsize::new(0),
        }
    }

    /// Number of jobs that have finished, successfully or not
    pub fn finished(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }

    fn emit(&self, status: StatusType, message: &str) {
        if self.spinner.is_hidden() {
            self.display.print_status(status, message);
        } else {
            self.spinner
                .suspend(|| self.display.print_status(status, message));
        }
    }

    fn progress(&self) -> String {
        format!("[{} done]", self.finished())
    }
}

impl ProgressObserver for ConsoleObserver {
    fn on_event(&self, event: &PoolEvent) {
        match event {
            PoolEvent::DuplicateSkipped { name } => {
                if self.verbose {
                    self.emit(
                        StatusType::Info,
                        &format!("Skipping duplicate repository {}", name),
                    );
                }
            }
            PoolEvent::JobStarted { name, worker } => {
                self.spinner.set_message(format!(
                    "{} worker {} processing {}",
                    self.progress(),
                    worker,
                    name
                ));
                if self.verbose {
                    self.emit(
                        StatusType::Working,
                        &format!("worker {} started {}", worker, name),
                    );
                }
            }
            PoolEvent::JobSucceeded { name, outcome, .. } => {
                self.finished.fetch_add(1, Ordering::SeqCst);
                self.emit(
                    StatusType::Success,
                    &format!("{} {}", outcome, self.display.format_repo(name)),
                );
            }
            PoolEvent::JobFailed { name, error, .. } => {
                self.finished.fetch_add(1, Ordering::SeqCst);
                self.emit(
                    StatusType::Error,
                    &format!("Error processing {}: {}", name, error),
                );
            }
            PoolEvent::PoolFinished { .. } => {
                self.spinner.finish_and_clear();
            }
        }
    }
}
