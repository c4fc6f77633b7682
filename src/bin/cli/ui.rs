use clap::ValueEnum;
use indicatif::{ProgressBar, ProgressStyle};
use nu_ansi_term::{Color, Style};
use std::fmt::Display;
use std::io::IsTerminal;
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum Theme {
    Auto,
    Light,
    Dark,
    Plain,
}

/// Human-facing output: headed key/value sections, status lines and
/// spinners for long phases. Quiet mode drops decoration and spinners.
pub struct Ui {
    palette: Palette,
    paint: bool,
    quiet: bool,
    spinner_style: ProgressStyle,
}

impl Ui {
    pub fn new(theme: Theme, quiet: bool) -> Self {
        let paint = theme != Theme::Plain && !quiet && std::io::stdout().is_terminal();

        #[cfg(windows)]
        if paint {
            let _ = nu_ansi_term::enable_ansi_support();
        }

        let palette = match theme {
            Theme::Plain => Palette::plain(),
            Theme::Light => Palette::light(),
            Theme::Dark | Theme::Auto => Palette::dark(),
        };
        let spinner_style = ProgressStyle::with_template("{prefix} {spinner} {msg} {elapsed}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ");

        Self {
            palette,
            paint,
            quiet,
            spinner_style,
        }
    }

    pub fn section<'a, I, V>(&self, title: &str, rows: I)
    where
        I: IntoIterator<Item = (&'a str, V)>,
        V: Display,
    {
        let rows: Vec<(&str, String)> = rows
            .into_iter()
            .map(|(key, value)| (key, value.to_string()))
            .collect();
        if rows.is_empty() {
            return;
        }
        self.heading(title);
        let width = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        for (key, value) in rows {
            if self.paint {
                println!(
                    "  {} {}",
                    self.palette.key.paint(format!("{key:<width$}")),
                    self.palette.value.paint(value)
                );
            } else {
                println!("  {key:<width$} {value}");
            }
        }
    }

    /// Prints one line per entry under `title`, marking each with `marker`.
    pub fn list<I>(&self, title: &str, entries: I)
    where
        I: IntoIterator<Item = (Marker, String)>,
    {
        let entries: Vec<(Marker, String)> = entries.into_iter().collect();
        if entries.is_empty() {
            return;
        }
        self.heading(title);
        for (marker, entry) in entries {
            let style = match marker {
                Marker::Plain => self.palette.key,
                Marker::Warning => self.palette.warn,
                Marker::Error => self.palette.error,
            };
            if self.paint {
                println!("  {} {entry}", style.paint(marker.glyph()));
            } else {
                println!("  {} {entry}", marker.glyph());
            }
        }
    }

    pub fn success(&self, message: &str) {
        self.status(SUCCESS_ICON, self.palette.success, message);
    }

    pub fn failure(&self, message: &str) {
        self.status(FAILURE_ICON, self.palette.error, message);
    }

    fn status(&self, icon: &str, style: Style, message: &str) {
        if self.quiet {
            println!("{message}");
        } else if self.paint {
            println!("{} {message}", style.paint(icon));
        } else {
            println!("{icon} {message}");
        }
    }

    pub fn task(&self, label: impl Into<String>) -> TaskGuard<'_> {
        let label = label.into();
        let pb = (!self.quiet).then(|| {
            let pb = ProgressBar::new_spinner();
            pb.set_style(self.spinner_style.clone());
            pb.set_prefix(if self.paint {
                self.palette.heading.paint(PROGRESS_ICON).to_string()
            } else {
                PROGRESS_ICON.to_string()
            });
            pb.set_message(label.clone());
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        });
        TaskGuard {
            ui: self,
            label,
            start: Instant::now(),
            finished: false,
            pb,
        }
    }

    fn heading(&self, title: &str) {
        if self.quiet {
            println!("{title}");
        } else if self.paint {
            println!("{}", self.palette.heading.paint(format!("{HEADING_ICON} {title}")));
        } else {
            println!("{HEADING_ICON} {title}");
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub enum Marker {
    Plain,
    Warning,
    Error,
}

impl Marker {
    fn glyph(self) -> &'static str {
        match self {
            Marker::Plain => "-",
            Marker::Warning => WARNING_ICON,
            Marker::Error => FAILURE_ICON,
        }
    }
}

/// Spinner for a running task; abandoned with a notice if dropped unfinished.
pub struct TaskGuard<'a> {
    ui: &'a Ui,
    label: String,
    start: Instant,
    finished: bool,
    pb: Option<ProgressBar>,
}

impl TaskGuard<'_> {
    pub fn finish(mut self) -> Duration {
        self.finished = true;
        if let Some(pb) = self.pb.take() {
            pb.finish_and_clear();
        }
        self.start.elapsed()
    }
}

impl Drop for TaskGuard<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let message = format!(
            "{} failed after {}",
            self.label,
            format_duration(self.start.elapsed())
        );
        match self.pb.take() {
            Some(pb) => pb.abandon_with_message(message),
            None if !self.ui.quiet => eprintln!("{WARNING_ICON} {message}"),
            None => {}
        }
    }
}

pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs >= 1.0 {
        format!("{secs:.2}s")
    } else {
        format!("{:.1}ms", secs * 1_000.0)
    }
}

struct Palette {
    heading: Style,
    key: Style,
    value: Style,
    success: Style,
    warn: Style,
    error: Style,
}

impl Palette {
    fn dark() -> Self {
        Self {
            heading: Style::new().fg(Color::Purple).bold(),
            key: Style::new().fg(Color::LightBlue),
            value: Style::new().fg(Color::White).bold(),
            success: Style::new().fg(Color::LightGreen).bold(),
            warn: Style::new().fg(Color::Yellow).bold(),
            error: Style::new().fg(Color::LightRed).bold(),
        }
    }

    fn light() -> Self {
        Self {
            heading: Style::new().fg(Color::Blue).bold(),
            key: Style::new().fg(Color::DarkGray),
            value: Style::new().fg(Color::Black).bold(),
            success: Style::new().fg(Color::Green).bold(),
            warn: Style::new().fg(Color::Purple).bold(),
            error: Style::new().fg(Color::Red).bold(),
        }
    }

    fn plain() -> Self {
        Self {
            heading: Style::new(),
            key: Style::new(),
            value: Style::new(),
            success: Style::new(),
            warn: Style::new(),
            error: Style::new(),
        }
    }
}

const HEADING_ICON: &str = "▸";
const SUCCESS_ICON: &str = "✔";
const FAILURE_ICON: &str = "✘";
const WARNING_ICON: &str = "⚠";
const PROGRESS_ICON: &str = "▶";
