//! Terminal output for the CLI

pub mod progress;
pub mod table;

pub use progress::Spinner;
pub use table::{changes_table, stats_table};

use owo_colors::{OwoColorize, Style};
use std::sync::OnceLock;

static THEME: OnceLock<Theme> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct Theme {
    pub header: Style,
    pub success: Style,
    pub error: Style,
    pub warn: Style,
    pub dim: Style,
}

impl Theme {
    pub fn detect() -> Self {
        if !console::Term::stdout().is_term() {
            return Self::plain();
        }
        Self::colored()
    }

    pub fn colored() -> Self {
        Self {
            header: Style::new().cyan().bold(),
            success: Style::new().green().bold(),
            error: Style::new().red().bold(),
            warn: Style::new().yellow().bold(),
            dim: Style::new().white().dimmed(),
        }
    }

    pub fn plain() -> Self {
        Self {
            header: Style::new(),
            success: Style::new(),
            error: Style::new(),
            warn: Style::new(),
            dim: Style::new(),
        }
    }
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::detect)
}

pub fn header(msg: &str) {
    println!("{}", msg.style(theme().header.clone()));
}

pub fn success(msg: &str) {
    println!("{}", msg.style(theme().success.clone()));
}

pub fn warn(msg: &str) {
    println!("{}", msg.style(theme().warn.clone()));
}

pub fn error(msg: &str) {
    eprintln!("{}", msg.style(theme().error.clone()));
}

pub fn dim(msg: &str) {
    println!("{}", msg.style(theme().dim.clone()));
}
