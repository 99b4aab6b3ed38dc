//! Console sink with optional ANSI colouring per level

use crate::core::{LogLevel, LogRecord, LoggerError, Result, SinkBackend};
use colored::Color;
use std::io::{self, IsTerminal, Write};

const RESET: &str = "\x1b[0m";
const CLEAR_LINE: &str = "\x1b[K";

/// `TERM` values (substrings) known to understand ANSI colour sequences
const COLOR_TERMS: [&str; 14] = [
    "ansi", "color", "console", "cygwin", "gnome", "konsole", "kterm", "linux", "msys", "putty",
    "rxvt", "screen", "vt100", "xterm",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleTarget {
    Stdout,
    Stderr,
}

impl ConsoleTarget {
    pub fn is_terminal(self) -> bool {
        match self {
            ConsoleTarget::Stdout => io::stdout().is_terminal(),
            ConsoleTarget::Stderr => io::stderr().is_terminal(),
        }
    }
}

/// Foreground, background and weight applied to one level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConsoleStyle {
    pub foreground: Option<Color>,
    pub background: Option<Color>,
    pub bold: bool,
}

impl ConsoleStyle {
    /// Terminal defaults
    pub const fn plain() -> Self {
        Self {
            foreground: None,
            background: None,
            bold: false,
        }
    }

    pub const fn fg(color: Color) -> Self {
        Self {
            foreground: Some(color),
            background: None,
            bold: false,
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn on(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Escape sequence that switches the terminal to this style
    pub fn prefix(&self) -> String {
        let mut codes: Vec<String> = Vec::with_capacity(3);
        if self.bold {
            codes.push("1".to_string());
        }
        if let Some(fg) = self.foreground {
            codes.push(fg.to_fg_str().into_owned());
        }
        if let Some(bg) = self.background {
            codes.push(bg.to_bg_str().into_owned());
        }
        if codes.is_empty() {
            RESET.to_string()
        } else {
            format!("\x1b[{}m", codes.join(";"))
        }
    }
}

fn default_styles() -> [ConsoleStyle; 7] {
    [
        ConsoleStyle::fg(Color::Cyan),
        ConsoleStyle::fg(Color::Cyan),
        ConsoleStyle::plain(),
        ConsoleStyle::fg(Color::Yellow).bold(),
        ConsoleStyle::fg(Color::Red).bold(),
        ConsoleStyle::fg(Color::Red).bold(),
        ConsoleStyle::plain().on(Color::Red).bold(),
    ]
}

/// True if a `TERM` value names a colour-capable terminal
pub fn is_color_term(term: &str) -> bool {
    COLOR_TERMS.iter().any(|known| term.contains(known))
}

fn term_supports_color() -> bool {
    std::env::var("TERM")
        .map(|term| is_color_term(&term))
        .unwrap_or(false)
}

#[derive(Debug)]
pub struct ConsoleSink {
    target: ConsoleTarget,
    colored: bool,
    styles: [ConsoleStyle; 7],
}

impl ConsoleSink {
    /// Colour is used only if `auto_color` is set and the target is a colour terminal
    pub fn new(target: ConsoleTarget, auto_color: bool) -> Self {
        Self {
            target,
            colored: auto_color && target.is_terminal() && term_supports_color(),
            styles: default_styles(),
        }
    }

    pub fn stdout() -> Self {
        Self::new(ConsoleTarget::Stdout, true)
    }

    pub fn stderr() -> Self {
        Self::new(ConsoleTarget::Stderr, true)
    }

    /// Force colouring on or off regardless of the terminal
    #[must_use = "builder methods return a new value"]
    pub fn with_color(mut self, colored: bool) -> Self {
        self.colored = colored;
        self
    }

    pub fn set_style(&mut self, level: LogLevel, style: ConsoleStyle) {
        self.styles[level.as_u8() as usize] = style;
    }

    /// Replace the foreground colour of `level`, keeping its other attributes
    pub fn set_color(&mut self, level: LogLevel, color: Color) {
        self.styles[level.as_u8() as usize].foreground = Some(color);
    }

    pub fn style(&self, level: LogLevel) -> ConsoleStyle {
        self.styles[level.as_u8() as usize]
    }

    pub fn is_colored(&self) -> bool {
        self.colored
    }

    pub fn target(&self) -> ConsoleTarget {
        self.target
    }

    fn render<W: Write>(&self, record: &LogRecord, out: &mut W) -> io::Result<()> {
        if self.colored {
            out.write_all(self.style(record.level).prefix().as_bytes())?;
            out.write_all(&record.formatted)?;
            out.write_all(RESET.as_bytes())?;
            out.write_all(CLEAR_LINE.as_bytes())?;
        } else {
            out.write_all(&record.formatted)?;
        }
        out.flush()
    }
}

impl SinkBackend for ConsoleSink {
    const NAME: &'static str = "console";

    fn write_record(&mut self, record: &LogRecord) -> Result<()> {
        let result = match self.target {
            ConsoleTarget::Stdout => self.render(record, &mut io::stdout().lock()),
            ConsoleTarget::Stderr => self.render(record, &mut io::stderr().lock()),
        };
        result.map_err(|e| LoggerError::io_operation("writing to console", "write failed", e))
    }

    fn flush_backend(&mut self) -> Result<()> {
        let result = match self.target {
            ConsoleTarget::Stdout => io::stdout().flush(),
            ConsoleTarget::Stderr => io::stderr().flush(),
        };
        result.map_err(|e| LoggerError::io_operation("flushing console", "flush failed", e))
    }
}
