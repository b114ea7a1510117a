//! Styled console output
//!
//! Styling is a pure function of message and [`Style`]; the only state is the
//! writer a [`Console`] was built with.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use colored::{ColoredString, Colorize};

/// Output styles, chosen for contrast on both dark and light terminals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Header,
    Step,
    Info,
    Success,
    Warning,
    Error,
    Input,
}

/// Apply a style to a message
pub fn styled(message: &str, style: Style) -> ColoredString {
    match style {
        Style::Header => message.white().bold(),
        Style::Step => message.cyan().bold(),
        Style::Info => message.blue().bold(),
        Style::Success => message.green().bold(),
        Style::Warning => message.yellow().bold(),
        Style::Error => message.red().bold(),
        Style::Input => message.magenta().bold(),
    }
}

/// Console bound to an output sink
pub struct Console {
    out: Box<dyn Write + Send>,
}

impl Console {
    /// Create a console writing to the given sink
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self { out }
    }

    /// Console writing to stdout
    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    /// Console writing to an in-memory buffer, plus a handle to read it back
    pub fn buffered() -> (Self, SharedBuffer) {
        let buffer = SharedBuffer::default();
        (Self::new(Box::new(buffer.clone())), buffer)
    }

    /// Print a styled line
    pub fn print(&mut self, style: Style, message: impl AsRef<str>) {
        let _ = writeln!(self.out, "{}", styled(message.as_ref(), style));
    }

    /// Print a styled section heading followed by a rule
    pub fn step(&mut self, message: impl AsRef<str>) {
        self.print(Style::Step, format!("\n{}", message.as_ref()));
        self.rule(30);
    }

    /// Print a horizontal rule
    pub fn rule(&mut self, width: usize) {
        self.print(Style::Info, "-".repeat(width));
    }

    /// Print text without styling
    pub fn raw(&mut self, message: impl AsRef<str>) {
        let _ = writeln!(self.out, "{}", message.as_ref());
        let _ = self.out.flush();
    }

    /// Print a titled panel around a pre-rendered body
    pub fn panel(&mut self, title: &str, body: &str) -> io::Result<()> {
        let width = body
            .lines()
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0)
            .max(title.chars().count() + 4)
            .min(100);

        let fill = width.saturating_sub(title.chars().count() + 1);
        let top = format!("╭─ {} {}", title, "─".repeat(fill));
        writeln!(self.out, "{}", top.cyan())?;
        for line in body.lines() {
            writeln!(self.out, "{} {}", "│".cyan(), line)?;
        }
        writeln!(self.out, "{}", format!("╰{}", "─".repeat(width + 2)).cyan())?;
        self.out.flush()
    }

    /// Print a prompt without a trailing newline
    pub fn prompt(&mut self, message: &str) -> io::Result<()> {
        write!(self.out, "{}", styled(message, Style::Input))?;
        self.out.flush()
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::stdout()
    }
}

/// Cloneable in-memory sink
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    /// Everything written so far, lossily decoded
    pub fn contents(&self) -> String {
        match self.inner.lock() {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(poisoned) => String::from_utf8_lossy(&poisoned.into_inner()).into_owned(),
        }
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut bytes = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "console buffer poisoned"))?;
        bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
