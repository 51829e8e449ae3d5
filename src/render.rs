//! Output rendering for the command-line front-end.
//!
//! This module provides the renderer trait and a plain-text implementation
//! with optional ANSI styling, a terminal spinner, and the banner.

use std::io::{self, IsTerminal, Stdout, Write};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// ANSI escape code for dim text.
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code for bold text.
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for responses and model names).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for yellow text (used for hints).
const ANSI_YELLOW: &str = "\x1b[33m";

/// ANSI escape code for green text (used for the prompt and success).
const ANSI_GREEN: &str = "\x1b[32m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// ANSI escape code for gray text (used for box borders).
const ANSI_GRAY: &str = "\x1b[90m";

/// Erase the current terminal line and return the cursor to column zero.
const CLEAR_LINE: &str = "\r\x1b[2K";

const SPINNER_FRAMES: &[&str] = &[
    "⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏",
];
const SPINNER_INTERVAL: Duration = Duration::from_millis(80);

const BANNER: &str = "\
 ███╗   ███╗██╗██╗   ██╗██╗   ██╗
 ████╗ ████║██║╚██╗ ██╔╝██║   ██║
 ██╔████╔██║██║ ╚████╔╝ ██║   ██║
 ██║╚██╔╝██║██║  ╚██╔╝  ██║   ██║
 ██║ ╚═╝ ██║██║   ██║   ╚██████╔╝
 ╚═╝     ╚═╝╚═╝   ╚═╝    ╚═════╝ ";

const GRADIENT_STOPS: [(u8, u8, u8); 3] = [
    (0xff, 0x6b, 0x6b),
    (0xfe, 0xca, 0x57),
    (0x48, 0xdb, 0xfb),
];

/// Trait for rendering command output.
///
/// This abstraction allows for different rendering strategies:
/// - Plain text with ANSI styling
/// - Plain text without styling (for piping/redirecting)
/// - Recording renderers in tests
pub trait Renderer: Send {
    /// Print the gradient banner.
    fn print_banner(&mut self);

    /// Print usage text.
    fn print_help(&mut self, help: &str);

    /// Print the boxed header shown when an interactive session starts.
    fn print_session_header(&mut self, model: &str);

    /// The prompt shown when reading a line in the interactive loop.
    fn prompt(&self) -> String;

    /// Show a transient status line (spinner) with the given text.
    fn start_status(&mut self, text: &str);

    /// Replace the text of the active status line.
    fn update_status(&mut self, text: &str);

    /// Remove the active status line without leaving a trace.
    fn stop_status(&mut self);

    /// Replace the active status line with a success line.
    fn succeed_status(&mut self, text: &str);

    /// Replace the active status line with an error line.
    fn fail_status(&mut self, error: &str);

    /// Print the marker shown while the interactive loop waits for a reply.
    fn print_pending(&mut self);

    /// Called before the first fragment of a response.
    ///
    /// `nested` responses (the interactive loop) are indented.
    fn start_response(&mut self, nested: bool);

    /// Print a chunk of response text.
    ///
    /// This is called incrementally as fragments are streamed from the daemon.
    fn print_text(&mut self, text: &str);

    /// Called when a response is complete or aborted.
    fn finish_response(&mut self);

    /// Print a section heading.
    fn print_heading(&mut self, heading: &str);

    /// Print one row of the model listing.
    fn print_model_row(&mut self, name: &str, size: &str);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print a hint suggesting how to recover from an error.
    fn print_hint(&mut self, hint: &str);

    /// Print the goodbye line that ends an interactive session.
    fn print_farewell(&mut self);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);
}

/// An animated status line drawn on stderr by a background task.
struct Spinner {
    text: watch::Sender<String>,
    task: Option<JoinHandle<()>>,
}

impl Spinner {
    fn start(text: &str, use_color: bool, animate: bool) -> Self {
        let (tx, rx) = watch::channel(text.to_string());
        let task = if animate && tokio::runtime::Handle::try_current().is_ok() {
            Some(tokio::spawn(spin(rx, use_color)))
        } else {
            None
        };
        Self { text: tx, task }
    }

    fn set_text(&self, text: &str) {
        self.text.send_replace(text.to_string());
    }

    #[cfg(test)]
    fn is_animated(&self) -> bool {
        self.task.is_some()
    }

    /// Stops the animation and erases the status line.
    fn stop(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let mut stderr = io::stderr().lock();
            let _ = write!(stderr, "{CLEAR_LINE}");
            let _ = stderr.flush();
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn spin(text: watch::Receiver<String>, use_color: bool) {
    let mut interval = tokio::time::interval(SPINNER_INTERVAL);
    let mut frame = 0;
    loop {
        interval.tick().await;
        let current = text.borrow().clone();
        let glyph = SPINNER_FRAMES[frame % SPINNER_FRAMES.len()];
        let mut stderr = io::stderr().lock();
        let _ = if use_color {
            write!(stderr, "{CLEAR_LINE}{ANSI_CYAN}{glyph}{ANSI_RESET} {current}")
        } else {
            write!(stderr, "{CLEAR_LINE}{glyph} {current}")
        };
        let _ = stderr.flush();
        frame += 1;
    }
}

/// Plain text renderer with optional ANSI styling.
///
/// Responses go to stdout; spinners, errors and hints go to stderr.
pub struct PlainTextRenderer {
    stdout: Stdout,
    use_color: bool,
    animate: bool,
    spinner: Option<Spinner>,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer, styled when stdout is a terminal.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    ///
    /// Styling is dropped when stdout is not a terminal, and the spinner only
    /// animates when stderr is one.
    pub fn with_color(use_color: bool) -> Self {
        Self::styled(
            use_color && io::stdout().is_terminal(),
            io::stderr().is_terminal(),
        )
    }

    fn styled(use_color: bool, animate: bool) -> Self {
        Self {
            stdout: io::stdout(),
            use_color,
            animate,
            spinner: None,
        }
    }

    /// Flushes stdout to ensure immediate display of streamed content.
    fn flush(&mut self) {
        let _ = self.stdout.flush();
    }

    fn paint(&self, style: &str, text: &str) -> String {
        if self.use_color {
            format!("{style}{text}{ANSI_RESET}")
        } else {
            text.to_string()
        }
    }

    fn write_out(&mut self, text: &str) {
        let _ = write!(self.stdout, "{text}");
        self.flush();
    }

    /// Ends the active spinner, printing a final symbol line on stderr.
    fn finish_status(&mut self, symbol: &str, style: &str, text: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.stop();
        }
        let line = format!("{} {}", self.paint(style, symbol), self.paint(style, text));
        eprintln!("{line}");
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PlainTextRenderer {
    fn print_banner(&mut self) {
        let banner = if self.use_color {
            gradient(BANNER)
        } else {
            BANNER.to_string()
        };
        self.write_out(&format!("\n{banner}\n"));
    }

    fn print_help(&mut self, help: &str) {
        self.write_out(&format!("{help}\n"));
    }

    fn print_session_header(&mut self, model: &str) {
        let lines = [
            (
                format!("Model: {model}"),
                format!("{}{model}", self.paint(ANSI_DIM, "Model: ")),
            ),
            (
                "Type exit to quit".to_string(),
                format!(
                    "{}{}{}",
                    self.paint(ANSI_DIM, "Type "),
                    self.paint(ANSI_YELLOW, "exit"),
                    self.paint(ANSI_DIM, " to quit")
                ),
            ),
        ];
        let boxed = draw_box(&lines, |border| self.paint(ANSI_GRAY, border));
        self.write_out(&format!("{boxed}\n\n"));
    }

    fn prompt(&self) -> String {
        self.paint(ANSI_GREEN, "❯ ")
    }

    fn start_status(&mut self, text: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.stop();
        }
        self.spinner = Some(Spinner::start(text, self.use_color, self.animate));
    }

    fn update_status(&mut self, text: &str) {
        match &self.spinner {
            Some(spinner) => spinner.set_text(text),
            None => self.start_status(text),
        }
    }

    fn stop_status(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.stop();
        }
    }

    fn succeed_status(&mut self, text: &str) {
        self.finish_status("✔", ANSI_GREEN, text);
    }

    fn fail_status(&mut self, error: &str) {
        self.finish_status("✖", ANSI_RED, &format!("Error: {error}"));
    }

    fn print_pending(&mut self) {
        let pending = self.paint(ANSI_DIM, "  ...thinking");
        self.write_out(&format!("{pending}\n"));
    }

    fn start_response(&mut self, nested: bool) {
        self.stop_status();
        let marker = self.paint(ANSI_CYAN, "❯ ");
        if nested {
            self.write_out(&format!("  {marker}"));
        } else {
            self.write_out(&format!("\n{marker}"));
        }
    }

    fn print_text(&mut self, text: &str) {
        self.write_out(text);
    }

    fn finish_response(&mut self) {
        self.write_out("\n\n");
    }

    fn print_heading(&mut self, heading: &str) {
        let heading = self.paint(ANSI_BOLD, &format!("  {heading}"));
        self.write_out(&format!("\n{heading}\n\n"));
    }

    fn print_model_row(&mut self, name: &str, size: &str) {
        let name = self.paint(ANSI_CYAN, &format!("{name:<28}"));
        let size = self.paint(ANSI_DIM, size);
        self.write_out(&format!("  {name} {size}\n"));
    }

    fn print_error(&mut self, error: &str) {
        self.stop_status();
        let line = self.paint(ANSI_RED, &format!("  Error: {error}"));
        eprintln!("{line}");
    }

    fn print_hint(&mut self, hint: &str) {
        let line = self.paint(ANSI_DIM, &format!("\n  {hint}\n"));
        eprintln!("{line}");
    }

    fn print_farewell(&mut self) {
        let line = self.paint(ANSI_DIM, "\n👋 Bye!\n");
        self.write_out(&format!("{line}\n"));
    }

    fn print_info(&mut self, info: &str) {
        self.write_out(&format!("{info}\n"));
    }
}

/// Colors each line of `art` with a left-to-right gradient across the stops.
fn gradient(art: &str) -> String {
    let width = art.lines().map(|l| l.chars().count()).max().unwrap_or(0);
    let mut out = String::new();
    for (i, line) in art.lines().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        for (column, ch) in line.chars().enumerate() {
            if ch == ' ' {
                out.push(ch);
                continue;
            }
            let (r, g, b) = gradient_color(column, width);
            out.push_str(&format!("\x1b[38;2;{r};{g};{b}m{ch}"));
        }
        out.push_str(ANSI_RESET);
    }
    out
}

/// Interpolates the gradient stops at `column` of a line `width` columns wide.
fn gradient_color(column: usize, width: usize) -> (u8, u8, u8) {
    let segments = GRADIENT_STOPS.len() - 1;
    if width < 2 {
        return GRADIENT_STOPS[0];
    }
    let position = column.min(width - 1) as f64 / (width - 1) as f64 * segments as f64;
    let segment = (position.floor() as usize).min(segments - 1);
    let t = position - segment as f64;
    let (from, to) = (GRADIENT_STOPS[segment], GRADIENT_STOPS[segment + 1]);
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    (mix(from.0, to.0), mix(from.1, to.1), mix(from.2, to.2))
}

/// Draws a rounded box with one column of padding on every side.
///
/// Each line is given as `(plain, styled)`; the plain text determines the width.
fn draw_box(lines: &[(String, String)], border: impl Fn(&str) -> String) -> String {
    let inner = lines
        .iter()
        .map(|(plain, _)| plain.chars().count())
        .max()
        .unwrap_or(0)
        + 6;
    let horizontal = "─".repeat(inner);
    let blank = format!("{}{}{}", border("│"), " ".repeat(inner), border("│"));
    let mut out = vec![border(&format!("╭{horizontal}╮")), blank.clone()];
    for (plain, styled) in lines {
        let pad = inner - 3 - plain.chars().count();
        out.push(format!(
            "{}   {styled}{}{}",
            border("│"),
            " ".repeat(pad),
            border("│")
        ));
    }
    out.push(blank);
    out.push(border(&format!("╰{horizontal}╯")));
    out.join("\n")
}
