//! Console boundary: user-facing progress lines and the final acknowledgment prompt.

use std::io::{self, BufRead, Write};

/// Where the build talks to the user.
pub trait Console {
    /// Print one line of user-facing output.
    fn line(&mut self, text: &str);

    /// Print `prompt` and block until the user answers with one line (or input ends).
    fn wait_for_ack(&mut self, prompt: &str) -> io::Result<()>;
}

/// stdout/stdin console used by the binary.
pub struct TerminalConsole<R: BufRead, W: Write> {
    input: R,
    output: W,
}

impl TerminalConsole<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        TerminalConsole {
            input: io::stdin().lock(),
            output: io::stdout(),
        }
    }
}

impl<R: BufRead, W: Write> TerminalConsole<R, W> {
    pub fn new(input: R, output: W) -> Self {
        TerminalConsole { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> Console for TerminalConsole<R, W> {
    fn line(&mut self, text: &str) {
        // A closed stdout must not abort the build
        let _ = writeln!(self.output, "{}", text);
        let _ = self.output.flush();
    }

    fn wait_for_ack(&mut self, prompt: &str) -> io::Result<()> {
        writeln!(self.output, "{}", prompt)?;
        self.output.flush()?;
        let mut answer = String::new();
        self.input.read_line(&mut answer)?;
        Ok(())
    }
}

/// In-memory console that records output and counts prompts.
#[derive(Debug, Default)]
pub struct RecordingConsole {
    pub lines: Vec<String>,
    pub prompts: Vec<String>,
}

impl RecordingConsole {
    pub fn new() -> Self {
        RecordingConsole::default()
    }

    /// All printed lines joined with newlines (prompts included, in order).
    pub fn transcript(&self) -> String {
        self.lines.join("\n")
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|l| l.contains(needle))
    }
}

impl Console for RecordingConsole {
    fn line(&mut self, text: &str) {
        self.lines.push(text.to_string());
    }

    fn wait_for_ack(&mut self, prompt: &str) -> io::Result<()> {
        self.lines.push(prompt.to_string());
        self.prompts.push(prompt.to_string());
        Ok(())
    }
}
