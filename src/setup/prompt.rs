use std::io::{self, BufRead, Write};

/// Interactive console: asks questions and prints status lines
pub trait Prompter {
    /// Print `question`, return the answer with surrounding whitespace removed
    fn ask(&mut self, question: &str) -> io::Result<String>;

    /// Print a user-facing status line
    fn say(&mut self, line: &str);
}

/// Prompter over any reader/writer pair; `stdio()` for the real terminal
pub struct ConsolePrompter<R, W> {
    input: R,
    output: W,
}

impl ConsolePrompter<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsolePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Prompter for ConsolePrompter<R, W> {
    fn ask(&mut self, question: &str) -> io::Result<String> {
        write!(self.output, "{} ", question)?;
        self.output.flush()?;

        let mut answer = String::new();
        if self.input.read_line(&mut answer)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed before an answer was given"));
        }
        Ok(answer.trim().to_string())
    }

    fn say(&mut self, line: &str) {
        // Console output is best effort; a closed stdout must not abort the flow
        let _ = writeln!(self.output, "{}", line);
    }
}
