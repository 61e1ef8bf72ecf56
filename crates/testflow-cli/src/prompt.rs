//! Line-based terminal input/output.

use std::io::{self, BufRead, Write};

/// What the user typed at a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Text(String),
    /// `:q` or end of input.
    Quit,
    /// `:reset`
    Reset,
}

pub struct Terminal<R, W> {
    input: R,
    output: W,
}

impl Terminal<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Terminal<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn out(&mut self) -> &mut W {
        &mut self.output
    }

    pub fn say(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.output, "{line}")
    }

    pub fn clear_screen(&mut self) -> io::Result<()> {
        write!(self.output, "\x1B[2J\x1B[1;1H")?;
        self.output.flush()
    }

    /// Ask for a line. An empty answer keeps `default` when one is given.
    pub fn ask(&mut self, label: &str, default: Option<&str>) -> io::Result<Input> {
        match default.filter(|d| !d.is_empty()) {
            Some(d) => write!(self.output, "{label} [{d}]: ")?,
            None => write!(self.output, "{label}: ")?,
        }
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(Input::Quit);
        }
        let line = line.trim();
        Ok(match line {
            ":q" | ":quit" => Input::Quit,
            ":reset" => Input::Reset,
            "" => Input::Text(default.unwrap_or_default().to_string()),
            other => Input::Text(other.to_string()),
        })
    }

    /// Ask for a number in `1..=max`; re-asks until one is given.
    pub fn ask_choice(&mut self, label: &str, max: usize, default: Option<usize>) -> io::Result<Input> {
        let default_text = default.map(|d| d.to_string());
        loop {
            match self.ask(label, default_text.as_deref())? {
                Input::Text(text) => match text.parse::<usize>() {
                    Ok(n) if (1..=max).contains(&n) => return Ok(Input::Text(n.to_string())),
                    _ => self.say(&format!("  enter a number from 1 to {max}"))?,
                },
                other => return Ok(other),
            }
        }
    }

    /// Yes/no question. End of input counts as no.
    pub fn confirm(&mut self, question: &str, default_yes: bool) -> io::Result<bool> {
        let hint = if default_yes { "Y/n" } else { "y/N" };
        write!(self.output, "{question} [{hint}] ")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(false);
        }
        Ok(match line.trim().to_lowercase().as_str() {
            "" => default_yes,
            "y" | "yes" => true,
            _ => false,
        })
    }
}
