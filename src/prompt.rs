use anyhow::Result;
use std::io::{self, IsTerminal, Write};

/// Line-oriented user interaction on the terminal
pub trait Prompter {
    /// Print `prompt` and read one line, `None` on end of input
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;

    /// Whether a person is answering, as opposed to piped input
    fn is_interactive(&self) -> bool;

    /// Answer to use instead of asking, if any
    fn preset_answer(&self) -> Option<bool> {
        None
    }

    /// Ask a yes/no question; an empty answer or end of input picks `default`
    fn ask(&mut self, question: &str, default: bool) -> Result<bool> {
        if let Some(answer) = self.preset_answer() {
            return Ok(answer);
        }
        if !self.is_interactive() {
            return Ok(default);
        }

        let (d_answer, d_str) = if default { ("y", "[Y/n]") } else { ("n", "[y/N]") };
        loop {
            let Some(line) = self.read_line(&format!("{} {} >> ", question, d_str))? else {
                return Ok(default);
            };
            let answer = line.trim().to_lowercase();
            if answer.is_empty() || answer == d_answer {
                return Ok(default);
            }
            match answer.as_str() {
                "y" | "n" => return Ok(!default),
                _ => eprintln!("[Warning] Invalid answer, expected 'y' or 'n'."),
            }
        }
    }
}

/// Prompter reading answers from the process stdin
pub struct StdinPrompter {
    assume_yes: bool,
    interactive: bool,
}

impl StdinPrompter {
    pub fn new(assume_yes: bool) -> Self {
        Self {
            assume_yes,
            interactive: io::stdin().is_terminal(),
        }
    }
}

impl Prompter for StdinPrompter {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        if self.interactive {
            print!("{}", prompt);
            io::stdout().flush()?;
        }
        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn preset_answer(&self) -> Option<bool> {
        self.assume_yes.then_some(true)
    }
}

/// Prompter fed from a fixed list of lines
#[cfg(test)]
pub struct ScriptedPrompter {
    pub lines: std::collections::VecDeque<String>,
    pub interactive: bool,
    pub assume_yes: bool,
    pub prompts: Vec<String>,
}

#[cfg(test)]
impl ScriptedPrompter {
    pub fn new(lines: &[&str], interactive: bool) -> Self {
        Self {
            lines: lines.iter().map(|l| l.to_string()).collect(),
            interactive,
            assume_yes: false,
            prompts: Vec::new(),
        }
    }
}

#[cfg(test)]
impl Prompter for ScriptedPrompter {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        Ok(self.lines.pop_front())
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn preset_answer(&self) -> Option<bool> {
        self.assume_yes.then_some(true)
    }
}
