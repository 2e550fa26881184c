//! Prompt I/O
//!
//! All user interaction of the init flow goes through [`Console`]: status text
//! and warnings are written to the error channel, and the three prompt kinds
//! (choice, free-form response, yes/no continue) announce themselves with a
//! structured record before reading one line of input.
//!
//! End of input is treated as cancellation for choices and responses and as
//! the default answer for yes/no questions.

use std::io::{self, BufRead, Write};
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;

pub mod ux;

pub use ux::{UxRecord, UxStyle};

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("This prompt could not be answered because you are not in an interactive session. Prompts are disabled.")]
    PromptsDisabled,
    #[error("Console I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to render prompt: {0}")]
    Render(#[from] serde_json::Error),
}

pub struct Console {
    input: Box<dyn BufRead + Send>,
    output: Box<dyn Write + Send>,
    style: UxStyle,
    prompts_disabled: bool,
}

impl Console {
    pub fn new(input: Box<dyn BufRead + Send>, output: Box<dyn Write + Send>) -> Self {
        Self {
            input,
            output,
            style: UxStyle::default(),
            prompts_disabled: false,
        }
    }

    /// Console reading stdin and writing to stderr.
    pub fn stdio() -> Self {
        Self::new(
            Box::new(io::BufReader::new(io::stdin())),
            Box::new(io::stderr()),
        )
    }

    /// Console fed from a fixed script of input lines, writing into `output`.
    pub fn scripted(input: impl Into<String>, output: TranscriptBuffer) -> Self {
        Self::new(
            Box::new(io::Cursor::new(input.into().into_bytes())),
            Box::new(output),
        )
    }

    pub fn set_style(&mut self, style: UxStyle) {
        self.style = style;
    }

    /// Make every later prompt fail with [`ConsoleError::PromptsDisabled`].
    pub fn set_prompts_disabled(&mut self, disabled: bool) {
        self.prompts_disabled = disabled;
    }

    pub fn prompts_disabled(&self) -> bool {
        self.prompts_disabled
    }

    /// Write raw status text to the error channel.
    pub fn status(&mut self, text: &str) -> Result<(), ConsoleError> {
        self.output.write_all(text.as_bytes())?;
        self.output.flush()?;
        Ok(())
    }

    /// Write `WARNING: <text>` followed by a newline.
    pub fn warning(&mut self, text: &str) -> Result<(), ConsoleError> {
        self.status(&format!("WARNING: {}\n", text))
    }

    /// Ask the user to pick one of `choices`.
    ///
    /// Accepts a 1-based index or the exact (trimmed, case-sensitive) text of
    /// a choice. Anything else, including empty input, returns `None`.
    pub fn prompt_choice(
        &mut self,
        choices: &[String],
        message: &str,
    ) -> Result<Option<usize>, ConsoleError> {
        self.ensure_prompts_enabled()?;

        match self.style {
            UxStyle::Testing => {
                let record = UxRecord::PromptChoice { message, choices }.render()?;
                self.status(&format!("{}\n", record))?;
            }
            UxStyle::Normal => {
                let mut menu = format!("{}\n", message);
                for (i, choice) in choices.iter().enumerate() {
                    menu.push_str(&format!(" [{}] {}\n", i + 1, choice));
                }
                menu.push_str("Please enter your numeric choice:  ");
                self.status(&menu)?;
            }
        }

        let Some(answer) = self.read_line()? else {
            return Ok(None);
        };
        Ok(resolve_choice(choices, answer.trim()))
    }

    /// Read one line of free-form text. Empty input returns `None`.
    pub fn prompt_response(&mut self, message: &str) -> Result<Option<String>, ConsoleError> {
        self.ensure_prompts_enabled()?;

        match self.style {
            UxStyle::Testing => {
                let record = UxRecord::PromptResponse { message }.render()?;
                self.status(&record)?;
            }
            UxStyle::Normal => self.status(message)?,
        }

        Ok(self
            .read_line()?
            .map(|answer| answer.trim().to_string())
            .filter(|answer| !answer.is_empty()))
    }

    /// Ask a yes/no question. Empty input or end of input yields `default`.
    pub fn prompt_continue(
        &mut self,
        message: Option<&str>,
        prompt_string: &str,
        default: bool,
    ) -> Result<bool, ConsoleError> {
        self.ensure_prompts_enabled()?;

        match self.style {
            UxStyle::Testing => {
                let record = UxRecord::PromptContinue {
                    message,
                    prompt_string,
                }
                .render()?;
                self.status(&format!("{}\n", record))?;
            }
            UxStyle::Normal => {
                let mut question = String::new();
                if let Some(message) = message {
                    question.push_str(&format!("{}\n\n", message));
                }
                let hint = if default { "Y/n" } else { "y/N" };
                question.push_str(&format!("{} ({})?  ", prompt_string, hint));
                self.status(&question)?;
            }
        }

        loop {
            let Some(answer) = self.read_line()? else {
                return Ok(default);
            };
            match answer.trim().to_ascii_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => self.status("Please enter 'y' or 'n':  ")?,
            }
        }
    }

    fn ensure_prompts_enabled(&self) -> Result<(), ConsoleError> {
        if self.prompts_disabled {
            Err(ConsoleError::PromptsDisabled)
        } else {
            Ok(())
        }
    }

    fn read_line(&mut self) -> Result<Option<String>, ConsoleError> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

fn resolve_choice(choices: &[String], answer: &str) -> Option<usize> {
    if answer.is_empty() {
        return None;
    }
    if let Ok(index) = answer.parse::<usize>() {
        return (1..=choices.len()).contains(&index).then(|| index - 1);
    }
    choices.iter().position(|choice| choice.trim() == answer)
}

/// Shared in-memory sink for console output.
///
/// Cloning yields another handle onto the same buffer, so one handle can be
/// given to a [`Console`] while another reads the transcript back.
#[derive(Debug, Clone, Default)]
pub struct TranscriptBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl TranscriptBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        let bytes = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for TranscriptBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
