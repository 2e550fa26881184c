//! Structured prompt records
//!
//! Every interactive prompt is announced on the error channel before input is
//! read. In the default style the announcement is a single JSON object such as
//! `{"ux": "PROMPT_CHOICE", "message": "...", "choices": ["a", "b"]}`, which
//! harnesses driving the CLI parse to know what is being asked.

use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};
use std::io;

/// How prompts are rendered on the error channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UxStyle {
    /// One JSON record per prompt.
    #[default]
    Testing,
    /// Human-oriented numbered menus and `(Y/n)` questions.
    Normal,
}

impl UxStyle {
    /// Resolve the `core/interactive_ux_style` property value.
    pub fn from_property(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("NORMAL") => UxStyle::Normal,
            _ => UxStyle::Testing,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "ux", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UxRecord<'a> {
    PromptChoice {
        message: &'a str,
        choices: &'a [String],
    },
    PromptContinue {
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<&'a str>,
        prompt_string: &'a str,
    },
    PromptResponse {
        message: &'a str,
    },
}

impl UxRecord<'_> {
    /// Render with `", "` and `": "` separators.
    pub fn render(&self) -> Result<String, serde_json::Error> {
        let mut buf = Vec::new();
        let mut serializer = Serializer::with_formatter(&mut buf, SpacedFormatter);
        self.serialize(&mut serializer)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// Compact JSON with a space after every separator. Text outside ASCII is
/// written as `\uXXXX` escapes, surrogate pairs above U+FFFF.
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut rest = fragment;
        while let Some(at) = rest.find(|c: char| !c.is_ascii()) {
            writer.write_all(rest[..at].as_bytes())?;
            let mut chars = rest[at..].chars();
            if let Some(c) = chars.next() {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
            rest = chars.as_str();
        }
        writer.write_all(rest.as_bytes())
    }
}
