//! Stateless command line tokenizer.
//!
//! Splits a line into a command name, its arguments and its switches,
//! shell style.
//!
//! # Example
//!
//! ```
//! use cotick_command::InputParser;
//!
//! let inv = InputParser::parse(r#"-echo "hello world" 3"#).unwrap().unwrap();
//! assert_eq!(inv.name, "echo");
//! assert_eq!(inv.args, ["hello world", "3"]);
//!
//! let inv = InputParser::parse("ps -h").unwrap().unwrap();
//! assert!(inv.args.is_empty());
//! assert!(inv.has_switch("h"));
//!
//! assert!(InputParser::parse("   ").unwrap().is_none());
//! ```

use std::collections::BTreeSet;

use crate::CommandError;

/// A tokenized command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub name: String,
    pub args: Vec<String>,
    /// Switch names, without their leading `-`.
    pub switches: BTreeSet<String>,
}

impl Invocation {
    pub fn new(name: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            args,
            switches: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_switches<I>(mut self, switches: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.switches.extend(switches.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn has_switch(&self, name: &str) -> bool {
        self.switches.contains(name)
    }
}

/// A token and whether any of it was quoted or escaped.
struct Token {
    text: String,
    plain: bool,
}

impl Token {
    /// Name of the switch this token spells, if any.
    ///
    /// Only bare `-name` tokens are switches; `-3` stays a (negative)
    /// argument and `"-h"` stays a literal argument.
    fn switch(&self) -> Option<&str> {
        if !self.plain {
            return None;
        }
        let name = self.text.strip_prefix('-')?;
        match name.chars().next() {
            Some(c) if !c.is_ascii_digit() => Some(name),
            _ => None,
        }
    }
}

/// Stateless command line parser.
pub struct InputParser;

impl InputParser {
    /// Parses a line into an [`Invocation`].
    ///
    /// Returns `Ok(None)` for a blank line.
    ///
    /// # Input Format
    ///
    /// | Input | Name | Args |
    /// |-------|------|------|
    /// | `ps` | `ps` | none |
    /// | `-ps` | `ps` | none (leading `-` is optional) |
    /// | `kill 12` | `kill` | `12` |
    /// | `echo "a b" c` | `echo` | `a b`, `c` |
    /// | `echo a\ b` | `echo` | `a b` |
    /// | `echo "say \"hi\""` | `echo` | `say "hi"` |
    /// | `kill -h` | `kill` | none, switch `h` |
    /// | `echo "-h" -3` | `echo` | `-h`, `-3` |
    ///
    /// # Errors
    ///
    /// [`CommandError::Parse`] on an unterminated quote or a trailing
    /// backslash.
    pub fn parse(line: &str) -> Result<Option<Invocation>, CommandError> {
        let mut tokens = Self::split(line)?.into_iter();
        let Some(first) = tokens.next() else {
            return Ok(None);
        };
        let name = first.text.strip_prefix('-').unwrap_or(&first.text).to_string();
        if name.is_empty() {
            return Err(CommandError::parse(line, "missing command name"));
        }

        let mut args = Vec::new();
        let mut switches = BTreeSet::new();
        for token in tokens {
            match token.switch() {
                Some(switch) => {
                    switches.insert(switch.to_string());
                }
                None => args.push(token.text),
            }
        }
        Ok(Some(Invocation {
            name,
            args,
            switches,
        }))
    }

    /// Splits a line on whitespace, honoring double quotes and
    /// backslash escapes.
    ///
    /// # Errors
    ///
    /// [`CommandError::Parse`] on an unterminated quote or a trailing
    /// backslash.
    pub fn tokenize(line: &str) -> Result<Vec<String>, CommandError> {
        Ok(Self::split(line)?.into_iter().map(|t| t.text).collect())
    }

    fn split(line: &str) -> Result<Vec<Token>, CommandError> {
        let mut tokens = Vec::new();
        let mut current = String::new();
        // A quoted empty string is still a token.
        let mut in_token = false;
        let mut quoted = false;
        let mut plain = true;
        let mut chars = line.chars();

        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some(escaped) => {
                        current.push(escaped);
                        in_token = true;
                        plain = false;
                    }
                    None => return Err(CommandError::parse(line, "trailing backslash")),
                },
                '"' => {
                    quoted = !quoted;
                    in_token = true;
                    plain = false;
                }
                c if c.is_whitespace() && !quoted => {
                    if in_token {
                        tokens.push(Token {
                            text: std::mem::take(&mut current),
                            plain,
                        });
                        in_token = false;
                        plain = true;
                    }
                }
                c => {
                    current.push(c);
                    in_token = true;
                }
            }
        }

        if quoted {
            return Err(CommandError::parse(line, "unterminated quote"));
        }
        if in_token {
            tokens.push(Token {
                text: current,
                plain,
            });
        }
        Ok(tokens)
    }
}
