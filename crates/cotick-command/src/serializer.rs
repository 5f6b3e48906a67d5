//! Builds command lines that survive [`InputParser`](crate::InputParser).

use std::fmt;

/// Incrementally renders `name "arg1" "arg2"`.
///
/// ```
/// use cotick_command::{CommandSerializer, InputParser};
///
/// let line = CommandSerializer::new("echo").arg("say \"hi\"").arg(3).to_string();
/// assert_eq!(line, r#"echo "say \"hi\"" "3""#);
///
/// let inv = InputParser::parse(&line).unwrap().unwrap();
/// assert_eq!(inv.args, ["say \"hi\"", "3"]);
/// ```
#[derive(Debug, Clone)]
pub struct CommandSerializer {
    line: String,
}

impl CommandSerializer {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            line: command.into(),
        }
    }

    /// Appends the `Display` form of `value` as a quoted argument.
    #[must_use]
    pub fn arg(mut self, value: impl fmt::Display) -> Self {
        self.line.push_str(" \"");
        for c in value.to_string().chars() {
            if matches!(c, '"' | '\\') {
                self.line.push('\\');
            }
            self.line.push(c);
        }
        self.line.push('"');
        self
    }

    #[must_use]
    pub fn args<I>(self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: fmt::Display,
    {
        values.into_iter().fold(self, Self::arg)
    }
}

impl fmt::Display for CommandSerializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InputParser;

    #[test]
    fn no_arguments() {
        assert_eq!(CommandSerializer::new("ps").to_string(), "ps");
    }

    #[test]
    fn spaces_and_escapes_round_trip() {
        let line = CommandSerializer::new("set")
            .args(["door state", r"C:\tmp", ""])
            .to_string();
        let inv = InputParser::parse(&line)
            .expect("should parse")
            .expect("not blank");
        assert_eq!(inv.name, "set");
        assert_eq!(inv.args, ["door state", r"C:\tmp", ""]);
    }
}
