//! Routine document parser.
//!
//! | Line | Meaning |
//! |------|---------|
//! | blank, or starting with `;` | ignored |
//! | `= name` | starts routine `name` (closes the previous one) |
//! | `while <instruction>` | opens a loop; its condition is a single instruction |
//! | `end` | closes the innermost loop, or the routine itself |
//! | `wait <n>` / `wait $k` | waits `n` ticks |
//! | `forever` | never completes |
//! | `-command args...` | runs a command; `$k` is replaced by routine argument `k` |
//!
//! Lines are trimmed and numbered from 1 in error messages. Loops still
//! open at the end of the document are closed implicitly.

use crate::{
    AutoRoutine, CommandInstruction, Instruction, RoutineError, WaitInstruction,
    WhileInstruction,
};

/// Stateless routine parser.
pub struct RoutineParser;

/// Instructions collected for the routine or for an open `while`.
struct Block {
    condition: Option<Instruction>,
    instructions: Vec<Instruction>,
}

impl Block {
    fn new(condition: Option<Instruction>) -> Self {
        Self {
            condition,
            instructions: Vec::new(),
        }
    }
}

/// The routine being built.
struct Open {
    name: String,
    /// `blocks[0]` is the routine body.
    blocks: Vec<Block>,
}

impl Open {
    fn new(name: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            blocks: vec![Block::new(None)],
        }
    }

    fn push(&mut self, instruction: Instruction) {
        if let Some(block) = self.blocks.last_mut() {
            block.instructions.push(instruction);
        }
    }

    /// Closes the innermost block; returns `true` when that was the
    /// routine itself.
    fn close_block(&mut self) -> bool {
        match self.blocks.pop() {
            Some(Block {
                condition: Some(condition),
                instructions,
            }) => {
                self.push(WhileInstruction::new(condition, instructions).into());
                false
            }
            Some(Block {
                condition: None,
                instructions,
            }) => {
                self.blocks.push(Block {
                    condition: None,
                    instructions,
                });
                true
            }
            None => true,
        }
    }

    fn finish(mut self) -> AutoRoutine {
        while self.blocks.len() > 1 {
            self.close_block();
        }
        let instructions = self
            .blocks
            .pop()
            .map(|block| block.instructions)
            .unwrap_or_default();
        AutoRoutine::new(self.name, instructions)
    }
}

impl RoutineParser {
    /// Parses every routine in `text`, in document order.
    ///
    /// # Errors
    ///
    /// - [`RoutineError::UnexpectedRoutineStart`] for `=` inside a `while`
    /// - [`RoutineError::OutsideRoutine`] for an instruction before any `=`
    /// - [`RoutineError::InvalidInstruction`] for anything unparsable
    pub fn parse(text: &str) -> Result<Vec<AutoRoutine>, RoutineError> {
        let mut routines = Vec::new();
        let mut current: Option<Open> = None;

        for (index, raw) in text.lines().enumerate() {
            let line_number = index + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with(';') {
                continue;
            }

            if let Some(name) = line.strip_prefix('=') {
                if let Some(open) = current.take() {
                    if open.blocks.len() > 1 {
                        return Err(RoutineError::UnexpectedRoutineStart { line: line_number });
                    }
                    routines.push(open.finish());
                }
                current = Some(Open::new(name));
                continue;
            }

            let Some(open) = current.as_mut() else {
                return Err(RoutineError::OutsideRoutine {
                    instruction: line.to_string(),
                    line: line_number,
                });
            };

            if line == "end" {
                if open.close_block() {
                    if let Some(open) = current.take() {
                        routines.push(open.finish());
                    }
                }
            } else if let Some(condition) = while_condition(line) {
                let condition = Self::parse_instruction(condition, line_number)?;
                open.blocks.push(Block::new(Some(condition)));
            } else {
                let instruction = Self::parse_instruction(line, line_number)?;
                open.push(instruction);
            }
        }

        if let Some(open) = current {
            routines.push(open.finish());
        }
        Ok(routines)
    }

    /// Parses a single (non-block) instruction.
    ///
    /// # Errors
    ///
    /// [`RoutineError::InvalidInstruction`] naming `line_number`, with the
    /// placeholder, duration or tokenizer error as its source.
    pub fn parse_instruction(text: &str, line_number: usize) -> Result<Instruction, RoutineError> {
        let invalid = |cause: Option<RoutineError>| RoutineError::InvalidInstruction {
            instruction: text.to_string(),
            line: line_number,
            source: cause.map(Box::new),
        };
        let text = text.trim();

        if text == "forever" {
            return Ok(Instruction::Forever);
        }
        if let Some(duration) = keyword_argument(text, "wait") {
            return WaitInstruction::parse(duration)
                .map(Instruction::from)
                .map_err(|e| invalid(Some(e)));
        }
        if text.starts_with('-') {
            return CommandInstruction::parse(text)
                .map(Instruction::from)
                .map_err(|e| invalid(Some(e)));
        }
        Err(invalid(None))
    }
}

fn while_condition(line: &str) -> Option<&str> {
    keyword_argument(line, "while")
}

/// The text after `keyword` when the line is `keyword <argument>`.
fn keyword_argument<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(keyword)?;
    if rest.starts_with(char::is_whitespace) {
        Some(rest.trim())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_needs_separator() {
        assert_eq!(keyword_argument("wait 10", "wait"), Some("10"));
        assert_eq!(keyword_argument("wait\t $2 ", "wait"), Some("$2"));
        assert_eq!(keyword_argument("waiting 10", "wait"), None);
        assert_eq!(keyword_argument("wait", "wait"), None);
    }

    #[test]
    fn single_instructions() {
        assert!(matches!(
            RoutineParser::parse_instruction("forever", 1),
            Ok(Instruction::Forever)
        ));
        assert!(matches!(
            RoutineParser::parse_instruction("wait 3", 1),
            Ok(Instruction::Wait(_))
        ));
        assert!(matches!(
            RoutineParser::parse_instruction("-cmd a", 1),
            Ok(Instruction::Command(_))
        ));
    }

    #[test]
    fn bad_instructions_name_the_line() {
        for text in ["something", "wait", "wait soon", "-cmd $0", "-cmd \"open"] {
            let err = RoutineParser::parse_instruction(text, 7).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("could not parse instruction '{text}' at line 7")
            );
        }
    }
}
