//! Cursor over the arguments of an invocation.

use std::collections::BTreeSet;

/// Arguments handed to a command provider.
///
/// Consuming an argument (through [`Iterator::next`]) moves the cursor;
/// [`get`](Self::get) and [`peek`](Self::peek) are relative to it. Parent
/// commands consume the subcommand names, so a leaf provider only sees
/// its own arguments. Switches (`-h`) are kept apart and never consumed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Arguments {
    args: Vec<String>,
    switches: BTreeSet<String>,
    position: usize,
}

impl Arguments {
    pub fn new(args: Vec<String>) -> Self {
        Self {
            args,
            switches: BTreeSet::new(),
            position: 0,
        }
    }

    #[must_use]
    pub fn with_switches(mut self, switches: BTreeSet<String>) -> Self {
        self.switches = switches;
        self
    }

    /// Whether `-name` was given.
    #[must_use]
    pub fn has_switch(&self, name: &str) -> bool {
        self.switches.contains(name)
    }

    /// The first unconsumed argument.
    #[must_use]
    pub fn peek(&self) -> Option<&str> {
        self.get(0)
    }

    /// The `index`-th unconsumed argument.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.args.get(self.position + index).map(String::as_str)
    }

    /// Number of unconsumed arguments.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.args.len().saturating_sub(self.position)
    }

    /// Total number of arguments, consumed or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.args.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Unconsumed arguments.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        self.args.get(self.position..).unwrap_or_default()
    }
}

impl Iterator for Arguments {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let arg = self.args.get(self.position).cloned();
        if arg.is_some() {
            self.position += 1;
        }
        arg
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining(), Some(self.remaining()))
    }
}

impl From<Vec<String>> for Arguments {
    fn from(args: Vec<String>) -> Self {
        Self::new(args)
    }
}
