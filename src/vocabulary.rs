//! # Vocabulary
//!
//! The allowed building blocks for expressions: terminals, one-argument functions
//! and two-argument functions. The vocabulary is handed to the expression engine
//! whenever it generates or mutates a program.

use crate::error::{GpError, Result};

/// The placeholder terminal replaced with a random constant after generation and mutation.
pub const CONSTANT_SYNTHESIS_TOKEN: &str = "CONSTANT-SYNTHESIS";

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    terminals: Vec<String>,
    one_arg_functions: Vec<String>,
    two_arg_functions: Vec<String>,
}

impl Vocabulary {
    pub fn new<T, O, W>(terminals: T, one_arg_functions: O, two_arg_functions: W) -> Self
    where
        T: IntoIterator,
        T::Item: Into<String>,
        O: IntoIterator,
        O::Item: Into<String>,
        W: IntoIterator,
        W::Item: Into<String>,
    {
        Self {
            terminals: collect_words(terminals),
            one_arg_functions: collect_words(one_arg_functions),
            two_arg_functions: collect_words(two_arg_functions),
        }
    }

    /// Parses three comma-separated word lists, as found on the lines of a vocabulary file.
    pub fn from_lists(terminals: &str, one_arg_functions: &str, two_arg_functions: &str) -> Self {
        Self::new(
            split_list(terminals),
            split_list(one_arg_functions),
            split_list(two_arg_functions),
        )
    }

    pub fn terminals(&self) -> &[String] {
        &self.terminals
    }

    pub fn one_arg_functions(&self) -> &[String] {
        &self.one_arg_functions
    }

    pub fn two_arg_functions(&self) -> &[String] {
        &self.two_arg_functions
    }

    pub fn set_terminals(&mut self, terminals: Vec<String>) {
        self.terminals = terminals;
    }

    pub fn set_one_arg_functions(&mut self, functions: Vec<String>) {
        self.one_arg_functions = functions;
    }

    pub fn set_two_arg_functions(&mut self, functions: Vec<String>) {
        self.two_arg_functions = functions;
    }

    /// Whether the constant-synthesis placeholder is one of the terminals.
    pub fn synthesizes_constants(&self) -> bool {
        self.terminals.iter().any(|t| t == CONSTANT_SYNTHESIS_TOKEN)
    }

    /// Checks that programs can be built from this vocabulary.
    ///
    /// # Errors
    ///
    /// Returns `GpError::Configuration` if there are no terminals.
    pub fn validate(&self) -> Result<()> {
        if self.terminals.is_empty() {
            return Err(GpError::Configuration(
                "Vocabulary must contain at least one terminal".to_string(),
            ));
        }
        Ok(())
    }
}

fn collect_words<I>(words: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    words.into_iter().map(Into::into).collect()
}

fn split_list(line: &str) -> Vec<String> {
    line.split(',')
        .map(str::trim)
        .filter(|word| !word.is_empty())
        .map(String::from)
        .collect()
}
