//! The parsing state machine.
//!
//! Consumes the flattened stream left to right with a few positions of
//! lookahead and no backtracking: every consumed character is final.
//! Two modes only: `scanning` (the default) and `literal`, entered once
//! after a bare `--` token and never left.

use std::ops::ControlFlow;

use crate::Result;
use crate::entity::ValueKind;
use crate::error::ErrorKind;
use crate::registry::Registry;
use crate::stream::{CharStream, Chr};

pub(crate) struct ArgParser<'a> {
    stream: CharStream,
    registry: &'a mut Registry,
    literal_mode: bool,
    positional: Vec<String>,
}

impl<'a> ArgParser<'a> {
    pub(crate) fn new(stream: CharStream, registry: &'a mut Registry) -> Self {
        Self { stream, registry, literal_mode: false, positional: Vec::new() }
    }

    pub(crate) fn into_positional(self) -> Vec<String> {
        self.positional
    }

    pub(crate) fn parse(&mut self) -> Result<()> {
        loop {
            if self.stream.peek(0) == Chr::StreamEnd {
                return Ok(());
            }

            if self.literal_mode {
                let arg = self.stream.take_arg();
                self.positional.push(arg);
            } else if self.stream.peek(0) == Chr::Byte(b'-') {
                if self.stream.peek(1) == Chr::Byte(b'-') {
                    if self.stream.peek(2) == Chr::ArgEnd {
                        self.parse_double_dash();
                    } else {
                        self.parse_long_option()?;
                    }
                } else if self.stream.peek(1).is_ascii_alphabetic() {
                    self.parse_short_cluster()?;
                } else {
                    // A lone `-` or something like `-9`.
                    let arg = self.stream.take_arg();
                    self.positional.push(arg);
                }
            } else {
                let arg = self.stream.take_arg();
                self.positional.push(arg);
            }
        }
    }

    /// A bare `--` token: switch to literal mode permanently.
    fn parse_double_dash(&mut self) {
        self.literal_mode = true;
        self.stream.advance(3);
    }

    /// `--name` or `--name=value`. The inline value, if any, stays in the
    /// stream for value dispatch to consume.
    fn parse_long_option(&mut self) -> Result<()> {
        self.stream.advance(2);

        let mut name = Vec::new();
        let mut has_inline = false;
        loop {
            match self.stream.pop() {
                Chr::Byte(b'=') => {
                    has_inline = true;
                    break;
                }
                Chr::Byte(b) => name.push(b),
                Chr::ArgEnd => break,
                Chr::StreamEnd => unreachable!(),
            }
        }
        let name = String::from_utf8_lossy(&name).into_owned();

        let index = self.registry.lookup_by_name(&name)?;
        if has_inline && self.registry.entity(index).kind() == ValueKind::Flag {
            return Err(ErrorKind::ValueForBoolOption.with_arg(format!("--{name}")));
        }
        self.dispatch(index)?;
        Ok(())
    }

    /// A `-abc` cluster: boolean letters chain; the first scalar or vector
    /// letter consumes the rest of the input and ends the cluster.
    fn parse_short_cluster(&mut self) -> Result<()> {
        self.stream.advance(1);
        let mut done = false;
        while !done {
            let Chr::Byte(letter) = self.stream.pop() else { unreachable!() };
            if self.stream.peek(0) == Chr::ArgEnd {
                self.stream.advance(1);
                done = true;
            }
            let index = self.registry.lookup_by_letter(letter as char)?;
            if self.dispatch(index)?.is_break() {
                return Ok(());
            }
        }
        Ok(())
    }

    /// Route a recognized option to its value consumption. `Continue`
    /// means no input was consumed and a cluster may keep going.
    fn dispatch(&mut self, index: usize) -> Result<ControlFlow<()>> {
        let entity = self.registry.entity_mut(index);
        match entity.kind() {
            ValueKind::Flag => {
                entity.set_flag()?;
                Ok(ControlFlow::Continue(()))
            }
            ValueKind::Scalar => {
                if self.stream.peek(0) == Chr::StreamEnd {
                    return Err(ErrorKind::MissingValue.with_arg(entity.display_name()));
                }
                let raw = self.stream.take_arg();
                entity.set_value(&raw)?;
                Ok(ControlFlow::Break(()))
            }
            ValueKind::Vector => {
                if self.stream.peek(0) == Chr::StreamEnd {
                    return Err(ErrorKind::MissingValue.with_arg(entity.display_name()));
                }
                loop {
                    let raw = self.stream.take_arg();
                    entity.add_value(&raw)?;
                    if !continue_vecargs(&self.stream) {
                        break;
                    }
                }
                Ok(ControlFlow::Break(()))
            }
        }
    }
}

/// Lookahead rule for vector options, evaluated at each argument boundary:
/// keep absorbing values (including ones that merely look negative, like
/// `-2`) but yield to the next option or to the literal-mode separator.
pub(crate) fn continue_vecargs(stream: &CharStream) -> bool {
    if stream.peek(0) == Chr::StreamEnd {
        return false;
    }
    if stream.peek(0) != Chr::Byte(b'-') {
        return true;
    }
    if stream.peek(1) == Chr::Byte(b'-') {
        return false;
    }
    if stream.peek(1) == Chr::ArgEnd {
        return true;
    }
    if stream.peek(1).is_ascii_alphabetic() {
        return false;
    }
    true
}
