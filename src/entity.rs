//! One registered option: identity, value kind, and runtime parse state.

use std::panic::Location;

use crate::Result;
use crate::error::ErrorKind;
use crate::values::{AnyValue, AppendFn, ClearFn, ParseFn};

/// The three value kinds an option can be declared with, fixed at
/// registration time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ValueKind {
    Flag,
    Scalar,
    Vector,
}

/// Value storage, one variant per kind. A scalar slot is `None` only for
/// a required option that has not been set yet; a vector slot always holds
/// a `Vec<T>` (the compiled-in default, or empty when required).
pub(crate) enum Slot {
    Flag {
        value: bool,
    },
    Scalar {
        value: Option<AnyValue>,
        parse: ParseFn,
        type_name: &'static str,
        default_text: Option<String>,
    },
    Vector {
        values: AnyValue,
        append: AppendFn,
        clear: ClearFn,
        type_name: &'static str,
        default_text: Option<String>,
    },
}

pub(crate) struct OptionEntity {
    pub(crate) name: String,
    pub(crate) letter: Option<char>,
    pub(crate) description: String,
    pub(crate) required: bool,
    pub(crate) declared_at: &'static Location<'static>,
    pub(crate) set: bool,
    pub(crate) slot: Slot,
}

impl OptionEntity {
    pub(crate) fn kind(&self) -> ValueKind {
        match self.slot {
            Slot::Flag { .. } => ValueKind::Flag,
            Slot::Scalar { .. } => ValueKind::Scalar,
            Slot::Vector { .. } => ValueKind::Vector,
        }
    }

    /// The spelling used in diagnostics, always the long form.
    pub(crate) fn display_name(&self) -> String {
        format!("--{}", self.name)
    }

    /// One-line identification for registration diagnostics.
    pub(crate) fn summary(&self) -> String {
        let type_name = match &self.slot {
            Slot::Flag { .. } => "bool",
            Slot::Scalar { type_name, .. } | Slot::Vector { type_name, .. } => *type_name,
        };
        format!(
            "[option {} of type {} defined at {}:{}]",
            self.name,
            type_name,
            self.declared_at.file(),
            self.declared_at.line(),
        )
    }

    /// Turn a boolean option on. The parser routes bare flags here.
    pub(crate) fn set_flag(&mut self) -> Result<()> {
        let Slot::Flag { value } = &mut self.slot else { unreachable!() };
        if self.set {
            return Err(ErrorKind::DuplicateOption.with_arg(format!("--{}", self.name)));
        }
        self.set = true;
        *value = true;
        Ok(())
    }

    /// Assign a scalar option from one raw argument.
    pub(crate) fn set_value(&mut self, raw: &str) -> Result<()> {
        let Slot::Scalar { value, parse, type_name, .. } = &mut self.slot else { unreachable!() };
        let (parse, type_name) = (*parse, *type_name);
        if self.set {
            return Err(ErrorKind::DuplicateOption.with_arg(format!("--{}", self.name)));
        }
        self.set = true;
        match parse(raw) {
            Ok(parsed) => {
                *value = Some(parsed);
                Ok(())
            }
            Err(source) => Err(ErrorKind::InvalidValue { type_name }
                .with_arg_input(format!("--{}", self.name), raw)
                .with_source(source)),
        }
    }

    /// Append one raw argument to a vector option. The first append
    /// discards the compiled-in default.
    pub(crate) fn add_value(&mut self, raw: &str) -> Result<()> {
        let Slot::Vector { values, append, clear, type_name, .. } = &mut self.slot else {
            unreachable!()
        };
        let (append, clear, type_name) = (*append, *clear, *type_name);
        if !self.set {
            clear(values);
            self.set = true;
        }
        append(values, raw).map_err(|source| {
            ErrorKind::InvalidValue { type_name }
                .with_arg_input(format!("--{}", self.name), raw)
                .with_source(source)
        })
    }

    pub(crate) fn check_required(&self) -> Result<()> {
        if self.required && !self.set {
            return Err(ErrorKind::MissingRequired { description: self.description.clone() }
                .with_arg(self.display_name()));
        }
        Ok(())
    }

    #[cfg(feature = "help")]
    fn arg_shape(&self) -> &'static str {
        match self.kind() {
            ValueKind::Flag => "",
            ValueKind::Scalar => "<arg>",
            ValueKind::Vector => "<arg1> <arg2> ... <argn>",
        }
    }

    /// Append this option's help block: usage lines for both spellings,
    /// then the indented description with its default or required marker.
    #[cfg(feature = "help")]
    pub(crate) fn help_into(&self, out: &mut String) {
        let shape = self.arg_shape();
        out.push_str("  --");
        out.push_str(&self.name);
        if !shape.is_empty() {
            out.push(' ');
            out.push_str(shape);
        }
        out.push('\n');
        if let Some(letter) = self.letter {
            out.push_str("  -");
            out.push(letter);
            if !shape.is_empty() {
                out.push(' ');
                out.push_str(shape);
            }
            out.push('\n');
        }
        out.push('\n');
        out.push_str("    ");
        out.push_str(&self.description);
        match &self.slot {
            Slot::Flag { .. } => {}
            Slot::Scalar { default_text, .. } | Slot::Vector { default_text, .. } => {
                if self.required {
                    out.push_str(" (required)");
                } else if let Some(default_text) = default_text {
                    out.push_str(" (default: ");
                    out.push_str(default_text);
                    out.push(')');
                }
            }
        }
        out.push('\n');
        out.push('\n');
    }
}
