use std::fmt;

pub(crate) type DynStdError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub struct Error(Box<Inner>);

#[cfg(test)]
struct _AssertErrorIsSendSync
where
    Error: Send + Sync;

struct Inner {
    kind: ErrorKind,

    /// Display form of the option involved ("--name" or "-x"), when known.
    arg: Option<String>,
    /// The offending raw input, when there is one.
    input: Option<String>,
    /// The underlying value-parse failure, if there is any.
    source: Option<DynStdError>,

    #[cfg(feature = "help")]
    help: Option<String>,
}

#[derive(Debug)]
pub(crate) enum ErrorKind {
    // Registration and lifecycle errors. These indicate a mistake in the
    // option declarations themselves, not in user input.
    DuplicateName { name: String, first: String, second: String },
    DuplicateLetter { letter: char, first: String, second: String },
    InvalidLetter { letter: char, entity: String },
    AlreadyInitialized,
    MissingArg0,

    // Command-line errors.
    InvalidUtf8,
    UnknownOption,
    DuplicateOption,
    ValueForBoolOption,
    MissingValue,
    InvalidValue { type_name: &'static str },

    // Finalization errors.
    MissingRequired { description: String },

    // Not really an error, but for bubbling out.
    #[cfg(feature = "help")]
    Help,
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source.as_ref().map(|err| &**err as _)
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let e = &*self.0;
        f.debug_struct("Error")
            .field("kind", &e.kind)
            .field("arg", &e.arg)
            .field("input", &e.input)
            .field("source", &e.source)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let e = &*self.0;

        let opt_arg = |f: &mut fmt::Formatter<'_>| {
            if let Some(arg) = &e.arg {
                f.write_str(" '")?;
                f.write_str(arg)?;
                f.write_str("'")?;
            }
            Ok(())
        };
        let opt_input = |f: &mut fmt::Formatter<'_>| {
            if let Some(input) = &e.input {
                f.write_str(" '")?;
                f.write_str(input)?;
                f.write_str("'")?;
            }
            Ok(())
        };

        match &e.kind {
            ErrorKind::DuplicateName { name, first, second } => {
                write!(f, "two options with the same name '--{name}': (1) {first}; (2) {second}")
            }
            ErrorKind::DuplicateLetter { letter, first, second } => {
                write!(f, "two options with the same letter '-{letter}': (1) {first}; (2) {second}")
            }
            ErrorKind::InvalidLetter { letter, entity } => {
                write!(f, "invalid option letter '{letter}', must be an ASCII letter: {entity}")
            }
            ErrorKind::AlreadyInitialized => {
                f.write_str("command-line options already initialized")
            }
            ErrorKind::MissingArg0 => f.write_str("missing executable argument (argv[0])"),

            ErrorKind::InvalidUtf8 => {
                f.write_str("invalid UTF-8 in argument")?;
                opt_input(f)
            }
            ErrorKind::UnknownOption => {
                f.write_str("unknown option")?;
                opt_arg(f)
            }
            ErrorKind::DuplicateOption => {
                f.write_str("option")?;
                opt_arg(f)?;
                f.write_str(" passed multiple times")
            }
            ErrorKind::ValueForBoolOption => {
                f.write_str("argument given to bool option")?;
                opt_arg(f)
            }
            ErrorKind::MissingValue => {
                f.write_str("expected argument for")?;
                opt_arg(f)
            }
            ErrorKind::InvalidValue { type_name } => {
                f.write_str("unable to parse value")?;
                opt_input(f)?;
                f.write_str(" for option")?;
                opt_arg(f)?;
                write!(f, " of type {type_name}")
            }

            ErrorKind::MissingRequired { description } => {
                f.write_str("required option")?;
                opt_arg(f)?;
                write!(f, " not set: {description}")
            }

            #[cfg(feature = "help")]
            ErrorKind::Help => f.write_str(e.help.as_deref().unwrap_or_default()),
        }
    }
}

impl Error {
    fn new(kind: ErrorKind) -> Self {
        Self(Box::new(Inner {
            kind,
            arg: None,
            input: None,
            source: None,
            #[cfg(feature = "help")]
            help: None,
        }))
    }

    pub(crate) fn with_source(mut self, source: DynStdError) -> Self {
        self.0.source = Some(source);
        self
    }

    /// Wrap rendered help text so it bubbles out of the parse like an error.
    #[cfg(feature = "help")]
    pub(crate) fn help(text: String) -> Self {
        let mut e = Self::new(ErrorKind::Help);
        e.0.help = Some(text);
        e
    }

    /// Returns true when this "error" is a rendered help request.
    #[cfg(feature = "help")]
    pub fn is_help(&self) -> bool {
        matches!(self.0.kind, ErrorKind::Help)
    }
}

impl From<ErrorKind> for Error {
    #[cold]
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl ErrorKind {
    #[cold]
    pub(crate) fn with_arg(self, arg: impl Into<String>) -> Error {
        let mut e = Error::new(self);
        e.0.arg = Some(arg.into());
        e
    }

    #[cold]
    pub(crate) fn with_input(self, input: impl Into<String>) -> Error {
        let mut e = Error::new(self);
        e.0.input = Some(input.into());
        e
    }

    #[cold]
    pub(crate) fn with_arg_input(self, arg: impl Into<String>, input: impl Into<String>) -> Error {
        let mut e = Error::new(self);
        e.0.arg = Some(arg.into());
        e.0.input = Some(input.into());
        e
    }
}
