//! The option registry: owns every declared option, compiles the lookup
//! tables, and drives the full parse lifecycle.

use std::collections::HashMap;
use std::ffi::OsString;
use std::fmt;
use std::marker::PhantomData;
use std::panic::Location;
use std::path::PathBuf;
use std::str::FromStr;

use crate::Result;
use crate::entity::{OptionEntity, Slot};
use crate::error::{DynStdError, ErrorKind};
use crate::parser::ArgParser;
use crate::stream::CharStream;
use crate::values::{append_fn, clear_fn, parse_fn, render_default, render_vec_default};

/// Typed handle to one registered option, returned at declaration time
/// and redeemed against the same registry after parsing.
pub struct OptKey<T> {
    index: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for OptKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for OptKey<T> {}

pub struct Registry {
    entities: Vec<OptionEntity>,
    by_name: HashMap<String, usize>,
    by_letter: HashMap<char, usize>,
    positional: Vec<String>,
    program_name: String,
    compiled: bool,
    parsed: bool,
    #[cfg(feature = "help")]
    help_key: OptKey<bool>,
}

impl Registry {
    /// Create an empty registry. With the `help` feature (the default)
    /// this also installs the reserved `--help`/`-h` option.
    #[track_caller]
    pub fn new() -> Self {
        let mut registry = Self {
            entities: Vec::new(),
            by_name: HashMap::new(),
            by_letter: HashMap::new(),
            positional: Vec::new(),
            program_name: String::new(),
            compiled: false,
            parsed: false,
            #[cfg(feature = "help")]
            help_key: OptKey { index: 0, _marker: PhantomData },
        };
        #[cfg(feature = "help")]
        {
            registry.help_key = registry.flag("help", Some('h'), "list program options");
        }
        registry
    }

    fn push_entity(&mut self, entity: OptionEntity) -> usize {
        assert!(!self.compiled, "option declared after initialization");
        assert!(!entity.name.is_empty(), "option name must not be empty");
        self.entities.push(entity);
        self.entities.len() - 1
    }

    /// Declare a boolean option. Flags default to `false` and can never
    /// be required, so neither can be specified.
    #[track_caller]
    pub fn flag(&mut self, name: &str, letter: Option<char>, description: &str) -> OptKey<bool> {
        let index = self.push_entity(OptionEntity {
            name: name.to_owned(),
            letter,
            description: description.to_owned(),
            required: false,
            declared_at: Location::caller(),
            set: false,
            slot: Slot::Flag { value: false },
        });
        OptKey { index, _marker: PhantomData }
    }

    /// Declare a scalar option with a default value.
    #[track_caller]
    pub fn scalar<T>(
        &mut self,
        name: &str,
        letter: Option<char>,
        default: T,
        description: &str,
    ) -> OptKey<T>
    where
        T: FromStr<Err: Into<DynStdError>> + fmt::Display + Send + Sync + 'static,
    {
        let default_text = Some(render_default(&default));
        let index = self.push_entity(OptionEntity {
            name: name.to_owned(),
            letter,
            description: description.to_owned(),
            required: false,
            declared_at: Location::caller(),
            set: false,
            slot: Slot::Scalar {
                value: Some(Box::new(default)),
                parse: parse_fn::<T>(),
                type_name: std::any::type_name::<T>(),
                default_text,
            },
        });
        OptKey { index, _marker: PhantomData }
    }

    /// Declare a scalar option that must be supplied on the command line.
    #[track_caller]
    pub fn scalar_required<T>(
        &mut self,
        name: &str,
        letter: Option<char>,
        description: &str,
    ) -> OptKey<T>
    where
        T: FromStr<Err: Into<DynStdError>> + fmt::Display + Send + Sync + 'static,
    {
        let index = self.push_entity(OptionEntity {
            name: name.to_owned(),
            letter,
            description: description.to_owned(),
            required: true,
            declared_at: Location::caller(),
            set: false,
            slot: Slot::Scalar {
                value: None,
                parse: parse_fn::<T>(),
                type_name: std::any::type_name::<T>(),
                default_text: None,
            },
        });
        OptKey { index, _marker: PhantomData }
    }

    /// Declare a multi-valued option with a default sequence. The first
    /// value parsed from the command line discards the default.
    #[track_caller]
    pub fn vector<T, I>(
        &mut self,
        name: &str,
        letter: Option<char>,
        defaults: I,
        description: &str,
    ) -> OptKey<Vec<T>>
    where
        T: FromStr<Err: Into<DynStdError>> + fmt::Display + Send + Sync + 'static,
        I: IntoIterator<Item = T>,
    {
        let defaults: Vec<T> = defaults.into_iter().collect();
        let default_text = Some(render_vec_default(&defaults));
        let index = self.push_entity(OptionEntity {
            name: name.to_owned(),
            letter,
            description: description.to_owned(),
            required: false,
            declared_at: Location::caller(),
            set: false,
            slot: Slot::Vector {
                values: Box::new(defaults),
                append: append_fn::<T>(),
                clear: clear_fn::<T>(),
                type_name: std::any::type_name::<T>(),
                default_text,
            },
        });
        OptKey { index, _marker: PhantomData }
    }

    /// Declare a multi-valued option that must be supplied on the command
    /// line at least once.
    #[track_caller]
    pub fn vector_required<T>(
        &mut self,
        name: &str,
        letter: Option<char>,
        description: &str,
    ) -> OptKey<Vec<T>>
    where
        T: FromStr<Err: Into<DynStdError>> + fmt::Display + Send + Sync + 'static,
    {
        let index = self.push_entity(OptionEntity {
            name: name.to_owned(),
            letter,
            description: description.to_owned(),
            required: true,
            declared_at: Location::caller(),
            set: false,
            slot: Slot::Vector {
                values: Box::new(Vec::<T>::new()),
                append: append_fn::<T>(),
                clear: clear_fn::<T>(),
                type_name: std::any::type_name::<T>(),
                default_text: None,
            },
        });
        OptKey { index, _marker: PhantomData }
    }

    /// Build the name and letter lookup tables. Runs exactly once; any
    /// collision names both conflicting declarations.
    pub fn compile(&mut self) -> Result<()> {
        if self.compiled {
            return Err(ErrorKind::AlreadyInitialized.into());
        }
        self.compiled = true;

        for (index, entity) in self.entities.iter().enumerate() {
            if let Some(letter) = entity.letter {
                if !letter.is_ascii_alphabetic() {
                    return Err(
                        ErrorKind::InvalidLetter { letter, entity: entity.summary() }.into()
                    );
                }
            }
            if let Some(&prev) = self.by_name.get(&entity.name) {
                return Err(ErrorKind::DuplicateName {
                    name: entity.name.clone(),
                    first: self.entities[prev].summary(),
                    second: entity.summary(),
                }
                .into());
            }
            self.by_name.insert(entity.name.clone(), index);
            if let Some(letter) = entity.letter {
                if let Some(&prev) = self.by_letter.get(&letter) {
                    return Err(ErrorKind::DuplicateLetter {
                        letter,
                        first: self.entities[prev].summary(),
                        second: entity.summary(),
                    }
                    .into());
                }
                self.by_letter.insert(letter, index);
            }
        }
        Ok(())
    }

    pub(crate) fn lookup_by_name(&self, name: &str) -> Result<usize> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| ErrorKind::UnknownOption.with_arg(format!("--{name}")))
    }

    pub(crate) fn lookup_by_letter(&self, letter: char) -> Result<usize> {
        self.by_letter
            .get(&letter)
            .copied()
            .ok_or_else(|| ErrorKind::UnknownOption.with_arg(format!("-{letter}")))
    }

    pub(crate) fn entity(&self, index: usize) -> &OptionEntity {
        &self.entities[index]
    }

    pub(crate) fn entity_mut(&mut self, index: usize) -> &mut OptionEntity {
        &mut self.entities[index]
    }

    #[cfg(feature = "help")]
    pub(crate) fn entities(&self) -> &[OptionEntity] {
        &self.entities
    }

    pub(crate) fn check_all_required(&self) -> Result<()> {
        for entity in &self.entities {
            entity.check_required()?;
        }
        Ok(())
    }

    /// Run the full lifecycle against an explicit argument list: compile
    /// (if not yet done), tokenize everything after the program name,
    /// parse, honor a help request, then check required options.
    ///
    /// A second invocation fails with the already-initialized diagnostic.
    pub fn try_parse_from<I, T>(&mut self, argv: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        if self.parsed {
            return Err(ErrorKind::AlreadyInitialized.into());
        }
        if !self.compiled {
            self.compile()?;
        }
        self.parsed = true;

        let mut iter = argv.into_iter().map(Into::into);
        let arg0 = PathBuf::from(iter.next().ok_or(ErrorKind::MissingArg0)?);
        // A non-UTF8 program name only matters in help output.
        self.program_name =
            arg0.file_name().unwrap_or(arg0.as_os_str()).to_string_lossy().into_owned();

        let mut args = Vec::new();
        for arg in iter {
            let arg = arg.into_string().map_err(|bad| {
                ErrorKind::InvalidUtf8.with_input(bad.to_string_lossy().into_owned())
            })?;
            args.push(arg);
        }

        let mut parser = ArgParser::new(CharStream::from_args(args), self);
        parser.parse()?;
        self.positional = parser.into_positional();

        // Help wins over the required-option check, so `--help` works on
        // a command line that is otherwise incomplete.
        #[cfg(feature = "help")]
        if self.entities[self.help_key.index].set {
            return Err(crate::error::Error::help(crate::help::render_help(self)));
        }

        self.check_all_required()?;
        Ok(())
    }

    /// Parse the process arguments, printing any diagnostic (including
    /// rendered help) to stderr and exiting with a non-zero status.
    pub fn parse_or_exit(&mut self) {
        if let Err(err) = self.try_parse_from(std::env::args_os()) {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }

    /// Current value of a registered option. For an option that was not
    /// set on the command line this is its default.
    ///
    /// # Panics
    ///
    /// Panics when reading a required option before a successful parse.
    pub fn get<T: 'static>(&self, key: &OptKey<T>) -> &T {
        let entity = &self.entities[key.index];
        match &entity.slot {
            Slot::Flag { value } => {
                let Some(value) = (value as &dyn std::any::Any).downcast_ref::<T>() else {
                    unreachable!()
                };
                value
            }
            Slot::Scalar { value: Some(value), .. } => {
                let Some(value) = value.downcast_ref::<T>() else { unreachable!() };
                value
            }
            Slot::Scalar { value: None, .. } => {
                panic!("required option '--{}' read before parsing", entity.name)
            }
            Slot::Vector { values, .. } => {
                let Some(values) = values.downcast_ref::<T>() else { unreachable!() };
                values
            }
        }
    }

    /// Whether the option was assigned from the command line.
    pub fn is_set<T>(&self, key: &OptKey<T>) -> bool {
        self.entities[key.index].set
    }

    /// Positional arguments accumulated by the last parse, in order.
    pub fn positional(&self) -> &[String] {
        &self.positional
    }

    /// The program name taken from `argv[0]`, empty before parsing.
    pub fn program_name(&self) -> &str {
        &self.program_name
    }
}

impl Default for Registry {
    #[track_caller]
    fn default() -> Self {
        Self::new()
    }
}
