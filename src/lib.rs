//! Declarative command-line options: a registry of typed options, a
//! tokenizer that flattens the argument list into a character stream, and
//! a GNU/POSIX-style parsing state machine that routes values into the
//! registry.
//!
//! Options are declared up front, each declaration returning a typed
//! [`OptKey`]. Parsing is fail-fast: the first violation (unknown option,
//! duplicate assignment, unparsable or missing value, missing required
//! option) surfaces as one [`Error`] whose `Display` output is the
//! complete user-facing diagnostic. Only the two `*_or_exit` entry points
//! ever print or terminate; everything below them returns `Result`.
//!
//! ```no_run
//! let mut registry = optreg::Registry::new();
//! let count = registry.scalar("count", Some('c'), 1i64, "number of items");
//! let verbose = registry.flag("verbose", Some('v'), "enable verbose output");
//! registry.parse_or_exit();
//! if *registry.get(&verbose) {
//!     eprintln!("count = {}", registry.get(&count));
//! }
//! ```
//!
//! For options declared from independent modules there is also a
//! process-wide registry: [`declare_flag`] and friends funnel into one
//! shared instance (registration is lock-guarded), and [`init_options`] /
//! [`try_init_options`] run its lifecycle exactly once.
#![forbid(unsafe_code)]

use std::ffi::OsString;
use std::fmt;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

mod entity;
mod error;
mod parser;
mod registry;
mod stream;
mod values;

#[cfg(feature = "help")]
mod help;

pub use crate::error::Error;
pub use crate::registry::{OptKey, Registry};

use crate::error::DynStdError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

fn process_registry() -> &'static Mutex<Registry> {
    static REGISTRY: OnceLock<Mutex<Registry>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(Registry::new()))
}

fn lock_registry() -> MutexGuard<'static, Registry> {
    process_registry().lock().unwrap_or_else(PoisonError::into_inner)
}

/// Declare a boolean option on the process-wide registry.
#[track_caller]
pub fn declare_flag(name: &str, letter: Option<char>, description: &str) -> OptKey<bool> {
    lock_registry().flag(name, letter, description)
}

/// Declare a scalar option with a default on the process-wide registry.
#[track_caller]
pub fn declare_scalar<T>(
    name: &str,
    letter: Option<char>,
    default: T,
    description: &str,
) -> OptKey<T>
where
    T: FromStr<Err: Into<DynStdError>> + fmt::Display + Send + Sync + 'static,
{
    lock_registry().scalar(name, letter, default, description)
}

/// Declare a required scalar option on the process-wide registry.
#[track_caller]
pub fn declare_scalar_required<T>(
    name: &str,
    letter: Option<char>,
    description: &str,
) -> OptKey<T>
where
    T: FromStr<Err: Into<DynStdError>> + fmt::Display + Send + Sync + 'static,
{
    lock_registry().scalar_required(name, letter, description)
}

/// Declare a multi-valued option with a default sequence on the
/// process-wide registry.
#[track_caller]
pub fn declare_vector<T, I>(
    name: &str,
    letter: Option<char>,
    defaults: I,
    description: &str,
) -> OptKey<Vec<T>>
where
    T: FromStr<Err: Into<DynStdError>> + fmt::Display + Send + Sync + 'static,
    I: IntoIterator<Item = T>,
{
    lock_registry().vector(name, letter, defaults, description)
}

/// Declare a required multi-valued option on the process-wide registry.
#[track_caller]
pub fn declare_vector_required<T>(
    name: &str,
    letter: Option<char>,
    description: &str,
) -> OptKey<Vec<T>>
where
    T: FromStr<Err: Into<DynStdError>> + fmt::Display + Send + Sync + 'static,
{
    lock_registry().vector_required(name, letter, description)
}

/// Run the process-wide registry's lifecycle against an explicit argument
/// list (including the program name). Fails on a second invocation.
pub fn try_init_options<I, T>(argv: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    lock_registry().try_parse_from(argv)
}

/// Parse the process arguments into the process-wide registry, printing
/// any diagnostic to stderr and exiting non-zero on failure.
pub fn init_options() {
    if let Err(err) = try_init_options(std::env::args_os()) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

/// Current value of an option on the process-wide registry.
pub fn option_value<T: Clone + 'static>(key: &OptKey<T>) -> T {
    lock_registry().get(key).clone()
}

/// Whether an option on the process-wide registry was set from the
/// command line.
pub fn option_is_set<T>(key: &OptKey<T>) -> bool {
    lock_registry().is_set(key)
}

/// Positional arguments accumulated by [`init_options`], in order.
pub fn positional_args() -> Vec<String> {
    lock_registry().positional().to_vec()
}
