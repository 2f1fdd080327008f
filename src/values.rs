//! Type-erased value slots for registered options.
//!
//! Each non-boolean option captures a set of monomorphized function
//! pointers at declaration time; the parser only ever sees the erased
//! `AnyValue` slot and the pointers, so the registry stays object-safe
//! without an open-ended trait hierarchy.

use std::any::Any;
use std::fmt;
use std::str::FromStr;

use crate::error::DynStdError;

pub(crate) type AnyValue = Box<dyn Any + Send + Sync>;

/// Parse one raw argument into a boxed value of the declared type.
pub(crate) type ParseFn = fn(&str) -> Result<AnyValue, DynStdError>;

/// Parse one raw argument and push it onto the boxed `Vec<T>` slot.
pub(crate) type AppendFn = fn(&mut AnyValue, &str) -> Result<(), DynStdError>;

/// Drop all elements of the boxed `Vec<T>` slot.
pub(crate) type ClearFn = fn(&mut AnyValue);

pub(crate) fn parse_fn<T>() -> ParseFn
where
    T: FromStr<Err: Into<DynStdError>> + Send + Sync + 'static,
{
    |raw| {
        let value = raw.parse::<T>().map_err(Into::into)?;
        Ok(Box::new(value))
    }
}

pub(crate) fn append_fn<T>() -> AppendFn
where
    T: FromStr<Err: Into<DynStdError>> + Send + Sync + 'static,
{
    |slot, raw| {
        let value = raw.parse::<T>().map_err(Into::into)?;
        let Some(values) = slot.downcast_mut::<Vec<T>>() else { unreachable!() };
        values.push(value);
        Ok(())
    }
}

pub(crate) fn clear_fn<T: Send + Sync + 'static>() -> ClearFn {
    |slot| {
        let Some(values) = slot.downcast_mut::<Vec<T>>() else { unreachable!() };
        values.clear();
    }
}

/// Render a scalar default for help output.
pub(crate) fn render_default<T: fmt::Display>(value: &T) -> String {
    value.to_string()
}

/// Render a vector default for help output, e.g. `[ foo bar ]`.
pub(crate) fn render_vec_default<T: fmt::Display>(values: &[T]) -> String {
    let mut out = String::from("[ ");
    for value in values {
        out.push_str(&value.to_string());
        out.push(' ');
    }
    out.push(']');
    out
}

#[test]
fn native_parsers() {
    let parse = parse_fn::<usize>();
    assert_eq!(*parse("42").unwrap().downcast_ref::<usize>().unwrap(), 42);
    assert!(parse("forty-two").is_err());

    let append = append_fn::<i32>();
    let mut slot: AnyValue = Box::new(Vec::<i32>::new());
    append(&mut slot, "7").unwrap();
    append(&mut slot, "-8").unwrap();
    assert!(append(&mut slot, "x").is_err());
    assert_eq!(slot.downcast_ref::<Vec<i32>>().unwrap(), &[7, -8]);

    clear_fn::<i32>()(&mut slot);
    assert!(slot.downcast_ref::<Vec<i32>>().unwrap().is_empty());

    assert_eq!(render_vec_default(&["foo", "bar"]), "[ foo bar ]");
    assert_eq!(render_vec_default::<u8>(&[]), "[ ]");
}
