use expect_test::{Expect, expect};
use optreg::Registry;
use proptest::prelude::*;

#[track_caller]
fn check_err(registry: &mut Registry, argv: &[&str], expect: Expect) {
    let err = registry.try_parse_from(argv.iter().copied()).unwrap_err();
    expect.assert_eq(&err.to_string());
}

#[test]
fn argv0() {
    let mut registry = Registry::new();
    check_err(&mut registry, &[], expect!["missing executable argument (argv[0])"]);
}

#[test]
fn mixed_options_and_positionals() {
    let mut registry = Registry::new();
    let count = registry.scalar("count", None, 1i64, "number of items");
    let verbose = registry.flag("verbose", Some('v'), "enable verbose output");

    registry.try_parse_from(["prog", "-v", "--count", "5", "file.txt"]).unwrap();

    assert_eq!(*registry.get(&count), 5);
    assert!(*registry.get(&verbose));
    assert_eq!(registry.positional(), ["file.txt"]);
    assert_eq!(registry.program_name(), "prog");
}

#[test]
fn defaults_until_overridden() {
    let mut registry = Registry::new();
    let count = registry.scalar("count", Some('c'), 7u32, "a count");
    let verbose = registry.flag("verbose", Some('v'), "a flag");

    registry.try_parse_from(["prog"]).unwrap();

    assert_eq!(*registry.get(&count), 7);
    assert!(!*registry.get(&verbose));
    assert!(!registry.is_set(&count));
    assert!(!registry.is_set(&verbose));
}

#[test]
fn boolean_cluster() {
    let mut registry = Registry::new();
    let a = registry.flag("all", Some('a'), "first");
    let b = registry.flag("brief", Some('b'), "second");
    let c = registry.flag("color", Some('c'), "third");

    registry.try_parse_from(["prog", "-abc"]).unwrap();

    assert!(*registry.get(&a));
    assert!(*registry.get(&b));
    assert!(*registry.get(&c));
    assert!(registry.positional().is_empty());
}

#[test]
fn cluster_ends_at_first_value_taking_letter() {
    let mut registry = Registry::new();
    let verbose = registry.flag("verbose", Some('v'), "a flag");
    let count = registry.scalar("count", Some('C'), 0i32, "a count");

    registry.try_parse_from(["prog", "-vC42"]).unwrap();

    assert!(*registry.get(&verbose));
    assert_eq!(*registry.get(&count), 42);
}

#[test]
fn short_scalar_takes_next_token() {
    let mut registry = Registry::new();
    let count = registry.scalar("count", Some('C'), 0i32, "a count");

    registry.try_parse_from(["prog", "-C", "-5"]).unwrap();

    assert_eq!(*registry.get(&count), -5);
}

#[test]
fn long_option_with_inline_value() {
    let mut registry = Registry::new();
    let name = registry.scalar("name", None, String::new(), "a name");

    registry.try_parse_from(["prog", "--name=hello"]).unwrap();

    assert_eq!(registry.get(&name), "hello");
}

#[test]
fn inline_value_may_be_empty() {
    let mut registry = Registry::new();
    let name = registry.scalar("name", None, "unset".to_string(), "a name");

    registry.try_parse_from(["prog", "--name="]).unwrap();

    assert_eq!(registry.get(&name), "");
    assert!(registry.is_set(&name));
}

#[test]
fn vector_absorbs_negative_numbers_until_separator() {
    let mut registry = Registry::new();
    let nums = registry.vector("nums", None, Vec::<i64>::new(), "some numbers");

    registry.try_parse_from(["prog", "--nums", "1", "-2", "3", "--", "pos"]).unwrap();

    assert_eq!(*registry.get(&nums), [1, -2, 3]);
    assert_eq!(registry.positional(), ["pos"]);
}

#[test]
fn vector_yields_to_next_option() {
    let mut registry = Registry::new();
    let nums = registry.vector("nums", Some('n'), Vec::<i64>::new(), "some numbers");
    let verbose = registry.flag("verbose", Some('v'), "a flag");

    registry.try_parse_from(["prog", "--nums", "1", "2", "-v"]).unwrap();

    assert_eq!(*registry.get(&nums), [1, 2]);
    assert!(*registry.get(&verbose));
}

#[test]
fn vector_keeps_a_lone_dash_value() {
    let mut registry = Registry::new();
    let words = registry.vector("words", None, Vec::<String>::new(), "some words");

    registry.try_parse_from(["prog", "--words", "a", "-", "b"]).unwrap();

    assert_eq!(*registry.get(&words), ["a", "-", "b"]);
}

#[test]
fn vector_inline_value_starts_the_sequence() {
    let mut registry = Registry::new();
    let nums = registry.vector("nums", None, Vec::<i64>::new(), "some numbers");

    registry.try_parse_from(["prog", "--nums=1", "2", "-3"]).unwrap();

    assert_eq!(*registry.get(&nums), [1, 2, -3]);
}

#[test]
fn vector_default_is_discarded_on_first_value() {
    let mut registry = Registry::new();
    let stringz = registry.vector(
        "stringz",
        Some('S'),
        ["foo".to_string(), "bar".to_string()],
        "some strings",
    );

    registry.try_parse_from(["prog", "-S", "baz"]).unwrap();

    assert_eq!(*registry.get(&stringz), ["baz"]);
}

#[test]
fn vector_default_survives_when_unset() {
    let mut registry = Registry::new();
    let stringz = registry.vector(
        "stringz",
        Some('S'),
        ["foo".to_string(), "bar".to_string()],
        "some strings",
    );

    registry.try_parse_from(["prog"]).unwrap();

    assert_eq!(*registry.get(&stringz), ["foo", "bar"]);
}

#[test]
fn separate_vector_occurrences_accumulate() {
    let mut registry = Registry::new();
    let nums = registry.vector("nums", None, vec![0i64], "some numbers");

    registry.try_parse_from(["prog", "--nums", "1", "--nums", "2", "3"]).unwrap();

    assert_eq!(*registry.get(&nums), [1, 2, 3]);
}

#[test]
fn required_vector_is_satisfied_by_values() {
    let mut registry = Registry::new();
    let ids = registry.vector_required::<u32>("ids", Some('s'), "the ids");

    registry.try_parse_from(["prog", "-s", "1", "2"]).unwrap();

    assert_eq!(*registry.get(&ids), [1, 2]);
}

#[test]
fn literal_mode_takes_everything() {
    let mut registry = Registry::new();
    registry.flag("verbose", Some('v'), "a flag");

    registry.try_parse_from(["prog", "--", "--verbose", "-v", "x"]).unwrap();

    assert_eq!(registry.positional(), ["--verbose", "-v", "x"]);
}

#[test]
fn dash_tokens_that_are_not_options_are_positional() {
    let mut registry = Registry::new();

    registry.try_parse_from(["prog", "-", "-9", "-.5"]).unwrap();

    assert_eq!(registry.positional(), ["-", "-9", "-.5"]);
}

#[test]
fn unknown_options() {
    let mut registry = Registry::new();
    check_err(&mut registry, &["prog", "--bogus"], expect!["unknown option '--bogus'"]);

    let mut registry = Registry::new();
    check_err(&mut registry, &["prog", "-x"], expect!["unknown option '-x'"]);

    // The letter after a boolean letter is looked up too.
    let mut registry = Registry::new();
    registry.flag("verbose", Some('v'), "a flag");
    check_err(&mut registry, &["prog", "-vx"], expect!["unknown option '-x'"]);
}

#[test]
fn duplicate_assignment() {
    let mut registry = Registry::new();
    registry.scalar("count", None, 0i64, "a count");
    check_err(
        &mut registry,
        &["prog", "--count", "1", "--count", "2"],
        expect!["option '--count' passed multiple times"],
    );

    let mut registry = Registry::new();
    registry.flag("verbose", Some('v'), "a flag");
    check_err(
        &mut registry,
        &["prog", "-v", "--verbose"],
        expect!["option '--verbose' passed multiple times"],
    );
}

#[test]
fn inline_value_for_bool_option() {
    let mut registry = Registry::new();
    registry.flag("verbose", None, "a flag");
    check_err(
        &mut registry,
        &["prog", "--verbose=1"],
        expect!["argument given to bool option '--verbose'"],
    );
}

#[test]
fn missing_value() {
    let mut registry = Registry::new();
    registry.scalar("count", None, 0i64, "a count");
    check_err(&mut registry, &["prog", "--count"], expect!["expected argument for '--count'"]);

    let mut registry = Registry::new();
    registry.vector("nums", Some('n'), Vec::<i64>::new(), "some numbers");
    check_err(&mut registry, &["prog", "-n"], expect!["expected argument for '--nums'"]);
}

#[test]
fn unparsable_values() {
    let mut registry = Registry::new();
    registry.scalar("count", None, 0i64, "a count");
    check_err(
        &mut registry,
        &["prog", "--count", "abc"],
        expect!["unable to parse value 'abc' for option '--count' of type i64"],
    );

    let mut registry = Registry::new();
    registry.vector("nums", None, Vec::<i64>::new(), "some numbers");
    check_err(
        &mut registry,
        &["prog", "--nums", "1", "x"],
        expect!["unable to parse value 'x' for option '--nums' of type i64"],
    );
}

#[test]
fn parse_failure_keeps_the_source() {
    let mut registry = Registry::new();
    registry.scalar("count", None, 0i64, "a count");
    let err = registry.try_parse_from(["prog", "--count", "abc"]).unwrap_err();
    let source = std::error::Error::source(&err).expect("parse failures carry a source");
    assert_eq!(source.to_string(), "abc".parse::<i64>().unwrap_err().to_string());
}

#[test]
fn missing_required_option() {
    let mut registry = Registry::new();
    registry.scalar_required::<String>("id", None, "unique identifier");
    check_err(
        &mut registry,
        &["prog", "positional"],
        expect!["required option '--id' not set: unique identifier"],
    );
}

#[test]
fn help_renders_all_options_in_registration_order() {
    let mut registry = Registry::new();
    registry.scalar("count", Some('c'), 1i64, "number of items");
    registry.scalar_required::<String>("id", None, "unique identifier");
    registry.vector("nums", None, vec![1i64, 2], "some numbers");

    let err = registry.try_parse_from(["prog", "--help"]).unwrap_err();
    assert!(err.is_help());
    assert_eq!(
        err.to_string(),
        "prog\n\
         \n\
         Options:\n\
         \x20 --help\n\
         \x20 -h\n\
         \n\
         \x20   list program options\n\
         \n\
         \x20 --count <arg>\n\
         \x20 -c <arg>\n\
         \n\
         \x20   number of items (default: 1)\n\
         \n\
         \x20 --id <arg>\n\
         \n\
         \x20   unique identifier (required)\n\
         \n\
         \x20 --nums <arg1> <arg2> ... <argn>\n\
         \n\
         \x20   some numbers (default: [ 1 2 ])\n\
         \n"
    );
}

#[test]
fn help_wins_over_required_check() {
    let mut registry = Registry::new();
    registry.scalar_required::<String>("id", None, "unique identifier");

    let err = registry.try_parse_from(["prog", "-h"]).unwrap_err();
    assert!(err.is_help());
}

#[test]
fn second_parse_is_rejected() {
    let mut registry = Registry::new();
    registry.try_parse_from(["prog"]).unwrap();
    check_err(&mut registry, &["prog"], expect!["command-line options already initialized"]);
}

#[test]
fn duplicate_names_collide_at_compile_time() {
    let mut registry = Registry::new();
    registry.flag("x", None, "first");
    registry.flag("x", None, "second");
    let err = registry.try_parse_from(["prog"]).unwrap_err().to_string();
    assert!(
        err.starts_with(
            "two options with the same name '--x': (1) [option x of type bool defined at "
        ),
        "{err}"
    );
    assert!(err.contains("tests/parse.rs:"), "{err}");
    assert!(err.contains("; (2) [option x of type bool defined at "), "{err}");
}

#[test]
fn duplicate_letters_collide_at_compile_time() {
    let mut registry = Registry::new();
    registry.flag("first", Some('f'), "first");
    registry.scalar("second", Some('f'), 0i64, "second");
    let err = registry.try_parse_from(["prog"]).unwrap_err().to_string();
    assert!(
        err.starts_with(
            "two options with the same letter '-f': (1) [option first of type bool defined at "
        ),
        "{err}"
    );
    assert!(err.contains("; (2) [option second of type i64 defined at "), "{err}");
}

#[test]
fn non_alphabetic_letter_is_rejected() {
    let mut registry = Registry::new();
    registry.flag("one", Some('1'), "numeric letter");
    let err = registry.try_parse_from(["prog"]).unwrap_err().to_string();
    assert!(
        err.starts_with(
            "invalid option letter '1', must be an ASCII letter: [option one of type bool "
        ),
        "{err}"
    );
}

#[cfg(unix)]
#[test]
fn non_utf8_argument_is_rejected() {
    use std::ffi::OsString;
    use std::os::unix::ffi::OsStringExt;

    let mut registry = Registry::new();
    let err = registry
        .try_parse_from([OsString::from("prog"), OsString::from_vec(vec![0xFF])])
        .unwrap_err();
    expect!["invalid UTF-8 in argument '\u{FFFD}'"].assert_eq(&err.to_string());
}

#[test]
fn reparsing_fresh_registries_is_idempotent() {
    fn run(argv: &[&str]) -> (Vec<i64>, bool, Vec<String>) {
        let mut registry = Registry::new();
        let nums = registry.vector("nums", Some('n'), vec![0i64], "some numbers");
        let verbose = registry.flag("verbose", Some('v'), "a flag");
        registry.try_parse_from(argv.iter().copied()).unwrap();
        (registry.get(&nums).clone(), *registry.get(&verbose), registry.positional().to_vec())
    }

    let argv = ["prog", "-v", "--nums", "1", "-2", "--", "tail"];
    assert_eq!(run(&argv), run(&argv));
}

proptest! {
    #[test]
    fn plain_tokens_parse_as_positionals(args in proptest::collection::vec("[a-z0-9]{1,8}", 0..8)) {
        let mut registry = Registry::new();
        let argv = std::iter::once("prog".to_string()).chain(args.iter().cloned());
        registry.try_parse_from(argv).unwrap();
        prop_assert_eq!(registry.positional(), &args[..]);
    }

    #[test]
    fn clusters_set_exactly_the_named_flags(bits in 0u8..8) {
        let mut registry = Registry::new();
        let keys = [
            registry.flag("alpha", Some('a'), "first"),
            registry.flag("beta", Some('b'), "second"),
            registry.flag("gamma", Some('c'), "third"),
        ];

        let mut token = String::from("-");
        for (bit, letter) in ['a', 'b', 'c'].into_iter().enumerate() {
            if bits & (1 << bit) != 0 {
                token.push(letter);
            }
        }

        registry.try_parse_from(["prog".to_string(), token.clone()]).unwrap();

        if token == "-" {
            prop_assert_eq!(registry.positional(), ["-"]);
        } else {
            prop_assert!(registry.positional().is_empty());
        }
        for (bit, key) in keys.iter().enumerate() {
            prop_assert_eq!(*registry.get(key), bits & (1 << bit) != 0);
        }
    }
}
