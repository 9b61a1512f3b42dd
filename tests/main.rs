use commandment::prelude::*;
use commandment::{
    CancellationToken, Collection, Command, CommandLine, ErrorKind, Nargs, Parameter, ParseResult,
    Scalar, Switch, CANCELLED_EXIT_CODE, PARSE_FAILURE_EXIT_CODE,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

enum Colour {}

impl Variants for Colour {
    const VARIANTS: &'static [&'static str] = &["Red", "Green", "Blue"];
}

fn kinds(result: &ParseResult) -> Vec<ErrorKind> {
    result.errors().iter().map(|error| error.kind()).collect()
}

#[test]
fn empty_input_uses_defaults() {
    // Setup
    let command_line = Command::new("program")
        .add(Parameter::option(Scalar::<u32>::new(), "level", Some('l')).default_value(3))
        .add(Parameter::option(Switch::new(true), "verbose", Some('v')).default_value(false))
        .add(Parameter::option(Scalar::<String>::new(), "name", None))
        .build();

    // Execute
    let result = command_line.parse_tokens(&[]);

    // Verify
    assert!(result.is_success(), "{result:?}");
    assert_eq!(result.get::<u32>("level"), Some(&3));
    assert_eq!(result.get::<bool>("verbose"), Some(&false));
    assert!(!result.contains("name"));
    assert_eq!(result.get::<String>("name"), None);
}

#[test]
fn required_missing_reported_once() {
    // Setup
    let command_line = Command::new("program")
        .add(Parameter::option(Scalar::<u32>::new(), "level", None).required().non_zero())
        .build();

    // Execute
    let result = command_line.parse_tokens(&[]);

    // Verify
    assert_eq!(kinds(&result), vec![ErrorKind::RequiredMissing]);
    assert_eq!(result.errors()[0].symbol(), Some("--level"));
}

#[test]
fn numeric_validators_gate_on_required_options() {
    // Setup
    let command_line = Command::new("program")
        .add(Parameter::option(Scalar::<i32>::new(), "optional", None).greater_than(0))
        .add(
            Parameter::option(Scalar::<i32>::new(), "required", None)
                .required()
                .greater_than(0),
        )
        .add(Parameter::argument(Scalar::<i32>::new(), "count").less_than(10))
        .build();

    // Execute
    let result = command_line.parse_tokens(&["--optional", "-1", "--required", "-1", "10"]);

    // Verify
    assert_eq!(
        kinds(&result),
        vec![ErrorKind::Validation, ErrorKind::Validation]
    );
    let symbols: Vec<Option<&str>> = result.errors().iter().map(|e| e.symbol()).collect();
    assert_eq!(symbols, vec![Some("--required"), Some("count")]);
    assert_eq!(result.get::<i32>("optional"), Some(&-1));
}

#[test]
fn errors_accumulate() {
    // Setup
    let command_line = Command::new("program")
        .add(Parameter::option(Scalar::<u32>::new(), "level", None))
        .add(
            Parameter::argument(Scalar::<String>::new(), "colour")
                .valid_enum_variant::<Colour>(false, false),
        )
        .build();

    // Execute
    let result = command_line.parse_tokens(&["--bogus", "--level", "x", "purple", "extra"]);

    // Verify
    assert_eq!(
        kinds(&result),
        vec![
            ErrorKind::Syntax,
            ErrorKind::Syntax,
            ErrorKind::Parse,
            ErrorKind::Validation
        ]
    );
}

#[test]
fn enum_variant_ignore_case() {
    // Setup
    let command_line = Command::new("program")
        .add(
            Parameter::argument(Scalar::<String>::new(), "colour")
                .valid_enum_variant::<Colour>(true, true),
        )
        .build();

    // Execute
    let accepted = command_line.parse_tokens(&["gReEn"]);
    let rejected = command_line.parse_tokens(&["purple"]);

    // Verify
    assert!(accepted.is_success(), "{accepted:?}");
    assert_eq!(accepted.get::<String>("colour"), Some(&"gReEn".to_string()));
    assert_eq!(kinds(&rejected), vec![ErrorKind::Validation]);
    let message = rejected.errors()[0].message();
    assert!(message.contains("'purple'"), "{message}");
    assert!(message.contains("[red, green, blue]"), "{message}");
}

#[test]
fn path_validators() {
    // Setup
    let directory = tempfile::tempdir().unwrap();
    let file = tempfile::NamedTempFile::new_in(directory.path()).unwrap();
    let missing = directory.path().join("missing.txt");
    let command_line = Command::new("program")
        .add(Parameter::option(Scalar::<PathBuf>::new(), "file", None).valid_file_path())
        .add(Parameter::option(Scalar::<PathBuf>::new(), "dir", None).valid_directory_path())
        .build();
    let file_token = file.path().display().to_string();
    let directory_token = directory.path().display().to_string();
    let missing_token = missing.display().to_string();

    // Execute
    let valid = command_line.parse_tokens(&[
        "--file",
        file_token.as_str(),
        "--dir",
        directory_token.as_str(),
    ]);
    let invalid = command_line.parse_tokens(&[
        "--file",
        directory_token.as_str(),
        "--dir",
        missing_token.as_str(),
    ]);

    // Verify
    assert!(valid.is_success(), "{valid:?}");
    assert_eq!(valid.get::<PathBuf>("file"), Some(&file.path().to_path_buf()));
    assert_eq!(
        kinds(&invalid),
        vec![ErrorKind::Validation, ErrorKind::Validation]
    );
}

#[test]
fn default_factory_runs_at_most_once() {
    // Setup
    let calls = Arc::new(AtomicUsize::new(0));
    let factory_calls = calls.clone();
    let command_line = Command::new("program")
        .add(
            Parameter::option(Scalar::<String>::new(), "name", None).default_factory(move |context| {
                factory_calls.fetch_add(1, Ordering::SeqCst);
                format!("{}-default", context.command())
            }),
        )
        .build();

    // Execute
    let defaulted = command_line.parse_tokens(&[]);
    let supplied = command_line.parse_tokens(&["--name", "given"]);

    // Verify
    assert_eq!(defaulted.get::<String>("name"), Some(&"program-default".to_string()));
    assert_eq!(supplied.get::<String>("name"), Some(&"given".to_string()));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn collection_accumulates() {
    // Setup
    let command_line = Command::new("program")
        .add(Parameter::option(
            Collection::<Vec<u32>, u32>::new(Nargs::AtLeastOne),
            "tag",
            Some('t'),
        ))
        .add(Parameter::argument(
            Collection::<Vec<u32>, u32>::new(Nargs::Precisely(2)),
            "pair",
        ))
        .build();

    // Execute
    let result = command_line.parse_tokens(&["-t", "5", "6", "--tag=7", "1", "2"]);

    // Verify
    assert!(result.is_success(), "{result:?}");
    assert_eq!(result.get::<Vec<u32>>("tag"), Some(&vec![5, 6, 7]));
    assert_eq!(result.get::<Vec<u32>>("pair"), Some(&vec![1, 2]));
}

fn tree(calls: Arc<AtomicUsize>) -> CommandLine {
    Command::new("program")
        .add(
            Parameter::option(Switch::new(true), "verbose", Some('v'))
                .default_value(false)
                .global(),
        )
        .action(move |result| {
            calls.fetch_add(1, Ordering::SeqCst);
            if result.command() == "program" {
                1
            } else {
                2
            }
        })
        .command("build", |build| {
            build
                .add(Parameter::argument(Scalar::<String>::new(), "target"))
                .action(|result| {
                    if result.get::<bool>("verbose") == Some(&true) {
                        10
                    } else {
                        11
                    }
                })
        })
        .command("test", |test| test)
        .build()
}

#[test]
fn sub_command_dispatch() {
    // Setup
    let calls = Arc::new(AtomicUsize::new(0));
    let command_line = tree(calls.clone());

    // Execute & Verify
    assert_eq!(command_line.invoke_tokens(&["build", "x"]), 11);
    assert_eq!(command_line.invoke_tokens(&["build", "x", "-v"]), 10);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    // The nearest ancestor's action runs for 'test'.
    assert_eq!(command_line.invoke_tokens(&["test"]), 2);
    assert_eq!(command_line.invoke_tokens(&[]), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    assert_eq!(command_line.invoke_tokens(&["build"]), PARSE_FAILURE_EXIT_CODE);
    assert_eq!(command_line.invoke_tokens(&["build", "-h"]), 0);
}

#[test]
fn no_action() {
    // Setup
    let command_line = Command::new("program")
        .command("build", |build| build.action(|_| 0))
        .build();

    // Execute & Verify
    assert_eq!(command_line.invoke_tokens(&["build"]), 0);
    assert_eq!(command_line.invoke_tokens(&[]), PARSE_FAILURE_EXIT_CODE);
}

async fn wait(result: ParseResult, cancellation: CancellationToken) -> i32 {
    let millis = result.get::<u64>("millis").copied().unwrap_or_default();

    tokio::select! {
        _ = cancellation.cancelled() => CANCELLED_EXIT_CODE,
        _ = tokio::time::sleep(Duration::from_millis(millis)) => 0,
    }
}

fn waiter() -> CommandLine {
    Command::new("waiter")
        .add(Parameter::option(Scalar::<u64>::new(), "millis", None).default_value(0))
        .async_action(wait)
        .build()
}

#[tokio::test]
async fn cancellable_action_completes() {
    assert_eq!(
        waiter()
            .invoke_tokens_async(&["--millis", "1"], CancellationToken::new())
            .await,
        0
    );
}

#[tokio::test]
async fn cancellable_action_observes_cancellation() {
    // Setup
    let command_line = waiter();
    let cancellation = CancellationToken::new();
    let canceller = cancellation.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        canceller.cancel();
    });

    // Execute
    let exit_code = tokio::time::timeout(
        Duration::from_secs(5),
        command_line.invoke_tokens_async(&["--millis", "60000"], cancellation),
    )
    .await;

    // Verify
    assert_eq!(exit_code, Ok(CANCELLED_EXIT_CODE));
}

#[tokio::test]
async fn cancelled_before_start() {
    // Setup
    let command_line = waiter();
    let cancellation = CancellationToken::new();
    cancellation.cancel();

    // Execute & Verify
    assert_eq!(
        command_line
            .invoke_tokens_async(&[], cancellation.clone())
            .await,
        CANCELLED_EXIT_CODE
    );
    assert_eq!(
        command_line.invoke_tokens_async(&["-h"], cancellation).await,
        0
    );
}

#[test]
fn blocking_invoke_runs_async_action() {
    assert_eq!(waiter().invoke_tokens(&["--millis", "1"]), 0);
}

#[test]
fn command_line_shared_across_threads() {
    // Setup
    let command_line = Arc::new(
        Command::new("program")
            .add(Parameter::argument(Scalar::<u32>::new(), "value"))
            .action(|result| result.get::<u32>("value").copied().unwrap_or_default() as i32)
            .build(),
    );

    // Execute
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let command_line = command_line.clone();
            std::thread::spawn(move || command_line.invoke_tokens(&[i.to_string().as_str()]))
        })
        .collect();
    let exit_codes: Vec<i32> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    // Verify
    assert_eq!(exit_codes, vec![0, 1, 2, 3]);
}

#[test]
fn options_between_positional_values() {
    // Setup
    let command_line = Command::new("program")
        .add(Parameter::option(Switch::new(true), "verbose", Some('v')).default_value(false))
        .add(Parameter::argument(
            Collection::<Vec<String>, String>::new(Nargs::AtLeastOne),
            "files",
        ))
        .build();

    // Execute
    let result = command_line.parse_tokens(&["a", "-v", "b"]);

    // Verify
    assert!(result.is_success(), "{result:?}");
    assert_eq!(
        result.get::<Vec<String>>("files"),
        Some(&vec!["a".to_string(), "b".to_string()])
    );
    assert_eq!(result.get::<bool>("verbose"), Some(&true));
}
