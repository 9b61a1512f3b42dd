use commandment::prelude::*;
use commandment::{Collection, Command, CommandLine, Nargs, Parameter, ParseResult, Scalar, Switch};
use std::path::PathBuf;

#[derive(Debug, PartialEq, Eq)]
pub enum Params {
    Sum {
        verbose: bool,
        scale: u32,
        items: Vec<u32>,
    },
    Check {
        verbose: bool,
        mode: String,
        path: PathBuf,
    },
}

enum Mode {}

impl Variants for Mode {
    const VARIANTS: &'static [&'static str] = &["Fast", "Thorough"];
}

impl Params {
    fn from_result(result: &ParseResult) -> Self {
        let verbose = result.get::<bool>("verbose").copied().unwrap_or_default();

        match result.command() {
            "sum" => Params::Sum {
                verbose,
                scale: result.get::<u32>("scale").copied().unwrap_or(1),
                items: result.get::<Vec<u32>>("item").cloned().unwrap_or_default(),
            },
            "check" => Params::Check {
                verbose,
                mode: result
                    .get::<String>("mode")
                    .map(|mode| mode.to_lowercase())
                    .unwrap_or_default(),
                path: result.get::<PathBuf>("path").cloned().unwrap_or_default(),
            },
            other => unreachable!("'{other}' has no action"),
        }
    }
}

fn main() {
    command_line().invoke();
}

fn run(params: Params) -> i32 {
    match params {
        Params::Sum {
            verbose,
            scale,
            items,
        } => {
            if verbose {
                println!("Summing {items:?}, scaled by {scale}.");
            }

            let sum: u32 = items.iter().sum();
            println!("Sum: {}", sum * scale);
        }
        Params::Check {
            verbose,
            mode,
            path,
        } => {
            if verbose {
                println!("Checking in {mode} mode.");
            }

            println!("Checked: {}", path.display());
        }
    }

    0
}

// Unit-testable function to configure the command line.
fn command_line() -> CommandLine {
    Command::new("organization")
        .about("Organize some work into sub-commands.")
        .add(
            Parameter::option(Switch::new(true), "verbose", Some('v'))
                .default_value(false)
                .global()
                .help("Explain what is happening."),
        )
        .command("sum", |sub| {
            sub.about("Sum the items.")
                .add(
                    Parameter::option(Scalar::<u32>::new(), "scale", Some('s'))
                        .default_value(1)
                        .validator(|scale, validation| {
                            if *scale == 0 {
                                let message = format!("{} must be positive", validation.name());
                                validation.add_error(message);
                            }
                        })
                        .help("Multiply the sum by this amount."),
                )
                .add(
                    Parameter::argument(Collection::<Vec<u32>, u32>::new(Nargs::AtLeastOne), "item")
                        .help("The items to sum."),
                )
                .action(|result| run(Params::from_result(result)))
        })
        .command("check", |sub| {
            sub.about("Check a file.")
                .add(
                    Parameter::option(Scalar::<String>::new(), "mode", Some('m'))
                        .default_value("fast".to_string())
                        .valid_enum_variant::<Mode>(true, true)
                        .choice("fast".to_string(), "Only look at the metadata.")
                        .choice("thorough".to_string(), "Read the whole file.")
                        .help("How to check."),
                )
                .add(
                    Parameter::argument(Scalar::<PathBuf>::new(), "path")
                        .valid_file_path()
                        .help("The file to check."),
                )
                .action(|result| run(Params::from_result(result)))
        })
        .build()
}
