use commandment::{CancellationToken, Command, ParseResult, Parameter, Scalar, CANCELLED_EXIT_CODE};
use std::time::Duration;

#[tokio::main]
async fn main() {
    let command_line = Command::new("fetcher")
        .about("Pretend to fetch a resource, waiting between each attempt.  Interrupt with Ctrl-C.")
        .add(Parameter::argument(Scalar::<String>::new(), "resource").help("The resource to fetch."))
        .add(
            Parameter::option(Scalar::<u32>::new(), "attempts", Some('a'))
                .default_value(3)
                .help("How many attempts to make."),
        )
        .add(
            Parameter::option(Scalar::<u64>::new(), "delay", Some('d'))
                .default_value(1000)
                .help("Milliseconds to wait for each attempt."),
        )
        .async_action(fetch)
        .build();

    std::process::exit(command_line.invoke_async().await);
}

async fn fetch(result: ParseResult, cancellation: CancellationToken) -> i32 {
    let resource = result.get::<String>("resource").cloned().unwrap_or_default();
    let attempts = result.get::<u32>("attempts").copied().unwrap_or(1);
    let delay = Duration::from_millis(result.get::<u64>("delay").copied().unwrap_or_default());

    for attempt in 1..=attempts {
        tokio::select! {
            _ = cancellation.cancelled() => {
                eprintln!("Cancelled fetching '{resource}' during attempt {attempt}.");
                return CANCELLED_EXIT_CODE;
            }
            _ = tokio::time::sleep(delay) => {
                println!("Attempt {attempt} of {attempts} for '{resource}'.");
            }
        }
    }

    println!("Fetched '{resource}'.");
    0
}
