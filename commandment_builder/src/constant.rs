use std::env;
use std::path::Path;

pub(crate) const HELP_NAME: &str = "help";
pub(crate) const HELP_SHORT: char = 'h';
pub(crate) const HELP_MESSAGE: &str = "Show this help message and exit.";

/// The exit code used when the input cannot be parsed or fails validation.
///
/// Distinct from any failure an action may report on its own behalf.
pub const PARSE_FAILURE_EXIT_CODE: i32 = 2;

/// The exit code used when the cancellation signal fired before the action could start.
pub const CANCELLED_EXIT_CODE: i32 = 130;

pub(crate) const DEFAULT_PROGRAM: &str = "program";

/// The name of the running program, as the host environment reports it.
pub(crate) fn program_name() -> String {
    env::args_os()
        .next()
        .and_then(|arg0| file_name(Path::new(&arg0)))
        .or_else(|| {
            env::current_exe()
                .ok()
                .and_then(|exe| file_name(exe.as_path()))
        })
        .unwrap_or_else(|| DEFAULT_PROGRAM.to_string())
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn program_name_not_empty() {
        assert!(!program_name().is_empty());
    }

    #[rstest]
    #[case("/usr/bin/app", Some("app"))]
    #[case("app", Some("app"))]
    #[case("./target/debug/app-1", Some("app-1"))]
    #[case("/", None)]
    fn file_names(#[case] path: &str, #[case] expected: Option<&str>) {
        assert_eq!(file_name(Path::new(path)).as_deref(), expected);
    }
}
