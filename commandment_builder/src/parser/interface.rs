use crate::parser::base::ParseError;
use crate::parser::ErrorContext;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

pub(crate) const PADDING_WIDTH: usize = 3;

// We'll target 95% of the total width, to ensure the renderer doesn't literally use the full space.
const TARGET_TOTAL_FACTOR: f64 = 0.95;

// Let's assume the average word length is 5.
// Then 17 is a good minimum, because it allows precisely 3 words with a space between them.
pub(crate) const MINIMUM_MIDDLE_WIDTH: usize = 17;

/// Renders two columns: a left column of names and a (wrapped) middle column of descriptions.
#[derive(Debug)]
pub(crate) struct ColumnRenderer {
    left: usize,
    middle: usize,
}

impl ColumnRenderer {
    /// Produce a renderer that fits the middle column into the total width, where possible.
    pub(crate) fn guided(left: usize, middle: usize, total_width: usize) -> Self {
        let non_middle = left + PADDING_WIDTH;
        let target_total_width = (total_width as f64 * TARGET_TOTAL_FACTOR) as usize;

        if middle + non_middle <= target_total_width {
            #[cfg(feature = "tracing_debug")]
            {
                debug!("Columns {non_middle} and middle fit within the target total {target_total_width}.  Selecting middle: {middle}.");
            }

            Self::new(left, std::cmp::max(middle, 1))
        } else {
            let calculated_middle = std::cmp::max(
                target_total_width.saturating_sub(non_middle),
                MINIMUM_MIDDLE_WIDTH,
            );
            #[cfg(feature = "tracing_debug")]
            {
                debug!("Columns {non_middle} do not fit within the target total {target_total_width}.  Selecting middle: {calculated_middle}.");
            }

            Self::new(left, calculated_middle)
        }
    }

    pub(crate) fn new(left: usize, middle: usize) -> Self {
        Self { left, middle }
    }

    pub(crate) fn render(&self, indent: usize, left: &str, middle: &str) -> Vec<String> {
        let left_width = self.left.saturating_sub(indent);
        let padding = format!("{:PADDING_WIDTH$}", "");
        let mut out = Vec::default();

        for (i, part) in chunk(middle, std::cmp::max(self.middle, 2))
            .into_iter()
            .enumerate()
        {
            let name = if i == 0 { left } else { "" };
            out.push(format!("{:indent$}{name:left_width$}{padding}{part}", ""));
        }

        if out.is_empty() {
            out.push(format!("{:indent$}{left}", ""));
        }

        out
    }
}

fn chunk(paragraph: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::default();
    let mut current = String::default();

    for word in paragraph.split(' ').filter(|word| !word.is_empty()) {
        let word_length = word.chars().count();

        if current.is_empty() {
            hyphenate(width, &mut lines, &mut current, word);
        } else if current.chars().count() + word_length < width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            hyphenate(width, &mut lines, &mut current, word);
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

fn hyphenate(width: usize, lines: &mut Vec<String>, current: &mut String, word: &str) {
    let characters: Vec<char> = word.chars().collect();
    let increment = width - 1;
    let mut left = 0;

    while characters.len() - left > width {
        let piece: String = characters[left..left + increment].iter().collect();
        lines.push(format!("{piece}-"));
        left += increment;
    }

    current.extend(&characters[left..]);
}

/// The sink for everything a command line prints.
pub(crate) trait UserInterface: Send + Sync {
    /// Print to the regular output (ex: help).
    fn print(&self, message: String);
    /// Print a parse error to the error output.
    fn print_error(&self, error: ParseError);
    /// Print the location of a parse error to the error output.
    fn print_error_context(&self, error_context: ErrorContext);
    /// Print any other diagnostic (ex: usage after an error) to the error output.
    fn print_diagnostic(&self, message: String);
}

#[derive(Default)]
pub(crate) struct ConsoleInterface {}

impl UserInterface for ConsoleInterface {
    fn print(&self, message: String) {
        println!("{message}");
    }

    fn print_error(&self, error: ParseError) {
        eprintln!("{error}");
    }

    fn print_error_context(&self, error_context: ErrorContext) {
        eprintln!("{error_context}");
    }

    fn print_diagnostic(&self, message: String) {
        eprintln!("{message}");
    }
}
