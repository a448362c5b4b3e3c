//! GitHub Actions step outputs and workflow-command annotations.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use rand::Rng;
use rand::distributions::Alphanumeric;

fn delimiter() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect();
    format!("ghadelimiter_{suffix}")
}

/// Render `name<<DELIM\nvalue\nDELIM\n`, safe for multi-line values.
pub fn format_output(name: &str, value: &str, delimiter: &str) -> String {
    format!("{name}<<{delimiter}\n{value}\n{delimiter}\n")
}

/// Expose `name=value` to later workflow steps.
///
/// Appends to the `$GITHUB_OUTPUT` file when running under Actions, otherwise
/// prints the pair to stdout.
pub fn set_output(output_file: Option<&Path>, name: &str, value: &str) -> io::Result<()> {
    match output_file {
        Some(path) => {
            let mut delim = delimiter();
            while value.contains(&delim) {
                delim = delimiter();
            }
            let mut file = OpenOptions::new().create(true).append(true).open(path)?;
            file.write_all(format_output(name, value, &delim).as_bytes())
        }
        None => {
            println!("{name}={value}");
            Ok(())
        }
    }
}

/// Escape a message for the `::error::` workflow command.
pub fn escape_annotation(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// The `::error::` line that marks the step as failed in the Actions UI.
pub fn error_annotation(message: &str) -> String {
    format!("::error::{}", escape_annotation(message))
}
