//! Stdin prompts for values not passed as flags.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result, bail};

/// Returns `value` if given, otherwise prompts on stderr and reads one line.
pub fn value_or_prompt(value: Option<String>, label: &str) -> Result<String> {
    if let Some(value) = value {
        return Ok(value);
    }

    eprint!("{label}: ");
    io::stderr().flush()?;

    let mut line = String::new();
    let read = io::stdin()
        .lock()
        .read_line(&mut line)
        .with_context(|| format!("read {} from stdin", label.to_lowercase()))?;
    if read == 0 {
        bail!("No {} provided", label.to_lowercase());
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
