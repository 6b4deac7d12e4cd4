//! Interactive prompts

use std::io::IsTerminal;

use dialoguer::{Confirm, Input};

use crate::error::{CliError, CliResult};

pub fn is_interactive_terminal() -> bool {
    std::io::stdin().is_terminal() && std::io::stdout().is_terminal()
}

/// Ask a yes/no question, defaulting to no. `assume_yes` skips the prompt;
/// without a terminal the prompt cannot be answered and `--yes` is required.
pub fn confirm(prompt: &str, assume_yes: bool) -> CliResult<bool> {
    if assume_yes {
        return Ok(true);
    }
    if !is_interactive_terminal() {
        return Err(CliError::Validation(
            "Cannot confirm in non-interactive mode. Use --yes to skip confirmation.".to_string(),
        ));
    }
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(e.to_string()))
}

/// Read one line; `None` on empty input
pub fn read_line(prompt: &str) -> CliResult<Option<String>> {
    let input: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()
        .map_err(|e| CliError::Io(e.to_string()))?;

    if input.trim().is_empty() {
        Ok(None)
    } else {
        Ok(Some(input))
    }
}
