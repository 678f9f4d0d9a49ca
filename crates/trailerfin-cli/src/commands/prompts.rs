use color_eyre::eyre::eyre;
use color_eyre::Result;
use dialoguer::{Confirm, Password};

/// Hidden input; an empty answer means "leave unchanged".
pub fn prompt_secret(prompt: &str) -> Result<Option<String>> {
    let value = Password::new()
        .with_prompt(prompt)
        .allow_empty_password(true)
        .interact()
        .map_err(|e| eyre!("Failed to read input: {}", e))?;
    let value = value.trim().to_string();
    Ok((!value.is_empty()).then_some(value))
}

pub fn prompt_yes_no(prompt: &str, default: bool) -> Result<bool> {
    Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()
        .map_err(|e| eyre!("Failed to read confirmation: {}", e))
}
