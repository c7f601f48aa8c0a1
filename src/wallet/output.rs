use serde_json::Value;

use crate::wallet::WalletError;
use crate::wallet::command::WalletCommand;

/// Marker ending every console prompt (`new >>> `, `locked >>> `, `unlocked >>> `).
pub const PROMPT: &str = ">>>";

/// Returns the command output preceding the prompt, once the prompt was printed.
pub fn strip_prompt(buffer: &str) -> Option<&str> {
    let trimmed = buffer.trim_end();
    if !trimmed.ends_with(PROMPT) {
        return None;
    }
    let output = match trimmed.rfind('\n') {
        Some(position) => &trimmed[..position],
        None => "",
    };
    Some(output)
}

/// Extracts the result of `command` from what the console printed for it.
pub fn parse_output(command: &WalletCommand, output: &str) -> Result<Value, WalletError> {
    let echo = command.to_string();
    let output = output
        .trim()
        .strip_prefix(echo.as_str())
        .unwrap_or(output)
        .trim();

    if let Some(message) = rejection(output) {
        return Err(WalletError::Rejected {
            method: command.method.clone(),
            message,
        });
    }
    if output.is_empty() {
        return Ok(Value::Null);
    }
    if let Ok(value) = serde_json::from_str(output) {
        return Ok(value);
    }
    if let Some(value) = embedded_json(output) {
        return Ok(value);
    }
    Ok(Value::String(output.to_string()))
}

// Exceptions are reported as `<code> <name>_exception: <message>` followed by context lines.
fn rejection(output: &str) -> Option<String> {
    let mut lines = output.lines();
    let first = lines.by_ref().find(|line| is_exception_header(line))?;
    let mut message = first.trim().to_string();
    for line in lines.map(str::trim).filter(|line| !line.is_empty()) {
        message.push_str(" | ");
        message.push_str(line);
    }
    Some(message)
}

fn is_exception_header(line: &str) -> bool {
    let mut words = line.split_whitespace();
    let code = words.next().unwrap_or_default();
    let name = words.next().unwrap_or_default();
    !code.is_empty() && code.chars().all(|c| c.is_ascii_digit()) && name.ends_with("_exception:")
}

fn embedded_json(output: &str) -> Option<Value> {
    output
        .match_indices(['{', '['])
        .find_map(|(position, _)| {
            serde_json::Deserializer::from_str(&output[position..])
                .into_iter::<Value>()
                .next()
                .and_then(Result::ok)
        })
}
