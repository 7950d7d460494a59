use anyhow::{Context, Result};
use std::io::{BufRead, Write};

use crate::output::format_value;
use crate::schema::KpiDefinition;
use crate::scoring::UserInputs;

/// Prompt with a message and return the trimmed line read.
fn prompt<R: BufRead, W: Write>(reader: &mut R, writer: &mut W, message: &str) -> Result<String> {
    write!(writer, "{}", message).context("Failed to write prompt")?;
    writer.flush().context("Failed to flush prompt")?;
    let mut input = String::new();
    let read = reader.read_line(&mut input).context("Failed to read input")?;
    if read == 0 {
        anyhow::bail!("Input ended before all values were entered");
    }
    Ok(input.trim().to_string())
}

/// Prompt with a default value. Returns default if input is empty.
fn prompt_with_default<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    message: &str,
    default: &str,
) -> Result<String> {
    let input = prompt(reader, writer, &format!("{} [{}]: ", message, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

/// Ask a yes/no question on stdin/stdout.
pub fn prompt_yes_no(message: &str, default_yes: bool) -> Result<bool> {
    let stdin = std::io::stdin();
    let mut reader = stdin.lock();
    let mut writer = std::io::stdout();
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let input = prompt(&mut reader, &mut writer, &format!("{} [{}]: ", message, hint))?;
    let input = input.to_lowercase();
    if input.is_empty() {
        Ok(default_yes)
    } else {
        Ok(input == "y" || input == "yes")
    }
}

/// Thresholds shown next to each input, e.g. "low >= 5, moderate >= 2, high 0".
fn threshold_hint(def: &KpiDefinition) -> String {
    let mut parts = Vec::new();
    if let Some(low) = def.low_threshold {
        parts.push(format!("low >= {}", format_value(low)));
    }
    if let Some(moderate) = def.moderate_threshold {
        parts.push(format!("moderate >= {}", format_value(moderate)));
    }
    if let Some(high) = def.high_threshold {
        parts.push(format!("high {}", format_value(high)));
    }
    parts.join(", ")
}

/// Ask for a value for every KPI, grouped under section headings.
///
/// Blank answers take 0. Invalid or negative entries are asked again.
pub fn prompt_inputs_from<R: BufRead, W: Write>(
    definitions: &[KpiDefinition],
    reader: &mut R,
    writer: &mut W,
) -> Result<UserInputs> {
    let mut inputs = UserInputs::new();
    let mut current_section: Option<&str> = None;

    for def in definitions {
        if current_section != Some(def.section.as_str()) {
            writeln!(writer).context("Failed to write prompt")?;
            writeln!(writer, "{}", def.section).context("Failed to write prompt")?;
            current_section = Some(def.section.as_str());
        }

        let message = format!("  {} ({})", def.metric, threshold_hint(def));
        let value = loop {
            let answer = prompt_with_default(reader, writer, &message, "0")?;
            match answer.parse::<f64>() {
                Ok(v) if v.is_finite() && v >= 0.0 => break v,
                Ok(_) => writeln!(writer, "  Invalid: must be non-negative. Try again.")
                    .context("Failed to write prompt")?,
                Err(_) => writeln!(writer, "  Invalid: must be a non-negative number. Try again.")
                    .context("Failed to write prompt")?,
            }
        };
        inputs.insert(def.metric.clone(), value);
    }

    Ok(inputs)
}

/// Interactive input form on stdin/stdout.
pub fn prompt_inputs(definitions: &[KpiDefinition]) -> Result<UserInputs> {
    let stdin = std::io::stdin();
    let mut reader = stdin.lock();
    let mut writer = std::io::stdout();
    prompt_inputs_from(definitions, &mut reader, &mut writer)
}
