use std::io::Write;

use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// What a command produced, in both output shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutput {
    pub text: String,
    pub data: Value,
    pub warnings: Vec<String>,
}

impl CommandOutput {
    pub fn new(text: impl Into<String>, data: &impl Serialize) -> Result<Self, CliError> {
        Ok(Self {
            text: text.into(),
            data: serde_json::to_value(data)?,
            warnings: Vec::new(),
        })
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }
}

#[derive(Serialize)]
struct JsonDocument<'a> {
    data: &'a Value,
    warnings: &'a [String],
}

pub fn render(
    result: &CommandOutput,
    format: OutputFormat,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Text => {
            for warning in &result.warnings {
                writeln!(err, "warning: {warning}")?;
            }
            if !result.text.is_empty() {
                writeln!(out, "{}", result.text)?;
            }
        }
        OutputFormat::Json => {
            let payload = serde_json::to_string_pretty(&JsonDocument {
                data: &result.data,
                warnings: &result.warnings,
            })?;
            writeln!(out, "{payload}")?;
        }
    }
    Ok(())
}
