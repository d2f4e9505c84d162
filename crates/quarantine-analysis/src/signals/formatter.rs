//! External code formatter invoked after each write.

use std::path::Path;
use std::process::Command;

use quarantine_core::config::MutateConfig;
use quarantine_core::errors::FormatterError;

use super::Formatter;

/// Runs `argv... <path>`, e.g. `ruff format tests/net/test_a.py`.
#[derive(Debug, Clone)]
pub struct CommandFormatter {
    argv: Vec<String>,
}

impl CommandFormatter {
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }

    pub fn from_config(config: &MutateConfig) -> Self {
        Self::new(config.effective_formatter())
    }

    pub fn command(&self) -> String {
        self.argv.join(" ")
    }
}

impl Formatter for CommandFormatter {
    fn format(&self, path: &Path) -> Result<(), FormatterError> {
        let Some((program, args)) = self.argv.split_first() else {
            return Ok(());
        };
        let output = Command::new(program)
            .args(args)
            .arg(path)
            .output()
            .map_err(|source| FormatterError::Launch {
                command: self.command(),
                source,
            })?;
        if output.status.success() {
            Ok(())
        } else {
            Err(FormatterError::Failed {
                path: path.to_path_buf(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

/// Formatter that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFormatter;

impl Formatter for NoopFormatter {
    fn format(&self, _path: &Path) -> Result<(), FormatterError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_program_is_launch_error() {
        let formatter = CommandFormatter::new(vec!["quarantine-no-such-formatter-bin".into()]);
        let err = formatter.format(Path::new("x.py")).unwrap_err();
        assert!(matches!(err, FormatterError::Launch { .. }));
    }

    #[test]
    fn empty_command_is_noop() {
        assert!(CommandFormatter::new(Vec::new()).format(Path::new("x.py")).is_ok());
        assert!(NoopFormatter.format(Path::new("x.py")).is_ok());
    }
}
