//! External command templates like `say -r {rate} {text}`.
//!
//! The template is split on whitespace once, then placeholders are filled
//! per argument, so substituted values are never re-split by a shell.

use tokio::process::Command;

use crate::error::GameError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandTemplate {
    program: String,
    args: Vec<String>,
}

impl CommandTemplate {
    pub fn parse(template: &str) -> Result<Self, GameError> {
        let mut parts = template.split_whitespace().map(String::from);
        let program = parts
            .next()
            .ok_or(GameError::Config("command template is empty"))?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments with every `{name}` replaced by its value.
    pub fn render_args(&self, vars: &[(&str, &str)]) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| {
                vars.iter().fold(arg.clone(), |acc, (name, value)| {
                    acc.replace(&format!("{{{name}}}"), value)
                })
            })
            .collect()
    }

    pub fn command(&self, vars: &[(&str, &str)]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.render_args(vars));
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_keeps_text_as_one_argument() {
        let tpl = CommandTemplate::parse("say -v Milena -r {rate} {text}").unwrap();
        assert_eq!(tpl.program(), "say");
        assert_eq!(
            tpl.render_args(&[("rate", "120"), ("text", "Я хожу E 7 на E 5")]),
            vec!["-v", "Milena", "-r", "120", "Я хожу E 7 на E 5"]
        );
    }

    #[test]
    fn test_placeholder_inside_argument() {
        let tpl = CommandTemplate::parse("arecord --file={output}").unwrap();
        assert_eq!(tpl.render_args(&[("output", "/tmp/a.wav")]), vec!["--file=/tmp/a.wav"]);
    }

    #[test]
    fn test_empty_template() {
        assert!(matches!(CommandTemplate::parse("  "), Err(GameError::Config(_))));
    }
}
