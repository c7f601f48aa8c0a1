use serde_json::Value;
use std::fmt;

/// A wallet API call: method name and positional arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct WalletCommand {
    pub method: String,
    pub args: Vec<Value>,
}

impl WalletCommand {
    pub fn new(method: &str) -> Self {
        Self {
            method: method.to_string(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn args(mut self, values: impl IntoIterator<Item = Value>) -> Self {
        self.args.extend(values);
        self
    }

    /// Renders the command the way the interactive console reads it.
    pub fn to_line(&self) -> String {
        let mut line = self.method.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string());
        }
        line.push('\n');
        line
    }
}

impl fmt::Display for WalletCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_line().trim_end())
    }
}
