use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Included fallback submission template
pub static DEFAULT_TEMPLATE: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/templates/job.sh"));

/// The exclusive-node directive as it sits, disabled, in the template
const EXCLUSIVE_OFF: &str = "##SBATCH --exclusive";
/// The same directive once enabled
const EXCLUSIVE_ON: &str = "#SBATCH --exclusive";

/// Load the submission template, preferring a user-supplied file.
pub fn load_template(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("can't read template {}", path.display())),
        None => Ok(DEFAULT_TEMPLATE.to_string()),
    }
}

/// An ordered list of placeholder substitutions.
///
/// Each pair is applied as one whole-pass literal replacement over the full
/// text before the next pair is touched, so an earlier value that contains a
/// later placeholder's token is resolved by that later pass. Values are plain
/// text: a `$`, `*` or `{` in a command line lands in the script unchanged.
#[derive(Debug, Default)]
pub struct Substitutions {
    pairs: Vec<(String, String)>,
}

impl Substitutions {
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Append a placeholder/value pair; call order is pass order.
    pub fn set(&mut self, token: &str, value: impl Into<String>) -> &mut Self {
        self.pairs.push((token.to_string(), value.into()));
        self
    }

    /// Render the template.
    ///
    /// The exclusive-node toggle is a direct text edit made before any
    /// placeholder pass runs.
    pub fn render(&self, template: &str, exclusive: bool) -> String {
        let mut text = match exclusive {
            true => template.replace(EXCLUSIVE_OFF, EXCLUSIVE_ON),
            false => template.to_string(),
        };
        for (token, value) in &self.pairs {
            text = text.replace(token, value);
        }
        text
    }
}
