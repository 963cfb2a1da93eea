use std::fs;
use std::io;
use std::path::Path;

/// Fallback for a memory keyword that is missing or carries no usable value,
/// in MB. Matches the Turbomole default for `$ricore` and `$rpacor`.
pub const DEFAULT_MEM: u64 = 500;

const RICORE_KEY: &str = "$ricore";
const RPACOR_KEY: &str = "$rpacor";

/// Memory settings extracted from a `control` file, in MB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resources {
    pub ricore: u64,
    pub rpacor: u64,
}

impl Default for Resources {
    fn default() -> Self {
        Self {
            ricore: DEFAULT_MEM,
            rpacor: DEFAULT_MEM,
        }
    }
}

impl Resources {
    /// Read memory settings from the named resource file inside `dir`.
    pub fn read(dir: &Path, file_name: &str) -> io::Result<Self> {
        let text = fs::read_to_string(dir.join(file_name))?;
        Ok(Self::parse(&text))
    }

    /// Scan control-file text for the `$ricore` and `$rpacor` keywords.
    ///
    /// The first line containing a keyword wins, and the value is the first
    /// whitespace-delimited token after the keyword on that line. A missing
    /// keyword, a missing token, or a token that is not an integer all fall
    /// back to [`DEFAULT_MEM`].
    pub fn parse(text: &str) -> Self {
        Self {
            ricore: extract(text, RICORE_KEY),
            rpacor: extract(text, RPACOR_KEY),
        }
    }
}

fn extract(text: &str, key: &str) -> u64 {
    text.lines()
        .find_map(|line| line.split_once(key).map(|(_, rest)| rest))
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|token| token.parse().ok())
        .unwrap_or(DEFAULT_MEM)
}
