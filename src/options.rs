//! Decoder configuration.

use crate::error::{ConfigError, InvalidOptionsSnafu, ReadOptionsSnafu};
use serde::{Deserialize, Serialize};
use snafu::ResultExt;
use std::path::Path;

/// Default limit for embedded message nesting.
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Flags that control how values are interpreted.
///
/// Options can be loaded from a TOML document where every key is optional:
///
/// ```
/// use protospan::DecodeOptions;
///
/// let options = DecodeOptions::from_toml_str(r#"
///     guess_unknown_as_string = true
///     max_depth = 16
/// "#).unwrap();
/// assert!(options.guess_unknown_as_string);
/// assert!(!options.treat_bytes_as_string);
/// assert_eq!(options.max_depth, 16);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecodeOptions
{
    /// Display `bytes` fields as strings.
    pub treat_bytes_as_string: bool,

    /// Guess length-delimited fields without a schema to be strings.
    pub guess_unknown_as_string: bool,

    /// Without a schema, decode every field with every type its wire type allows.
    pub show_all_candidate_types: bool,

    /// Maximum nesting of embedded messages.
    pub max_depth: usize,
}

impl Default for DecodeOptions
{
    fn default() -> Self
    {
        DecodeOptions {
            treat_bytes_as_string: false,
            guess_unknown_as_string: false,
            show_all_candidate_types: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl DecodeOptions
{
    /// Parses options from a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError>
    {
        toml::from_str(s).context(InvalidOptionsSnafu)
    }

    /// Reads options from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError>
    {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).context(ReadOptionsSnafu { path })?;
        Self::from_toml_str(&content)
    }

    /// Sets [`treat_bytes_as_string`](Self::treat_bytes_as_string).
    pub fn with_bytes_as_string(mut self, value: bool) -> Self
    {
        self.treat_bytes_as_string = value;
        self
    }

    /// Sets [`guess_unknown_as_string`](Self::guess_unknown_as_string).
    pub fn with_guess_unknown_as_string(mut self, value: bool) -> Self
    {
        self.guess_unknown_as_string = value;
        self
    }

    /// Sets [`show_all_candidate_types`](Self::show_all_candidate_types).
    pub fn with_all_candidate_types(mut self, value: bool) -> Self
    {
        self.show_all_candidate_types = value;
        self
    }

    /// Sets [`max_depth`](Self::max_depth).
    pub fn with_max_depth(mut self, value: usize) -> Self
    {
        self.max_depth = value;
        self
    }
}

#[cfg(test)]
mod test
{
    use super::*;

    #[test]
    fn empty_document_uses_defaults()
    {
        assert_eq!(DecodeOptions::from_toml_str("").unwrap(), DecodeOptions::default());
    }

    #[test]
    fn unknown_keys_are_rejected()
    {
        let err = DecodeOptions::from_toml_str("dissect_everything = true").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOptions { .. }));
    }

    #[test]
    fn missing_file()
    {
        let err = DecodeOptions::from_file("/nonexistent/protospan.toml").unwrap_err();
        assert!(matches!(err, ConfigError::ReadOptions { .. }));
    }
}
