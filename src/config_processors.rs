use justconfig::error::ConfigError;
use justconfig::item::{MapAction, StringItem};

/// Strip surrounding quotes from configuration strings.
pub trait Unquote
where
    Self: Sized,
{
    fn unquote(self) -> Result<StringItem, ConfigError>;
}

impl Unquote for Result<StringItem, ConfigError> {
    /// Trims every configuration value and removes one pair of surrounding
    /// double quotes (`"`) when both are present. Unquoted values are kept
    /// unchanged.
    fn unquote(self) -> Result<StringItem, ConfigError> {
        self?.map(|value| {
            let value = value.trim();

            if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
                MapAction::Replace(vec![value[1..value.len() - 1].to_owned()])
            } else {
                MapAction::Keep
            }
        })
    }
}
