//! Compatibility modes and calculation settings

use crate::error::FormulaError;
use std::fmt;
use std::str::FromStr;

/// Which spreadsheet application's coercion rules to follow
///
/// The mode decides whether booleans are accepted where numbers are
/// expected, what a blank argument defaults to, and whether numeric input is
/// floored before base conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum CompatibilityMode {
    #[default]
    Excel,
    OpenOffice,
    Gnumeric,
}

impl CompatibilityMode {
    pub const ALL: [CompatibilityMode; 3] = [
        CompatibilityMode::Excel,
        CompatibilityMode::OpenOffice,
        CompatibilityMode::Gnumeric,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CompatibilityMode::Excel => "excel",
            CompatibilityMode::OpenOffice => "openoffice",
            CompatibilityMode::Gnumeric => "gnumeric",
        }
    }
}

impl fmt::Display for CompatibilityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompatibilityMode {
    type Err = FormulaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "excel" => Ok(CompatibilityMode::Excel),
            "openoffice" | "ods" => Ok(CompatibilityMode::OpenOffice),
            "gnumeric" => Ok(CompatibilityMode::Gnumeric),
            _ => Err(FormulaError::UnknownMode(s.to_string())),
        }
    }
}

/// Settings fixed for a whole evaluation session
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalcSettings {
    pub mode: CompatibilityMode,
    /// Localized spelling of TRUE
    pub true_token: String,
    /// Localized spelling of FALSE
    pub false_token: String,
}

impl CalcSettings {
    pub fn new(mode: CompatibilityMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Replace the localized boolean spellings
    pub fn with_boolean_tokens(
        mut self,
        true_token: impl Into<String>,
        false_token: impl Into<String>,
    ) -> Self {
        self.true_token = true_token.into();
        self.false_token = false_token.into();
        self
    }

    pub fn boolean_token(&self, b: bool) -> &str {
        if b {
            &self.true_token
        } else {
            &self.false_token
        }
    }

    /// Read a boolean spelled as TRUE/FALSE or as the localized token
    ///
    /// Comparison ignores case.
    pub fn parse_boolean(&self, s: &str) -> Option<bool> {
        let upper = s.to_uppercase();
        if upper == "TRUE" || upper == self.true_token.to_uppercase() {
            Some(true)
        } else if upper == "FALSE" || upper == self.false_token.to_uppercase() {
            Some(false)
        } else {
            None
        }
    }
}

impl Default for CalcSettings {
    fn default() -> Self {
        Self {
            mode: CompatibilityMode::Excel,
            true_token: "TRUE".to_string(),
            false_token: "FALSE".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_round_trips_through_strings() {
        for mode in CompatibilityMode::ALL {
            assert_eq!(mode.to_string().parse::<CompatibilityMode>().unwrap(), mode);
        }
        assert_eq!(
            "ODS".parse::<CompatibilityMode>().unwrap(),
            CompatibilityMode::OpenOffice
        );
        assert!("lotus".parse::<CompatibilityMode>().is_err());
    }

    #[test]
    fn test_localized_booleans() {
        let settings = CalcSettings::new(CompatibilityMode::Excel).with_boolean_tokens("WAHR", "FALSCH");
        assert_eq!(settings.parse_boolean("wahr"), Some(true));
        assert_eq!(settings.parse_boolean("Falsch"), Some(false));
        assert_eq!(settings.parse_boolean(" true"), None);
        assert_eq!(settings.parse_boolean("true"), Some(true));
        assert_eq!(settings.parse_boolean("yes"), None);
        assert_eq!(settings.boolean_token(false), "FALSCH");
    }
}
