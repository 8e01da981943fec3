use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SifaError;

/// Which form the suggestion engine drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FormProfile {
    /// Medication order form: "select existing" / "create new" toggle with
    /// two sections. Suggestions only run while creating.
    #[default]
    #[serde(rename = "dual")]
    DualMode,
    /// Product quick-add form: one section, every pick fills the fields.
    #[serde(rename = "single")]
    SingleField,
}

impl FormProfile {
    /// Whether gaining focus on the name input starts a query.
    pub fn searches_on_focus(&self) -> bool {
        matches!(self, Self::DualMode)
    }

    /// Whether leaving the name input hides the panel after a delay instead
    /// of on the next outside click.
    pub fn hides_on_blur(&self) -> bool {
        matches!(self, Self::SingleField)
    }
}

impl fmt::Display for FormProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DualMode => write!(f, "dual"),
            Self::SingleField => write!(f, "single"),
        }
    }
}

impl FromStr for FormProfile {
    type Err = SifaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dual" => Ok(Self::DualMode),
            "single" => Ok(Self::SingleField),
            _ => Err(SifaError::InvalidProfile(s.to_string())),
        }
    }
}
