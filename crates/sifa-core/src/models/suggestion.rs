use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SifaError;

/// Source tag the backend uses for entries from the local catalog.
pub const LOCAL_SOURCE: &str = "local";

/// Provider recorded for untagged entries that carry no id.
pub const UNKNOWN_SOURCE: &str = "unknown";

/// Product attributes carried by a suggestion. Missing values are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDetails {
    pub nombre: String,
    pub potencia: String,
    pub forma: String,
}

/// A candidate match returned by the suggestion endpoint.
///
/// Only local entries carry an id: they map to an existing catalog record.
/// External entries come from a reference source and can only pre-fill the
/// "create new" fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Suggestion {
    Local {
        id: String,
        label: String,
        details: ProductDetails,
    },
    External {
        provider: String,
        label: String,
        details: ProductDetails,
    },
}

impl Suggestion {
    /// Normalize one entry of the `results` array.
    ///
    /// Returns `None` for entries that cannot be shown or bound: no usable
    /// label, or an entry tagged `local` without an id. An untagged entry is
    /// local when it has an id and external otherwise.
    pub fn from_json(v: &Value) -> Option<Self> {
        let text = |key: &str| {
            v.get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .unwrap_or_default()
                .to_string()
        };

        let details = ProductDetails {
            nombre: text("nombre"),
            potencia: text("potencia"),
            forma: text("forma"),
        };

        let label = Some(text("label"))
            .filter(|l| !l.is_empty())
            .or_else(|| Some(details.nombre.clone()).filter(|n| !n.is_empty()))?;

        let id = match v.get("id") {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        let source = match Some(text("source")).filter(|s| !s.is_empty()) {
            Some(source) => source,
            None if id.is_some() => LOCAL_SOURCE.to_string(),
            None => UNKNOWN_SOURCE.to_string(),
        };

        if source.eq_ignore_ascii_case(LOCAL_SOURCE) {
            let Some(id) = id else {
                tracing::debug!(%label, "skipping local suggestion without id");
                return None;
            };
            Some(Self::Local { id, label, details })
        } else {
            Some(Self::External {
                provider: source,
                label,
                details,
            })
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Local { label, .. } | Self::External { label, .. } => label,
        }
    }

    pub fn details(&self) -> &ProductDetails {
        match self {
            Self::Local { details, .. } | Self::External { details, .. } => details,
        }
    }

    /// Provenance tag as sent by the backend (`local`, `cima`, `rxnorm`, ...).
    pub fn source(&self) -> &str {
        match self {
            Self::Local { .. } => LOCAL_SOURCE,
            Self::External { provider, .. } => provider,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local { .. })
    }
}

/// Extract the suggestion list from a response body.
///
/// A missing or non-array `results` field is an empty list. Entries keep the
/// backend's order, and entries sharing a label are all kept since their
/// strength or form may differ. Capped at `limit` when given.
pub fn parse_results(body: &Value, limit: Option<usize>) -> Vec<Suggestion> {
    let Some(items) = body.get("results").and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(Suggestion::from_json)
        .take(limit.unwrap_or(usize::MAX))
        .collect()
}

/// Provider hint understood by the suggestion endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Provider {
    Local,
    External,
    Cima,
    RxNorm,
    Hybrid,
}

impl Provider {
    pub fn as_query_value(&self) -> &'static str {
        match self {
            Self::Local => "LOCAL",
            Self::External => "EXTERNAL",
            Self::Cima => "CIMA",
            Self::RxNorm => "RXNORM",
            Self::Hybrid => "HYBRID",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query_value())
    }
}

impl FromStr for Provider {
    type Err = SifaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOCAL" => Ok(Self::Local),
            "EXTERNAL" => Ok(Self::External),
            "CIMA" => Ok(Self::Cima),
            "RXNORM" => Ok(Self::RxNorm),
            "HYBRID" => Ok(Self::Hybrid),
            _ => Err(SifaError::InvalidProvider(s.to_string())),
        }
    }
}
