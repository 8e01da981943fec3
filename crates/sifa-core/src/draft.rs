use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SifaError};
use crate::form::FormState;
use crate::mode::FormMode;
use crate::models::{ProductDetails, ScheduleEntry};

/// How the submitted order refers to its product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProductRef {
    Existing { id: String },
    New(ProductDetails),
}

/// What the form would submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub product: Option<ProductRef>,
    /// Enabled controls outside the product sections, by id.
    pub fields: BTreeMap<String, String>,
    pub schedule: Vec<ScheduleEntry>,
}

impl FormState {
    /// Validate required controls and collect the submission.
    ///
    /// Disabled controls are never submitted nor validated, like a browser
    /// form.
    pub fn draft(&self) -> Result<OrderDraft> {
        let missing: Vec<&str> = self
            .fields
            .iter()
            .filter(|f| !f.disabled && f.required && f.value().trim().is_empty())
            .map(|f| f.id.as_str())
            .collect();
        if !missing.is_empty() {
            return Err(SifaError::ValidationError(format!(
                "required fields are empty: {}",
                missing.join(", ")
            )));
        }

        let fields = self
            .fields
            .iter()
            .filter(|f| !f.disabled && self.section_of(&f.id).is_none())
            .filter(|f| Some(&f.id) != self.targets.name.as_ref())
            .filter(|f| Some(&f.id) != self.targets.strength.as_ref())
            .filter(|f| Some(&f.id) != self.targets.form.as_ref())
            .map(|f| (f.id.to_string(), f.value().trim().to_string()))
            .collect();

        Ok(OrderDraft {
            product: self.product_ref(),
            fields,
            schedule: self.rows.schedule(),
        })
    }

    fn product_ref(&self) -> Option<ProductRef> {
        match self.mode() {
            Some(FormMode::SelectExisting) => self
                .selector_value()
                .filter(|v| !v.is_empty())
                .map(|id| ProductRef::Existing { id: id.to_string() }),
            Some(FormMode::CreateNew) | None => {
                let value = |id: &Option<crate::models::FieldId>| {
                    id.as_ref()
                        .and_then(|id| self.field(id.as_str()))
                        .map(|f| f.value().trim().to_string())
                        .unwrap_or_default()
                };
                let details = ProductDetails {
                    nombre: value(&self.targets.name),
                    potencia: value(&self.targets.strength),
                    forma: value(&self.targets.form),
                };
                (!details.nombre.is_empty()).then_some(ProductRef::New(details))
            }
        }
    }
}
