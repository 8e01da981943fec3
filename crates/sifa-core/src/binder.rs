use crate::form::FormState;
use crate::mode::FormMode;
use crate::models::{FieldId, FormProfile, Suggestion};

impl FormState {
    /// Apply a chosen suggestion to the form.
    ///
    /// On the order form a local entry selects the existing product and an
    /// external one switches to "create new" and pre-fills it; the mode switch
    /// runs the full toggle logic. The quick-add form always fills.
    pub fn bind(&mut self, suggestion: &Suggestion) {
        match (self.profile, suggestion) {
            (FormProfile::DualMode, Suggestion::Local { id, label, .. }) => {
                self.set_mode(FormMode::SelectExisting);
                self.select_existing(id, label);
            }
            (FormProfile::DualMode, Suggestion::External { label, details, .. }) => {
                self.set_mode(FormMode::CreateNew);
                let name = if details.nombre.is_empty() {
                    label.as_str()
                } else {
                    details.nombre.as_str()
                };
                self.fill_new_entry(name, &details.potencia, &details.forma);
            }
            (FormProfile::SingleField, s) => {
                let details = s.details();
                self.fill_new_entry(s.label(), &details.potencia, &details.forma);
            }
        }
        tracing::debug!(label = suggestion.label(), source = suggestion.source(), "suggestion bound");
    }

    fn select_existing(&mut self, id: &str, label: &str) {
        let Some(selector) = self.selector.clone() else {
            return;
        };
        if let Some(choice) = self
            .field_mut(selector.as_str())
            .and_then(|f| f.as_choice_mut())
        {
            choice.ensure_selected(id, label);
        }
    }

    fn fill_new_entry(&mut self, name: &str, strength: &str, form: &str) {
        let targets = self.targets.clone();
        for (target, value) in [
            (targets.name, name),
            (targets.strength, strength),
            (targets.form, form),
        ] {
            self.fill(target.as_ref(), value);
        }
    }

    fn fill(&mut self, target: Option<&FieldId>, value: &str) {
        if let Some(field) = target.and_then(|id| self.field_mut(id.as_str())) {
            field.set_value(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::form::{FormBuilder, FormState};
    use crate::mode::FormMode;
    use crate::models::{Field, FormProfile, ProductDetails, SelectOption, Suggestion, ids};

    fn paracetamol() -> Suggestion {
        Suggestion::Local {
            id: "42".to_string(),
            label: "Paracetamol 500mg".to_string(),
            details: ProductDetails {
                nombre: "Paracetamol".to_string(),
                potencia: "500mg".to_string(),
                forma: "tableta".to_string(),
            },
        }
    }

    fn ibuprofeno() -> Suggestion {
        Suggestion::External {
            provider: "external".to_string(),
            label: "Ibuprofeno 400mg".to_string(),
            details: ProductDetails {
                nombre: "Ibuprofeno".to_string(),
                potencia: "400mg".to_string(),
                forma: "tableta".to_string(),
            },
        }
    }

    #[test]
    fn local_pick_selects_existing_record() {
        let mut form = FormState::medication_order(Vec::new(), true);
        form.bind(&paracetamol());

        assert_eq!(form.mode(), Some(FormMode::SelectExisting));
        let product = form.field(ids::PRODUCT).unwrap();
        assert_eq!(product.value(), "42");
        let choice = match &product.input {
            crate::models::Input::Select(c) => c,
            _ => unreachable!(),
        };
        assert_eq!(choice.selected().unwrap().label, "Paracetamol 500mg");
        assert!(!product.disabled && product.required);
    }

    #[test]
    fn local_pick_reuses_existing_option() {
        let mut form = FormState::medication_order(
            vec![SelectOption::new("42", "Paracetamol 500mg")],
            true,
        );
        form.bind(&paracetamol());
        form.set_mode(FormMode::CreateNew);
        form.bind(&paracetamol());

        let product = form.field(ids::PRODUCT).unwrap();
        match &product.input {
            crate::models::Input::Select(c) => assert_eq!(c.options.len(), 1),
            _ => unreachable!(),
        }
        assert_eq!(product.value(), "42");
    }

    #[test]
    fn external_pick_fills_new_entry() {
        let mut form = FormState::medication_order(Vec::new(), false);
        form.bind(&ibuprofeno());

        assert_eq!(form.mode(), Some(FormMode::CreateNew));
        assert_eq!(form.field(ids::NEW_NAME).unwrap().value(), "Ibuprofeno");
        assert_eq!(form.field(ids::NEW_STRENGTH).unwrap().value(), "400mg");
        assert_eq!(form.field(ids::NEW_FORM).unwrap().value(), "tableta");
        assert!(!form.field(ids::NEW_NAME).unwrap().disabled);
    }

    #[test]
    fn external_pick_with_missing_attributes_blanks_fields() {
        let mut form = FormState::medication_order(Vec::new(), true);
        form.field_mut(ids::NEW_STRENGTH).unwrap().set_value("old");
        form.bind(&Suggestion::External {
            provider: "rxnorm".to_string(),
            label: "Amoxicillin".to_string(),
            details: ProductDetails::default(),
        });

        assert_eq!(form.field(ids::NEW_NAME).unwrap().value(), "Amoxicillin");
        assert_eq!(form.field(ids::NEW_STRENGTH).unwrap().value(), "");
        assert_eq!(form.field(ids::NEW_FORM).unwrap().value(), "");
    }

    #[test]
    fn untagged_entry_fills_new_entry() {
        let body = serde_json::json!({
            "results": [{ "label": "Ibuprofeno", "nombre": "Ibuprofeno", "potencia": "400mg" }]
        });
        let results = crate::models::parse_results(&body, None);
        assert_eq!(results.len(), 1);

        let mut form = FormState::medication_order(Vec::new(), false);
        form.bind(&results[0]);

        assert_eq!(form.mode(), Some(FormMode::CreateNew));
        assert_eq!(form.field(ids::NEW_NAME).unwrap().value(), "Ibuprofeno");
        assert_eq!(form.field(ids::NEW_STRENGTH).unwrap().value(), "400mg");
        assert_eq!(form.selector_value(), Some(""));
    }

    #[test]
    fn quick_form_fills_from_any_source() {
        let mut form = FormState::product_quick();
        form.bind(&paracetamol());

        assert_eq!(form.mode(), None);
        assert_eq!(form.field(ids::NAME).unwrap().value(), "Paracetamol 500mg");
        assert_eq!(form.field(ids::STRENGTH).unwrap().value(), "500mg");
        assert_eq!(form.field(ids::FORM).unwrap().value(), "tableta");
    }

    #[test]
    fn bind_without_toggle_still_fills() {
        let mut form = FormBuilder::new(FormProfile::DualMode)
            .field(Field::text(ids::NEW_NAME, "Nombre"))
            .fill_targets(ids::NEW_NAME, None, None)
            .build();
        form.bind(&ibuprofeno());
        assert_eq!(form.field(ids::NEW_NAME).unwrap().value(), "Ibuprofeno");
    }
}
