use crate::mode::{FormMode, ModeToggle};
use crate::models::{Field, FieldId, FormProfile, SelectOption, TextValue, ids};
use crate::panel::SuggestionPanel;
use crate::rows::RowManager;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    SelectExisting,
    CreateNew,
}

/// A group of controls shown or hidden as a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSection {
    pub kind: SectionKind,
    pub hidden: bool,
    pub fields: Vec<FieldId>,
}

impl FormSection {
    fn new(kind: SectionKind, ids: &[&str]) -> Self {
        Self {
            kind,
            hidden: false,
            fields: ids.iter().map(|id| FieldId::new(*id)).collect(),
        }
    }
}

/// Controls a picked suggestion writes into. The name input doubles as the
/// query input.
#[derive(Debug, Clone, Default)]
pub(crate) struct FillTargets {
    pub(crate) name: Option<FieldId>,
    pub(crate) strength: Option<FieldId>,
    pub(crate) form: Option<FieldId>,
}

/// The whole form surface the suggestion engine works on.
///
/// Every page element is optional; operations that need a missing element
/// do nothing.
#[derive(Debug, Clone)]
pub struct FormState {
    pub(crate) profile: FormProfile,
    pub(crate) toggle: ModeToggle,
    pub(crate) fields: Vec<Field>,
    pub(crate) select_section: Option<FormSection>,
    pub(crate) new_section: Option<FormSection>,
    pub(crate) selector: Option<FieldId>,
    pub(crate) targets: FillTargets,
    pub(crate) panel: Option<SuggestionPanel>,
    pub rows: RowManager,
}

impl FormState {
    /// Medication order form: product selector on one side, quick product
    /// creation on the other, plus dose fields and schedule rows.
    pub fn medication_order(products: Vec<SelectOption>, start_in_create_mode: bool) -> Self {
        FormBuilder::new(FormProfile::DualMode)
            .toggle(start_in_create_mode)
            .field(Field::select(ids::PRODUCT, "Producto", products).required())
            .field(Field::text(ids::NEW_NAME, "Nombre").required())
            .field(Field::text(ids::NEW_STRENGTH, "Potencia"))
            .field(Field::text(ids::NEW_FORM, "Forma"))
            .field(Field::text(ids::DOSE, "Dosis").required())
            .field(Field::text(ids::ROUTE, "Vía"))
            .field(Field::text(ids::INSTRUCTIONS, "Indicaciones"))
            .select_section(&[ids::PRODUCT])
            .new_section(&[ids::NEW_NAME, ids::NEW_STRENGTH, ids::NEW_FORM])
            .selector(ids::PRODUCT)
            .fill_targets(ids::NEW_NAME, Some(ids::NEW_STRENGTH), Some(ids::NEW_FORM))
            .rows(RowManager::hours())
            .panel()
            .build()
    }

    /// Product quick-add form: a single section, no toggle.
    pub fn product_quick() -> Self {
        FormBuilder::new(FormProfile::SingleField)
            .field(Field::text(ids::NAME, "Nombre").required())
            .field(Field::text(ids::STRENGTH, "Potencia"))
            .field(Field::text(ids::FORM, "Forma"))
            .fill_targets(ids::NAME, Some(ids::STRENGTH), Some(ids::FORM))
            .panel()
            .build()
    }

    pub fn profile(&self) -> FormProfile {
        self.profile
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, id: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.id.as_str() == id)
    }

    pub fn field_mut(&mut self, id: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.id.as_str() == id)
    }

    pub fn section(&self, kind: SectionKind) -> Option<&FormSection> {
        match kind {
            SectionKind::SelectExisting => self.select_section.as_ref(),
            SectionKind::CreateNew => self.new_section.as_ref(),
        }
    }

    /// Section a field belongs to, if any.
    pub fn section_of(&self, id: &FieldId) -> Option<SectionKind> {
        [&self.select_section, &self.new_section]
            .into_iter()
            .flatten()
            .find(|s| s.fields.contains(id))
            .map(|s| s.kind)
    }

    pub fn selector_value(&self) -> Option<&str> {
        let id = self.selector.as_ref()?;
        self.field(id.as_str()).map(Field::value)
    }

    // ─── Mode ──────────────────────────────────────────────

    pub fn mode(&self) -> Option<FormMode> {
        self.toggle.mode()
    }

    pub fn toggle(&self) -> &ModeToggle {
        &self.toggle
    }

    /// Force a mode and run the full activation logic. Returns `false` when
    /// the form has no toggle.
    pub fn set_mode(&mut self, mode: FormMode) -> bool {
        if !self.toggle.set_mode(mode) {
            return false;
        }
        self.apply_mode();
        if !mode.is_create() {
            self.clear_panel();
        }
        true
    }

    /// User flipped the toggle.
    pub fn toggle_mode(&mut self) -> bool {
        match self.mode() {
            Some(mode) => self.set_mode(mode.toggled()),
            None => false,
        }
    }

    /// Show one section, hide the other and move enabled/required state
    /// accordingly.
    pub fn apply_mode(&mut self) {
        let Some(mode) = self.toggle.mode() else {
            return;
        };
        let creating = mode.is_create();

        if let Some(section) = &mut self.select_section {
            section.hidden = creating;
        }
        if let Some(section) = &mut self.new_section {
            section.hidden = !creating;
        }

        let (hidden, visible) = if creating {
            (&self.select_section, &self.new_section)
        } else {
            (&self.new_section, &self.select_section)
        };
        let hidden_ids = hidden.as_ref().map(|s| s.fields.clone()).unwrap_or_default();
        let visible_ids = visible.as_ref().map(|s| s.fields.clone()).unwrap_or_default();

        for field in self.fields.iter_mut() {
            if hidden_ids.contains(&field.id) {
                self.toggle.deactivate(field);
            } else if visible_ids.contains(&field.id) {
                self.toggle.activate(field);
            }
        }

        if creating {
            if let Some(choice) = self
                .selector
                .clone()
                .and_then(|id| self.field_mut(id.as_str()))
                .and_then(Field::as_choice_mut)
            {
                choice.clear_selection();
            }
        }
        tracing::debug!(%mode, "form mode applied");
    }

    // ─── Query input & panel ───────────────────────────────

    pub fn query_field_id(&self) -> Option<&FieldId> {
        self.targets.name.as_ref()
    }

    pub fn query_text(&self) -> Option<&str> {
        let id = self.targets.name.as_ref()?;
        self.field(id.as_str()).map(Field::value)
    }

    pub fn query_input_mut(&mut self) -> Option<&mut TextValue> {
        let id = self.targets.name.clone()?;
        self.field_mut(id.as_str()).and_then(Field::as_text_mut)
    }

    /// Whether suggestions should be fetched and shown right now.
    pub fn actively_searching(&self) -> bool {
        if self.panel.is_none() || self.query_text().is_none() {
            return false;
        }
        match self.profile {
            FormProfile::DualMode => self.mode() == Some(FormMode::CreateNew),
            FormProfile::SingleField => true,
        }
    }

    pub fn panel(&self) -> Option<&SuggestionPanel> {
        self.panel.as_ref()
    }

    pub fn panel_mut(&mut self) -> Option<&mut SuggestionPanel> {
        self.panel.as_mut()
    }

    pub fn clear_panel(&mut self) {
        if let Some(panel) = &mut self.panel {
            panel.clear();
        }
    }

    /// Pick panel row `index` and bind it to the form.
    pub fn pick(&mut self, index: usize) -> bool {
        let Some(suggestion) = self.panel.as_mut().and_then(|p| p.take(index)) else {
            return false;
        };
        self.bind(&suggestion);
        true
    }

    pub fn pick_highlighted(&mut self) -> bool {
        match self.panel.as_ref().and_then(SuggestionPanel::highlighted) {
            Some(index) => self.pick(index),
            None => false,
        }
    }
}

/// Assembles a [`FormState`] from optional page elements.
#[derive(Debug, Clone, Default)]
pub struct FormBuilder {
    profile: FormProfile,
    toggle: ModeToggle,
    fields: Vec<Field>,
    select_section: Option<FormSection>,
    new_section: Option<FormSection>,
    selector: Option<FieldId>,
    targets: FillTargets,
    rows: RowManager,
    panel: bool,
}

impl FormBuilder {
    pub fn new(profile: FormProfile) -> Self {
        Self {
            profile,
            ..Self::default()
        }
    }

    pub fn toggle(mut self, checked: bool) -> Self {
        self.toggle = ModeToggle::new(checked);
        self
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn select_section(mut self, ids: &[&str]) -> Self {
        self.select_section = Some(FormSection::new(SectionKind::SelectExisting, ids));
        self
    }

    pub fn new_section(mut self, ids: &[&str]) -> Self {
        self.new_section = Some(FormSection::new(SectionKind::CreateNew, ids));
        self
    }

    pub fn selector(mut self, id: &str) -> Self {
        self.selector = Some(FieldId::new(id));
        self
    }

    pub fn fill_targets(mut self, name: &str, strength: Option<&str>, form: Option<&str>) -> Self {
        self.targets = FillTargets {
            name: Some(FieldId::new(name)),
            strength: strength.map(FieldId::new),
            form: form.map(FieldId::new),
        };
        self
    }

    pub fn rows(mut self, rows: RowManager) -> Self {
        self.rows = rows;
        self
    }

    pub fn panel(mut self) -> Self {
        self.panel = true;
        self
    }

    /// Build the form and apply the toggle's initial state, as on page load.
    pub fn build(self) -> FormState {
        let mut form = FormState {
            profile: self.profile,
            toggle: self.toggle,
            fields: self.fields,
            select_section: self.select_section,
            new_section: self.new_section,
            selector: self.selector,
            targets: self.targets,
            panel: self.panel.then(|| SuggestionPanel::new(self.profile)),
            rows: self.rows,
        };
        form.apply_mode();
        form
    }
}
