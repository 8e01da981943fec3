use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{Field, FieldId};

/// Which form section is interactive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FormMode {
    #[default]
    SelectExisting,
    CreateNew,
}

impl FormMode {
    /// Mode indicated by the "create new" toggle's checked state.
    pub fn from_checked(checked: bool) -> Self {
        if checked { Self::CreateNew } else { Self::SelectExisting }
    }

    pub fn is_create(&self) -> bool {
        matches!(self, Self::CreateNew)
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::SelectExisting => Self::CreateNew,
            Self::CreateNew => Self::SelectExisting,
        }
    }
}

impl fmt::Display for FormMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelectExisting => write!(f, "SELECT EXISTING"),
            Self::CreateNew => write!(f, "CREATE NEW"),
        }
    }
}

/// What a control looked like before a mode switch first disabled it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMemory {
    pub originally_required: bool,
}

/// The "create new" toggle plus the requiredness memory of every control it
/// has ever disabled.
#[derive(Debug, Clone, Default)]
pub struct ModeToggle {
    /// `None` when the page has no toggle control.
    checked: Option<bool>,
    memory: HashMap<FieldId, FieldMemory>,
}

impl ModeToggle {
    pub fn new(checked: bool) -> Self {
        Self {
            checked: Some(checked),
            memory: HashMap::new(),
        }
    }

    pub fn absent() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Option<FormMode> {
        self.checked.map(FormMode::from_checked)
    }

    /// Returns `false` (and does nothing) when there is no toggle.
    pub fn set_mode(&mut self, mode: FormMode) -> bool {
        match &mut self.checked {
            Some(checked) => {
                *checked = mode.is_create();
                true
            }
            None => false,
        }
    }

    pub fn memory(&self, id: &FieldId) -> Option<FieldMemory> {
        self.memory.get(id).copied()
    }

    /// Disable a control of the hidden section, remembering its requiredness
    /// the first time only.
    pub fn deactivate(&mut self, field: &mut Field) {
        self.memory
            .entry(field.id.clone())
            .or_insert(FieldMemory {
                originally_required: field.required,
            });
        field.required = false;
        field.disabled = true;
    }

    /// Enable a control of the visible section. Requiredness comes back only
    /// if it was required before it was first disabled.
    pub fn activate(&self, field: &mut Field) {
        field.disabled = false;
        if self
            .memory(&field.id)
            .is_some_and(|m| m.originally_required)
        {
            field.required = true;
        }
    }
}
