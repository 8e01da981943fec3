use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier of a form control (`producto`, `prod-nombre`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(String);

impl FieldId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FieldId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ids of the controls in the stock forms.
pub mod ids {
    /// Existing-product selector.
    pub const PRODUCT: &str = "producto";
    pub const NEW_NAME: &str = "prod-nombre";
    pub const NEW_STRENGTH: &str = "prod-potencia";
    pub const NEW_FORM: &str = "prod-forma";
    pub const DOSE: &str = "dosis";
    pub const ROUTE: &str = "via";
    pub const INSTRUCTIONS: &str = "indicaciones";
    /// Quick-add product form.
    pub const NAME: &str = "nombre";
    pub const STRENGTH: &str = "potencia";
    pub const FORM: &str = "forma";
}

/// Editable single-line text with a byte cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextValue {
    pub value: String,
    pub cursor: usize,
}

impl TextValue {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let cursor = value.len();
        Self { value, cursor }
    }

    /// Replace the whole value, leaving the cursor at the end.
    pub fn set(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.value.len();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    pub fn insert_char(&mut self, c: char) {
        self.value.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn delete_back(&mut self) {
        if self.cursor > 0 {
            let prev = self.value[..self.cursor]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
            self.value.remove(prev);
            self.cursor = prev;
        }
    }

    pub fn move_left(&mut self) {
        if self.cursor > 0 {
            self.cursor = self.value[..self.cursor]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.value.len() {
            self.cursor = self.value[self.cursor..]
                .char_indices()
                .nth(1)
                .map(|(i, _)| self.cursor + i)
                .unwrap_or(self.value.len());
        }
    }
}

/// One `<option>` of a selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            selected: false,
        }
    }
}

/// Single-choice selector. Its value is the selected option's value, or
/// empty when nothing is selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Choice {
    pub options: Vec<SelectOption>,
}

impl Choice {
    pub fn new(options: Vec<SelectOption>) -> Self {
        Self { options }
    }

    pub fn value(&self) -> &str {
        self.selected()
            .map(|o| o.value.as_str())
            .unwrap_or_default()
    }

    pub fn selected(&self) -> Option<&SelectOption> {
        self.options.iter().find(|o| o.selected)
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.options.iter().position(|o| o.selected)
    }

    pub fn clear_selection(&mut self) {
        for o in &mut self.options {
            o.selected = false;
        }
    }

    pub fn select_index(&mut self, index: usize) {
        if index < self.options.len() {
            for (i, o) in self.options.iter_mut().enumerate() {
                o.selected = i == index;
            }
        }
    }

    /// Select the option with `value`, appending it with `label` first if it
    /// does not exist. Returns `true` when an option was created.
    pub fn ensure_selected(&mut self, value: &str, label: &str) -> bool {
        match self.options.iter().position(|o| o.value == value) {
            Some(i) => {
                self.select_index(i);
                false
            }
            None => {
                self.options.push(SelectOption::new(value, label));
                self.select_index(self.options.len() - 1);
                true
            }
        }
    }

    /// Move the selection one option down (wraps).
    pub fn select_next(&mut self) {
        if self.options.is_empty() {
            return;
        }
        let next = match self.selected_index() {
            Some(i) => (i + 1) % self.options.len(),
            None => 0,
        };
        self.select_index(next);
    }

    /// Move the selection one option up (wraps).
    pub fn select_prev(&mut self) {
        if self.options.is_empty() {
            return;
        }
        let prev = match self.selected_index() {
            Some(0) | None => self.options.len() - 1,
            Some(i) => i - 1,
        };
        self.select_index(prev);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Text(TextValue),
    Select(Choice),
}

/// A form control with its HTML-like `required` / `disabled` flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub id: FieldId,
    pub label: String,
    pub required: bool,
    pub disabled: bool,
    pub input: Input,
}

impl Field {
    pub fn text(id: &str, label: impl Into<String>) -> Self {
        Self {
            id: FieldId::new(id),
            label: label.into(),
            required: false,
            disabled: false,
            input: Input::Text(TextValue::default()),
        }
    }

    pub fn select(id: &str, label: impl Into<String>, options: Vec<SelectOption>) -> Self {
        Self {
            id: FieldId::new(id),
            label: label.into(),
            required: false,
            disabled: false,
            input: Input::Select(Choice::new(options)),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn value(&self) -> &str {
        match &self.input {
            Input::Text(t) => &t.value,
            Input::Select(c) => c.value(),
        }
    }

    /// Set a text value, or select the option with that value.
    pub fn set_value(&mut self, value: &str) {
        match &mut self.input {
            Input::Text(t) => t.set(value),
            Input::Select(c) => match c.options.iter().position(|o| o.value == value) {
                Some(i) => c.select_index(i),
                None => c.clear_selection(),
            },
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextValue> {
        match &mut self.input {
            Input::Text(t) => Some(t),
            Input::Select(_) => None,
        }
    }

    pub fn as_choice_mut(&mut self) -> Option<&mut Choice> {
        match &mut self.input {
            Input::Select(c) => Some(c),
            Input::Text(_) => None,
        }
    }
}
