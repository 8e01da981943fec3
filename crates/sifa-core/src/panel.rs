use crate::models::{FormProfile, Suggestion};

/// Right-hand tag of a suggestion row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Badge {
    /// Local catalog entry: picking it selects the existing product.
    UseExisting,
    /// External entry: picking it pre-fills the new product.
    FillIn,
    /// Raw source tag, shown by the quick-add form.
    Source(String),
}

impl Badge {
    pub fn text(&self) -> String {
        match self {
            Self::UseExisting => "Use existing".to_string(),
            Self::FillIn => "Fill in".to_string(),
            Self::Source(tag) => tag.to_uppercase(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelRow {
    pub suggestion: Suggestion,
    pub text: String,
    pub badge: Badge,
}

impl PanelRow {
    fn new(suggestion: Suggestion, profile: FormProfile) -> Self {
        let (text, badge) = match profile {
            FormProfile::DualMode => {
                let badge = if suggestion.is_local() {
                    Badge::UseExisting
                } else {
                    Badge::FillIn
                };
                (suggestion.label().to_string(), badge)
            }
            FormProfile::SingleField => {
                let d = suggestion.details();
                let mut text = suggestion.label().to_string();
                if !d.potencia.is_empty() {
                    text.push_str(" · ");
                    text.push_str(&d.potencia);
                }
                if !d.forma.is_empty() {
                    text.push_str(" — ");
                    text.push_str(&d.forma);
                }
                (text, Badge::Source(suggestion.source().to_string()))
            }
        };
        Self {
            suggestion,
            text,
            badge,
        }
    }
}

/// Where a click landed, relative to the suggestion panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Panel,
    QueryInput,
    Elsewhere,
}

/// The dismissible list of suggestions under the name input.
#[derive(Debug, Clone)]
pub struct SuggestionPanel {
    profile: FormProfile,
    visible: bool,
    rows: Vec<PanelRow>,
    highlighted: Option<usize>,
}

impl SuggestionPanel {
    pub fn new(profile: FormProfile) -> Self {
        Self {
            profile,
            visible: false,
            rows: Vec::new(),
            highlighted: None,
        }
    }

    /// Replace the panel content. An empty list hides it.
    pub fn render(&mut self, suggestions: Vec<Suggestion>) {
        self.rows = suggestions
            .into_iter()
            .map(|s| PanelRow::new(s, self.profile))
            .collect();
        self.visible = !self.rows.is_empty();
        self.highlighted = self.visible.then_some(0);
    }

    pub fn clear(&mut self) {
        self.rows.clear();
        self.visible = false;
        self.highlighted = None;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn rows(&self) -> &[PanelRow] {
        &self.rows
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    /// Move highlight down (wraps).
    pub fn move_down(&mut self) {
        if !self.rows.is_empty() {
            self.highlighted = Some(match self.highlighted {
                Some(i) => (i + 1) % self.rows.len(),
                None => 0,
            });
        }
    }

    /// Move highlight up (wraps).
    pub fn move_up(&mut self) {
        if !self.rows.is_empty() {
            self.highlighted = Some(match self.highlighted {
                Some(0) | None => self.rows.len() - 1,
                Some(i) => i - 1,
            });
        }
    }

    /// Pick row `index`: returns its suggestion and clears the panel.
    pub fn take(&mut self, index: usize) -> Option<Suggestion> {
        if !self.visible || index >= self.rows.len() {
            return None;
        }
        let row = self.rows.swap_remove(index);
        self.clear();
        Some(row.suggestion)
    }

    pub fn take_highlighted(&mut self) -> Option<Suggestion> {
        self.highlighted.and_then(|i| self.take(i))
    }

    /// Hide the panel unless the click hit the panel or the query input.
    pub fn click(&mut self, target: ClickTarget) {
        if target == ClickTarget::Elsewhere {
            self.clear();
        }
    }
}
