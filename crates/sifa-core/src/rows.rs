use crate::models::{ScheduleEntry, TextValue};

/// Template a new row is cloned from: the names of its cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowTemplate {
    pub cells: Vec<String>,
}

impl RowTemplate {
    pub fn new(cells: &[&str]) -> Self {
        Self {
            cells: cells.iter().map(|c| c.to_string()).collect(),
        }
    }

    fn instantiate(&self) -> Row {
        Row {
            cells: self
                .cells
                .iter()
                .map(|name| RowCell {
                    name: name.clone(),
                    value: TextValue::default(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowCell {
    pub name: String,
    pub value: TextValue,
}

/// One repeatable sub-row. It has no identity beyond its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub cells: Vec<RowCell>,
}

impl Row {
    pub fn cell(&self, name: &str) -> Option<&TextValue> {
        self.cells.iter().find(|c| c.name == name).map(|c| &c.value)
    }

    pub fn cell_mut(&mut self, name: &str) -> Option<&mut TextValue> {
        self.cells
            .iter_mut()
            .find(|c| c.name == name)
            .map(|c| &mut c.value)
    }
}

/// Add/remove manager for the schedule rows.
///
/// Both the template and the container are optional page elements: without
/// a template nothing can be added, without a container nothing exists.
#[derive(Debug, Clone, Default)]
pub struct RowManager {
    template: Option<RowTemplate>,
    container: Option<Vec<Row>>,
}

pub const HOUR_CELL: &str = "hora";
pub const DAY_CELL: &str = "dia";

impl RowManager {
    pub fn new(template: Option<RowTemplate>, container: Option<Vec<Row>>) -> Self {
        Self {
            template,
            container,
        }
    }

    /// Schedule rows with `hora` / `dia` cells and an empty container.
    pub fn hours() -> Self {
        Self::new(Some(RowTemplate::new(&[HOUR_CELL, DAY_CELL])), Some(Vec::new()))
    }

    pub fn is_present(&self) -> bool {
        self.container.is_some()
    }

    /// Append a fresh copy of the template. Returns its index.
    pub fn add_row(&mut self) -> Option<usize> {
        let (Some(template), Some(rows)) = (&self.template, &mut self.container) else {
            return None;
        };
        rows.push(template.instantiate());
        Some(rows.len() - 1)
    }

    /// Detach exactly the row at `index`.
    pub fn remove_row(&mut self, index: usize) -> Option<Row> {
        let rows = self.container.as_mut()?;
        (index < rows.len()).then(|| rows.remove(index))
    }

    pub fn rows(&self) -> &[Row] {
        self.container.as_deref().unwrap_or_default()
    }

    pub fn row_mut(&mut self, index: usize) -> Option<&mut Row> {
        self.container.as_mut()?.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.rows().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows().is_empty()
    }

    /// Administration times entered so far, skipping incomplete rows.
    pub fn schedule(&self) -> Vec<ScheduleEntry> {
        self.rows()
            .iter()
            .filter_map(|row| {
                let hora = row.cell(HOUR_CELL).map(|v| v.value.as_str())?;
                let dia = row.cell(DAY_CELL).map(|v| v.value.as_str()).unwrap_or("");
                ScheduleEntry::parse(hora, dia)
            })
            .collect()
    }
}
