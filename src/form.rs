//! Editable form state seeded from an extracted record.
//!
//! The form is the mutable half of the workflow: every scalar attribute of
//! the record becomes an owned `String` (empty when the record field was
//! absent — absence renders as an empty input, never a crash), and the
//! nutrition table becomes a freely editable ordered row list. No field-level
//! validation happens anywhere here; any text is accepted.

use crate::error::FichaError;
use crate::record::{ExtractedRecord, NutrientRow};
use serde::{Deserialize, Serialize};

/// Column of the nutrition table. The schema is fixed: item / qtd / vd.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Item,
    Qtd,
    Vd,
}

/// The editable nutrition table: a mutable ordered sequence of rows.
///
/// Rows may be appended, inserted, removed, or edited cell by cell; order is
/// always preserved. An empty table still carries the item/qtd/vd schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NutritionTable {
    rows: Vec<NutrientRow>,
}

impl NutritionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<NutrientRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[NutrientRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a row at the end.
    pub fn push_row(&mut self, row: NutrientRow) {
        self.rows.push(row);
    }

    /// Insert a row at `index`, clamped to the current length.
    pub fn insert_row(&mut self, index: usize, row: NutrientRow) {
        let index = index.min(self.rows.len());
        self.rows.insert(index, row);
    }

    /// Remove and return the row at `index`, or `None` when out of range.
    pub fn remove_row(&mut self, index: usize) -> Option<NutrientRow> {
        if index < self.rows.len() {
            Some(self.rows.remove(index))
        } else {
            None
        }
    }

    /// Overwrite one cell. Returns false when the row does not exist.
    pub fn set_cell(&mut self, index: usize, column: Column, value: impl Into<String>) -> bool {
        let Some(row) = self.rows.get_mut(index) else {
            return false;
        };
        let value = value.into();
        match column {
            Column::Item => row.item = value,
            Column::Qtd => row.qtd = value,
            Column::Vd => row.vd = value,
        }
        true
    }

    /// Serialise the table into its embedded-text form: a JSON array of
    /// `{item, qtd, vd}` objects in row order. This string is what the
    /// exporter stores in the single nutrition-table CSV field.
    pub fn to_embedded_text(&self) -> Result<String, FichaError> {
        serde_json::to_string(&self.rows).map_err(|e| FichaError::TableSerialization(e.to_string()))
    }

    /// Parse the embedded-text form back into a table.
    pub fn from_embedded_text(s: &str) -> Result<Self, FichaError> {
        let rows: Vec<NutrientRow> =
            serde_json::from_str(s).map_err(|e| FichaError::TableSerialization(e.to_string()))?;
        Ok(Self { rows })
    }
}

/// Editable form state for one extracted record.
///
/// Seeded by [`FormState::from_record`]; the in-progress edits live only here
/// until the user exports.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    /// Technical product name ("Produto").
    pub product: String,
    /// Brand ("Marca").
    pub brand: String,
    /// Net weight ("Peso").
    pub weight: String,
    /// Manufacturer ("Fabricante").
    pub manufacturer: String,
    /// Full ingredient text ("Ingredientes").
    pub ingredients: String,
    /// Storage instruction ("Conservação").
    pub storage: String,
    /// Contact info ("Contatos").
    pub contacts: String,
    /// The editable nutrition table.
    pub nutrition: NutritionTable,
}

impl FormState {
    /// Seed a form from a record. Absent fields become empty strings and an
    /// absent table becomes an empty item/qtd/vd table.
    pub fn from_record(record: &ExtractedRecord) -> Self {
        let opt = |v: &Option<String>| v.clone().unwrap_or_default();
        Self {
            product: opt(&record.nome_tecnico),
            brand: opt(&record.marca),
            weight: opt(&record.peso_liquido),
            manufacturer: opt(&record.fabricante),
            ingredients: opt(&record.ingredientes_texto),
            storage: opt(&record.conservacao),
            contacts: opt(&record.contatos),
            nutrition: NutritionTable::from_rows(record.tabela_nutricional.clone()),
        }
    }
}
