//! The structured product record returned by the vision model.
//!
//! Every scalar field is an explicit `Option<String>`: the model is told it
//! may answer `null` when a photo is unreadable, and an absent key must be
//! representable without key-presence checks at use sites. Field names are
//! the wire format — the serde names below must match
//! [`crate::prompts::EXTRACTION_PROMPT`] verbatim.

use crate::error::FichaError;
use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize an explicit JSON `null` the same as a missing key.
///
/// The model is told it may answer `null` for anything it cannot read, and
/// serde's `#[serde(default)]` alone only covers *missing* keys.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One line of the nutrition table.
///
/// `qtd` and `vd` are free text, not numbers: the model routinely returns
/// units ("120mg") or approximations ("<1%"), and the record keeps them as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NutrientRow {
    #[serde(default, deserialize_with = "null_as_default")]
    pub item: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub qtd: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vd: String,
}

impl NutrientRow {
    pub fn new(
        item: impl Into<String>,
        qtd: impl Into<String>,
        vd: impl Into<String>,
    ) -> Self {
        Self {
            item: item.into(),
            qtd: qtd.into(),
            vd: vd.into(),
        }
    }
}

/// The product record extracted from the packaging photos.
///
/// Created only by a successful extraction call, held in session memory, and
/// replaced wholesale by the next successful call — fields from two calls are
/// never merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    /// Technical product name.
    pub nome_tecnico: Option<String>,
    /// Commercial brand.
    pub marca: Option<String>,
    /// Net weight, free text (e.g. "500g").
    pub peso_liquido: Option<String>,
    /// Manufacturer name.
    pub fabricante: Option<String>,
    /// Nutrition table lines, in label order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub tabela_nutricional: Vec<NutrientRow>,
    /// Full ingredient list text.
    pub ingredientes_texto: Option<String>,
    /// Storage instruction.
    pub conservacao: Option<String>,
    /// Customer-service contact info.
    pub contatos: Option<String>,
}

impl ExtractedRecord {
    /// Parse a model reply into a record.
    ///
    /// Unknown keys are ignored; missing keys become `None` / an empty table.
    /// Anything that is not a JSON object with the expected shape fails with
    /// [`FichaError::MalformedReply`].
    pub fn from_json_str(s: &str) -> Result<Self, FichaError> {
        serde_json::from_str(s).map_err(|e| FichaError::MalformedReply {
            detail: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_record() {
        let json = r#"{
            "nome_tecnico": "Filé de Tilápia",
            "marca": "Frescatto",
            "peso_liquido": "500g",
            "fabricante": "Frescatto SA",
            "tabela_nutricional": [{"item": "Sódio", "qtd": "120mg", "vd": "5%"}],
            "ingredientes_texto": "Peixe",
            "conservacao": "Congelado -18C",
            "contatos": "sac@frescatto.com"
        }"#;
        let r = ExtractedRecord::from_json_str(json).unwrap();
        assert_eq!(r.nome_tecnico.as_deref(), Some("Filé de Tilápia"));
        assert_eq!(r.tabela_nutricional.len(), 1);
        assert_eq!(r.tabela_nutricional[0].qtd, "120mg");
    }

    #[test]
    fn missing_and_null_keys_become_none() {
        let r = ExtractedRecord::from_json_str(r#"{"marca": null}"#).unwrap();
        assert!(r.nome_tecnico.is_none());
        assert!(r.marca.is_none());
        assert!(r.tabela_nutricional.is_empty());
    }

    #[test]
    fn explicit_null_table_becomes_empty() {
        let r = ExtractedRecord::from_json_str(r#"{"tabela_nutricional": null}"#).unwrap();
        assert!(r.tabela_nutricional.is_empty());
    }

    #[test]
    fn null_cells_become_empty_strings() {
        let r = ExtractedRecord::from_json_str(
            r#"{"tabela_nutricional": [{"item": "Sódio", "qtd": null, "vd": null}]}"#,
        )
        .unwrap();
        assert_eq!(r.tabela_nutricional[0].qtd, "");
    }

    #[test]
    fn partial_row_gets_empty_cells() {
        let r = ExtractedRecord::from_json_str(
            r#"{"tabela_nutricional": [{"item": "Proteínas"}]}"#,
        )
        .unwrap();
        assert_eq!(r.tabela_nutricional[0].item, "Proteínas");
        assert_eq!(r.tabela_nutricional[0].qtd, "");
        assert_eq!(r.tabela_nutricional[0].vd, "");
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let r = ExtractedRecord::from_json_str(r#"{"marca": "X", "extra": 1}"#).unwrap();
        assert_eq!(r.marca.as_deref(), Some("X"));
    }

    #[test]
    fn non_json_reply_is_malformed() {
        let err = ExtractedRecord::from_json_str("Sorry, I cannot read the photo.");
        assert!(matches!(err, Err(FichaError::MalformedReply { .. })));
    }

    #[test]
    fn json_array_reply_is_malformed() {
        let err = ExtractedRecord::from_json_str("[1, 2, 3]");
        assert!(matches!(err, Err(FichaError::MalformedReply { .. })));
    }
}
