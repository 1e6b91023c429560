//! The fixed extraction instruction sent alongside the packaging photos.
//!
//! Centralising the prompt here serves two purposes:
//!
//! 1. **Single source of truth** — the JSON schema the model is asked to
//!    return must match [`crate::record::ExtractedRecord`] field for field;
//!    keeping it in one constant makes drift obvious in review.
//!
//! 2. **Testability** — unit tests can assert the schema keys appear in the
//!    prompt without spinning up a real model.

/// Instruction describing the reverse-engineering task and the exact JSON
/// object to return.
///
/// The field names are the wire format and must not be reworded: the parser
/// in [`crate::record`] expects exactly these keys.
pub const EXTRACTION_PROMPT: &str = r#"Analyse these photos of a food product package.
Goal: reverse-engineer the label into a technical registration record.

Extract and return ONLY a JSON object with these exact fields:
{
    "nome_tecnico": "Exact product name",
    "marca": "Commercial brand",
    "peso_liquido": "e.g. 500g",
    "fabricante": "Company or manufacturer name",
    "tabela_nutricional": [
         {"item": "Valor Energético", "qtd": "value", "vd": "%"},
         {"item": "Carboidratos", "qtd": "value", "vd": "%"},
         {"item": "Proteínas", "qtd": "value", "vd": "%"},
         {"item": "Sódio", "qtd": "value", "vd": "%"}
    ],
    "ingredientes_texto": "Full ingredient list text",
    "conservacao": "e.g. Keep frozen at -12C",
    "contatos": "Customer service, email or phone"
}
If a photo is unclear, infer the value from context or leave it null."#;
