// src/models/term.rs

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Entrada do manifest.json da pasta de modelos
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TermTemplate {
    #[schema(example = "entrega-notebook")]
    pub id: String,
    #[schema(example = "Termo de entrega de notebook")]
    pub name: String,
    #[serde(skip_serializing)]
    pub file: String,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssuedTerm {
    pub id: Uuid,
    pub term_number: i64,
    pub template_id: String,
    pub asset_id: Option<Uuid>,
    pub holder_name: String,
    pub holder_registration: Option<String>,
    pub serial_number: String,
    pub issued_by: Option<Uuid>,
    pub issued_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenderedTerm {
    #[schema(example = "00042/2026")]
    pub term_number: String,
    pub template_name: String,
    pub content: String,
    pub issued: IssuedTerm,
}

/// Pedido de emissão. Com `assetId`, serial e portador vêm do ativo quando omitidos.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenderTermPayload {
    #[validate(custom(function = "crate::common::validation::not_blank"))]
    pub template_id: String,
    pub asset_id: Option<Uuid>,
    pub serial_number: Option<String>,
    pub holder_name: Option<String>,
    pub holder_registration: Option<String>,
    // Padrão: hoje
    pub date: Option<NaiveDate>,
}

/// Nome de arquivo do manifesto só pode apontar para dentro da pasta de modelos.
pub fn is_safe_template_file(file: &str) -> bool {
    !file.is_empty() && !file.contains("..") && !file.contains('/') && !file.contains('\\')
}

/// Número do termo no formato `NNNNN/AAAA`.
pub fn format_term_number(sequence: i64, year: i32) -> String {
    format!("{:05}/{}", sequence, year)
}

pub fn format_term_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Substitui `{{CHAVE}}` pelos valores conhecidos; placeholders sem valor ficam como estão.
pub fn render_template(template: &str, values: &HashMap<&str, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];

        let Some(end) = after_open.find("}}") else {
            // "{{" sem fechamento: copia o resto literal
            out.push_str(&rest[start..]);
            return out;
        };

        let key = after_open[..end].trim();
        match values.get(key) {
            Some(value) => out.push_str(value),
            None => out.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after_open[end + 2..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values() -> HashMap<&'static str, String> {
        HashMap::from([
            ("NOME", "Maria Souza".to_string()),
            ("MATRICULA", "004512".to_string()),
            ("SERIAL", "5CG1234XYZ".to_string()),
        ])
    }

    #[test]
    fn known_placeholders_are_replaced() {
        let text = render_template("Eu, {{NOME}} ({{ MATRICULA }}), recebi o equipamento {{SERIAL}}.", &values());
        assert_eq!(text, "Eu, Maria Souza (004512), recebi o equipamento 5CG1234XYZ.");
    }

    #[test]
    fn unknown_placeholders_are_kept_verbatim() {
        let text = render_template("Setor: {{SETOR}} / {{NOME}}", &values());
        assert_eq!(text, "Setor: {{SETOR}} / Maria Souza");
    }

    #[test]
    fn unclosed_braces_are_left_untouched() {
        assert_eq!(render_template("Nome: {{NOME", &values()), "Nome: {{NOME");
    }

    #[test]
    fn term_number_is_zero_padded_with_year() {
        assert_eq!(format_term_number(42, 2026), "00042/2026");
        assert_eq!(format_term_number(123456, 2026), "123456/2026");
    }

    #[test]
    fn date_uses_brazilian_format() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(format_term_date(date), "07/03/2026");
    }

    #[test]
    fn template_files_cannot_escape_the_folder() {
        assert!(is_safe_template_file("entrega-notebook.txt"));
        assert!(!is_safe_template_file("../segredos.txt"));
        assert!(!is_safe_template_file("sub/termo.txt"));
        assert!(!is_safe_template_file(""));
    }
}
