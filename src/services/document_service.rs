// src/services/document_service.rs

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use chrono::{Datelike, Local};
use genpdf::{
    elements,
    fonts::{FontData, FontFamily},
    style, Element,
};
use image::Luma;
use qrcode::QrCode;
use sqlx::PgPool;
use validator::{ValidationError, ValidationErrors};

use crate::{
    common::error::AppError,
    db::{term_repo::NewIssuedTerm, AssetRepository, TermRepository},
    models::{
        auth::User,
        term::{
            format_term_date, format_term_number, is_safe_template_file, render_template, IssuedTerm,
            RenderTermPayload, RenderedTerm, TermTemplate,
        },
    },
};

const MANIFEST_FILE: &str = "manifest.json";
const FONT_FAMILY: &str = "Roboto";

/// PDF pronto para download.
pub struct TermPdf {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone)]
pub struct DocumentService {
    repo: TermRepository,
    assets: AssetRepository,
    pool: PgPool,
    templates_dir: PathBuf,
    fonts_dir: PathBuf,
}

impl DocumentService {
    pub fn new(
        repo: TermRepository,
        assets: AssetRepository,
        pool: PgPool,
        templates_dir: PathBuf,
        fonts_dir: PathBuf,
    ) -> Self {
        Self { repo, assets, pool, templates_dir, fonts_dir }
    }

    /// Modelos listados no manifest.json; relido a cada chamada para aceitar novos arquivos sem reinício.
    pub async fn list_templates(&self) -> Result<Vec<TermTemplate>, AppError> {
        let path = self.templates_dir.join(MANIFEST_FILE);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "Manifesto de modelos não encontrado.");
                return Ok(Vec::new());
            }
            Err(e) => return Err(anyhow::anyhow!("Falha ao ler {}: {}", path.display(), e).into()),
        };

        let templates: Vec<TermTemplate> = serde_json::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("Manifesto de modelos inválido: {}", e))?;
        Ok(templates)
    }

    pub async fn list_issued(&self, serial_number: Option<&str>) -> Result<Vec<IssuedTerm>, AppError> {
        let serial = serial_number.map(str::trim).filter(|s| !s.is_empty());
        self.repo.list_issued(serial).await
    }

    async fn load_template(&self, template_id: &str) -> Result<(TermTemplate, String), AppError> {
        let template = self
            .list_templates()
            .await?
            .into_iter()
            .find(|t| t.id == template_id)
            .ok_or_else(|| AppError::TemplateNotFound(template_id.to_string()))?;

        if !is_safe_template_file(&template.file) {
            tracing::warn!(template = %template.id, file = %template.file, "Arquivo de modelo fora da pasta.");
            return Err(AppError::TemplateNotFound(template.id));
        }

        let content = tokio::fs::read_to_string(self.templates_dir.join(&template.file))
            .await
            .map_err(|_| AppError::TemplateNotFound(template.id.clone()))?;
        Ok((template, content))
    }

    /// Substitui os campos, aloca o número do termo e registra a emissão.
    pub async fn render(&self, user: &User, payload: &RenderTermPayload) -> Result<RenderedTerm, AppError> {
        let (template, content) = self.load_template(payload.template_id.trim()).await?;

        let asset = match payload.asset_id {
            Some(id) => Some(
                self.assets
                    .find(id)
                    .await?
                    .ok_or_else(|| AppError::ResourceNotFound("asset".into()))?,
            ),
            None => None,
        };

        let pick = |given: &Option<String>, fallback: Option<&String>| -> Option<String> {
            clean(given.as_deref()).or(fallback.map(String::as_str)).map(str::to_string)
        };
        let serial_number = pick(&payload.serial_number, asset.as_ref().map(|a| &a.serial_number));
        let holder_name = pick(&payload.holder_name, asset.as_ref().and_then(|a| a.holder_name.as_ref()));
        let holder_registration =
            pick(&payload.holder_registration, asset.as_ref().and_then(|a| a.holder_registration.as_ref()));

        let (serial_number, holder_name) = require_issue_fields(serial_number, holder_name)?;

        let date = payload.date.unwrap_or_else(|| Local::now().date_naive());

        let mut tx = self.pool.begin().await?;
        let sequence = self.repo.next_term_number(&mut *tx).await?;
        let issued = self
            .repo
            .record_issue(
                &mut *tx,
                NewIssuedTerm {
                    term_number: sequence,
                    template_id: &template.id,
                    asset_id: asset.as_ref().map(|a| a.id),
                    holder_name: &holder_name,
                    holder_registration: holder_registration.as_deref(),
                    serial_number: &serial_number,
                    issued_by: user.id,
                },
            )
            .await?;
        tx.commit().await?;

        let term_number = format_term_number(sequence, date.year());

        let mut values: HashMap<&str, String> = HashMap::from([
            ("NOME", holder_name),
            ("SERIAL", serial_number),
            ("DATA", format_term_date(date)),
            ("NUM_TERMO", term_number.clone()),
        ]);
        if let Some(registration) = holder_registration {
            values.insert("MATRICULA", registration);
        }

        tracing::info!(term = %term_number, template = %template.id, "📄 Termo emitido.");

        Ok(RenderedTerm {
            term_number,
            template_name: template.name,
            content: render_template(&content, &values),
            issued,
        })
    }

    /// Mesma emissão, exportada em PDF com QR code do número de série.
    pub async fn pdf(&self, user: &User, payload: &RenderTermPayload) -> Result<TermPdf, AppError> {
        // A família inteira (regular, negrito, itálico) é carregada antes de consumir um número de termo
        let fonts_dir = self.fonts_dir.clone();
        let font_family = tokio::task::spawn_blocking(move || load_font_family(&fonts_dir))
            .await
            .map_err(|e| anyhow::anyhow!("Falha ao carregar as fontes: {}", e))??;

        let rendered = self.render(user, payload).await?;
        let file_name = format!("termo_{}.pdf", rendered.term_number.replace('/', "-"));

        let bytes = tokio::task::spawn_blocking(move || build_pdf(font_family, &rendered))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na geração do PDF: {}", e))??;

        Ok(TermPdf { file_name, bytes })
    }
}

fn clean(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|t| !t.is_empty())
}

/// Serial e nome do portador são obrigatórios para emitir.
fn require_issue_fields(
    serial_number: Option<String>,
    holder_name: Option<String>,
) -> Result<(String, String), AppError> {
    match (serial_number, holder_name) {
        (Some(serial), Some(holder)) => Ok((serial, holder)),
        (serial, holder) => {
            let mut errors = ValidationErrors::new();
            if serial.is_none() {
                errors.add("serialNumber", ValidationError::new("required"));
            }
            if holder.is_none() {
                errors.add("holderName", ValidationError::new("required"));
            }
            Err(AppError::ValidationError(errors))
        }
    }
}

fn load_font_family(fonts_dir: &Path) -> Result<FontFamily<FontData>, AppError> {
    genpdf::fonts::from_files(fonts_dir, FONT_FAMILY, None).map_err(|e| {
        tracing::warn!(dir = %fonts_dir.display(), error = %e, "Família de fontes incompleta.");
        AppError::FontNotFound(fonts_dir.display().to_string())
    })
}

fn build_pdf(font_family: FontFamily<FontData>, term: &RenderedTerm) -> Result<Vec<u8>, AppError> {
    let mut doc = genpdf::Document::new(font_family);
    doc.set_title(format!("Termo {}", term.term_number));
    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(10);
    doc.set_page_decorator(decorator);

    doc.push(elements::Paragraph::new(term.template_name.clone()).styled(style::Style::new().bold().with_font_size(16)));
    doc.push(
        elements::Paragraph::new(format!("Termo nº {}", term.term_number))
            .styled(style::Style::new().with_font_size(10)),
    );
    doc.push(elements::Break::new(1.5));

    for line in term.content.lines() {
        if line.trim().is_empty() {
            doc.push(elements::Break::new(1));
        } else {
            doc.push(elements::Paragraph::new(line.to_string()));
        }
    }

    doc.push(elements::Break::new(2));

    let code = QrCode::new(term.issued.serial_number.as_bytes())
        .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?;
    let image_buffer = code.render::<Luma<u8>>().build();
    let qr_image = elements::Image::from_dynamic_image(image::DynamicImage::ImageLuma8(image_buffer))
        .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?
        .with_scale(genpdf::Scale::new(0.5, 0.5));
    doc.push(qr_image);
    doc.push(
        elements::Paragraph::new(format!("Serial: {}", term.issued.serial_number))
            .styled(style::Style::new().italic().with_font_size(8)),
    );

    let mut buffer = Vec::new();
    doc.render(&mut buffer)
        .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_serial_and_holder_are_reported_together() {
        let Err(AppError::ValidationError(errors)) = require_issue_fields(None, None) else {
            panic!("esperava erro de validação");
        };
        let fields = errors.field_errors();
        assert!(fields.contains_key("serialNumber"));
        assert!(fields.contains_key("holderName"));
    }

    #[test]
    fn partial_font_family_is_rejected_before_issuing() {
        let dir = std::env::temp_dir().join(format!("gestao-ti-fontes-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        // Só a regular, e ainda por cima inválida: negrito e itálico faltam
        std::fs::write(dir.join(format!("{FONT_FAMILY}-Regular.ttf")), b"nao e uma fonte").unwrap();

        let result = load_font_family(&dir);
        std::fs::remove_dir_all(&dir).ok();

        assert!(matches!(result, Err(AppError::FontNotFound(_))));
    }

    #[test]
    fn missing_fonts_dir_is_reported_as_font_not_found() {
        let dir = std::env::temp_dir().join(format!("gestao-ti-sem-fontes-{}", uuid::Uuid::new_v4()));
        assert!(matches!(load_font_family(&dir), Err(AppError::FontNotFound(_))));
    }

    #[test]
    fn blank_values_fall_back_to_none() {
        assert_eq!(clean(Some("  ")), None);
        assert_eq!(clean(Some(" 5CG1 ")), Some("5CG1"));
    }
}
