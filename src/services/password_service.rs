// src/services/password_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::PasswordRepository,
    models::{
        auth::User,
        password::{PasswordEntry, PasswordFields},
    },
};

// O acesso de coordenador é garantido pelo extrator nas rotas
#[derive(Clone)]
pub struct PasswordService {
    repo: PasswordRepository,
}

impl PasswordService {
    pub fn new(repo: PasswordRepository) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> Result<Vec<PasswordEntry>, AppError> {
        self.repo.list().await
    }

    pub async fn create(&self, user: &User, fields: &PasswordFields) -> Result<PasswordEntry, AppError> {
        let entry = self.repo.create(user.id, &trimmed(fields)).await?;
        tracing::info!(entry = %entry.id, by = %user.id, "🔐 Senha cadastrada no cofre.");
        Ok(entry)
    }

    pub async fn update(&self, id: Uuid, fields: &PasswordFields) -> Result<PasswordEntry, AppError> {
        self.repo
            .update(id, &trimmed(fields))
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("password".into()))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete(id).await? {
            return Err(AppError::ResourceNotFound("password".into()));
        }
        Ok(())
    }
}

// A senha em si é gravada como veio: espaços podem fazer parte dela
fn trimmed(fields: &PasswordFields) -> PasswordFields {
    let opt = |v: &Option<String>| v.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);
    PasswordFields {
        title: fields.title.trim().to_string(),
        username: opt(&fields.username),
        secret: fields.secret.clone(),
        url: opt(&fields.url),
        notes: opt(&fields.notes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_is_kept_verbatim() {
        let fields = PasswordFields {
            title: " Firewall ".into(),
            username: Some("  ".into()),
            secret: " s3nh@ ".into(),
            url: None,
            notes: None,
        };
        let clean = trimmed(&fields);
        assert_eq!(clean.title, "Firewall");
        assert_eq!(clean.username, None);
        assert_eq!(clean.secret, " s3nh@ ");
    }
}
