// src/services/user_service.rs

use std::path::PathBuf;

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{CreateUserPayload, ResetLinkResponse, User, UserRole},
    services::auth::{hash_password, AuthService},
};

pub const MAX_AVATAR_BYTES: usize = 2 * 1024 * 1024;
const AVATAR_FOLDER: &str = "avatars";

#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    auth_service: AuthService,
    storage_dir: PathBuf,
    public_base_url: String,
    pool: PgPool,
}

impl UserService {
    pub fn new(
        user_repo: UserRepository,
        auth_service: AuthService,
        storage_dir: PathBuf,
        public_base_url: String,
        pool: PgPool,
    ) -> Self {
        Self { user_repo, auth_service, storage_dir, public_base_url, pool }
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.user_repo.list_all().await
    }

    pub async fn create_user(&self, payload: &CreateUserPayload) -> Result<User, AppError> {
        let hashed = hash_password(&payload.password).await?;
        self.user_repo
            .create_user(
                &self.pool,
                payload.email.trim(),
                payload.full_name.trim(),
                payload.registration.as_deref(),
                payload.role,
                &hashed,
            )
            .await
    }

    pub async fn update_role(&self, user_id: Uuid, role: UserRole) -> Result<User, AppError> {
        self.user_repo
            .update_role(user_id, role)
            .await?
            .ok_or(AppError::UserNotFound)
    }

    pub async fn delete_user(&self, actor: &User, user_id: Uuid) -> Result<(), AppError> {
        if actor.id == user_id {
            return Err(AppError::CannotDeleteSelf);
        }
        if !self.user_repo.delete(user_id).await? {
            return Err(AppError::UserNotFound);
        }
        tracing::info!(deleted = %user_id, by = %actor.id, "Usuário excluído.");
        Ok(())
    }

    /// Link de redefinição gerado pelo coordenador para repassar ao usuário.
    pub async fn reset_link_for(&self, user_id: Uuid) -> Result<ResetLinkResponse, AppError> {
        let user = self.user_repo.find_by_id(user_id).await?.ok_or(AppError::UserNotFound)?;
        let link = self.auth_service.issue_reset_link(user.id).await?;
        tracing::info!(user_id = %user.id, "🔑 Link de recuperação gerado por coordenador.");
        Ok(link)
    }

    /// Grava a imagem na pasta pública e guarda a URL no usuário.
    pub async fn upload_avatar(&self, user_id: Uuid, content_type: &str, bytes: &[u8]) -> Result<User, AppError> {
        let extension = avatar_extension(content_type)?;
        if bytes.len() > MAX_AVATAR_BYTES {
            return Err(AppError::PayloadTooLarge);
        }

        let folder = self.storage_dir.join(AVATAR_FOLDER);
        tokio::fs::create_dir_all(&folder)
            .await
            .map_err(|e| anyhow::anyhow!("Falha ao criar pasta de avatares: {}", e))?;

        // Nome novo a cada envio: evita cache antigo no navegador
        let file_name = format!("{}-{}.{}", user_id, Uuid::new_v4().simple(), extension);
        tokio::fs::write(folder.join(&file_name), bytes)
            .await
            .map_err(|e| anyhow::anyhow!("Falha ao gravar avatar: {}", e))?;

        let url = format!("{}/storage/{}/{}", self.public_base_url, AVATAR_FOLDER, file_name);
        self.user_repo
            .update_avatar(user_id, &url)
            .await?
            .ok_or(AppError::UserNotFound)
    }
}

/// Tipos de imagem aceitos como avatar.
pub fn avatar_extension(content_type: &str) -> Result<&'static str, AppError> {
    let mime = content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    match mime.as_str() {
        "image/png" => Ok("png"),
        "image/jpeg" | "image/jpg" => Ok("jpg"),
        "image/webp" => Ok("webp"),
        _ => Err(AppError::UnsupportedMediaType(mime)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_image_types_are_accepted() {
        assert_eq!(avatar_extension("image/png").unwrap(), "png");
        assert_eq!(avatar_extension("IMAGE/JPEG; charset=binary").unwrap(), "jpg");
        assert_eq!(avatar_extension("image/webp").unwrap(), "webp");
    }

    #[test]
    fn other_types_are_rejected() {
        assert!(matches!(
            avatar_extension("application/pdf"),
            Err(AppError::UnsupportedMediaType(m)) if m == "application/pdf"
        ));
    }
}
