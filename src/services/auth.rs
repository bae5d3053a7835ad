// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{AuthResponse, Claims, ResetLinkResponse, User, UserRole},
};

const TOKEN_LIFETIME_DAYS: i64 = 7;
const RESET_TOKEN_LIFETIME_HOURS: i64 = 1;

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
    site_url: String,
    pool: PgPool,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String, site_url: String, pool: PgPool) -> Self {
        Self { user_repo, jwt_secret, site_url, pool }
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<AuthResponse, AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        let token = self.create_token(user.id)?;
        Ok(AuthResponse { token, user })
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        // Usuário excluído depois da emissão do token não passa
        self.user_repo
            .find_by_id(token_data.claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)
    }

    fn create_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + Duration::days(TOKEN_LIFETIME_DAYS);

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }

    /// Cria o primeiro coordenador quando a base ainda não tem usuários.
    pub async fn bootstrap_coordinator(&self, email: &str, password: &str) -> Result<Option<User>, AppError> {
        if self.user_repo.count().await? > 0 {
            return Ok(None);
        }

        let hashed = hash_password(password).await?;
        let user = self
            .user_repo
            .create_user(&self.pool, email, "Administrador", None, UserRole::Coordenador, &hashed)
            .await?;

        tracing::info!(email = %user.email, "👤 Coordenador inicial criado.");
        Ok(Some(user))
    }

    pub async fn change_password(&self, user: &User, current: &str, new_password: &str) -> Result<(), AppError> {
        if !verify_password(current, &user.password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }
        let hashed = hash_password(new_password).await?;
        self.user_repo.update_password(&self.pool, user.id, &hashed).await
    }

    // ---
    // Recuperação de senha
    // ---

    /// Pedido feito pelo próprio usuário. Nunca revela se o e-mail existe.
    pub async fn request_password_reset(&self, email: &str) -> Result<(), AppError> {
        match self.user_repo.find_by_email(email).await? {
            Some(user) => {
                let link = self.issue_reset_link(user.id).await?;
                // Sem serviço de e-mail: o link fica no log para o suporte repassar
                tracing::info!(user_id = %user.id, link = %link.reset_link, "🔑 Link de recuperação gerado.");
            }
            None => tracing::debug!("Recuperação pedida para e-mail inexistente."),
        }
        Ok(())
    }

    /// Gera um token de uso único; só o hash vai para o banco.
    pub async fn issue_reset_link(&self, user_id: Uuid) -> Result<ResetLinkResponse, AppError> {
        let token = generate_reset_token();
        let expires_at = reset_token_expiry(Utc::now());

        self.user_repo
            .insert_reset_token(user_id, &hash_reset_token(&token), expires_at)
            .await?;

        Ok(ResetLinkResponse {
            reset_link: reset_link(&self.site_url, &token),
            expires_at,
        })
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AppError> {
        let hashed = hash_password(new_password).await?;

        let mut tx = self.pool.begin().await?;

        let user_id = self
            .user_repo
            .consume_reset_token(&mut *tx, &hash_reset_token(token))
            .await?
            .ok_or(AppError::InvalidResetToken)?;

        self.user_repo.update_password(&mut *tx, user_id, &hashed).await?;

        tx.commit().await?;
        Ok(())
    }
}

// O bcrypt é caro: roda fora do executor assíncrono
pub(crate) async fn hash_password(password: &str) -> Result<String, AppError> {
    let password = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password = password.to_owned();
    let password_hash = password_hash.to_owned();
    let valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
    Ok(valid)
}

fn generate_reset_token() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

pub(crate) fn hash_reset_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

pub(crate) fn reset_token_expiry(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::hours(RESET_TOKEN_LIFETIME_HOURS)
}

pub(crate) fn reset_link(site_url: &str, token: &str) -> String {
    format!("{}/reset-password?token={}", site_url, token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_tokens_are_stored_as_sha256_hex() {
        let hashed = hash_reset_token("abc");
        assert_eq!(hashed, "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad");
    }

    #[test]
    fn reset_tokens_are_long_and_unique() {
        let (a, b) = (generate_reset_token(), generate_reset_token());
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
    }

    #[test]
    fn reset_link_points_to_the_frontend_page() {
        assert_eq!(
            reset_link("https://ti.empresa.com.br", "tok123"),
            "https://ti.empresa.com.br/reset-password?token=tok123"
        );
    }

    #[test]
    fn reset_tokens_expire_after_one_hour() {
        let now = Utc::now();
        assert_eq!(reset_token_expiry(now) - now, Duration::hours(1));
    }

    #[tokio::test]
    async fn password_hash_round_trip() {
        let hashed = hash_password("senha-forte").await.unwrap();
        assert!(verify_password("senha-forte", &hashed).await.unwrap());
        assert!(!verify_password("outra", &hashed).await.unwrap());
    }
}
