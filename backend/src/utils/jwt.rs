use anyhow::anyhow;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub email: String,
    pub role: String,
    pub exp: i64,    // expiration time
    pub iat: i64,    // issued at
    pub jti: String, // JWT ID
}

impl Claims {
    pub fn new(user_id: String, email: String, role: String, expiration_hours: u64) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(expiration_hours as i64);

        Self {
            sub: user_id,
            email,
            role,
            exp: exp.timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }
}

pub fn create_access_token(
    user_id: String,
    email: String,
    role: String,
    secret: &str,
    expiration_hours: u64,
) -> anyhow::Result<String> {
    let claims = Claims::new(user_id, email, role, expiration_hours);
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?;

    Ok(token)
}

pub fn verify_access_token(token: &str, secret: &str) -> anyhow::Result<Claims> {
    let validation = Validation::default();
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &validation,
    )?;

    Ok(token_data.claims)
}

/// A freshly minted refresh token. Only `token_hash` is stored server-side;
/// the cleartext secret leaves this struct once, through [`encoded`].
///
/// [`encoded`]: RefreshToken::encoded
pub struct RefreshToken {
    pub id: String,
    pub user_id: String,
    secret: String,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}

impl RefreshToken {
    /// Opaque client-side form: `base64url("{id}.{secret}")`.
    pub fn encoded(&self) -> String {
        URL_SAFE_NO_PAD.encode(format!("{}.{}", self.id, self.secret))
    }
}

pub fn create_refresh_token(
    user_id: String,
    expiration_days: u64,
) -> anyhow::Result<RefreshToken> {
    let secret = Uuid::new_v4().to_string();
    let token_hash = hash_refresh_token(&secret)?;
    let expires_at = Utc::now() + Duration::days(expiration_days as i64);

    Ok(RefreshToken {
        id: Uuid::new_v4().to_string(),
        user_id,
        secret,
        token_hash,
        expires_at,
    })
}

/// Splits an encoded refresh token back into `(id, secret)`.
pub fn decode_refresh_token(encoded: &str) -> anyhow::Result<(String, String)> {
    let bytes = URL_SAFE_NO_PAD
        .decode(encoded)
        .map_err(|_| anyhow!("Malformed refresh token"))?;
    let text = String::from_utf8(bytes).map_err(|_| anyhow!("Malformed refresh token"))?;
    let (id, secret) = text
        .split_once('.')
        .ok_or_else(|| anyhow!("Malformed refresh token"))?;
    if id.is_empty() || secret.is_empty() {
        return Err(anyhow!("Malformed refresh token"));
    }

    Ok((id.to_string(), secret.to_string()))
}

pub fn hash_refresh_token(token: &str) -> anyhow::Result<String> {
    use argon2::password_hash::{rand_core::OsRng, SaltString};
    use argon2::{Argon2, PasswordHasher};

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let token_hash = argon2
        .hash_password(token.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash refresh token: {}", e))?;

    Ok(token_hash.to_string())
}

pub fn verify_refresh_token(token: &str, hash: &str) -> anyhow::Result<bool> {
    use argon2::password_hash::PasswordHash;
    use argon2::{Argon2, PasswordVerifier};

    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| anyhow::anyhow!("Invalid refresh token hash: {}", e))?;

    let argon2 = Argon2::default();
    let result = argon2.verify_password(token.as_bytes(), &parsed_hash);

    match result {
        Ok(_) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(anyhow::anyhow!("Refresh token verification error: {}", e)),
    }
}
