use actix_web::{
    Error as ActixError, FromRequest, HttpRequest, dev::Payload, error::ErrorUnauthorized,
};
use anyhow::{Result, anyhow};
use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::future::{Ready, ready};
use uuid::Uuid;

use crate::config::config;
use crate::database::models::{AuthResponse, CreateUserInput, LoginInput, User};
use crate::database::repositories::user as user_repo;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid, // user id
    pub email: String,
    pub exp: usize, // expiration time
}

impl Claims {
    pub fn user_id(&self) -> Uuid {
        self.sub
    }
}

impl FromRequest for Claims {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let auth_header = req.headers().get("Authorization");

        if let Some(auth_header) = auth_header {
            if let Ok(auth_str) = auth_header.to_str() {
                if let Some(token) = auth_str.strip_prefix("Bearer ") {
                    return match verify_token(token) {
                        Ok(claims) => ready(Ok(claims)),
                        Err(_) => ready(Err(ErrorUnauthorized("Invalid token"))),
                    };
                }
            }
        }

        ready(Err(ErrorUnauthorized(
            "Missing or invalid authorization header",
        )))
    }
}

pub async fn register(request: CreateUserInput) -> Result<AuthResponse> {
    if user_repo::email_exists(&request.email).await? {
        return Err(anyhow!("Email already exists"));
    }

    let password_hash = hash(&request.password, DEFAULT_COST)?;
    let user = User::new(request.email, password_hash, request.full_name);
    let user = user_repo::create_user(&user).await?;

    let token = generate_token(&user)?;

    Ok(AuthResponse {
        token,
        user: user.into(),
    })
}

pub async fn login(request: LoginInput) -> Result<AuthResponse> {
    let user = user_repo::find_by_email(&request.email)
        .await?
        .ok_or_else(|| anyhow!("Invalid email or password"))?;

    if !verify(&request.password, &user.password_hash)? {
        return Err(anyhow!("Invalid email or password"));
    }

    let token = generate_token(&user)?;

    Ok(AuthResponse {
        token,
        user: user.into(),
    })
}

pub fn generate_token(user: &User) -> Result<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::days(config().jwt_expiration_days))
        .ok_or_else(|| anyhow!("Token expiration out of range"))?
        .timestamp() as usize;

    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        exp: expiration,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config().jwt_secret.as_ref()),
    )?;

    Ok(token)
}

pub fn verify_token(token: &str) -> Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config().jwt_secret.as_ref()),
        &Validation::new(Algorithm::HS256),
    )?;

    Ok(token_data.claims)
}
