//! Request body decoding for contact writes, including the avatar upload.
//!
//! Multipart bodies may carry a single image under `avatarFile`. JSON and
//! URL-encoded bodies carry only the text fields.

use async_trait::async_trait;
use axum::{
    extract::{multipart::Field, FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    Form, Json,
};
use bytes::BytesMut;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::{avatar_extension, AvatarUpload, ContactInput, FlagValue, AVATAR_FIELD},
    AppState,
};

/// Decoded contact fields plus the optional validated avatar.
#[derive(Debug)]
pub struct ContactForm {
    pub input: ContactInput,
    pub avatar: Option<AvatarUpload>,
}

/// Multipart schema for the API documentation.
#[allow(dead_code)]
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactMultipart {
    name: Option<String>,
    email: Option<String>,
    address: Option<String>,
    phone: Option<String>,
    /// `true`/`false` or `1`/`0`
    favorite: Option<String>,
    /// JPEG, PNG, GIF or WebP image
    #[schema(value_type = Option<String>, format = Binary)]
    avatar_file: Option<Vec<u8>>,
}

#[async_trait]
impl FromRequest<AppState> for ContactForm {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state).await?;
            read_multipart(multipart, state.config.upload.max_avatar_bytes).await
        } else if content_type.starts_with("application/json") {
            let Json(input) = Json::<ContactInput>::from_request(req, state).await?;
            Ok(Self { input, avatar: None })
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(input) = Form::<ContactInput>::from_request(req, state).await?;
            Ok(Self { input, avatar: None })
        } else {
            Err(AppError::validation(
                "Request body must be multipart/form-data, JSON or URL-encoded",
            ))
        }
    }
}

async fn read_multipart(mut multipart: Multipart, max_bytes: usize) -> AppResult<ContactForm> {
    let mut input = ContactInput::default();
    let mut avatar = None;
    let mut avatar_seen = false;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        if name == AVATAR_FIELD {
            if avatar_seen {
                return Err(AppError::validation("Only one avatar file may be uploaded"));
            }
            avatar_seen = true;
            avatar = read_avatar(field, max_bytes).await?;
            continue;
        }

        if field.file_name().is_some() {
            return Err(AppError::validation(format!(
                "Unexpected file field: {}",
                name
            )));
        }

        let value = field.text().await?;
        match name.as_str() {
            "name" => input.name = Some(value),
            "email" => input.email = Some(value),
            "address" => input.address = Some(value),
            "phone" => input.phone = Some(value),
            "favorite" => input.favorite = Some(FlagValue::Text(value)),
            _ => {}
        }
    }

    Ok(ContactForm { input, avatar })
}

/// Reads the avatar part, enforcing type and size. A part with neither a file
/// name nor content is what browsers send for an empty file input.
async fn read_avatar(mut field: Field<'_>, max_bytes: usize) -> AppResult<Option<AvatarUpload>> {
    let file_name = field.file_name().unwrap_or_default().to_string();
    let content_type = field.content_type().unwrap_or_default().to_string();
    let extension = avatar_extension(&content_type);

    if extension.is_none() && !file_name.is_empty() {
        return Err(unsupported_type());
    }

    let mut data = BytesMut::new();
    while let Some(chunk) = field.chunk().await? {
        if data.len() + chunk.len() > max_bytes {
            return Err(AppError::validation(format!(
                "Avatar file must not exceed {} bytes",
                max_bytes
            )));
        }
        data.extend_from_slice(&chunk);
    }

    if data.is_empty() {
        if file_name.is_empty() {
            return Ok(None);
        }
        return Err(AppError::validation("Avatar file is empty"));
    }

    let extension = extension.ok_or_else(unsupported_type)?;
    tracing::debug!(
        "Accepted avatar {:?} ({}, {} bytes)",
        file_name,
        content_type,
        data.len()
    );

    Ok(Some(AvatarUpload {
        content_type,
        extension,
        data: data.freeze(),
    }))
}

fn unsupported_type() -> AppError {
    AppError::validation("Avatar must be a JPEG, PNG, GIF or WebP image")
}
