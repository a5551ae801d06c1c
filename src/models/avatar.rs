use bytes::Bytes;

/// Multipart field carrying the avatar image.
pub const AVATAR_FIELD: &str = "avatarFile";

/// Accepted image types and the extension used when storing them.
pub const ALLOWED_AVATAR_TYPES: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/jpg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
];

pub fn avatar_extension(content_type: &str) -> Option<&'static str> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    ALLOWED_AVATAR_TYPES
        .iter()
        .find(|(mime, _)| *mime == essence)
        .map(|(_, ext)| *ext)
}

/// An avatar that passed type and size checks and is ready to be stored.
#[derive(Debug, Clone)]
pub struct AvatarUpload {
    pub content_type: String,
    pub extension: &'static str,
    pub data: Bytes,
}
