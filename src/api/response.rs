//! Uniform JSON envelope shared by every endpoint.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Contact, PaginationMetadata};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Fail,
    Error,
}

/// `{status: "success", data}`
#[derive(Debug, Serialize, ToSchema)]
pub struct Envelope<T> {
    pub status: ResponseStatus,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: ResponseStatus::Success,
            data,
        }
    }
}

/// `{status: "success", data: null}`
#[derive(Debug, Serialize, ToSchema)]
pub struct EmptyEnvelope {
    pub status: ResponseStatus,
    #[schema(value_type = Option<Object>)]
    pub data: Option<serde_json::Value>,
}

impl EmptyEnvelope {
    pub fn success() -> Self {
        Self {
            status: ResponseStatus::Success,
            data: None,
        }
    }
}

/// Client error: `{status: "fail", data: {message}}`
#[derive(Debug, Serialize, ToSchema)]
pub struct FailEnvelope {
    pub status: ResponseStatus,
    pub data: FailData,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FailData {
    pub message: String,
}

impl FailEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Fail,
            data: FailData {
                message: message.into(),
            },
        }
    }
}

/// Server fault: `{status: "error", message}`
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorEnvelope {
    pub status: ResponseStatus,
    pub message: String,
}

impl ErrorEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ContactBody {
    pub contact: Contact,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ContactListBody {
    pub contacts: Vec<Contact>,
    pub metadata: PaginationMetadata,
}
