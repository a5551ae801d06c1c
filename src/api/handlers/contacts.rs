use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    api::{
        response::{ContactBody, ContactListBody, EmptyEnvelope, Envelope, ErrorEnvelope, FailEnvelope},
        upload::{ContactForm, ContactMultipart},
    },
    error::{AppError, AppResult},
    models::{parse_flag, ContactFilter, PageRequest},
    services::contacts::ContactsService,
    AppState,
};

fn contacts_service(state: AppState) -> ContactsService {
    ContactsService::new(state.contacts, state.avatars)
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListContactsQuery {
    /// Only favorites (`true`/`1`) or only non-favorites (`false`/`0`)
    pub favorite: Option<String>,
    /// Case-insensitive substring of the contact name
    pub name: Option<String>,
    /// Page number, starting at 1
    #[param(minimum = 1, default = 1)]
    pub page: Option<u32>,
    /// Page size
    #[param(minimum = 1, maximum = 100, default = 5)]
    pub limit: Option<u32>,
}

impl ListContactsQuery {
    fn filter(&self) -> AppResult<ContactFilter> {
        let favorite = match self.favorite.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_flag(raw).ok_or_else(|| {
                AppError::validation("Favorite must be a boolean (true/false or 1/0)")
            })?),
        };
        let name = self
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(String::from);

        Ok(ContactFilter { favorite, name })
    }
}

#[utoipa::path(
    get,
    tag = "contacts",
    path = "/api/v1/contacts",
    params(ListContactsQuery),
    responses(
        (status = 200, body = Envelope<ContactListBody>),
        (status = 400, body = FailEnvelope),
        (status = 500, body = ErrorEnvelope),
    )
)]
pub async fn get_contacts(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<ListContactsQuery>, AppError>,
) -> AppResult<Json<Envelope<ContactListBody>>> {
    let filter = query.filter()?;
    let page = PageRequest::new(query.page, query.limit)?;

    let (contacts, metadata) = contacts_service(state).list_contacts(&filter, page).await?;

    Ok(Json(Envelope::success(ContactListBody { contacts, metadata })))
}

#[utoipa::path(
    post,
    tag = "contacts",
    path = "/api/v1/contacts",
    request_body(content = ContactMultipart, content_type = "multipart/form-data"),
    responses(
        (status = 201, body = Envelope<ContactBody>),
        (status = 400, body = FailEnvelope),
        (status = 500, body = ErrorEnvelope),
    )
)]
pub async fn create_contact(
    State(state): State<AppState>,
    form: ContactForm,
) -> AppResult<(StatusCode, Json<Envelope<ContactBody>>)> {
    let contact = contacts_service(state)
        .create_contact(form.input, form.avatar)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::success(ContactBody { contact })),
    ))
}

#[utoipa::path(
    get,
    tag = "contacts",
    path = "/api/v1/contacts/{id}",
    params(("id" = i64, Path, description = "Contact id")),
    responses(
        (status = 200, body = Envelope<ContactBody>),
        (status = 400, body = FailEnvelope),
        (status = 404, body = FailEnvelope),
        (status = 500, body = ErrorEnvelope),
    )
)]
pub async fn get_contact(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> AppResult<Json<Envelope<ContactBody>>> {
    let contact = contacts_service(state).get_contact(id).await?;

    Ok(Json(Envelope::success(ContactBody { contact })))
}

#[utoipa::path(
    put,
    tag = "contacts",
    path = "/api/v1/contacts/{id}",
    params(("id" = i64, Path, description = "Contact id")),
    request_body(content = ContactMultipart, content_type = "multipart/form-data"),
    responses(
        (status = 200, body = Envelope<ContactBody>),
        (status = 400, body = FailEnvelope),
        (status = 404, body = FailEnvelope),
        (status = 500, body = ErrorEnvelope),
    )
)]
pub async fn update_contact(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
    form: ContactForm,
) -> AppResult<Json<Envelope<ContactBody>>> {
    let contact = contacts_service(state)
        .update_contact(id, form.input, form.avatar)
        .await?;

    Ok(Json(Envelope::success(ContactBody { contact })))
}

#[utoipa::path(
    delete,
    tag = "contacts",
    path = "/api/v1/contacts/{id}",
    params(("id" = i64, Path, description = "Contact id")),
    responses(
        (status = 200, body = EmptyEnvelope),
        (status = 400, body = FailEnvelope),
        (status = 404, body = FailEnvelope),
        (status = 500, body = ErrorEnvelope),
    )
)]
pub async fn delete_contact(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> AppResult<Json<EmptyEnvelope>> {
    contacts_service(state).delete_contact(id).await?;

    Ok(Json(EmptyEnvelope::success()))
}

#[utoipa::path(
    delete,
    tag = "contacts",
    path = "/api/v1/contacts",
    responses(
        (status = 200, body = EmptyEnvelope),
        (status = 500, body = ErrorEnvelope),
    )
)]
pub async fn delete_all_contacts(State(state): State<AppState>) -> AppResult<Json<EmptyEnvelope>> {
    contacts_service(state).delete_all_contacts().await?;

    Ok(Json(EmptyEnvelope::success()))
}
