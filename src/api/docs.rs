use utoipa::OpenApi;

use super::{
    handlers::{contacts, system},
    response::{ErrorEnvelope, FailEnvelope},
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Contacts API",
        description = "Manage contacts and their avatars",
    ),
    paths(
        system::liveness,
        contacts::get_contacts,
        contacts::create_contact,
        contacts::delete_all_contacts,
        contacts::get_contact,
        contacts::update_contact,
        contacts::delete_contact,
    ),
    components(schemas(FailEnvelope, ErrorEnvelope)),
    tags(
        (name = "contacts", description = "Contact management"),
        (name = "system", description = "Liveness"),
    )
)]
pub struct ApiDoc;
