pub mod accounts;
pub mod auth;
pub mod comms;
pub mod contacts;
pub mod envelope;
pub mod middleware;
pub mod state;
pub mod templates;
pub mod upload;
pub mod vcard;

#[cfg(test)]
pub mod testutil;

use utoipa::OpenApi;

pub use middleware::{require_admin, require_auth};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::signup_handler,
        auth::login_handler,
        auth::logout_handler,
        auth::check_slug_handler,
        auth::public_profile_handler,
        contacts::submit_handler,
        contacts::submit_for_slug_handler,
        contacts::list_contacts_handler,
        contacts::get_contact_handler,
        contacts::update_contact_handler,
        contacts::update_status_handler,
        contacts::delete_contact_handler,
        contacts::list_communications_handler,
        contacts::my_contacts_handler,
        contacts::delete_me_handler,
        accounts::get_me_handler,
        accounts::update_me_handler,
        accounts::list_users_handler,
        accounts::user_contacts_handler,
        comms::send_sms_handler,
        comms::send_email_handler,
        templates::list_templates_handler,
        upload::upload_photo_handler,
        upload::serve_upload_handler,
        vcard::owner_vcard_handler,
        vcard::user_vcard_handler,
        vcard::contact_vcard_handler,
    ),
    components(
        schemas(
            auth::SignupRequest,
            auth::LoginRequest,
            auth::AuthResponse,
            auth::SlugCheckResponse,
            auth::PublicProfile,
            contacts::SubmitContactRequest,
            contacts::UpdateContactRequest,
            contacts::UpdateStatusRequest,
            comms::SendMessageRequest,
            accounts::UpdateProfileRequest,
        )
    ),
    tags(
        (name = "Cardex API", description = "Digital business card exchange and follow-up API.")
    )
)]
pub struct ApiDoc;
