//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{FsFileStore, PgStore, ResendEmailAdapter, TwilioSmsAdapter},
    config::Config,
    error::ApiError,
    pipeline::{NotifyConfig, SubmissionPipeline},
    web::{
        accounts::{
            get_me_handler, list_users_handler, update_me_handler, user_contacts_handler,
        },
        auth::{
            check_slug_handler, login_handler, logout_handler, public_profile_handler,
            signup_handler,
        },
        comms::{send_email_handler, send_sms_handler},
        contacts::{
            delete_contact_handler, delete_me_handler, get_contact_handler,
            list_communications_handler, list_contacts_handler, my_contacts_handler,
            submit_for_slug_handler, submit_handler, update_contact_handler,
            update_status_handler,
        },
        middleware::{require_admin, require_auth},
        state::AppState,
        templates::list_templates_handler,
        upload::{serve_upload_handler, upload_photo_handler},
        vcard::{contact_vcard_handler, owner_vcard_handler, user_vcard_handler},
        ApiDoc,
    },
};
use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use tower_http::cors::CorsLayer;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let store = Arc::new(PgStore::new(db_pool.clone()));
    info!("Running database migrations...");
    store.run_migrations().await.map_err(sqlx::Error::from)?;
    info!("Database migrations complete.");

    // --- 3. Initialize Service Adapters ---
    let http_client = reqwest::Client::new();
    let sms = Arc::new(TwilioSmsAdapter::new(
        http_client.clone(),
        config.twilio_account_sid.clone(),
        config.twilio_auth_token.clone(),
        config.twilio_phone_number.clone(),
    ));
    let email = Arc::new(ResendEmailAdapter::new(
        http_client,
        config.resend_api_key.clone(),
        config.resend_from_email.clone(),
    ));
    let files = Arc::new(FsFileStore::new(config.uploads_dir.clone()));

    // --- 4. Build the Pipeline and Shared AppState ---
    let pipeline = SubmissionPipeline::new(
        store.clone(),
        sms.clone(),
        email.clone(),
        files.clone(),
        NotifyConfig {
            app_url: config.app_url.clone(),
            admin_phone: config.admin_phone.clone(),
            welcome_pdf: config
                .welcome_pdf_path
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned()),
            default_sender: config.owner.clone(),
        },
    );

    let app_state = Arc::new(AppState {
        config: config.clone(),
        contacts: store.clone(),
        users: store,
        sms,
        email,
        files,
        pipeline,
    });

    let cors = CorsLayer::new()
        .allow_origin("http://localhost:3000".parse::<HeaderValue>().unwrap())
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 5. Create the Web Router ---
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/auth/signup", post(signup_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/logout", post(logout_handler))
        .route("/auth/check-slug/{slug}", get(check_slug_handler))
        .route("/u/{slug}", get(public_profile_handler))
        .route("/u/{slug}/submit", post(submit_for_slug_handler))
        .route("/u/{slug}/vcard", get(user_vcard_handler))
        .route("/contacts/submit", post(submit_handler))
        .route("/upload/photo", post(upload_photo_handler))
        .route("/uploads/{*path}", get(serve_upload_handler))
        .route("/vcard", get(owner_vcard_handler))
        .route("/templates", get(list_templates_handler));

    // Session-protected routes (logged-in card owners)
    let user_routes = Router::new()
        .route("/me/contacts", get(my_contacts_handler))
        .route(
            "/me",
            get(get_me_handler)
                .patch(update_me_handler)
                .delete(delete_me_handler),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    // Admin routes (Basic auth with the configured admin password)
    let admin_routes = Router::new()
        .route("/contacts", get(list_contacts_handler))
        .route(
            "/contacts/{id}",
            get(get_contact_handler)
                .patch(update_contact_handler)
                .delete(delete_contact_handler),
        )
        .route("/contacts/{id}/status", patch(update_status_handler))
        .route(
            "/contacts/{id}/communications",
            get(list_communications_handler),
        )
        .route("/contacts/{id}/vcard", get(contact_vcard_handler))
        .route("/users", get(list_users_handler))
        .route("/users/{id}/contacts", get(user_contacts_handler))
        .route("/communications/sms", post(send_sms_handler))
        .route("/communications/email", post(send_email_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_admin,
        ));

    // Combine API routes
    let api_router = Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .merge(admin_routes)
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
