use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::controller::{Notice, PROFILE_ROUTE, PageView, ProfileController};
use crate::edit::{EditRequest, PermissionEditRequest};
use crate::error::ProfileError;
use crate::local::LocalCache;
use crate::render::ProfilePage;
use crate::store::{JsonFileApi, init_database};

/// Controller and page of the single profile being browsed
pub struct ProfileSession {
    pub controller: ProfileController<JsonFileApi>,
    pub page: ProfilePage,
}

/// Shared server state
///
/// The async mutex is held across collaborator calls, so loads, edits and
/// saves never interleave.
pub struct AppState {
    session: Mutex<ProfileSession>,
}

impl AppState {
    pub fn new(controller: ProfileController<JsonFileApi>) -> Result<Self, ProfileError> {
        Ok(AppState {
            session: Mutex::new(ProfileSession {
                controller,
                page: ProfilePage::new()?,
            }),
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileQuery {
    github_id: Option<String>,
    edit: Option<bool>,
    code: Option<String>,
}

#[derive(Serialize)]
struct ActionResponse {
    status: String,
    message: Option<String>,
}

pub fn router(state: Arc<AppState>, static_dir: &Path) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::to(PROFILE_ROUTE) }))
        .route(PROFILE_ROUTE, get(serve_profile))
        .route("/api/profile", get(get_profile_state))
        .route("/api/profile/edit", post(edit_profile))
        .route("/api/profile/permissions", post(edit_permission))
        .route("/api/profile/save", post(save_profile))
        .route("/api/profile/resend-email", post(resend_email))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    init_database(&config.database_path, &config.current_github_id)?;
    let cache = LocalCache::load(&config.local_cache_path);
    let api = JsonFileApi::new(config.database_path.clone(), &config.current_github_id);
    let state = Arc::new(AppState::new(ProfileController::new(api, &cache))?);

    let app = router(state, &config.static_dir);

    let listener = TcpListener::bind(config.bind_addr.as_str()).await?;
    info!("Listening on http://{}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn serve_profile(
    Query(params): Query<ProfileQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let mut session = state.session.lock().await;
    let ProfileSession { controller, page } = &mut *session;
    let target = params.github_id.as_deref();

    if controller.record().is_none() || controller.target_github_id() != target {
        // the page renders the access-denied view on failure
        if let Err(e) = controller.load(target).await {
            debug!("Serving access-denied page: {}", e);
        }
    }

    if params.code.is_some() && controller.view() == PageView::Ready {
        match controller.authorize_discord().await {
            Ok(Some(route)) => return Redirect::to(route).into_response(),
            Ok(None) => {}
            Err(e) => warn!("Discord authorization skipped: {}", e),
        }
    }

    let editing = controller.is_profile_owner() && params.edit.unwrap_or(false);
    controller.set_editing_mode(editing);

    let status = match controller.view() {
        PageView::AccessDenied => StatusCode::FORBIDDEN,
        _ => StatusCode::OK,
    };

    match page.render(controller) {
        Ok(html) => {
            controller.clear_notice();
            (status, Html(html)).into_response()
        }
        Err(e) => error_response(&e),
    }
}

async fn get_profile_state(State(state): State<Arc<AppState>>) -> Response {
    let session = state.session.lock().await;
    Json(session.controller.state()).into_response()
}

async fn edit_profile(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<EditRequest>,
) -> Response {
    let mut session = state.session.lock().await;
    match session.controller.apply_edit_request(&payload) {
        Ok(_) => Json(session.controller.state()).into_response(),
        Err(e) => error_response(&e),
    }
}

async fn edit_permission(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PermissionEditRequest>,
) -> Response {
    let mut session = state.session.lock().await;
    match session
        .controller
        .apply_permission_edit(payload.checked, &payload.edit)
    {
        Ok(_) => Json(session.controller.state()).into_response(),
        Err(e) => error_response(&e),
    }
}

async fn save_profile(State(state): State<Arc<AppState>>) -> Response {
    let mut session = state.session.lock().await;
    match session.controller.save().await {
        Ok(()) => Json(ActionResponse {
            status: "ok".to_string(),
            message: Some(Notice::Saved.message().to_string()),
        })
        .into_response(),
        Err(e) => error_response(&e),
    }
}

async fn resend_email(State(state): State<Arc<AppState>>) -> Response {
    let mut session = state.session.lock().await;
    match session.controller.resend_email_confirmation().await {
        Ok(()) => Json(ActionResponse {
            status: "ok".to_string(),
            message: Some(Notice::EmailConfirmationSent.message().to_string()),
        })
        .into_response(),
        Err(e) => error_response(&e),
    }
}

fn error_response(e: &ProfileError) -> Response {
    let status = match e {
        ProfileError::NotLoaded => StatusCode::CONFLICT,
        ProfileError::UnknownPath(_)
        | ProfileError::InvalidValue { .. }
        | ProfileError::IndexOutOfRange { .. }
        | ProfileError::UnknownPermission(_)
        | ProfileError::UnknownRole { .. } => StatusCode::BAD_REQUEST,
        ProfileError::AccessDenied(_) | ProfileError::NotOwner => StatusCode::FORBIDDEN,
        ProfileError::SaveFailed(_) | ProfileError::ActionFailed(_) => StatusCode::BAD_GATEWAY,
        ProfileError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    // collaborator details stay in the log
    let message = match e {
        ProfileError::SaveFailed(_) => Notice::SaveFailed.message().to_string(),
        ProfileError::ActionFailed(_) => Notice::EmailConfirmationFailed.message().to_string(),
        other => other.to_string(),
    };

    (
        status,
        Json(ActionResponse {
            status: "error".to_string(),
            message: Some(message),
        }),
    )
        .into_response()
}

#[cfg(all(test, feature = "web"))]
mod tests {
    use super::*;
    use crate::profile::{DiscordInfo, IS_PROFILE_VISIBLE, Role};
    use crate::store::ProfileDatabase;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use serde_json::json;
    use std::fs;
    use tempfile::{TempDir, tempdir};
    use tower::ServiceExt;

    /// Database with alex-dev signed in, a public `bob` and a private `carol`
    fn test_state(link_discord: bool) -> (TempDir, Arc<AppState>) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("profiles.json");
        init_database(&path, "alex-dev").unwrap();

        let api = JsonFileApi::new(&path, "alex-dev");
        let mut database: ProfileDatabase = api.read_database().unwrap();
        let owner = database.profiles["alex-dev"].clone();
        for (github_id, public) in [("bob", true), ("carol", false)] {
            let mut profile = owner.clone();
            if let Some(info) = profile.general_info.as_mut() {
                info.github_id = github_id.to_string();
                info.name = github_id.to_uppercase();
            }
            if let Some(settings) = profile.permissions_settings.as_mut() {
                settings
                    .entry(IS_PROFILE_VISIBLE.to_string())
                    .or_default()
                    .insert(Role::All, public);
            }
            database.profiles.insert(github_id.to_string(), profile);
        }
        if link_discord {
            database.discord_links.insert(
                "alex-dev".to_string(),
                DiscordInfo {
                    id: "4242".to_string(),
                    username: "alex".to_string(),
                    discriminator: "0001".to_string(),
                },
            );
        }
        fs::write(&path, serde_json::to_string_pretty(&database).unwrap()).unwrap();

        let controller = ProfileController::new(api, &LocalCache::default());
        let state = Arc::new(AppState::new(controller).unwrap());
        (dir, state)
    }

    async fn send(state: &Arc<AppState>, dir: &TempDir, request: Request<Body>) -> Response {
        router(state.clone(), dir.path())
            .oneshot(request)
            .await
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn root_redirects_to_profile() {
        let (dir, state) = test_state(false);
        let response = send(&state, &dir, get_request("/")).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], PROFILE_ROUTE);
    }

    #[tokio::test]
    async fn owner_gets_edit_link_and_can_save() {
        let (dir, state) = test_state(false);

        let response = send(&state, &dir, get_request("/profile")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("/profile?edit=true"));

        let edit = json!({ "path": "generalInfo.aboutMyself", "value": "Rustacean" });
        let response = send(&state, &dir, post_json("/api/profile/edit", edit)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let state_json: serde_json::Value =
            serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(state_json["isProfileOwner"], true);

        let response = send(&state, &dir, post_json("/api/profile/save", json!({}))).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn private_profile_is_forbidden() {
        let (dir, state) = test_state(false);
        let response = send(&state, &dir, get_request("/profile?githubId=carol")).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(body_text(response).await.contains("Access denied"));
    }

    #[tokio::test]
    async fn visitor_cannot_edit_or_save() {
        let (dir, state) = test_state(false);

        let response = send(&state, &dir, get_request("/profile?githubId=bob&edit=true")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("BOB"));
        assert!(!html.contains("?edit"));
        assert!(!html.contains("data-edit-path"));

        let edit = json!({ "path": "generalInfo.name", "value": "Bobby" });
        let response = send(&state, &dir, post_json("/api/profile/edit", edit)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = send(&state, &dir, post_json("/api/profile/save", json!({}))).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = send(&state, &dir, post_json("/api/profile/resend-email", json!({}))).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let database = state.session.lock().await.controller.api().read_database().unwrap();
        assert_eq!(database.profiles["alex-dev"].github_id(), Some("alex-dev"));
        assert_eq!(database.profiles["bob"].general_info.as_ref().unwrap().name, "BOB");
    }

    #[tokio::test]
    async fn discord_callback_links_and_redirects() {
        let (dir, state) = test_state(true);

        let response = send(&state, &dir, get_request("/profile?code=discord")).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], PROFILE_ROUTE);

        let response = send(&state, &dir, get_request("/profile")).await;
        assert!(body_text(response).await.contains("alex#0001"));
    }

    #[tokio::test]
    async fn discord_callback_without_pending_link_renders_page() {
        let (dir, state) = test_state(false);
        let response = send(&state, &dir, get_request("/profile?code=discord")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Link discord account"));
    }
}
