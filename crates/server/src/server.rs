use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use tower_http::cors::CorsLayer;

use std::sync::Arc;

use crate::{AuthUser, ServerError, TokenKeys, distribution, email, user};
use engine::Engine;
use mailer::Dispatcher;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub dispatcher: Arc<Dispatcher>,
    pub tokens: Arc<TokenKeys>,
}

impl ServerState {
    pub fn new(engine: Engine, dispatcher: Dispatcher, tokens: TokenKeys) -> Self {
        Self {
            engine: Arc::new(engine),
            dispatcher: Arc::new(dispatcher),
            tokens: Arc::new(tokens),
        }
    }
}

/// Resolve the bearer token into an [`AuthUser`] request extension.
async fn auth(
    State(state): State<ServerState>,
    auth_header: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(TypedHeader(Authorization(bearer))) = auth_header else {
        return Err(ServerError::Unauthorized("missing bearer token".to_string()));
    };

    let claims = state.tokens.verify(bearer.token())?;

    request.extensions_mut().insert(AuthUser { id: claims.sub });
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    let protected = Router::new()
        .route("/distribution", post(distribution::distribution_new))
        .route("/distributions/{user_id}", get(distribution::list))
        .route(
            "/send-distribution-email",
            post(email::send_distribution_email),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    Router::new()
        .route("/register", post(user::register))
        .route("/login", post(user::login))
        .merge(protected)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(state)).await
}
