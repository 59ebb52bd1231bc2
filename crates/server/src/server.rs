use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Error as AxumError, Header},
    typed_header::TypedHeaderRejection,
};

use std::{net::SocketAddr, sync::Arc};

use crate::{ServerError, cart, checkout, courses, earnings, withdrawals};
use engine::{Engine, EngineError};

static CALLER_HEADER: axum::http::HeaderName =
    axum::http::HeaderName::from_static("x-caller-id");

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// `TypedHeader` for the authenticated caller.
///
/// The gateway in front of the server authenticates the user and forwards
/// the identity provider's id in "x-caller-id".
#[derive(Debug)]
struct CallerHeader(String);

impl Header for CallerHeader {
    fn name() -> &'static axum::http::HeaderName {
        &CALLER_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, AxumError>
    where
        Self: Sized,
        I: Iterator<Item = &'i axum::http::HeaderValue>,
    {
        let value = values.next().ok_or_else(AxumError::invalid)?;
        let Ok(value) = value.to_str() else {
            return Err(AxumError::invalid());
        };
        let value = value.trim();
        if value.is_empty() {
            return Err(AxumError::invalid());
        }

        Ok(CallerHeader(value.to_string()))
    }

    fn encode<E: Extend<axum::http::HeaderValue>>(&self, values: &mut E) {
        match axum::http::HeaderValue::from_str(&self.0) {
            Ok(value) => values.extend(std::iter::once(value)),
            Err(_) => tracing::error!("failed to encode x-caller-id header"),
        }
    }
}

async fn auth(
    caller: Result<TypedHeader<CallerHeader>, TypedHeaderRejection>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let TypedHeader(CallerHeader(caller_id)) =
        caller.map_err(|rejection| ServerError::Generic(rejection.to_string()).into_response())?;
    let user = match state.engine.user(&caller_id).await {
        Ok(user) => user,
        Err(EngineError::KeyNotFound(_)) => return Err(StatusCode::UNAUTHORIZED.into_response()),
        Err(err) => return Err(ServerError::from(err).into_response()),
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/checkout", post(checkout::checkout))
        .route(
            "/withdrawals",
            post(withdrawals::withdraw).get(withdrawals::list),
        )
        .route("/courses/{id}", delete(courses::delete_course))
        .route("/cart", get(cart::list_cart).post(cart::add_to_cart))
        .route("/cart/{id}", delete(cart::remove_from_cart))
        .route(
            "/favorites",
            get(cart::list_favorites).post(cart::add_favorite),
        )
        .route("/favorites/{id}", delete(cart::remove_favorite))
        .route("/earnings", get(earnings::get_earnings))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

pub async fn run(engine: Engine, addr: SocketAddr) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {addr}: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
