use axum::extract::{Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use serde::Deserialize;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::StreamExt;

use super::error::ApiError;
use super::AppState;

/// Comment-line heartbeat cadence; keeps proxies from idle-closing the stream
const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(25);

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    pub token: Option<String>,
}

/// Open the live event stream for the authenticated user
///
/// `GET /api/events?token=<jwt>` - the browser's EventSource API cannot set
/// an Authorization header, so the bearer token travels as a query
/// parameter instead. Each event goes out as an `event:` line plus a JSON
/// `data:` line; an unnamed `: heartbeat` comment is interleaved on the
/// keep-alive interval. The registration is dropped (and pruned from the
/// hub) when the client disconnects or a transport write fails.
pub async fn events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let token = query
        .token
        .ok_or_else(|| ApiError::Unauthorized("token query param required".to_string()))?;

    let claims = state
        .auth
        .verify_token(&token)
        .map_err(|_| ApiError::Unauthorized("invalid token".to_string()))?;
    let user_id = claims.sub;

    let (guard, rx) = std::sync::Arc::clone(&state.hub).register_guarded(user_id);
    tracing::info!("SSE client connected - user {}", user_id);

    // Handshake so the client knows the stream is live before any trigger fires
    let handshake = Event::default()
        .event("connected")
        .json_data(serde_json::json!({
            "userId": user_id,
            "ts": chrono::Utc::now().timestamp_millis(),
        }))
        .unwrap_or_else(|_| Event::default().event("connected"));

    // The guard rides inside the stream closure: axum drops the stream on
    // disconnect, the guard drops with it, and the hub entry goes away.
    let live_events = UnboundedReceiverStream::new(rx).map(move |event| {
        let _registration = &guard;
        Ok::<Event, Infallible>(event)
    });

    let stream = tokio_stream::once(Ok(handshake)).chain(live_events);

    Ok(Sse::new(stream)
        .keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL).text("heartbeat")))
}
