//! Kitchen WebSocket endpoint: live order change push
//!
//! GET /api/kitchen/live/ws?token=<JWT>
//! Auth: JWT in the query string (browser WebSocket cannot set headers)
//!
//! Protocol:
//! - Cloud → Kitchen: KitchenMessage (Ready, OrderChanged, Resync)
//! - Kitchen → Cloud: KitchenCommand (Subscribe)

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::kitchen::{KitchenCommand, KitchenMessage};
use std::collections::HashSet;
use tokio::sync::broadcast;
use tokio::time::Duration;
use uuid::Uuid;

use crate::auth::staff_auth;
use crate::live::{ConnectionSlot, OrderChange};
use crate::state::AppState;

/// Maximum concurrent kitchen WS connections per tenant
const MAX_KITCHEN_WS_PER_TENANT: usize = 20;

#[derive(Deserialize)]
pub struct WsAuthQuery {
    token: String,
}

/// GET /api/kitchen/live/ws?token=<JWT>
pub async fn handle_kitchen_ws(
    State(state): State<AppState>,
    Query(query): Query<WsAuthQuery>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, AppError> {
    let identity = staff_auth::verify_staff_token(&query.token, &state.jwt_secret)?;
    let tenant_id = identity.tenant_id;

    let slot = state
        .kitchen_hub
        .try_connect(tenant_id, MAX_KITCHEN_WS_PER_TENANT)
        .map_err(|connected| {
            AppError::with_message(
                ErrorCode::ResourceLimitExceeded,
                format!("Too many kitchen connections ({connected}/{MAX_KITCHEN_WS_PER_TENANT})"),
            )
        })?;

    Ok(ws.on_upgrade(move |socket| kitchen_ws_session(socket, state, tenant_id, slot)))
}

async fn kitchen_ws_session(
    socket: WebSocket,
    state: AppState,
    tenant_id: Uuid,
    _slot: ConnectionSlot,
) {
    let (mut sink, mut stream) = socket.split();

    tracing::info!(tenant_id = %tenant_id, "Kitchen WS connected");

    let mut hub_rx = state.kitchen_hub.subscribe(tenant_id);

    // None = every store of the tenant
    let mut subscribed_stores: Option<HashSet<Uuid>> = None;

    if send_message(&mut sink, &KitchenMessage::Ready { tenant_id })
        .await
        .is_err()
    {
        drop(hub_rx);
        state.kitchen_hub.release(tenant_id);
        return;
    }

    let mut ping_interval = tokio::time::interval(Duration::from_secs(30));
    ping_interval.tick().await; // skip immediate

    loop {
        tokio::select! {
            _ = ping_interval.tick() => {
                if sink.send(Message::Ping(vec![].into())).await.is_err() {
                    break;
                }
            }

            event = hub_rx.recv() => {
                match event {
                    Ok(change) => {
                        if let Some(msg) = convert_change(change, &subscribed_stores)
                            && send_message(&mut sink, &msg).await.is_err()
                        {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(tenant_id = %tenant_id, lagged = n, "Kitchen subscriber lagged, asking for reload");
                        hub_rx = state.kitchen_hub.subscribe(tenant_id);
                        if send_message(&mut sink, &KitchenMessage::Resync).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }

            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<KitchenCommand>(&text) {
                            Ok(KitchenCommand::Subscribe { store_ids }) => {
                                subscribed_stores = if store_ids.is_empty() {
                                    None
                                } else {
                                    Some(store_ids.into_iter().collect())
                                };
                                tracing::debug!(tenant_id = %tenant_id, stores = ?subscribed_stores, "Kitchen store filter changed");
                            }
                            Err(e) => {
                                tracing::debug!(tenant_id = %tenant_id, error = %e, "Ignoring unknown kitchen command");
                            }
                        }
                    }
                    Some(Ok(Message::Pong(_))) => {}
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {}
                }
            }
        }
    }

    drop(hub_rx);
    state.kitchen_hub.release(tenant_id);

    tracing::info!(tenant_id = %tenant_id, "Kitchen WS disconnected");
}

/// Turn a hub change into a push message, applying the store filter
fn convert_change(
    change: OrderChange,
    subscribed: &Option<HashSet<Uuid>>,
) -> Option<KitchenMessage> {
    if !passes_filter(subscribed, change.order.store_id) {
        return None;
    }
    Some(KitchenMessage::order_changed(change.kind, *change.order))
}

fn passes_filter(subscribed: &Option<HashSet<Uuid>>, store_id: Uuid) -> bool {
    match subscribed {
        None => true,
        Some(set) => set.contains(&store_id),
    }
}

async fn send_message<S>(sink: &mut S, msg: &KitchenMessage) -> Result<(), ()>
where
    S: futures::Sink<Message, Error = axum::Error> + Unpin,
{
    let json = serde_json::to_string(msg).map_err(|_| ())?;
    sink.send(Message::Text(json.into())).await.map_err(|_| ())
}
