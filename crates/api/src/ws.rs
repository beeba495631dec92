use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};

use crate::state::{AppState, TickEvent};

pub async fn ticks_socket(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| stream_ticks(socket, state))
}

async fn stream_ticks(mut socket: WebSocket, state: AppState) {
    // Subscribe before the hello so no tick published after the handshake
    // is missed.
    let mut ticks = state.subscribe_ticks();

    let active_deals = {
        let engine = state.engine();
        let engine = engine.lock().await;
        engine.book().len()
    };
    if send_tick(&mut socket, &TickEvent::connected(active_deals))
        .await
        .is_err()
    {
        return;
    }

    loop {
        tokio::select! {
            inbound = socket.recv() => {
                match inbound {
                    Some(Ok(Message::Close(_))) | None => return,
                    Some(Ok(_)) => {}
                    Some(Err(_)) => return,
                }
            }
            tick = ticks.recv() => {
                match tick {
                    Ok(tick) => {
                        if send_tick(&mut socket, &tick).await.is_err() {
                            return;
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => return,
                }
            }
        }
    }
}

async fn send_tick(socket: &mut WebSocket, tick: &TickEvent) -> Result<(), ()> {
    let payload = tick_json(tick)?;
    socket.send(Message::Text(payload)).await.map_err(|_| ())
}

fn tick_json(tick: &TickEvent) -> Result<String, ()> {
    serde_json::to_string(tick).map_err(|_| ())
}
