use crate::RoomStore;
use crate::dispatch::dispatch;
use crate::dispatch::on_disconnect;
use futures::StreamExt;
use std::sync::Arc;

/// Pumps one `actix-ws` session: inbound text frames go through the
/// dispatcher, outbound frames arrive on this connection's private channel
/// in the store.
pub async fn bridge(
    store: Arc<RoomStore>,
    connection_id: String,
    mut session: actix_ws::Session,
    mut stream: actix_ws::MessageStream,
) {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<String>();
    store.register_connection(connection_id.clone(), tx);
    log::debug!("[bridge {connection_id}] connected");

    loop {
        tokio::select! {
            biased;
            outbound = rx.recv() => match outbound {
                Some(text) => if session.text(text).await.is_err() { break },
                None => break,
            },
            inbound = stream.next() => match inbound {
                Some(Ok(actix_ws::Message::Text(text))) => {
                    dispatch(store.clone(), connection_id.clone(), &text).await;
                }
                Some(Ok(actix_ws::Message::Ping(bytes))) => {
                    if session.pong(&bytes).await.is_err() { break }
                }
                Some(Ok(actix_ws::Message::Close(_))) | None => break,
                Some(Err(_)) => break,
                _ => continue,
            },
        }
    }

    on_disconnect(store, connection_id.clone()).await;
    log::debug!("[bridge {connection_id}] disconnected");
}
