use actix_web::{HttpRequest, HttpResponse, Result, rt, web};
use actix_ws::Message;
use futures_util::StreamExt;

use crate::handlers::get_user_id_from_request;
use crate::services::NotificationHub;

/// Upgrades to a websocket that receives the caller's notifications as JSON text frames.
pub async fn notifications_ws(
    req: HttpRequest,
    body: web::Payload,
    hub: web::Data<NotificationHub>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);
    let (response, mut session, mut msg_stream) = actix_ws::handle(&req, body)?;

    let hub = hub.get_ref().clone();
    let mut subscription = hub.subscribe(user_id).await;
    log::info!("Notification socket {} opened for user {user_id}", subscription.id);

    rt::spawn(async move {
        loop {
            tokio::select! {
                outgoing = subscription.receiver.recv() => {
                    let Some(payload) = outgoing else { break };
                    if session.text(payload).await.is_err() {
                        break;
                    }
                }
                incoming = msg_stream.next() => {
                    match incoming {
                        Some(Ok(Message::Ping(bytes))) => {
                            if session.pong(&bytes).await.is_err() {
                                break;
                            }
                        }
                        Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                        // clients have nothing to send on this channel
                        Some(Ok(_)) => {}
                    }
                }
            }
        }

        hub.unsubscribe(subscription.user_id, subscription.id).await;
        let _ = session.close(None).await;
        log::info!(
            "Notification socket {} closed for user {}",
            subscription.id,
            subscription.user_id
        );
    });

    Ok(response)
}

pub fn ws_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/ws/notifications", web::get().to(notifications_ws));
}
