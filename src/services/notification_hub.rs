use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

type Subscribers = HashMap<i64, Vec<(u64, UnboundedSender<String>)>>;

/// Fans notifications out to every open websocket of a user.
#[derive(Clone, Default)]
pub struct NotificationHub {
    subscribers: Arc<RwLock<Subscribers>>,
    next_id: Arc<AtomicU64>,
}

pub struct Subscription {
    pub id: u64,
    pub user_id: i64,
    pub receiver: UnboundedReceiver<String>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn subscribe(&self, user_id: i64) -> Subscription {
        let (tx, rx) = unbounded_channel();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers
            .write()
            .await
            .entry(user_id)
            .or_default()
            .push((id, tx));
        log::debug!("websocket {id} subscribed for user {user_id}");
        Subscription {
            id,
            user_id,
            receiver: rx,
        }
    }

    pub async fn unsubscribe(&self, user_id: i64, id: u64) {
        let mut subscribers = self.subscribers.write().await;
        if let Some(channels) = subscribers.get_mut(&user_id) {
            channels.retain(|(channel_id, _)| *channel_id != id);
            if channels.is_empty() {
                subscribers.remove(&user_id);
            }
        }
    }

    /// Returns how many sockets received the payload. Closed channels are dropped.
    pub async fn publish(&self, user_id: i64, payload: &str) -> usize {
        let mut subscribers = self.subscribers.write().await;
        let Some(channels) = subscribers.get_mut(&user_id) else {
            return 0;
        };
        channels.retain(|(_, tx)| tx.send(payload.to_string()).is_ok());
        let delivered = channels.len();
        if channels.is_empty() {
            subscribers.remove(&user_id);
        }
        delivered
    }

    pub async fn connection_count(&self, user_id: i64) -> usize {
        self.subscribers
            .read()
            .await
            .get(&user_id)
            .map_or(0, Vec::len)
    }
}
