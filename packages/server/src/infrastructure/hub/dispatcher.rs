//! Hub dispatcher
//!
//! ## 責務
//!
//! - ルーム → 接続集合の管理（ルームは最初の登録で作成、最後の退出で削除）
//! - register / unregister / broadcast リクエストを到着順に 1 つずつ処理
//! - 受信フレームを type ごとのハンドラに渡してからファンアウト
//!
//! ## 設計ノート
//!
//! ディスパッチャは 1 つのタスクで動き、ここが唯一の直列化ポイントです。
//! リクエストキューは unbounded なので、ディスパッチャ上で動くハンドラが
//! [`HubHandle`] 経由で追加のイベントを publish してもデッドロックしません。
//! 一方、接続ごとの配送キューは bounded で、満杯・クローズ済みの接続は
//! ブロックせずにルームから追い出します。

use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
};

use serde_json::Value;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use crate::{
    domain::{RoomBroadcaster, RoomEvent, RoomId, UserId},
    infrastructure::dto::websocket::ServerMessage,
};

use super::{
    connection::{Connection, ConnectionId},
    handler::{FrameHandler, HandlerContext},
};

/// Hub のエラー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HubError {
    #[error("hub dispatcher has stopped")]
    DispatcherStopped,
}

/// The connection a broadcast frame came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Origin {
    pub connection_id: ConnectionId,
    pub user_id: UserId,
    pub message_type: String,
    /// Stamped inbound object, handed to the type's handler
    pub body: Value,
}

/// A payload for every member of a room.
#[derive(Debug, Clone, PartialEq)]
pub struct Broadcast {
    pub room_id: RoomId,
    pub payload: Arc<str>,
    /// `None` for server-originated events: every member receives them
    pub origin: Option<Origin>,
}

/// Membership count of one room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomStats {
    pub room_id: RoomId,
    pub connections: usize,
}

/// Work items consumed by the dispatcher.
#[derive(Debug)]
pub enum HubRequest {
    Register(Connection),
    Unregister {
        room_id: RoomId,
        connection_id: ConnectionId,
    },
    Broadcast(Broadcast),
    Inspect(oneshot::Sender<Vec<RoomStats>>),
}

/// Cloneable entry point to the dispatcher.
#[derive(Debug, Clone)]
pub struct HubHandle {
    requests: mpsc::UnboundedSender<HubRequest>,
}

impl HubHandle {
    fn submit(&self, request: HubRequest) -> Result<(), HubError> {
        self.requests
            .send(request)
            .map_err(|_| HubError::DispatcherStopped)
    }

    pub fn register(&self, connection: Connection) -> Result<(), HubError> {
        self.submit(HubRequest::Register(connection))
    }

    pub fn unregister(&self, room_id: RoomId, connection_id: ConnectionId) -> Result<(), HubError> {
        self.submit(HubRequest::Unregister {
            room_id,
            connection_id,
        })
    }

    pub fn broadcast(&self, broadcast: Broadcast) -> Result<(), HubError> {
        self.submit(HubRequest::Broadcast(broadcast))
    }

    /// Snapshot of room sizes, sorted by room id.
    ///
    /// The reply is produced after every request queued before this one.
    pub async fn inspect(&self) -> Result<Vec<RoomStats>, HubError> {
        let (reply, answer) = oneshot::channel();
        self.submit(HubRequest::Inspect(reply))?;
        answer.await.map_err(|_| HubError::DispatcherStopped)
    }
}

impl RoomBroadcaster for HubHandle {
    fn publish(&self, room_id: &RoomId, event: RoomEvent) {
        let Some(payload) = encode(&ServerMessage::from(event)) else {
            return;
        };
        let broadcast = Broadcast {
            room_id: room_id.clone(),
            payload,
            origin: None,
        };
        if let Err(e) = self.broadcast(broadcast) {
            tracing::warn!(room_id = %room_id, "Failed to publish room event: {}", e);
        }
    }
}

fn encode(message: &ServerMessage) -> Option<Arc<str>> {
    match message.to_json() {
        Ok(json) => Some(Arc::from(json)),
        Err(e) => {
            tracing::error!("Failed to encode server message: {}", e);
            None
        }
    }
}

/// The dispatcher. Build it with [`Hub::new`], bind handlers, then spawn
/// [`Hub::run`].
pub struct Hub {
    requests: mpsc::UnboundedReceiver<HubRequest>,
    rooms: HashMap<RoomId, HashMap<ConnectionId, Connection>>,
    handlers: HashMap<String, Arc<dyn FrameHandler>>,
}

impl Hub {
    pub fn new() -> (HubHandle, Self) {
        let (requests_tx, requests) = mpsc::unbounded_channel();
        let hub = Self {
            requests,
            rooms: HashMap::new(),
            handlers: HashMap::new(),
        };
        (
            HubHandle {
                requests: requests_tx,
            },
            hub,
        )
    }

    /// Bind `handler` to inbound frames whose `type` is `message_type`.
    pub fn register_handler(
        &mut self,
        message_type: impl Into<String>,
        handler: Arc<dyn FrameHandler>,
    ) {
        self.handlers.insert(message_type.into(), handler);
    }

    /// Process requests until every [`HubHandle`] is dropped.
    pub async fn run(mut self) {
        tracing::info!(handlers = self.handlers.len(), "Hub dispatcher started");
        while let Some(request) = self.requests.recv().await {
            self.process(request).await;
        }
        tracing::info!("Hub dispatcher stopped");
    }

    async fn process(&mut self, request: HubRequest) {
        match request {
            HubRequest::Register(connection) => self.register(connection),
            HubRequest::Unregister {
                room_id,
                connection_id,
            } => self.unregister(&room_id, &connection_id),
            HubRequest::Broadcast(broadcast) => self.broadcast(broadcast).await,
            HubRequest::Inspect(reply) => {
                let _ = reply.send(self.stats());
            }
        }
    }

    fn register(&mut self, connection: Connection) {
        let room_id = connection.room_id.clone();
        let connection_id = connection.id;
        let notice = encode(&ServerMessage::user_joined(&connection.user_id));

        tracing::info!(
            room_id = %room_id,
            user_id = %connection.user_id,
            connection_id = %connection_id,
            "Connection registered"
        );
        self.rooms
            .entry(room_id.clone())
            .or_default()
            .insert(connection_id, connection);

        if let Some(notice) = notice {
            self.fan_out(&room_id, notice, Some(connection_id));
        }
    }

    fn unregister(&mut self, room_id: &RoomId, connection_id: &ConnectionId) {
        let Some(members) = self.rooms.get_mut(room_id) else {
            return;
        };
        let Some(connection) = members.remove(connection_id) else {
            return;
        };
        if members.is_empty() {
            self.rooms.remove(room_id);
            tracing::debug!(room_id = %room_id, "Room closed");
        }

        tracing::info!(
            room_id = %room_id,
            user_id = %connection.user_id,
            connection_id = %connection_id,
            "Connection unregistered"
        );
        let notice = encode(&ServerMessage::user_left(&connection.user_id));
        // closes the delivery queue
        drop(connection);

        if let Some(notice) = notice {
            self.fan_out(room_id, notice, None);
        }
    }

    async fn broadcast(&mut self, broadcast: Broadcast) {
        let Broadcast {
            room_id,
            payload,
            origin,
        } = broadcast;

        let exclude = match origin {
            Some(origin) => {
                if let Some(handler) = self.handlers.get(&origin.message_type).cloned() {
                    let ctx = HandlerContext {
                        room_id: room_id.clone(),
                        sender: origin.user_id,
                        connection_id: origin.connection_id,
                    };
                    handler.handle(ctx, &origin.body).await;
                }
                Some(origin.connection_id)
            }
            None => None,
        };

        self.fan_out(&room_id, payload, exclude);
    }

    /// Deliver to every member except `exclude`.
    ///
    /// Members whose queue is full or closed are evicted and the rest of the
    /// room is told they left. Those notices are delivered by the same loop.
    fn fan_out(&mut self, room_id: &RoomId, payload: Arc<str>, exclude: Option<ConnectionId>) {
        let mut pending = VecDeque::from([(room_id.clone(), payload, exclude)]);

        while let Some((room_id, payload, exclude)) = pending.pop_front() {
            let Some(members) = self.rooms.get_mut(&room_id) else {
                tracing::debug!(room_id = %room_id, "Broadcast to empty room skipped");
                continue;
            };

            let mut evicted = Vec::new();
            for (connection_id, connection) in members.iter() {
                if exclude == Some(*connection_id) {
                    continue;
                }
                if let Err(e) = connection.deliver(payload.clone()) {
                    tracing::warn!(
                        room_id = %room_id,
                        user_id = %connection.user_id,
                        connection_id = %connection_id,
                        "Evicting connection: {}",
                        e
                    );
                    evicted.push(*connection_id);
                }
            }

            for connection_id in evicted {
                if let Some(connection) = members.remove(&connection_id)
                    && let Some(notice) = encode(&ServerMessage::user_left(&connection.user_id))
                {
                    pending.push_back((room_id.clone(), notice, None));
                }
            }

            if members.is_empty() {
                self.rooms.remove(&room_id);
                tracing::debug!(room_id = %room_id, "Room closed");
            }
        }
    }

    fn stats(&self) -> Vec<RoomStats> {
        let mut stats: Vec<RoomStats> = self
            .rooms
            .iter()
            .map(|(room_id, members)| RoomStats {
                room_id: room_id.clone(),
                connections: members.len(),
            })
            .collect();
        stats.sort_by(|a, b| a.room_id.cmp(&b.room_id));
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::hub::connection::Outbox;
    use async_trait::async_trait;
    use serde_json::json;
    use tokio::sync::Mutex;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - register / unregister 時の user-joined / user-left 通知
    // - broadcast の送信者除外、空ルームへの broadcast
    // - 配送キューが溢れた接続の追い出し
    // - ハンドラがファンアウトより先に実行されること
    //
    // 【なぜこのテストが必要か】
    // - Hub はルームメンバーシップの唯一の直列化ポイント
    // - 遅いクライアントがディスパッチャを止めないことを保証する
    // ========================================

    fn room(id: &str) -> RoomId {
        RoomId::new(id.to_string()).unwrap()
    }

    fn user(id: &str) -> UserId {
        UserId::new(id.to_string()).unwrap()
    }

    fn spawn_hub(hub: Hub) {
        tokio::spawn(hub.run());
    }

    fn join(handle: &HubHandle, room_id: &str, user_id: &str, capacity: usize) -> (ConnectionId, Outbox) {
        let (connection, outbox) = Connection::open(room(room_id), user(user_id), capacity);
        let id = connection.id;
        handle.register(connection).unwrap();
        (id, outbox)
    }

    fn next_json(outbox: &mut Outbox) -> Option<Value> {
        outbox
            .try_recv()
            .ok()
            .map(|text| serde_json::from_str(&text).unwrap())
    }

    fn frame(room_id: &str, origin: Option<Origin>, body: Value) -> Broadcast {
        Broadcast {
            room_id: room(room_id),
            payload: Arc::from(body.to_string()),
            origin,
        }
    }

    #[tokio::test]
    async fn test_register_notifies_rest_of_room() {
        // テスト項目: 新しい接続の user-joined は既存メンバーだけに届く
        // given (前提条件):
        let (handle, hub) = Hub::new();
        spawn_hub(hub);
        let (_, mut alice) = join(&handle, "d1", "alice", 8);

        // when (操作):
        let (_, mut bob) = join(&handle, "d1", "bob", 8);
        handle.inspect().await.unwrap();

        // then (期待する結果):
        assert_eq!(
            next_json(&mut alice),
            Some(json!({"type": "user-joined", "userId": "bob"}))
        );
        assert_eq!(next_json(&mut bob), None);
    }

    #[tokio::test]
    async fn test_broadcast_excludes_sender() {
        // テスト項目: 送信者付きの broadcast は送信者以外に届く
        // given (前提条件):
        let (handle, hub) = Hub::new();
        spawn_hub(hub);
        let (alice_id, mut alice) = join(&handle, "d1", "alice", 8);
        let (_, mut bob) = join(&handle, "d1", "bob", 8);
        handle.inspect().await.unwrap();
        while next_json(&mut alice).is_some() {}

        // when (操作):
        let body = json!({"type": "chat", "senderId": "alice", "text": "hi"});
        let origin = Origin {
            connection_id: alice_id,
            user_id: user("alice"),
            message_type: "chat".to_string(),
            body: body.clone(),
        };
        handle.broadcast(frame("d1", Some(origin), body.clone())).unwrap();
        handle.inspect().await.unwrap();

        // then (期待する結果):
        assert_eq!(next_json(&mut bob), Some(body));
        assert_eq!(next_json(&mut alice), None);
    }

    #[tokio::test]
    async fn test_server_event_reaches_every_member() {
        // テスト項目: 送信者なしの publish はルームの全員に届く
        // given (前提条件):
        let (handle, hub) = Hub::new();
        spawn_hub(hub);
        let (_, mut alice) = join(&handle, "d1", "alice", 8);
        let (_, mut bob) = join(&handle, "d1", "bob", 8);
        handle.inspect().await.unwrap();
        while next_json(&mut alice).is_some() {}

        // when (操作):
        handle.publish(
            &room("d1"),
            RoomEvent::UserLeft {
                user_id: user("carol"),
            },
        );
        handle.inspect().await.unwrap();

        // then (期待する結果):
        let expected = json!({"type": "user-left", "userId": "carol"});
        assert_eq!(next_json(&mut alice), Some(expected.clone()));
        assert_eq!(next_json(&mut bob), Some(expected));
    }

    #[tokio::test]
    async fn test_broadcast_to_empty_room_is_noop() {
        // テスト項目: メンバーのいないルームへの broadcast は何もしない
        // given (前提条件):
        let (handle, hub) = Hub::new();
        spawn_hub(hub);

        // when (操作):
        handle
            .broadcast(frame("nobody-here", None, json!({"type": "chat"})))
            .unwrap();
        let stats = handle.inspect().await.unwrap();

        // then (期待する結果):
        assert!(stats.is_empty());
    }

    #[tokio::test]
    async fn test_unregister_is_idempotent() {
        // テスト項目: 同じ接続を 2 回 unregister しても user-left は 1 回だけ
        // given (前提条件):
        let (handle, hub) = Hub::new();
        spawn_hub(hub);
        let (alice_id, mut alice) = join(&handle, "d1", "alice", 8);
        let (_, mut bob) = join(&handle, "d1", "bob", 8);
        handle.inspect().await.unwrap();
        while next_json(&mut alice).is_some() {}

        // when (操作):
        handle.unregister(room("d1"), alice_id).unwrap();
        handle.unregister(room("d1"), alice_id).unwrap();
        let stats = handle.inspect().await.unwrap();

        // then (期待する結果):
        assert_eq!(
            next_json(&mut bob),
            Some(json!({"type": "user-left", "userId": "alice"}))
        );
        assert_eq!(next_json(&mut bob), None);
        assert_eq!(
            stats,
            vec![RoomStats {
                room_id: room("d1"),
                connections: 1
            }]
        );
        // 配送キューはクローズされている
        assert_eq!(alice.recv().await, None);
    }

    #[tokio::test]
    async fn test_saturated_connection_is_evicted() {
        // テスト項目: 配送キューが満杯の接続だけがルームから追い出される
        // given (前提条件):
        let (handle, hub) = Hub::new();
        spawn_hub(hub);
        let (_, mut slow) = join(&handle, "d1", "slow", 1);
        let (_, mut fast) = join(&handle, "d1", "fast", 8);
        handle.inspect().await.unwrap();
        // slow のキューは user-joined(fast) で既に満杯

        // when (操作):
        handle
            .broadcast(frame("d1", None, json!({"type": "tick"})))
            .unwrap();
        let stats = handle.inspect().await.unwrap();

        // then (期待する結果):
        assert_eq!(next_json(&mut fast), Some(json!({"type": "tick"})));
        assert_eq!(
            next_json(&mut fast),
            Some(json!({"type": "user-left", "userId": "slow"}))
        );
        assert_eq!(stats[0].connections, 1);
        assert_eq!(
            slow.recv().await.as_deref(),
            Some(r#"{"type":"user-joined","userId":"fast"}"#)
        );
        assert_eq!(slow.recv().await, None);
    }

    #[tokio::test]
    async fn test_room_removed_when_last_member_leaves() {
        // テスト項目: 最後のメンバーが抜けるとルームは削除される
        // given (前提条件):
        let (handle, hub) = Hub::new();
        spawn_hub(hub);
        let (alice_id, _alice) = join(&handle, "d1", "alice", 8);
        let (_, _other) = join(&handle, "d2", "bob", 8);

        // when (操作):
        handle.unregister(room("d1"), alice_id).unwrap();
        let stats = handle.inspect().await.unwrap();

        // then (期待する結果):
        assert_eq!(
            stats,
            vec![RoomStats {
                room_id: room("d2"),
                connections: 1
            }]
        );
    }

    struct RecordingHandler {
        handle: HubHandle,
        seen: Mutex<Vec<(UserId, Value)>>,
    }

    #[async_trait]
    impl FrameHandler for RecordingHandler {
        async fn handle(&self, ctx: HandlerContext, body: &Value) {
            self.seen.lock().await.push((ctx.sender, body.clone()));
            self.handle.publish(
                &ctx.room_id,
                RoomEvent::UserLeft {
                    user_id: user("from-handler"),
                },
            );
        }
    }

    #[tokio::test]
    async fn test_handler_runs_before_fan_out() {
        // テスト項目: 登録済みの type はハンドラ実行後にファンアウトされ、
        //             ハンドラからの publish はその後に届く
        // given (前提条件):
        let (handle, mut hub) = Hub::new();
        let handler = Arc::new(RecordingHandler {
            handle: handle.clone(),
            seen: Mutex::new(Vec::new()),
        });
        hub.register_handler("debate:join_room", handler.clone());
        spawn_hub(hub);
        let (alice_id, mut alice) = join(&handle, "d1", "alice", 8);
        let (_, mut bob) = join(&handle, "d1", "bob", 8);
        handle.inspect().await.unwrap();
        while next_json(&mut alice).is_some() {}

        // when (操作):
        let body = json!({"type": "debate:join_room", "senderId": "alice"});
        let origin = Origin {
            connection_id: alice_id,
            user_id: user("alice"),
            message_type: "debate:join_room".to_string(),
            body: body.clone(),
        };
        handle.broadcast(frame("d1", Some(origin), body.clone())).unwrap();
        handle.inspect().await.unwrap();
        // ハンドラの publish はキューの後ろに積まれている
        handle.inspect().await.unwrap();

        // then (期待する結果):
        assert_eq!(*handler.seen.lock().await, vec![(user("alice"), body.clone())]);
        assert_eq!(next_json(&mut bob), Some(body));
        assert_eq!(
            next_json(&mut bob),
            Some(json!({"type": "user-left", "userId": "from-handler"}))
        );
        assert_eq!(
            next_json(&mut alice),
            Some(json!({"type": "user-left", "userId": "from-handler"}))
        );
    }

    #[tokio::test]
    async fn test_handler_not_run_without_sender() {
        // テスト項目: 送信者なしの broadcast ではハンドラは実行されない
        // given (前提条件):
        let (handle, mut hub) = Hub::new();
        let handler = Arc::new(RecordingHandler {
            handle: handle.clone(),
            seen: Mutex::new(Vec::new()),
        });
        hub.register_handler("debate:join_room", handler.clone());
        spawn_hub(hub);

        // when (操作):
        handle
            .broadcast(frame("d1", None, json!({"type": "debate:join_room"})))
            .unwrap();
        handle.inspect().await.unwrap();

        // then (期待する結果):
        assert!(handler.seen.lock().await.is_empty());
    }
}
