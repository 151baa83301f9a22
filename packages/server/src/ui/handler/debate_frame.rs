//! Debate commands arriving over WebSocket.
//!
//! Bound in the hub to every `debate:*` command type. Runs on the dispatcher
//! before the frame is relayed to the room. Failures are logged only: on the
//! socket path a rejected command changes nothing and broadcasts nothing.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::{
    domain::{DebateId, Side, UserId},
    infrastructure::{
        dto::websocket::DebateCommand,
        hub::{FrameHandler, HandlerContext},
    },
    usecase::{
        DebateError, HostMuteUseCase, JoinDebateUseCase, JoinSource, LeaveDebateUseCase,
        SelfMuteUseCase,
    },
};

pub struct DebateFrameHandler {
    join_debate_usecase: Arc<JoinDebateUseCase>,
    leave_debate_usecase: Arc<LeaveDebateUseCase>,
    self_mute_usecase: Arc<SelfMuteUseCase>,
    host_mute_usecase: Arc<HostMuteUseCase>,
}

impl DebateFrameHandler {
    pub fn new(
        join_debate_usecase: Arc<JoinDebateUseCase>,
        leave_debate_usecase: Arc<LeaveDebateUseCase>,
        self_mute_usecase: Arc<SelfMuteUseCase>,
        host_mute_usecase: Arc<HostMuteUseCase>,
    ) -> Self {
        Self {
            join_debate_usecase,
            leave_debate_usecase,
            self_mute_usecase,
            host_mute_usecase,
        }
    }

    async fn dispatch(
        &self,
        debate_id: &DebateId,
        sender: &UserId,
        command: DebateCommand,
    ) -> Result<(), DebateError> {
        match command {
            DebateCommand::JoinRoom { side } => {
                let side = match side {
                    Some(raw) => Side::parse(&raw)?,
                    None => None,
                };
                self.join_debate_usecase
                    .execute(debate_id, sender, side, JoinSource::Socket)
                    .await?;
            }
            DebateCommand::LeaveRoom => {
                self.leave_debate_usecase.execute(debate_id, sender).await?;
            }
            DebateCommand::SelfMuteChange { is_self_muted } => {
                self.self_mute_usecase
                    .execute(debate_id, sender, is_self_muted)
                    .await?;
            }
            DebateCommand::MuteChange {
                target_user_id,
                is_muted_by_host,
            } => {
                let target = UserId::new(target_user_id)?;
                self.host_mute_usecase
                    .execute(debate_id, sender, &target, is_muted_by_host)
                    .await?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl FrameHandler for DebateFrameHandler {
    async fn handle(&self, ctx: HandlerContext, body: &Value) {
        let command = match DebateCommand::from_body(body) {
            Ok(command) => command,
            Err(e) => {
                tracing::warn!(
                    room_id = %ctx.room_id,
                    user_id = %ctx.sender,
                    "Malformed debate command: {}",
                    e
                );
                return;
            }
        };

        let debate_id = DebateId::from(&ctx.room_id);
        if let Err(e) = self.dispatch(&debate_id, &ctx.sender, command).await {
            tracing::info!(
                debate_id = %debate_id,
                user_id = %ctx.sender,
                "Debate command rejected: {}",
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{DebateRepository, Participant, RoomId},
        infrastructure::hub::ConnectionId,
        usecase::fixture::{Fixture, t0, user},
    };
    use serde_json::json;

    fn handler(fixture: &Fixture) -> DebateFrameHandler {
        let join = JoinDebateUseCase::new(
            fixture.repository.clone(),
            fixture.points.clone(),
            fixture.broadcaster.clone(),
            fixture.roster.clone(),
            fixture.locks.clone(),
            fixture.clock.clone(),
        );
        let leave = LeaveDebateUseCase::new(
            fixture.repository.clone(),
            fixture.roster.clone(),
            fixture.locks.clone(),
            fixture.clock.clone(),
        );
        let self_mute = SelfMuteUseCase::new(
            fixture.repository.clone(),
            fixture.roster.clone(),
            fixture.locks.clone(),
        );
        let host_mute = HostMuteUseCase::new(
            fixture.repository.clone(),
            fixture.roster.clone(),
            fixture.locks.clone(),
        );
        DebateFrameHandler::new(
            Arc::new(join),
            Arc::new(leave),
            Arc::new(self_mute),
            Arc::new(host_mute),
        )
    }

    fn ctx(debate_id: &DebateId, sender: &str) -> HandlerContext {
        HandlerContext {
            room_id: RoomId::from(debate_id),
            sender: user(sender),
            connection_id: ConnectionId::generate(),
        }
    }

    #[tokio::test]
    async fn test_join_room_frame_joins_sender() {
        // テスト項目: debate:join_room で送信者が参加者になる
        // given (前提条件):
        let fixture = Fixture::new();
        let debate = fixture.seed_debate().await;
        let handler = handler(&fixture);

        // when (操作):
        handler
            .handle(
                ctx(&debate.id, "alice"),
                &json!({"type": "debate:join_room", "senderId": "alice"}),
            )
            .await;

        // then (期待する結果):
        let participants = fixture.repository.get_participants(&debate.id).await.unwrap();
        assert_eq!(participants.len(), 1);
        assert_eq!(participants[0].user_id, user("alice"));
    }

    #[tokio::test]
    async fn test_non_host_mute_change_is_silently_ignored() {
        // テスト項目: ホスト以外の debate:mute_change は状態もブロードキャストも変えない
        // given (前提条件):
        let fixture = Fixture::new();
        let debate = fixture.seed_debate().await;
        fixture
            .repository
            .add_participant(Participant::join(&debate, user("bob"), None, t0()))
            .await
            .unwrap();
        let handler = handler(&fixture);

        // when (操作):
        handler
            .handle(
                ctx(&debate.id, "alice"),
                &json!({
                    "type": "debate:mute_change",
                    "targetUserId": "bob",
                    "isMutedByHost": true,
                    "senderId": "alice"
                }),
            )
            .await;

        // then (期待する結果):
        let participants = fixture.repository.get_participants(&debate.id).await.unwrap();
        assert!(!participants[0].is_muted_by_host);
        assert!(fixture.broadcaster.take().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_command_is_dropped() {
        // テスト項目: フィールドが欠けたコマンドは何もせずに破棄される
        // given (前提条件):
        let fixture = Fixture::new();
        let debate = fixture.seed_debate().await;
        let handler = handler(&fixture);

        // when (操作):
        handler
            .handle(
                ctx(&debate.id, "alice"),
                &json!({"type": "debate:self_mute_change", "senderId": "alice"}),
            )
            .await;

        // then (期待する結果):
        assert!(fixture.broadcaster.take().is_empty());
    }
}
