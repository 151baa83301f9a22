//! UseCase: ホストによるディベートの早期終了

use std::sync::Arc;

use agora_shared::time::Clock;

use crate::domain::{Debate, DebateId, DebateRepository, RoomBroadcaster, UserId};

use super::{error::DebateError, get_debate::announce_transition, locks::DebateLocks};

/// ディベート終了のユースケース
pub struct EndDebateUseCase {
    repository: Arc<dyn DebateRepository>,
    broadcaster: Arc<dyn RoomBroadcaster>,
    locks: Arc<DebateLocks>,
    clock: Arc<dyn Clock>,
}

impl EndDebateUseCase {
    pub fn new(
        repository: Arc<dyn DebateRepository>,
        broadcaster: Arc<dyn RoomBroadcaster>,
        locks: Arc<DebateLocks>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            broadcaster,
            locks,
            clock,
        }
    }

    /// ホストのみ実行可能。終了時刻は実行時点に切り詰められる。
    pub async fn execute(&self, debate_id: &DebateId, actor: &UserId) -> Result<Debate, DebateError> {
        let _guard = self.locks.acquire(debate_id).await;
        let now = self.clock.now();

        let mut debate = self.repository.get_debate(debate_id).await?;
        if !debate.is_host(actor) {
            return Err(DebateError::NotHost);
        }

        let lazy = debate.refresh_status(now);
        let forced = debate.end(actor, now)?;
        if lazy.is_none() && forced.is_none() {
            return Ok(debate);
        }

        self.repository.update_debate(debate.clone()).await?;
        for transition in [lazy, forced].into_iter().flatten() {
            announce_transition(self.broadcaster.as_ref(), debate_id, transition);
        }
        Ok(debate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{DebateStatus, RoomEvent},
        usecase::fixture::{Fixture, t0, user},
    };
    use chrono::Duration;

    fn usecase(fixture: &Fixture) -> EndDebateUseCase {
        EndDebateUseCase::new(
            fixture.repository.clone(),
            fixture.broadcaster.clone(),
            fixture.locks.clone(),
            fixture.clock.clone(),
        )
    }

    #[tokio::test]
    async fn test_host_ends_debate_early() {
        // テスト項目: ホストは早期終了でき、終了時刻は現在時刻になる
        // given (前提条件):
        let fixture = Fixture::new();
        let debate = fixture.seed_debate().await;
        fixture.clock.advance(Duration::minutes(5));

        // when (操作):
        let ended = usecase(&fixture)
            .execute(&debate.id, &user("host"))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(ended.status, DebateStatus::Ended);
        assert_eq!(ended.end_time, Some(t0() + Duration::minutes(5)));
        assert_eq!(
            fixture.broadcaster.take()[0].1,
            RoomEvent::StatusChanged {
                debate_id: debate.id.clone(),
                status: DebateStatus::Ended,
                old_status: DebateStatus::Active,
            }
        );
    }

    #[tokio::test]
    async fn test_non_host_cannot_end() {
        // テスト項目: ホスト以外の早期終了は拒否される
        // given (前提条件):
        let fixture = Fixture::new();
        let debate = fixture.seed_debate().await;

        // when (操作):
        let result = usecase(&fixture).execute(&debate.id, &user("alice")).await;

        // then (期待する結果):
        assert_eq!(result, Err(DebateError::NotHost));
        let stored = fixture.repository.get_debate(&debate.id).await.unwrap();
        assert_eq!(stored.status, DebateStatus::Active);
        assert!(fixture.broadcaster.take().is_empty());
    }

    #[tokio::test]
    async fn test_ending_twice_is_quiet() {
        // テスト項目: 終了済みのディベートを再度終了しても通知は増えない
        // given (前提条件):
        let fixture = Fixture::new();
        let debate = fixture.seed_debate().await;
        let usecase = usecase(&fixture);
        usecase.execute(&debate.id, &user("host")).await.unwrap();
        fixture.broadcaster.take();

        // when (操作):
        let again = usecase.execute(&debate.id, &user("host")).await;

        // then (期待する結果):
        assert_eq!(again.unwrap().status, DebateStatus::Ended);
        assert!(fixture.broadcaster.take().is_empty());
    }
}
