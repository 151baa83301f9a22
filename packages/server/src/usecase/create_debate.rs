//! UseCase: ディベート作成
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - CreateDebateUseCase::execute() の入力検証とホスト資格チェック
//!
//! ### どのような状況を想定しているか
//! - 正常系：作成、debates-list ルームへの `debate:created` 通知
//! - 異常系：タイトル長・期間・過去の開始時刻、一時ミュート中のホスト、1 日の上限超過

use std::sync::Arc;

use agora_shared::time::Clock;
use chrono::{DateTime, Duration, Utc};

use crate::domain::{
    Debate, DebateRepository, DebateType, NewDebate, PointsService, RoomBroadcaster, RoomEvent,
    RoomId, UserId,
};

use super::error::DebateError;

const MAX_TITLE_CHARS: usize = 100;
const ALLOWED_DURATIONS_MINUTES: [u32; 4] = [30, 60, 360, 1440];
/// Start times may lag `now` by this much to absorb client latency.
const START_TIME_GRACE_MINUTES: i64 = 1;

/// Validated-at-the-edge input for a new debate.
#[derive(Debug, Clone)]
pub struct CreateDebate {
    pub title: String,
    pub description: String,
    pub category: String,
    pub host_id: UserId,
    pub debate_type: DebateType,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: u32,
    pub show_in_pulse: bool,
}

/// ディベート作成のユースケース
pub struct CreateDebateUseCase {
    repository: Arc<dyn DebateRepository>,
    points: Arc<dyn PointsService>,
    broadcaster: Arc<dyn RoomBroadcaster>,
    clock: Arc<dyn Clock>,
}

impl CreateDebateUseCase {
    pub fn new(
        repository: Arc<dyn DebateRepository>,
        points: Arc<dyn PointsService>,
        broadcaster: Arc<dyn RoomBroadcaster>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            points,
            broadcaster,
            clock,
        }
    }

    pub async fn execute(&self, input: CreateDebate) -> Result<Debate, DebateError> {
        let now = self.clock.now();
        validate(&input, now)?;

        if self
            .points
            .is_temporarily_muted(&input.host_id, now)
            .await?
        {
            return Err(DebateError::HostTemporarilyMuted);
        }
        if !self.points.can_host_debate(&input.host_id, now).await? {
            return Err(DebateError::HostingLimitReached);
        }

        let debate = Debate::schedule(
            NewDebate {
                title: input.title,
                description: input.description,
                category: input.category,
                host_id: input.host_id,
                debate_type: input.debate_type,
                start_time: input.start_time,
                duration_minutes: input.duration_minutes,
                show_in_pulse: input.show_in_pulse,
            },
            now,
        );
        self.repository.create_debate(debate.clone()).await?;

        if let Err(e) = self.points.record_debate_host(&debate.host_id, now).await {
            tracing::warn!(host_id = %debate.host_id, "Failed to record debate hosting: {}", e);
        }
        tracing::info!(
            debate_id = %debate.id,
            host_id = %debate.host_id,
            status = %debate.status,
            "Debate created"
        );

        self.broadcaster.publish(
            &RoomId::debates_list(),
            RoomEvent::DebateCreated {
                debate: Box::new(debate.clone()),
            },
        );
        Ok(debate)
    }
}

fn validate(input: &CreateDebate, now: DateTime<Utc>) -> Result<(), DebateError> {
    if input.title.trim().is_empty() {
        return Err(DebateError::Validation("title is required".to_string()));
    }
    if input.title.chars().count() > MAX_TITLE_CHARS {
        return Err(DebateError::Validation(format!(
            "title must be {MAX_TITLE_CHARS} characters or less"
        )));
    }
    if !ALLOWED_DURATIONS_MINUTES.contains(&input.duration_minutes) {
        return Err(DebateError::Validation(
            "duration must be 30, 60, 360, or 1440 minutes".to_string(),
        ));
    }
    if input.start_time < now - Duration::minutes(START_TIME_GRACE_MINUTES) {
        return Err(DebateError::Validation(
            "start time must be in the future or now".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{DebateStatus, MockPointsService, PointsService},
        usecase::fixture::{Fixture, t0, user},
    };

    fn input(start_time: DateTime<Utc>) -> CreateDebate {
        CreateDebate {
            title: "Pineapple on pizza".to_string(),
            description: "Settle it".to_string(),
            category: "food".to_string(),
            host_id: user("host"),
            debate_type: DebateType::Private,
            start_time,
            duration_minutes: 30,
            show_in_pulse: true,
        }
    }

    fn usecase(fixture: &Fixture, points: Arc<dyn PointsService>) -> CreateDebateUseCase {
        CreateDebateUseCase::new(
            fixture.repository.clone(),
            points,
            fixture.broadcaster.clone(),
            fixture.clock.clone(),
        )
    }

    #[tokio::test]
    async fn test_create_publishes_to_debates_list() {
        // テスト項目: 作成したディベートが保存され、debates-list に通知される
        // given (前提条件):
        let fixture = Fixture::new();
        let usecase = usecase(&fixture, fixture.points.clone());

        // when (操作):
        let debate = usecase
            .execute(input(t0() + Duration::minutes(30)))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(debate.status, DebateStatus::Scheduled);
        assert!(!debate.show_in_pulse);
        assert_eq!(
            fixture.repository.get_debate(&debate.id).await.unwrap(),
            debate
        );
        let events = fixture.broadcaster.take();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, RoomId::debates_list());
        assert_eq!(
            events[0].1,
            RoomEvent::DebateCreated {
                debate: Box::new(debate)
            }
        );
    }

    #[tokio::test]
    async fn test_daily_hosting_limit() {
        // テスト項目: 1 日に 2 つ目のディベートは作成できない
        // given (前提条件):
        let fixture = Fixture::new();
        let usecase = usecase(&fixture, fixture.points.clone());
        usecase.execute(input(t0())).await.unwrap();

        // when (操作):
        let second = usecase.execute(input(t0())).await;

        // then (期待する結果):
        assert_eq!(second, Err(DebateError::HostingLimitReached));
    }

    #[tokio::test]
    async fn test_temporarily_muted_host_refused() {
        // テスト項目: 一時ミュート中のユーザーはディベートを作成できない
        // given (前提条件):
        let fixture = Fixture::new();
        let mut points = MockPointsService::new();
        points
            .expect_is_temporarily_muted()
            .returning(|_, _| Ok(true));
        points.expect_can_host_debate().never();
        let usecase = usecase(&fixture, Arc::new(points));

        // when (操作):
        let result = usecase.execute(input(t0())).await;

        // then (期待する結果):
        assert_eq!(result, Err(DebateError::HostTemporarilyMuted));
        assert!(fixture.broadcaster.take().is_empty());
    }

    #[tokio::test]
    async fn test_validation_rules() {
        // テスト項目: タイトル長・期間・開始時刻の検証
        // given (前提条件):
        let fixture = Fixture::new();
        let usecase = usecase(&fixture, fixture.points.clone());

        let mut long_title = input(t0());
        long_title.title = "x".repeat(101);
        let mut blank_title = input(t0());
        blank_title.title = "   ".to_string();
        let mut odd_duration = input(t0());
        odd_duration.duration_minutes = 45;
        let past = input(t0() - Duration::minutes(2));
        let mut just_fits = input(t0() - Duration::seconds(30));
        just_fits.title = "y".repeat(100);

        // when (操作):
        let results = [
            usecase.execute(long_title).await,
            usecase.execute(blank_title).await,
            usecase.execute(odd_duration).await,
            usecase.execute(past).await,
        ];
        let accepted = usecase.execute(just_fits).await;

        // then (期待する結果):
        for result in results {
            assert!(matches!(result, Err(DebateError::Validation(_))));
        }
        assert_eq!(accepted.unwrap().status, DebateStatus::Active);
    }
}
