//! InMemory Debate Repository 実装
//!
//! ドメイン層が定義する DebateRepository trait の具体的な実装。
//! HashMap をインメモリ DB として使用し、全テーブルを 1 つの Mutex で保護します。
//!
//! 参加者テーブルを変更する操作は、同じロックの中でディベートの
//! `agree_count` / `disagree_count` を参加者から再集計します。
//! 集計値はカウンタを増減させるのではなく常に導出されるため、
//! どの経路で参加者が変更されてもずれは生じません。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    Debate, DebateId, DebateRepository, DebateStatus, Participant, RepositoryError, SideTally, SpeakRequest,
    SpeakRequestId, UserId,
};

#[derive(Default)]
struct DebateTables {
    debates: HashMap<DebateId, Debate>,
    /// debate_id -> 全参加履歴（退出済みを含む）
    participants: HashMap<DebateId, Vec<Participant>>,
    /// debate_id -> 作成順の発言リクエスト
    speak_requests: HashMap<DebateId, Vec<SpeakRequest>>,
}

impl DebateTables {
    fn debate_mut(&mut self, debate_id: &DebateId) -> Result<&mut Debate, RepositoryError> {
        self.debates
            .get_mut(debate_id)
            .ok_or_else(|| RepositoryError::DebateNotFound(debate_id.to_string()))
    }

    fn ensure_debate(&self, debate_id: &DebateId) -> Result<(), RepositoryError> {
        if self.debates.contains_key(debate_id) {
            Ok(())
        } else {
            Err(RepositoryError::DebateNotFound(debate_id.to_string()))
        }
    }

    /// 参加者テーブルからディベートの集計値を導出し直す
    fn retally(&mut self, debate_id: &DebateId) {
        let tally = SideTally::from_participants(
            self.participants.get(debate_id).into_iter().flatten(),
        );
        if let Some(debate) = self.debates.get_mut(debate_id) {
            debate.apply_tally(tally);
            tracing::debug!(
                debate_id = %debate_id,
                agree = tally.agree,
                disagree = tally.disagree,
                "Side counts recomputed"
            );
        }
    }
}

/// インメモリ Debate Repository 実装
#[derive(Default)]
pub struct InMemoryDebateRepository {
    tables: Mutex<DebateTables>,
}

impl InMemoryDebateRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DebateRepository for InMemoryDebateRepository {
    async fn create_debate(&self, debate: Debate) -> Result<(), RepositoryError> {
        let mut tables = self.tables.lock().await;
        if tables.debates.contains_key(&debate.id) {
            return Err(RepositoryError::DebateAlreadyExists(debate.id.to_string()));
        }
        let debate_id = debate.id.clone();
        tables.debates.insert(debate_id.clone(), debate);
        tables.retally(&debate_id);
        Ok(())
    }

    async fn get_debate(&self, debate_id: &DebateId) -> Result<Debate, RepositoryError> {
        let tables = self.tables.lock().await;
        tables
            .debates
            .get(debate_id)
            .cloned()
            .ok_or_else(|| RepositoryError::DebateNotFound(debate_id.to_string()))
    }

    async fn list_debates(
        &self,
        status: Option<DebateStatus>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Debate>, RepositoryError> {
        let tables = self.tables.lock().await;
        let mut debates: Vec<&Debate> = tables
            .debates
            .values()
            .filter(|d| status.is_none_or(|status| d.status == status))
            .collect();
        debates.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(debates
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn delete_debate(&self, debate_id: &DebateId) -> Result<Debate, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let debate = tables
            .debates
            .remove(debate_id)
            .ok_or_else(|| RepositoryError::DebateNotFound(debate_id.to_string()))?;
        tables.participants.remove(debate_id);
        tables.speak_requests.remove(debate_id);
        Ok(debate)
    }

    async fn update_debate(&self, debate: Debate) -> Result<(), RepositoryError> {
        let mut tables = self.tables.lock().await;
        let stored = tables.debate_mut(&debate.id)?;
        let (agree, disagree) = (stored.agree_count, stored.disagree_count);
        *stored = debate;
        stored.agree_count = agree;
        stored.disagree_count = disagree;
        Ok(())
    }

    async fn get_participants(
        &self,
        debate_id: &DebateId,
    ) -> Result<Vec<Participant>, RepositoryError> {
        let tables = self.tables.lock().await;
        tables.ensure_debate(debate_id)?;
        Ok(tables
            .participants
            .get(debate_id)
            .into_iter()
            .flatten()
            .filter(|p| p.is_active())
            .cloned()
            .collect())
    }

    async fn get_all_participants(
        &self,
        debate_id: &DebateId,
    ) -> Result<Vec<Participant>, RepositoryError> {
        let tables = self.tables.lock().await;
        tables.ensure_debate(debate_id)?;
        Ok(tables
            .participants
            .get(debate_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn add_participant(&self, participant: Participant) -> Result<(), RepositoryError> {
        let mut tables = self.tables.lock().await;
        tables.ensure_debate(&participant.debate_id)?;

        let debate_id = participant.debate_id.clone();
        let records = tables.participants.entry(debate_id.clone()).or_default();
        if records.iter().any(|p| p.user_id == participant.user_id) {
            return Err(RepositoryError::ParticipantAlreadyExists(
                participant.user_id.to_string(),
            ));
        }
        records.push(participant);
        tables.retally(&debate_id);
        Ok(())
    }

    async fn update_participant(&self, participant: Participant) -> Result<(), RepositoryError> {
        let mut tables = self.tables.lock().await;
        tables.ensure_debate(&participant.debate_id)?;

        let debate_id = participant.debate_id.clone();
        let slot = tables
            .participants
            .get_mut(&debate_id)
            .and_then(|records| records.iter_mut().find(|p| p.user_id == participant.user_id))
            .ok_or_else(|| RepositoryError::ParticipantNotFound(participant.user_id.to_string()))?;
        *slot = participant;
        tables.retally(&debate_id);
        Ok(())
    }

    async fn remove_participant(
        &self,
        debate_id: &DebateId,
        user_id: &UserId,
    ) -> Result<(), RepositoryError> {
        let mut tables = self.tables.lock().await;
        tables.ensure_debate(debate_id)?;

        let records = tables
            .participants
            .get_mut(debate_id)
            .ok_or_else(|| RepositoryError::ParticipantNotFound(user_id.to_string()))?;
        let before = records.len();
        records.retain(|p| &p.user_id != user_id);
        if records.len() == before {
            return Err(RepositoryError::ParticipantNotFound(user_id.to_string()));
        }
        tables.retally(debate_id);
        Ok(())
    }

    async fn create_speak_request(&self, request: SpeakRequest) -> Result<(), RepositoryError> {
        let mut tables = self.tables.lock().await;
        tables.ensure_debate(&request.debate_id)?;

        let requests = tables
            .speak_requests
            .entry(request.debate_id.clone())
            .or_default();
        if requests.iter().any(|r| r.id == request.id) {
            return Err(RepositoryError::SpeakRequestAlreadyExists(
                request.id.to_string(),
            ));
        }
        requests.push(request);
        Ok(())
    }

    async fn update_speak_request(&self, request: SpeakRequest) -> Result<(), RepositoryError> {
        let mut tables = self.tables.lock().await;
        let slot = tables
            .speak_requests
            .get_mut(&request.debate_id)
            .and_then(|requests| requests.iter_mut().find(|r| r.id == request.id))
            .ok_or_else(|| RepositoryError::SpeakRequestNotFound(request.id.to_string()))?;
        *slot = request;
        Ok(())
    }

    async fn get_speak_requests(
        &self,
        debate_id: &DebateId,
    ) -> Result<Vec<SpeakRequest>, RepositoryError> {
        let tables = self.tables.lock().await;
        tables.ensure_debate(debate_id)?;
        Ok(tables
            .speak_requests
            .get(debate_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn delete_speak_request(
        &self,
        debate_id: &DebateId,
        request_id: &SpeakRequestId,
    ) -> Result<(), RepositoryError> {
        let mut tables = self.tables.lock().await;
        if let Some(requests) = tables.speak_requests.get_mut(debate_id) {
            requests.retain(|r| &r.id != request_id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DebateType, NewDebate, Side, SpeakRequestStatus};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - InMemoryDebateRepository の CRUD 操作
    // - 参加者変更のたびに agree / disagree の集計値が導出し直されること
    // - 退出済みの参加者が active 一覧から除外され、全履歴には残ること
    //
    // 【なぜこのテストが必要か】
    // - 集計値の不変条件（active 参加者数と一致）は Repository が保証する
    // - 参加ポイントの冪等性は全履歴の取得に依存している
    // ========================================

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap()
    }

    fn user(id: &str) -> UserId {
        UserId::new(id.to_string()).unwrap()
    }

    fn debate_created_at(title: &str, created_at: DateTime<Utc>) -> Debate {
        Debate::schedule(
            NewDebate {
                title: title.to_string(),
                description: String::new(),
                category: String::new(),
                host_id: user("host"),
                debate_type: DebateType::Public,
                start_time: created_at,
                duration_minutes: 60,
                show_in_pulse: true,
            },
            created_at,
        )
    }

    async fn repository_with_debate() -> (InMemoryDebateRepository, Debate) {
        let repo = InMemoryDebateRepository::new();
        let debate = debate_created_at("Remote work", now());
        repo.create_debate(debate.clone()).await.unwrap();
        (repo, debate)
    }

    #[tokio::test]
    async fn test_add_participant_updates_side_counts() {
        // テスト項目: 参加者追加で該当 side の集計値が増える
        // given (前提条件):
        let (repo, debate) = repository_with_debate().await;

        // when (操作):
        repo.add_participant(Participant::join(&debate, user("a"), Some(Side::Agree), now()))
            .await
            .unwrap();
        repo.add_participant(Participant::join(&debate, user("b"), Some(Side::Disagree), now()))
            .await
            .unwrap();
        repo.add_participant(Participant::join(&debate, user("c"), Some(Side::Neutral), now()))
            .await
            .unwrap();

        // then (期待する結果):
        let stored = repo.get_debate(&debate.id).await.unwrap();
        assert_eq!(stored.agree_count, 1);
        assert_eq!(stored.disagree_count, 1);
    }

    #[tokio::test]
    async fn test_add_participant_rejects_duplicate_user() {
        // テスト項目: 同じユーザーの記録を二重に追加できない
        // given (前提条件):
        let (repo, debate) = repository_with_debate().await;
        repo.add_participant(Participant::join(&debate, user("a"), None, now()))
            .await
            .unwrap();

        // when (操作):
        let result = repo
            .add_participant(Participant::join(&debate, user("a"), None, now()))
            .await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(RepositoryError::ParticipantAlreadyExists("a".to_string()))
        );
    }

    #[tokio::test]
    async fn test_soft_left_participant_is_hidden_but_kept_in_history() {
        // テスト項目: 退出済みの参加者は active 一覧から消え、履歴には残る
        // given (前提条件):
        let (repo, debate) = repository_with_debate().await;
        let mut participant = Participant::join(&debate, user("a"), Some(Side::Agree), now());
        repo.add_participant(participant.clone()).await.unwrap();

        // when (操作):
        participant.leave(now());
        repo.update_participant(participant).await.unwrap();

        // then (期待する結果):
        assert!(repo.get_participants(&debate.id).await.unwrap().is_empty());
        assert_eq!(repo.get_all_participants(&debate.id).await.unwrap().len(), 1);
        assert_eq!(repo.get_debate(&debate.id).await.unwrap().agree_count, 0);
    }

    #[tokio::test]
    async fn test_update_debate_cannot_overwrite_counts() {
        // テスト項目: update_debate で集計値を書き換えることはできない
        // given (前提条件):
        let (repo, debate) = repository_with_debate().await;
        repo.add_participant(Participant::join(&debate, user("a"), Some(Side::Agree), now()))
            .await
            .unwrap();

        // when (操作):
        let mut tampered = repo.get_debate(&debate.id).await.unwrap();
        tampered.agree_count = 42;
        tampered.title = "Renamed".to_string();
        repo.update_debate(tampered).await.unwrap();

        // then (期待する結果):
        let stored = repo.get_debate(&debate.id).await.unwrap();
        assert_eq!(stored.agree_count, 1);
        assert_eq!(stored.title, "Renamed");
    }

    #[tokio::test]
    async fn test_remove_participant_updates_counts_and_reports_missing() {
        // テスト項目: 物理削除で集計値が減り、存在しない参加者はエラーになる
        // given (前提条件):
        let (repo, debate) = repository_with_debate().await;
        repo.add_participant(Participant::join(&debate, user("a"), Some(Side::Disagree), now()))
            .await
            .unwrap();

        // when (操作):
        let first = repo.remove_participant(&debate.id, &user("a")).await;
        let second = repo.remove_participant(&debate.id, &user("a")).await;

        // then (期待する結果):
        assert!(first.is_ok());
        assert_eq!(
            second,
            Err(RepositoryError::ParticipantNotFound("a".to_string()))
        );
        assert_eq!(repo.get_debate(&debate.id).await.unwrap().disagree_count, 0);
    }

    #[tokio::test]
    async fn test_operations_on_unknown_debate_fail() {
        // テスト項目: 存在しないディベートへの操作は DebateNotFound になる
        // given (前提条件):
        let repo = InMemoryDebateRepository::new();
        let missing = DebateId::new("missing".to_string()).unwrap();

        // when (操作):
        let debate = repo.get_debate(&missing).await;
        let participants = repo.get_participants(&missing).await;

        // then (期待する結果):
        assert_eq!(
            debate,
            Err(RepositoryError::DebateNotFound("missing".to_string()))
        );
        assert_eq!(
            participants,
            Err(RepositoryError::DebateNotFound("missing".to_string()))
        );
    }

    #[tokio::test]
    async fn test_speak_requests_keep_creation_order() {
        // テスト項目: 発言リクエストは作成順に取得でき、更新・削除できる
        // given (前提条件):
        let (repo, debate) = repository_with_debate().await;
        let first = SpeakRequest::new(debate.id.clone(), user("a"), now());
        let second = SpeakRequest::new(debate.id.clone(), user("b"), now());
        repo.create_speak_request(first.clone()).await.unwrap();
        repo.create_speak_request(second.clone()).await.unwrap();

        // when (操作):
        let mut approved = first.clone();
        approved.resolve(SpeakRequestStatus::Approved).unwrap();
        repo.update_speak_request(approved).await.unwrap();
        repo.delete_speak_request(&debate.id, &second.id).await.unwrap();

        // then (期待する結果):
        let requests = repo.get_speak_requests(&debate.id).await.unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].id, first.id);
        assert_eq!(requests[0].status, SpeakRequestStatus::Approved);
    }

    #[tokio::test]
    async fn test_list_debates_newest_first_with_filter_and_paging() {
        // テスト項目: 一覧は新しい順に並び、ステータス絞り込みとページングが効く
        // given (前提条件):
        let repo = InMemoryDebateRepository::new();
        let oldest = debate_created_at("oldest", now());
        let middle = debate_created_at("middle", now() + Duration::minutes(1));
        let mut newest = debate_created_at("newest", now() + Duration::minutes(2));
        newest.status = DebateStatus::Ended;
        for debate in [&oldest, &newest, &middle] {
            repo.create_debate(debate.clone()).await.unwrap();
        }

        // when (操作):
        let all = repo.list_debates(None, 50, 0).await.unwrap();
        let active = repo
            .list_debates(Some(DebateStatus::Active), 50, 0)
            .await
            .unwrap();
        let second_page = repo.list_debates(None, 2, 2).await.unwrap();
        let past_end = repo.list_debates(None, 2, 10).await.unwrap();

        // then (期待する結果):
        fn titles(debates: &[Debate]) -> Vec<&str> {
            debates.iter().map(|d| d.title.as_str()).collect()
        }
        assert_eq!(titles(&all), vec!["newest", "middle", "oldest"]);
        assert_eq!(titles(&active), vec!["middle", "oldest"]);
        assert_eq!(titles(&second_page), vec!["oldest"]);
        assert!(past_end.is_empty());
    }

    #[tokio::test]
    async fn test_delete_debate_drops_participants_and_speak_requests() {
        // テスト項目: 削除でディベートと付随する参加者・発言リクエストが消える
        // given (前提条件):
        let (repo, debate) = repository_with_debate().await;
        repo.add_participant(Participant::join(&debate, user("a"), Some(Side::Agree), now()))
            .await
            .unwrap();
        repo.create_speak_request(SpeakRequest::new(debate.id.clone(), user("a"), now()))
            .await
            .unwrap();

        // when (操作):
        let deleted = repo.delete_debate(&debate.id).await.unwrap();
        let again = repo.delete_debate(&debate.id).await;

        // then (期待する結果):
        assert_eq!(deleted.id, debate.id);
        assert_eq!(deleted.agree_count, 1);
        assert_eq!(
            repo.get_debate(&debate.id).await,
            Err(RepositoryError::DebateNotFound(debate.id.to_string()))
        );
        assert_eq!(
            again,
            Err(RepositoryError::DebateNotFound(debate.id.to_string()))
        );
        let tables = repo.tables.lock().await;
        assert!(!tables.participants.contains_key(&debate.id));
        assert!(!tables.speak_requests.contains_key(&debate.id));
    }
}
