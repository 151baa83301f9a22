//! UseCase: 発言リクエスト
//!
//! 参加者が作成し、ホストが 1 度だけ承認・却下します。削除は直接行います。

use std::sync::Arc;

use agora_shared::time::Clock;

use crate::domain::{
    DebateId, DebateRepository, SpeakRequest, SpeakRequestId, SpeakRequestStatus, UserId,
};

use super::{error::DebateError, locks::DebateLocks};

/// 発言リクエストのユースケース
pub struct SpeakRequestUseCase {
    repository: Arc<dyn DebateRepository>,
    locks: Arc<DebateLocks>,
    clock: Arc<dyn Clock>,
}

impl SpeakRequestUseCase {
    pub fn new(
        repository: Arc<dyn DebateRepository>,
        locks: Arc<DebateLocks>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            locks,
            clock,
        }
    }

    pub async fn create(
        &self,
        debate_id: &DebateId,
        user_id: &UserId,
    ) -> Result<SpeakRequest, DebateError> {
        let _guard = self.locks.acquire(debate_id).await;
        self.repository.get_debate(debate_id).await?;

        let request = SpeakRequest::new(debate_id.clone(), user_id.clone(), self.clock.now());
        self.repository.create_speak_request(request.clone()).await?;
        tracing::info!(
            debate_id = %debate_id,
            user_id = %user_id,
            request_id = %request.id,
            "Speak request created"
        );
        Ok(request)
    }

    /// 作成順の一覧
    pub async fn list(&self, debate_id: &DebateId) -> Result<Vec<SpeakRequest>, DebateError> {
        Ok(self.repository.get_speak_requests(debate_id).await?)
    }

    /// ホストによる承認・却下
    pub async fn resolve(
        &self,
        debate_id: &DebateId,
        request_id: &SpeakRequestId,
        actor: &UserId,
        resolution: SpeakRequestStatus,
    ) -> Result<SpeakRequest, DebateError> {
        let _guard = self.locks.acquire(debate_id).await;

        let debate = self.repository.get_debate(debate_id).await?;
        if !debate.is_host(actor) {
            return Err(DebateError::NotHost);
        }

        let mut request = self
            .repository
            .get_speak_requests(debate_id)
            .await?
            .into_iter()
            .find(|r| &r.id == request_id)
            .ok_or_else(|| DebateError::SpeakRequestNotFound(request_id.to_string()))?;
        request.resolve(resolution)?;
        self.repository.update_speak_request(request.clone()).await?;
        tracing::info!(
            debate_id = %debate_id,
            request_id = %request_id,
            status = ?resolution,
            "Speak request resolved"
        );
        Ok(request)
    }

    pub async fn delete(
        &self,
        debate_id: &DebateId,
        request_id: &SpeakRequestId,
    ) -> Result<(), DebateError> {
        let _guard = self.locks.acquire(debate_id).await;
        self.repository
            .delete_speak_request(debate_id, request_id)
            .await?;
        Ok(())
    }
}
