//! UseCase: ディベート一覧（ステータスの遅延更新を含む）
//!
//! 一覧に含まれる各ディベートも取得時と同じく現在時刻で再評価され、
//! 変化があれば永続化と `debate:status_changed` の通知が行われます。

use std::sync::Arc;

use agora_shared::time::Clock;

use crate::domain::{DebateRepository, DebateStatus, RoomBroadcaster, UserDirectory};

use super::{
    error::DebateError,
    get_debate::{DebateDetail, host_profile, load_refreshed},
    locks::DebateLocks,
};

/// Page size used when none (or an out-of-range one) is given.
pub const DEFAULT_PAGE_SIZE: usize = 50;
/// Largest page a caller may ask for.
pub const MAX_PAGE_SIZE: usize = 100;

/// Which slice of the debate list to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebatePage {
    pub status: Option<DebateStatus>,
    pub limit: usize,
    pub offset: usize,
}

impl DebatePage {
    /// Normalize raw paging input.
    ///
    /// A limit outside `1..=100` falls back to 50 and a negative offset to 0.
    pub fn new(status: Option<DebateStatus>, limit: Option<i64>, offset: Option<i64>) -> Self {
        let limit = limit
            .and_then(|limit| usize::try_from(limit).ok())
            .filter(|limit| (1..=MAX_PAGE_SIZE).contains(limit))
            .unwrap_or(DEFAULT_PAGE_SIZE);
        let offset = offset
            .and_then(|offset| usize::try_from(offset).ok())
            .unwrap_or(0);
        Self {
            status,
            limit,
            offset,
        }
    }
}

impl Default for DebatePage {
    fn default() -> Self {
        Self::new(None, None, None)
    }
}

/// One page of debates with their hosts.
#[derive(Debug, Clone, PartialEq)]
pub struct DebateListing {
    pub debates: Vec<DebateDetail>,
    pub limit: usize,
    pub offset: usize,
}

/// ディベート一覧のユースケース
pub struct ListDebatesUseCase {
    repository: Arc<dyn DebateRepository>,
    user_directory: Arc<dyn UserDirectory>,
    broadcaster: Arc<dyn RoomBroadcaster>,
    locks: Arc<DebateLocks>,
    clock: Arc<dyn Clock>,
}

impl ListDebatesUseCase {
    pub fn new(
        repository: Arc<dyn DebateRepository>,
        user_directory: Arc<dyn UserDirectory>,
        broadcaster: Arc<dyn RoomBroadcaster>,
        locks: Arc<DebateLocks>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            user_directory,
            broadcaster,
            locks,
            clock,
        }
    }

    /// 絞り込みは保存済みのステータスに対して行い、返す値は再評価後のもの
    pub async fn execute(&self, page: DebatePage) -> Result<DebateListing, DebateError> {
        let listed = self
            .repository
            .list_debates(page.status, page.limit, page.offset)
            .await?;
        let now = self.clock.now();

        let mut debates = Vec::with_capacity(listed.len());
        for stored in listed {
            let debate = match load_refreshed(
                self.repository.as_ref(),
                self.broadcaster.as_ref(),
                &self.locks,
                &stored.id,
                now,
            )
            .await
            {
                Ok(debate) => debate,
                // deleted between the listing and the refresh
                Err(DebateError::DebateNotFound(_)) => continue,
                Err(e) => return Err(e),
            };
            let host = host_profile(self.user_directory.as_ref(), &debate.host_id).await;
            debates.push(DebateDetail { debate, host });
        }

        tracing::debug!(
            count = debates.len(),
            limit = page.limit,
            offset = page.offset,
            "Debates listed"
        );
        Ok(DebateListing {
            debates,
            limit: page.limit,
            offset: page.offset,
        })
    }
}
