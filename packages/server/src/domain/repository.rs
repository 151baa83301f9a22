//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! ## 集計値の扱い
//!
//! `Debate::agree_count` / `disagree_count` は Repository が参加者テーブルから
//! 導出する値です。参加者を変更するメソッドは同じロックの中で集計し直し、
//! `update_debate` は呼び出し側が渡した集計値を無視します。

use async_trait::async_trait;

use super::{
    entity::{Debate, Participant, SpeakRequest},
    error::RepositoryError,
    value_object::{DebateId, DebateStatus, SpeakRequestId, UserId},
};

/// Debate Repository trait
///
/// UseCase 層はこの trait に依存し、Infrastructure 層の具体的な実装には依存しない。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DebateRepository: Send + Sync {
    /// ディベートを登録
    async fn create_debate(&self, debate: Debate) -> Result<(), RepositoryError>;

    /// ディベートを取得（集計値は参加者テーブルから導出済み）
    async fn get_debate(&self, debate_id: &DebateId) -> Result<Debate, RepositoryError>;

    /// ディベート一覧を取得（作成日時の新しい順、`status` 指定時はそのステータスのみ）
    async fn list_debates(
        &self,
        status: Option<DebateStatus>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Debate>, RepositoryError>;

    /// ディベートを参加者・発言リクエストごと削除し、削除したディベートを返す
    async fn delete_debate(&self, debate_id: &DebateId) -> Result<Debate, RepositoryError>;

    /// ディベートを更新（集計値は上書きされない）
    async fn update_debate(&self, debate: Debate) -> Result<(), RepositoryError>;

    /// 退出していない参加者を取得
    async fn get_participants(
        &self,
        debate_id: &DebateId,
    ) -> Result<Vec<Participant>, RepositoryError>;

    /// 退出済みを含む全参加履歴を取得
    async fn get_all_participants(
        &self,
        debate_id: &DebateId,
    ) -> Result<Vec<Participant>, RepositoryError>;

    /// 参加者を追加（同じユーザーの記録が既にあればエラー）
    async fn add_participant(&self, participant: Participant) -> Result<(), RepositoryError>;

    /// 参加者の記録を置き換え
    async fn update_participant(&self, participant: Participant) -> Result<(), RepositoryError>;

    /// 参加者の記録を物理削除
    async fn remove_participant(
        &self,
        debate_id: &DebateId,
        user_id: &UserId,
    ) -> Result<(), RepositoryError>;

    /// 発言リクエストを登録
    async fn create_speak_request(&self, request: SpeakRequest) -> Result<(), RepositoryError>;

    /// 発言リクエストを置き換え
    async fn update_speak_request(&self, request: SpeakRequest) -> Result<(), RepositoryError>;

    /// 発言リクエストを作成順に取得
    async fn get_speak_requests(
        &self,
        debate_id: &DebateId,
    ) -> Result<Vec<SpeakRequest>, RepositoryError>;

    /// 発言リクエストを削除（存在しなくてもエラーにしない）
    async fn delete_speak_request(
        &self,
        debate_id: &DebateId,
        request_id: &SpeakRequestId,
    ) -> Result<(), RepositoryError>;
}
