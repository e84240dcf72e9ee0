//! ルームの参加資格の確認

use crate::domain::{RepositoryError, RoomId, RoomRepository, UserId};

/// 参加資格の確認結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Membership {
    Member,
    NotMember,
    LookupFailed(RepositoryError),
}

/// ユーザーがルームのメンバーかどうかを確認
///
/// 存在しないルームはメンバーなしとして扱う。
pub(crate) async fn check_membership(
    room_repository: &dyn RoomRepository,
    room_id: &RoomId,
    user_id: &UserId,
) -> Membership {
    match room_repository.find_room_members(room_id).await {
        Ok(members) if members.contains(user_id) => Membership::Member,
        Ok(_) | Err(RepositoryError::RoomNotFound(_)) => Membership::NotMember,
        Err(e) => Membership::LookupFailed(e),
    }
}
