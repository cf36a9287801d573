//! 在室者レジストリ
//!
//! 接続 ID → Identity の対応を保持します。1 つの接続につきエントリは高々 1 件です。

use std::collections::HashMap;

use super::{
    entity::{Identity, RosterEntry},
    error::PresenceError,
    value_object::ConnectionId,
};

/// Registry of joined connections
#[derive(Debug, Default)]
pub struct PresenceRegistry {
    entries: HashMap<ConnectionId, Identity>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 参加者を登録
    ///
    /// 同じ接続が既に登録済みの場合は何もせずエラーを返します（二重 join 対策）。
    pub fn register(
        &mut self,
        connection_id: ConnectionId,
        identity: Identity,
    ) -> Result<(), PresenceError> {
        if self.entries.contains_key(&connection_id) {
            return Err(PresenceError::AlreadyRegistered(connection_id));
        }
        self.entries.insert(connection_id, identity);
        Ok(())
    }

    /// 参加者を削除し、登録されていた Identity を返す
    pub fn unregister(&mut self, connection_id: &ConnectionId) -> Option<Identity> {
        self.entries.remove(connection_id)
    }

    pub fn get(&self, connection_id: &ConnectionId) -> Option<&Identity> {
        self.entries.get(connection_id)
    }

    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.entries.contains_key(connection_id)
    }

    /// 在室者リストのスナップショット
    ///
    /// 順序に意味はありませんが、出力を安定させるため入室時刻・表示名の順に並べます。
    pub fn snapshot(&self) -> Vec<RosterEntry> {
        let mut identities: Vec<&Identity> = self.entries.values().collect();
        identities.sort_by(|a, b| {
            a.joined_at
                .cmp(&b.joined_at)
                .then_with(|| a.user_name.as_str().cmp(b.user_name.as_str()))
        });
        identities.into_iter().map(Identity::roster_entry).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
