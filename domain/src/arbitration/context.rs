//! Summons context handed to the judicial role.

use crate::envelope::{EnvelopeId, LogEntry};
use crate::role::Role;
use crate::role::factions::{CREATIVE_ROLES, SUPERVISORY_ROLES};
use serde::{Deserialize, Serialize};

/// Creative-faction messages included in a summons
pub const PLAINTIFF_SNAPSHOT_LIMIT: usize = 3;
/// Supervisory-faction messages included in a summons
pub const DEFENDANT_SNAPSHOT_LIMIT: usize = 2;

const EXCERPT_CHARS: usize = 160;

/// Compact reference to a logged message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageDigest {
    pub id: EnvelopeId,
    pub origin: Role,
    pub tick: u64,
    pub schema_id: String,
    pub excerpt: String,
}

/// Two-faction snapshot attached to the summons envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArbitrationContext {
    pub signature: String,
    pub cycle: u32,
    pub plaintiffs: Vec<Role>,
    pub defendants: Vec<Role>,
    pub plaintiff_snapshot: Vec<MessageDigest>,
    pub defendant_snapshot: Vec<MessageDigest>,
}

impl ArbitrationContext {
    /// Build the summons context from the most recent messages in `log`.
    pub fn summon(signature: impl Into<String>, cycle: u32, log: &[LogEntry]) -> Self {
        let plaintiff_snapshot = recent_from(log, &CREATIVE_ROLES, PLAINTIFF_SNAPSHOT_LIMIT);
        let defendant_snapshot = recent_from(log, &SUPERVISORY_ROLES, DEFENDANT_SNAPSHOT_LIMIT);
        Self {
            signature: signature.into(),
            cycle,
            plaintiffs: parties(&plaintiff_snapshot, &CREATIVE_ROLES),
            defendants: parties(&defendant_snapshot, &SUPERVISORY_ROLES),
            plaintiff_snapshot,
            defendant_snapshot,
        }
    }
}

/// Up to `limit` most recent messages from `faction`, newest first.
fn recent_from(log: &[LogEntry], faction: &[Role], limit: usize) -> Vec<MessageDigest> {
    log.iter()
        .rev()
        .filter_map(LogEntry::as_message)
        .filter(|env| faction.contains(&env.origin()))
        .take(limit)
        .map(|env| MessageDigest {
            id: env.id().clone(),
            origin: env.origin(),
            tick: env.tick(),
            schema_id: env.schema_id().to_string(),
            excerpt: excerpt(env.payload()),
        })
        .collect()
}

/// Distinct speakers in the snapshot, or the whole faction when it is silent.
fn parties(snapshot: &[MessageDigest], faction: &[Role]) -> Vec<Role> {
    let mut roles: Vec<Role> = Vec::new();
    for digest in snapshot {
        if !roles.contains(&digest.origin) {
            roles.push(digest.origin);
        }
    }
    if roles.is_empty() {
        roles.extend_from_slice(faction);
    }
    roles
}

fn excerpt(payload: &serde_json::Value) -> String {
    let text = payload
        .get("summary")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| payload.to_string());
    text.chars().take(EXCERPT_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::Envelope;
    use serde_json::json;

    fn message(seq: u64, origin: Role) -> LogEntry {
        LogEntry::Message(
            Envelope::new(EnvelopeId::sequential(seq), origin, vec![], seq)
                .with_payload("note.v1", json!({"summary": format!("note {}", seq)})),
        )
    }

    #[test]
    fn test_summon_takes_most_recent_per_faction() {
        let log = vec![
            message(1, Role::Creative),
            message(2, Role::Ethics),
            message(3, Role::Visionary),
            message(4, Role::Legal),
            message(5, Role::Critic),
            message(6, Role::Narrative),
            message(7, Role::Creative),
            message(8, Role::Memory),
        ];
        let ctx = ArbitrationContext::summon("loop:echo", 0, &log);
        let plaintiff_ids: Vec<u64> = ctx.plaintiff_snapshot.iter().map(|d| d.tick).collect();
        assert_eq!(plaintiff_ids, vec![7, 6, 3]);
        let defendant_ids: Vec<u64> = ctx.defendant_snapshot.iter().map(|d| d.tick).collect();
        assert_eq!(defendant_ids, vec![5, 4]);
        assert_eq!(
            ctx.plaintiffs,
            vec![Role::Creative, Role::Narrative, Role::Visionary]
        );
        assert_eq!(ctx.defendants, vec![Role::Critic, Role::Legal]);
        assert_eq!(ctx.plaintiff_snapshot[0].excerpt, "note 7");
    }

    #[test]
    fn test_silent_faction_defaults_to_all_members() {
        let ctx = ArbitrationContext::summon("x", 0, &[message(1, Role::Memory)]);
        assert!(ctx.plaintiff_snapshot.is_empty());
        assert_eq!(ctx.plaintiffs, CREATIVE_ROLES.to_vec());
    }
}
