//! Which messages a requester is allowed to read.

use lobby_database::{ChatMessage, MessageKind};

/// Normal and status messages are public. Private messages are visible only
/// to their sender and recipient, and never to an anonymous reader.
pub fn is_visible_to(message: &ChatMessage, requester: Option<&str>) -> bool {
    match message.kind {
        MessageKind::Normal | MessageKind::Status => true,
        MessageKind::Private => {
            requester.is_some_and(|user| message.from == user || message.to == user)
        }
    }
}

/// Filter `log` for `requester`, keeping order. With a `limit`, only the
/// last `limit` visible messages are returned.
pub fn visible(
    log: &[ChatMessage],
    requester: Option<&str>,
    limit: Option<usize>,
) -> Vec<ChatMessage> {
    let filtered: Vec<&ChatMessage> = log
        .iter()
        .filter(|message| is_visible_to(message, requester))
        .collect();

    let skip = limit.map_or(0, |limit| filtered.len().saturating_sub(limit));
    filtered.into_iter().skip(skip).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lobby_database::EVERYONE;

    fn message(id: i64, from: &str, to: &str, kind: MessageKind) -> ChatMessage {
        ChatMessage {
            id,
            from: from.to_string(),
            to: to.to_string(),
            text: format!("text {id}"),
            kind,
            time: "12:00:00".to_string(),
        }
    }

    fn sample_log() -> Vec<ChatMessage> {
        vec![
            message(1, "Ann", EVERYONE, MessageKind::Status),
            message(2, "Ann", EVERYONE, MessageKind::Normal),
            message(3, "Ann", "Bob", MessageKind::Private),
            message(4, "Cid", "Ann", MessageKind::Private),
            message(5, "Bob", EVERYONE, MessageKind::Normal),
        ]
    }

    fn ids(messages: &[ChatMessage]) -> Vec<i64> {
        messages.iter().map(|m| m.id).collect()
    }

    #[test]
    fn private_messages_reach_sender_and_recipient_only() {
        let log = sample_log();

        assert_eq!(ids(&visible(&log, Some("Ann"), None)), vec![1, 2, 3, 4, 5]);
        assert_eq!(ids(&visible(&log, Some("Bob"), None)), vec![1, 2, 3, 5]);
        assert_eq!(ids(&visible(&log, Some("Cid"), None)), vec![1, 2, 4, 5]);
        assert_eq!(ids(&visible(&log, Some("Dee"), None)), vec![1, 2, 5]);
    }

    #[test]
    fn anonymous_reader_never_sees_private_messages() {
        assert_eq!(ids(&visible(&sample_log(), None, None)), vec![1, 2, 5]);
    }

    #[test]
    fn limit_keeps_the_tail_of_the_filtered_log() {
        let log = sample_log();
        let full = visible(&log, Some("Bob"), None);
        let limited = visible(&log, Some("Bob"), Some(2));

        assert_eq!(limited, full[full.len() - 2..].to_vec());
        assert_eq!(ids(&limited), vec![3, 5]);
    }

    #[test]
    fn limit_edge_cases() {
        let log = sample_log();

        assert!(visible(&log, Some("Ann"), Some(0)).is_empty());
        assert_eq!(visible(&log, Some("Ann"), Some(50)).len(), 5);
        assert!(visible(&[], Some("Ann"), Some(3)).is_empty());
    }
}
