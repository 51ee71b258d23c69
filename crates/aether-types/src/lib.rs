//! Shared wire types for the Aether launcher.
//!
//! Two protocols cross the client/backend boundary:
//!
//! - the **query channel**, a persistent WebSocket carrying [`QueryRequest`]
//!   frames out and [`QueryReply`] frames back;
//! - the **launch endpoint**, a one-shot HTTP `POST /run` carrying a
//!   [`LaunchRequest`].
//!
//! Replies come in two shapes, a candidate list or a single literal value
//! (calculator output and similar). The current wire form tags the shape
//! explicitly and echoes the request's sequence number; the older untagged
//! form `{"message": [...] | "..."}` is still accepted and is told apart
//! structurally.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Query sent on every input change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Raw text of the input field
    pub message: String,
    /// Monotonic request number, echoed back by the backend
    pub seq: u64,
}

impl QueryRequest {
    pub fn new(message: impl Into<String>, seq: u64) -> Self {
        Self {
            message: message.into(),
            seq,
        }
    }
}

/// What a query resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// Ordered launchable candidates (may be empty)
    Candidates(Vec<String>),
    /// A single non-navigable value, e.g. `"4"` for `2+2`
    Literal(String),
}

/// Backend reply to a [`QueryRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawReply", into = "RawReply")]
pub struct QueryReply {
    /// Sequence number of the request this answers. `None` for legacy
    /// replies, which are taken to answer the most recent request.
    pub seq: Option<u64>,
    pub outcome: QueryOutcome,
}

impl QueryReply {
    pub fn candidates<I, S>(seq: u64, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            seq: Some(seq),
            outcome: QueryOutcome::Candidates(items.into_iter().map(Into::into).collect()),
        }
    }

    pub fn literal(seq: u64, value: impl Into<String>) -> Self {
        Self {
            seq: Some(seq),
            outcome: QueryOutcome::Literal(value.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ReplyKind {
    Candidates,
    Literal,
}

/// Wire shape shared by the tagged and legacy reply forms.
#[derive(Debug, Serialize, Deserialize)]
struct RawReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    seq: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kind: Option<ReplyKind>,
    message: serde_json::Value,
}

/// A reply frame that matches neither accepted shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidReply(String);

impl fmt::Display for InvalidReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid query reply: {}", self.0)
    }
}

impl std::error::Error for InvalidReply {}

fn candidate_list(values: Vec<serde_json::Value>) -> Result<Vec<String>, InvalidReply> {
    values
        .into_iter()
        .enumerate()
        .map(|(i, v)| match v {
            serde_json::Value::String(s) => Ok(s),
            other => Err(InvalidReply(format!(
                "candidate {i} is not a string: {other}"
            ))),
        })
        .collect()
}

/// Scalars other than strings show up from calculator backends as bare
/// numbers; they are displayed verbatim.
fn literal_value(value: serde_json::Value) -> Result<String, InvalidReply> {
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Bool(b) => Ok(b.to_string()),
        other => Err(InvalidReply(format!("expected a scalar message, got {other}"))),
    }
}

impl TryFrom<RawReply> for QueryReply {
    type Error = InvalidReply;

    fn try_from(raw: RawReply) -> Result<Self, Self::Error> {
        let outcome = match (raw.kind, raw.message) {
            (Some(ReplyKind::Candidates) | None, serde_json::Value::Array(items)) => {
                QueryOutcome::Candidates(candidate_list(items)?)
            }
            (Some(ReplyKind::Candidates), other) => {
                return Err(InvalidReply(format!(
                    "kind is candidates but message is {other}"
                )));
            }
            (Some(ReplyKind::Literal) | None, scalar) => QueryOutcome::Literal(literal_value(scalar)?),
        };

        Ok(Self {
            seq: raw.seq,
            outcome,
        })
    }
}

impl From<QueryReply> for RawReply {
    fn from(reply: QueryReply) -> Self {
        let (kind, message) = match reply.outcome {
            QueryOutcome::Candidates(items) => (
                ReplyKind::Candidates,
                serde_json::Value::Array(items.into_iter().map(serde_json::Value::String).collect()),
            ),
            QueryOutcome::Literal(value) => (ReplyKind::Literal, serde_json::Value::String(value)),
        };
        Self {
            seq: reply.seq,
            kind: Some(kind),
            message,
        }
    }
}

/// Body of `POST /run`.
///
/// Built at commit time from the current selection and consumed immediately
/// by the launch dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchRequest {
    /// Candidate to launch, or the literal query for a web search
    pub message: String,
    pub search_in_web: bool,
}

impl LaunchRequest {
    pub fn candidate(name: impl Into<String>) -> Self {
        Self {
            message: name.into(),
            search_in_web: false,
        }
    }

    pub fn web_search(query: impl Into<String>) -> Self {
        Self {
            message: query.into(),
            search_in_web: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_request_wire_format() {
        let req = QueryRequest::new("fire", 7);
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value, json!({"message": "fire", "seq": 7}));
    }

    #[test]
    fn test_legacy_list_reply_is_candidates() {
        let reply: QueryReply =
            serde_json::from_str(r#"{"message": ["Firefox", "Firewall Config"]}"#).unwrap();
        assert_eq!(reply.seq, None);
        assert_eq!(
            reply.outcome,
            QueryOutcome::Candidates(vec!["Firefox".into(), "Firewall Config".into()])
        );
    }

    #[test]
    fn test_legacy_scalar_reply_is_literal() {
        let reply: QueryReply = serde_json::from_str(r#"{"message": "4"}"#).unwrap();
        assert_eq!(reply.outcome, QueryOutcome::Literal("4".into()));
    }

    #[test]
    fn test_numeric_scalar_reply_is_stringified() {
        let reply: QueryReply = serde_json::from_str(r#"{"message": 4.5}"#).unwrap();
        assert_eq!(reply.outcome, QueryOutcome::Literal("4.5".into()));
    }

    #[test]
    fn test_tagged_reply_keeps_sequence() {
        let reply: QueryReply =
            serde_json::from_str(r#"{"seq": 3, "kind": "candidates", "message": []}"#).unwrap();
        assert_eq!(reply.seq, Some(3));
        assert_eq!(reply.outcome, QueryOutcome::Candidates(vec![]));
    }

    #[test]
    fn test_tagged_literal_serializes_with_kind() {
        let value = serde_json::to_value(QueryReply::literal(9, "42")).unwrap();
        assert_eq!(value, json!({"seq": 9, "kind": "literal", "message": "42"}));
    }

    #[test]
    fn test_kind_mismatch_is_rejected() {
        let err = serde_json::from_str::<QueryReply>(
            r#"{"seq": 1, "kind": "candidates", "message": "oops"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("candidates"));

        assert!(
            serde_json::from_str::<QueryReply>(r#"{"kind": "literal", "message": ["a"]}"#)
                .is_err()
        );
    }

    #[test]
    fn test_missing_message_is_rejected() {
        assert!(serde_json::from_str::<QueryReply>(r#"{"seq": 1}"#).is_err());
    }

    #[test]
    fn test_non_string_candidate_is_rejected() {
        let err = serde_json::from_str::<QueryReply>(r#"{"message": ["ok", 5]}"#).unwrap_err();
        assert!(err.to_string().contains("candidate 1"));
    }

    #[test]
    fn test_object_and_null_messages_are_rejected() {
        assert!(serde_json::from_str::<QueryReply>(r#"{"message": {"a": 1}}"#).is_err());
        assert!(serde_json::from_str::<QueryReply>(r#"{"message": null}"#).is_err());
    }

    #[test]
    fn test_launch_request_wire_format() {
        let value = serde_json::to_value(LaunchRequest::candidate("Firewall Config")).unwrap();
        assert_eq!(
            value,
            json!({"message": "Firewall Config", "searchInWeb": false})
        );

        let value = serde_json::to_value(LaunchRequest::web_search("fire")).unwrap();
        assert_eq!(value, json!({"message": "fire", "searchInWeb": true}));
    }
}
