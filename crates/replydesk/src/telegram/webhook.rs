//! Parsing of webhook update payloads.
//!
//! Only the fields the inbox stores are read, and everything is optional so that
//! partial or unusual updates degrade instead of failing.

use serde::Serialize;
use serde_json::Value;

use crate::storage::NewMessage;

/// Status reported back to the platform for every webhook call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WebhookStatus {
    #[serde(rename = "ok")]
    Ok,
    #[serde(rename = "no data")]
    NoData,
    #[serde(rename = "no message")]
    NoMessage,
    #[serde(rename = "unauthorized")]
    Unauthorized,
}

/// The parts of an inbound chat message that get recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub user_id: String,
    pub user_name: Option<String>,
    pub text: String,
}

impl IncomingMessage {
    pub fn into_new_message(self) -> NewMessage {
        NewMessage::received_now(self.user_id, self.user_name, self.text)
    }
}

/// Result of reading a raw webhook body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedUpdate {
    /// Body missing, `null`, or not JSON
    NoData,
    /// JSON without a usable `message`
    NoMessage,
    Message(IncomingMessage),
}

/// Ids arrive as JSON numbers; strings are accepted too.
fn id_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

/// String field of a JSON object; anything that is not a string counts as absent.
fn str_field<'a>(object: Option<&'a Value>, key: &str) -> Option<&'a str> {
    object.and_then(|o| o.get(key)).and_then(Value::as_str)
}

/// Username when present, otherwise first and last name joined by a space.
fn display_name(sender: Option<&Value>) -> Option<String> {
    if let Some(username) = str_field(sender, "username").filter(|u| !u.is_empty()) {
        return Some(username.to_string());
    }

    let full_name = [str_field(sender, "first_name"), str_field(sender, "last_name")]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if full_name.is_empty() {
        None
    } else {
        Some(full_name)
    }
}

/// Parse a raw webhook request body.
///
/// Each field is read on its own, so a field of an unexpected type only
/// loses that field.
pub fn parse_update(body: &[u8]) -> ParsedUpdate {
    let value: Value = match serde_json::from_slice(body) {
        Ok(Value::Null) | Err(_) => return ParsedUpdate::NoData,
        Ok(value) => value,
    };

    let Some(message) = value.get("message").filter(|m| m.is_object()) else {
        return ParsedUpdate::NoMessage;
    };

    let sender = message.get("from");
    let user_id = message
        .get("chat")
        .and_then(|chat| chat.get("id"))
        .and_then(id_to_string)
        .or_else(|| sender.and_then(|s| s.get("id")).and_then(id_to_string));

    let Some(user_id) = user_id else {
        log::warn!("Webhook message has neither chat.id nor from.id, ignoring");
        return ParsedUpdate::NoMessage;
    };

    ParsedUpdate::Message(IncomingMessage {
        user_id,
        user_name: display_name(sender),
        text: str_field(Some(message), "text").unwrap_or_default().to_string(),
    })
}
