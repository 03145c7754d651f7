//! Defensive navigation of flow results.
//!
//! The engine nests chat output as
//! `outputs[0].outputs[0].results.message.text`; nothing guarantees it.

use serde_json::Value;

/// JSON pointer to the first chat message text
pub const MESSAGE_TEXT_POINTER: &str = "/outputs/0/outputs/0/results/message/text";

/// The chat reply text, if the result has the conventional shape
pub fn message_text(result: &Value) -> Option<&str> {
    result.pointer(MESSAGE_TEXT_POINTER).and_then(Value::as_str)
}
