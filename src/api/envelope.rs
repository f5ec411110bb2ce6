use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{Failure, STATUS_OK};

/// Response envelope every backend endpoint wraps its payload in:
/// `{ statuscode, data, message? }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub statuscode: i64,
    #[serde(default)]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Envelope {
    pub fn ok(data: Value) -> Self {
        Self {
            statuscode: STATUS_OK,
            data,
            message: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.statuscode == STATUS_OK
    }

    /// Unwrap the payload, turning a non-200 application status into a
    /// business failure.
    pub fn into_data(self) -> Result<Value, Failure> {
        if self.is_ok() {
            Ok(self.data)
        } else {
            Err(Failure::business(Some(self.statuscode), self.message))
        }
    }

    /// Pull a displayable message out of an arbitrary error body, if any
    pub fn message_from_body(body: &[u8]) -> Option<String> {
        let value: Value = serde_json::from_slice(body).ok()?;
        ["message", "error"]
            .iter()
            .find_map(|field| value.get(field).and_then(Value::as_str))
            .map(str::to_string)
            .filter(|m| !m.trim().is_empty())
    }
}
