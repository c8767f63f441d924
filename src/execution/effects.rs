use crate::errors::ExecutorError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use strum_macros::{Display, EnumString};

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, EnumString, Serialize, Deserialize)]
pub enum OutputState {
    ObjectWrite,
    PackageWrite,
    DoesNotExist,
}

impl OutputState {
    pub fn is_live(&self) -> bool {
        matches!(self, OutputState::ObjectWrite)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangedObject {
    pub object_id: String,
    pub output_state: OutputState,
    #[serde(default, deserialize_with = "u64_from_str_or_num")]
    pub output_version: Option<u64>,
    #[serde(default)]
    pub output_digest: Option<String>,
    #[serde(default)]
    pub output_owner: Option<Value>,
    #[serde(default)]
    pub object_type: Option<String>,
}

impl ChangedObject {
    pub fn written(object_id: impl Into<String>, version: u64, digest: impl Into<String>) -> Self {
        Self {
            object_id: object_id.into(),
            output_state: OutputState::ObjectWrite,
            output_version: Some(version),
            output_digest: Some(digest.into()),
            output_owner: None,
            object_type: None,
        }
    }

    pub fn deleted(object_id: impl Into<String>) -> Self {
        Self {
            object_id: object_id.into(),
            output_state: OutputState::DoesNotExist,
            output_version: None,
            output_digest: None,
            output_owner: None,
            object_type: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ExecutionStatus {
    #[default]
    Success,
    Failure {
        error: String,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEffects {
    #[serde(default)]
    pub status: ExecutionStatus,
    #[serde(default)]
    pub changed_objects: Vec<ChangedObject>,
}

/// Outcome of one accepted submission: the network-assigned digest, the effects and the raw
/// response as returned by the submit capability.
#[derive(Clone, Debug, PartialEq)]
pub struct ExecutionResult {
    pub digest: String,
    pub effects: Option<TransactionEffects>,
    pub raw: Value,
}

#[derive(Deserialize)]
struct ResponseBody {
    digest: String,
    #[serde(default)]
    effects: Option<TransactionEffects>,
}

impl ExecutionResult {
    /// Parses a submit response. Accepts either the bare result object or a JSON-RPC envelope
    /// with a `result` field.
    pub fn from_response(response: Value) -> Result<Self, ExecutorError> {
        let body = match response.get("result") {
            Some(result) if result.is_object() => result.clone(),
            _ => response.clone(),
        };
        let parsed: ResponseBody =
            serde_json::from_value(body).map_err(|e| ExecutorError::InvalidResponse(e.to_string()))?;
        Ok(Self { digest: parsed.digest, effects: parsed.effects, raw: response })
    }

    pub fn is_success(&self) -> bool {
        self.effects.as_ref().is_none_or(|effects| effects.status == ExecutionStatus::Success)
    }
}

pub(crate) fn u64_from_str_or_num<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Num(u64),
        Str(String),
    }

    match Option::<Repr>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Repr::Num(n)) => Ok(Some(n)),
        Some(Repr::Str(s)) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_rpc_envelope() {
        let response = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {
                "digest": "Fx1",
                "effects": {
                    "status": { "status": "success" },
                    "changedObjects": [
                        { "objectId": "0xabc", "outputState": "ObjectWrite", "outputVersion": "12", "outputDigest": "d" },
                        { "objectId": "0xdef", "outputState": "DoesNotExist" }
                    ]
                }
            }
        });

        let result = ExecutionResult::from_response(response).unwrap();
        assert_eq!(result.digest, "Fx1");
        assert!(result.is_success());

        let effects = result.effects.unwrap();
        assert_eq!(effects.changed_objects[0].output_version, Some(12));
        assert!(effects.changed_objects[0].output_state.is_live());
        assert_eq!(effects.changed_objects[1].output_state, OutputState::DoesNotExist);
    }

    #[test]
    fn test_failure_status() {
        let response = json!({
            "digest": "Fx2",
            "effects": { "status": { "status": "failure", "error": "InsufficientGas" } }
        });
        let result = ExecutionResult::from_response(response).unwrap();
        assert!(!result.is_success());
    }

    #[test]
    fn test_missing_digest_is_invalid() {
        let err = ExecutionResult::from_response(json!({ "effects": {} })).unwrap_err();
        assert!(matches!(err, ExecutorError::InvalidResponse(_)));
    }
}
