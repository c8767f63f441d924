use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::{Display, EnumIter, EnumString};

/// Reference to a concrete on-chain object at a fixed version.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRef {
    pub object_id: String,
    pub version: u64,
    pub digest: String,
}

impl ObjectRef {
    pub fn new(object_id: impl Into<String>, version: u64, digest: impl Into<String>) -> Self {
        Self { object_id: object_id.into(), version, digest: digest.into() }
    }
}

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash, EnumString, EnumIter, Serialize, Deserialize)]
pub enum InputKind {
    Pure,
    Object,
    UnresolvedObject,
    UnresolvedPure,
    CoinWithBalance,
    GasCoin,
}

impl InputKind {
    /// Intent kinds. A transaction carrying any of them is not ready to submit.
    pub fn is_unresolved(&self) -> bool {
        matches!(self, InputKind::UnresolvedObject | InputKind::UnresolvedPure | InputKind::CoinWithBalance)
    }
}

/// A transaction input. `Unresolved*` and `CoinWithBalance` are intents a resolver plugin has to make concrete.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "$kind")]
pub enum CallArg {
    Pure {
        #[serde(with = "base64_bytes")]
        bytes: Vec<u8>,
    },
    Object(ObjectRef),
    #[serde(rename_all = "camelCase")]
    UnresolvedObject {
        object_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        version: Option<u64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        digest: Option<String>,
    },
    UnresolvedPure {
        value: Value,
    },
    #[serde(rename_all = "camelCase")]
    CoinWithBalance {
        coin_type: String,
        balance: u64,
    },
    GasCoin,
}

impl CallArg {
    pub fn kind(&self) -> InputKind {
        match self {
            CallArg::Pure { .. } => InputKind::Pure,
            CallArg::Object(_) => InputKind::Object,
            CallArg::UnresolvedObject { .. } => InputKind::UnresolvedObject,
            CallArg::UnresolvedPure { .. } => InputKind::UnresolvedPure,
            CallArg::CoinWithBalance { .. } => InputKind::CoinWithBalance,
            CallArg::GasCoin => InputKind::GasCoin,
        }
    }

    pub fn is_unresolved(&self) -> bool {
        self.kind().is_unresolved()
    }

    pub fn unresolved_object(object_id: impl Into<String>) -> Self {
        CallArg::UnresolvedObject { object_id: object_id.into(), version: None, digest: None }
    }

    pub fn object_id(&self) -> Option<&str> {
        match self {
            CallArg::Object(object_ref) => Some(&object_ref.object_id),
            CallArg::UnresolvedObject { object_id, .. } => Some(object_id),
            _ => None,
        }
    }
}

/// Reference from a command to an input, the gas coin or an earlier command's result.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Argument {
    GasCoin,
    Input(u16),
    Result(u16),
    NestedResult(u16, u16),
}

/// Opaque command payload. The pipeline only inspects `arguments`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub kind: String,
    pub arguments: Vec<Argument>,
    pub payload: Value,
}

impl Command {
    pub fn new(kind: impl Into<String>, arguments: Vec<Argument>, payload: Value) -> Self {
        Self { kind: kind.into(), arguments, payload }
    }
}

mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(s).map_err(serde::de::Error::custom)
    }
}
