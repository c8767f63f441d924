use crate::transaction::{CallArg, InputKind, Transaction};
use ahash::AHashMap;
use serde_json::{Value, json};
use std::collections::BTreeSet;

/// Something a plugin still has to make concrete.
///
/// `input_index` points at the transaction input the request was discovered at; requests a
/// plugin appends on its own carry `None`.
#[derive(Clone, Debug, PartialEq)]
pub struct UnresolvedInput {
    pub kind: InputKind,
    pub input_index: Option<usize>,
    pub payload: Value,
}

impl UnresolvedInput {
    pub fn new(kind: InputKind, input_index: Option<usize>, payload: Value) -> Self {
        Self { kind, input_index, payload }
    }

    /// Descriptor for an input, or `None` if the input is already concrete.
    pub fn from_input(index: usize, arg: &CallArg) -> Option<Self> {
        let payload = match arg {
            CallArg::UnresolvedObject { object_id, version, digest } => {
                json!({ "objectId": object_id, "version": version, "digest": digest })
            }
            CallArg::UnresolvedPure { value } => value.clone(),
            CallArg::CoinWithBalance { coin_type, balance } => json!({ "coinType": coin_type, "balance": balance }),
            _ => return None,
        };
        Some(Self::new(arg.kind(), Some(index), payload))
    }
}

/// Mutable state of one resolve pass, shared by every plugin in turn.
#[derive(Clone, Debug, Default)]
pub struct ResolutionContext {
    pub transaction: Transaction,
    pub unresolved_inputs: Vec<UnresolvedInput>,
    pub sender: Option<String>,
    pub resolved_indices: BTreeSet<usize>,
    pub resolved_values: AHashMap<String, Value>,
}

impl ResolutionContext {
    /// Takes ownership of `transaction` and scans its inputs for unresolved intents.
    pub fn new(transaction: Transaction) -> Self {
        let unresolved_inputs = transaction
            .inputs()
            .iter()
            .enumerate()
            .filter_map(|(index, arg)| UnresolvedInput::from_input(index, arg))
            .collect();
        let sender = transaction.sender().map(str::to_string);

        Self { transaction, unresolved_inputs, sender, ..Default::default() }
    }

    pub fn unresolved_count(&self) -> usize {
        self.unresolved_inputs.len()
    }

    /// Unresolved descriptors and transaction inputs still left, whichever is larger.
    pub fn remaining(&self) -> usize {
        let in_transaction = self.transaction.inputs().iter().filter(|arg| arg.is_unresolved()).count();
        self.unresolved_inputs.len().max(in_transaction)
    }

    pub fn push_unresolved(&mut self, kind: InputKind, payload: Value) {
        self.unresolved_inputs.push(UnresolvedInput::new(kind, None, payload));
    }

    /// Input indices of pending descriptors of `kind`, in discovery order.
    pub fn pending_indices(&self, kind: InputKind) -> Vec<usize> {
        self.unresolved_inputs.iter().filter(|u| u.kind == kind).filter_map(|u| u.input_index).collect()
    }

    /// Replaces input `index` with a concrete value and drops its descriptors.
    ///
    /// Returns the previous input.
    pub fn resolve_input(&mut self, index: usize, arg: CallArg) -> eyre::Result<CallArg> {
        let len = self.transaction.inputs().len();
        let previous = self
            .transaction
            .replace_input(index, arg)
            .ok_or_else(|| eyre::eyre!("input index {} out of bounds ({} inputs)", index, len))?;

        self.unresolved_inputs.retain(|u| u.input_index != Some(index));
        self.resolved_indices.insert(index);
        Ok(previous)
    }

    pub fn set_value(&mut self, key: impl Into<String>, value: Value) {
        self.resolved_values.insert(key.into(), value);
    }

    pub fn value(&self, key: &str) -> Option<&Value> {
        self.resolved_values.get(key)
    }

    pub fn into_transaction(self) -> Transaction {
        self.transaction
    }
}
