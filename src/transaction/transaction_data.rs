use super::inputs::{Argument, CallArg, Command, ObjectRef};
use crate::errors::ValidationError;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasConfig {
    pub budget: Option<u64>,
    pub price: Option<u64>,
    pub owner: Option<String>,
    pub payment: Vec<ObjectRef>,
}

/// A ledger transaction: sender, gas configuration, inputs and the commands consuming them.
///
/// Inputs can only be appended or replaced in place, so the indices that commands
/// reference stay valid through a resolve pass.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    sender: Option<String>,
    gas_config: GasConfig,
    inputs: Vec<CallArg>,
    commands: Vec<Command>,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sender(&self) -> Option<&str> {
        self.sender.as_deref()
    }

    pub fn set_sender(&mut self, sender: impl Into<String>) {
        self.sender = Some(sender.into());
    }

    pub fn set_sender_if_not_set(&mut self, sender: impl Into<String>) {
        if self.sender.is_none() {
            self.set_sender(sender);
        }
    }

    pub fn gas_config(&self) -> &GasConfig {
        &self.gas_config
    }

    pub fn gas_config_mut(&mut self) -> &mut GasConfig {
        &mut self.gas_config
    }

    pub fn set_gas_budget(&mut self, budget: u64) {
        self.gas_config.budget = Some(budget);
    }

    pub fn set_gas_budget_if_not_set(&mut self, budget: u64) {
        self.gas_config.budget.get_or_insert(budget);
    }

    pub fn set_gas_price(&mut self, price: u64) {
        self.gas_config.price = Some(price);
    }

    pub fn set_gas_price_if_not_set(&mut self, price: u64) {
        self.gas_config.price.get_or_insert(price);
    }

    pub fn inputs(&self) -> &[CallArg] {
        &self.inputs
    }

    pub fn input(&self, index: usize) -> Option<&CallArg> {
        self.inputs.get(index)
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Command payloads can be rewritten freely; arguments stay fixed.
    pub fn payloads_mut(&mut self) -> impl Iterator<Item = &mut Value> {
        self.commands.iter_mut().map(|command| &mut command.payload)
    }

    /// Appends an input and returns an argument pointing at it.
    ///
    /// Fails once the input index would no longer fit an [`Argument::Input`].
    pub fn add_input(&mut self, arg: CallArg) -> Result<Argument, ValidationError> {
        let index = u16::try_from(self.inputs.len()).map_err(|_| ValidationError::TooManyInputs { len: self.inputs.len() })?;
        self.inputs.push(arg);
        Ok(Argument::Input(index))
    }

    /// Replaces the input at `index` in place, returning the previous value.
    pub fn replace_input(&mut self, index: usize, arg: CallArg) -> Option<CallArg> {
        let slot = self.inputs.get_mut(index)?;
        Some(std::mem::replace(slot, arg))
    }

    pub fn object(&mut self, object_id: impl Into<String>) -> Result<Argument, ValidationError> {
        self.add_input(CallArg::unresolved_object(object_id))
    }

    pub fn object_ref(&mut self, object_ref: ObjectRef) -> Result<Argument, ValidationError> {
        self.add_input(CallArg::Object(object_ref))
    }

    pub fn pure(&mut self, bytes: impl Into<Vec<u8>>) -> Result<Argument, ValidationError> {
        self.add_input(CallArg::Pure { bytes: bytes.into() })
    }

    pub fn pure_value(&mut self, value: Value) -> Result<Argument, ValidationError> {
        self.add_input(CallArg::UnresolvedPure { value })
    }

    pub fn coin_with_balance(&mut self, coin_type: impl Into<String>, balance: u64) -> Result<Argument, ValidationError> {
        self.add_input(CallArg::CoinWithBalance { coin_type: coin_type.into(), balance })
    }

    pub fn gas(&self) -> Argument {
        Argument::GasCoin
    }

    /// Appends a command and returns an argument pointing at its result.
    pub fn add_command(&mut self, command: Command) -> Result<Argument, ValidationError> {
        let index =
            u16::try_from(self.commands.len()).map_err(|_| ValidationError::TooManyCommands { len: self.commands.len() })?;
        self.commands.push(command);
        Ok(Argument::Result(index))
    }

    /// Puts `commands` in front of the existing ones.
    ///
    /// `Result` and `NestedResult` arguments of the existing commands are shifted so they keep
    /// pointing at the same command. Arguments of the inserted commands are taken as given.
    pub fn prepend_commands(&mut self, commands: Vec<Command>) -> Result<(), ValidationError> {
        let shift = commands.len();
        let total = self.commands.len() + shift;
        if total > u16::MAX as usize + 1 {
            return Err(ValidationError::TooManyCommands { len: self.commands.len() });
        }
        for command in &mut self.commands {
            for argument in &mut command.arguments {
                match argument {
                    Argument::Result(result) | Argument::NestedResult(result, _) => {
                        // shift < 65,536 whenever there is an existing command
                        *result = result.saturating_add(shift as u16);
                    }
                    Argument::GasCoin | Argument::Input(_) => {}
                }
            }
        }
        let existing = std::mem::replace(&mut self.commands, commands);
        self.commands.extend(existing);
        Ok(())
    }

    /// Rewrites every `Input(index)` argument of the commands from `first_command` on to `to`.
    pub fn redirect_input(&mut self, index: u16, to: Argument, first_command: usize) -> usize {
        let mut redirected = 0;
        for command in self.commands.iter_mut().skip(first_command) {
            for argument in &mut command.arguments {
                if *argument == Argument::Input(index) {
                    *argument = to;
                    redirected += 1;
                }
            }
        }
        redirected
    }

    pub fn move_call(
        &mut self,
        target: &str,
        arguments: Vec<Argument>,
        type_arguments: Vec<String>,
    ) -> Result<Argument, ValidationError> {
        let mut parts = target.splitn(3, "::");
        let payload = json!({
            "package": parts.next().unwrap_or_default(),
            "module": parts.next().unwrap_or_default(),
            "function": parts.next().unwrap_or_default(),
            "typeArguments": type_arguments,
        });
        self.add_command(Command::new("MoveCall", arguments, payload))
    }

    pub fn has_unresolved_inputs(&self) -> bool {
        self.inputs.iter().any(CallArg::is_unresolved)
    }

    /// Fails on the first input that still carries an unresolved intent.
    pub fn assert_fully_resolved(&self) -> Result<(), ValidationError> {
        match self.inputs.iter().position(CallArg::is_unresolved) {
            Some(index) => Err(ValidationError::UnresolvedInput { index, kind: self.inputs[index].kind().to_string() }),
            None => Ok(()),
        }
    }

    /// Checks that every command argument points at an existing input or an earlier command.
    pub fn validate_references(&self) -> Result<(), ValidationError> {
        for (command_idx, command) in self.commands.iter().enumerate() {
            for argument in &command.arguments {
                match *argument {
                    Argument::GasCoin => {}
                    Argument::Input(input) => {
                        if input as usize >= self.inputs.len() {
                            return Err(ValidationError::InputOutOfBounds {
                                command: command_idx,
                                input: input as usize,
                                len: self.inputs.len(),
                            });
                        }
                    }
                    Argument::Result(result) | Argument::NestedResult(result, _) => {
                        if result as usize >= command_idx {
                            return Err(ValidationError::ResultOutOfBounds { command: command_idx, result: result as usize });
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
