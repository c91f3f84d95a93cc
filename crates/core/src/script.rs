//! Action scripts: the ordered deploy/send/skip instructions of a run.

use serde::{Deserialize, Serialize};

use crate::types::{Address, Label};

/// One instruction of an action script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Deploy `label` with constructor `args`, unless an address is known.
    Deploy {
        label: Label,
        #[serde(default)]
        args: Vec<String>,
    },
    /// Call `function` on the deployed `label`.
    Send {
        label: Label,
        function: String,
        #[serde(default)]
        args: Vec<String>,
    },
    /// Stop executing until the next [`Action::SkipEnd`].
    SkipStart,
    SkipEnd,
}

impl Action {
    pub fn deploy<I, S>(label: impl Into<Label>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Deploy {
            label: label.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn send<I, S>(label: impl Into<Label>, function: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Send {
            label: label.into(),
            function: function.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

/// A contract known before the script runs.
///
/// An empty `locator` marks an external contract known only by address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractSpec {
    pub label: Label,
    #[serde(default)]
    pub locator: String,
    #[serde(default)]
    pub address: Option<Address>,
}

impl ContractSpec {
    pub fn new(label: impl Into<Label>, locator: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            locator: locator.into(),
            address: None,
        }
    }

    pub fn with_address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }
}

/// Interpreter mode. Skip ranges do not nest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScriptState {
    #[default]
    Active,
    Skipping,
}

impl ScriptState {
    /// State after `action`; only skip markers change it.
    pub fn next(self, action: &Action) -> Self {
        match action {
            Action::SkipStart => Self::Skipping,
            Action::SkipEnd => Self::Active,
            Action::Deploy { .. } | Action::Send { .. } => self,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
