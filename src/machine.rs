//! State machine construction and validation.
//!
//! A [`StateMachine`] is built from an already-parsed definition tree with
//! [`from_value`](StateMachine::from_value);
//! [`from_json_str`](StateMachine::from_json_str) and
//! [`from_yaml_str`](StateMachine::from_yaml_str) wrap the text loaders for
//! convenience. Construction validates everything
//! the language requires — `StartAt` resolution, a non-empty `States`
//! mapping, per-state field shapes, `Next`/`End` exclusivity, and that every
//! `Next` / `Default` / `Catch.Next` names an existing state (recursively
//! inside Parallel branches). A machine that builds cannot fail structurally
//! at runtime.
//!
//! Unknown top-level keys in the definition are ignored.
//!
//! # Examples
//!
//! ```rust
//! use serde_json::json;
//! use stateweave::machine::StateMachine;
//!
//! let machine = StateMachine::from_value(&json!({
//!     "StartAt": "Classify",
//!     "States": {
//!         "Classify": {
//!             "Type": "Choice",
//!             "Choices": [
//!                 {"Variable": "$.total", "NumericGreaterThanEquals": 100, "Next": "Large"}
//!             ],
//!             "Default": "Small"
//!         },
//!         "Large": {"Type": "Succeed"},
//!         "Small": {"Type": "Succeed"}
//!     }
//! })).expect("valid definition");
//!
//! assert_eq!(machine.start_at, "Classify");
//! assert_eq!(machine.states.len(), 3);
//! ```

use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::definition::{self, DefinitionError};
use crate::states::State;

/// A validated state machine: the typed form of a definition document.
#[derive(Debug, Clone)]
pub struct StateMachine {
    /// Name of the state execution begins in.
    pub start_at: String,
    /// All states, keyed by name. States reference each other through this
    /// map only.
    pub states: FxHashMap<String, State>,
    /// Free-form description carried from the definition.
    pub comment: Option<String>,
    /// Advisory machine-level timeout; the core does not enforce it.
    pub timeout_seconds: Option<u64>,
}

impl StateMachine {
    /// Build a machine from a parsed definition tree.
    ///
    /// # Errors
    ///
    /// Every structural violation the language defines surfaces here as a
    /// [`DefinitionError`]: a missing or unresolvable `StartAt`, an empty
    /// `States` mapping, an unsupported `Type`, malformed per-state fields,
    /// a `Next`/`End` conflict, or a dangling transition target.
    pub fn from_value(definition: &Value) -> Result<Self, DefinitionError> {
        let root = definition.as_object().ok_or(DefinitionError::InvalidRoot)?;

        let start_at = match root.get("StartAt") {
            Some(Value::String(name)) if !name.is_empty() => name.clone(),
            Some(other) => {
                return Err(definition::invalid_field(
                    "definition",
                    "StartAt",
                    format!("expected a non-empty string, found {other}"),
                ));
            }
            None => return Err(DefinitionError::MissingStartAt),
        };

        let state_defs = root
            .get("States")
            .and_then(Value::as_object)
            .filter(|map| !map.is_empty())
            .ok_or(DefinitionError::EmptyStates)?;

        let mut states = FxHashMap::default();
        for (name, def) in state_defs {
            states.insert(name.clone(), State::from_def(name, def)?);
        }

        if !states.contains_key(&start_at) {
            return Err(DefinitionError::UnresolvedStart { start_at });
        }
        for state in states.values() {
            for (field, target) in state.transition_targets() {
                if !states.contains_key(target) {
                    return Err(DefinitionError::UnresolvedTarget {
                        state: state.name().to_string(),
                        field,
                        target: target.to_string(),
                    });
                }
            }
        }

        Ok(Self {
            start_at,
            states,
            comment: definition::opt_str("definition", root, "Comment")?,
            timeout_seconds: definition::opt_positive_u64(
                "definition",
                root,
                "TimeoutSeconds",
            )?,
        })
    }

    /// Build a machine from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, DefinitionError> {
        let definition: Value = serde_json::from_str(text)?;
        Self::from_value(&definition)
    }

    /// Build a machine from YAML text. YAML is parsed into a plain value
    /// tree; no typed objects are ever instantiated.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use stateweave::machine::StateMachine;
    ///
    /// let machine = StateMachine::from_yaml_str(
    ///     "StartAt: Done\nStates:\n  Done:\n    Type: Succeed\n",
    /// ).unwrap();
    /// assert_eq!(machine.start_at, "Done");
    /// ```
    pub fn from_yaml_str(text: &str) -> Result<Self, DefinitionError> {
        let definition: Value = serde_yaml::from_str(text)?;
        Self::from_value(&definition)
    }

    /// Look up a state by name.
    #[must_use]
    pub fn state(&self, name: &str) -> Option<&State> {
        self.states.get(name)
    }

    /// Iterate the names of all states in the machine.
    ///
    /// Iteration order is not deterministic; states are stored by hash.
    pub fn state_names(&self) -> impl Iterator<Item = &str> {
        self.states.keys().map(String::as_str)
    }

    /// Number of states in the machine.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// A validated machine is never empty; kept for API symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
