//! State container threaded through a graph run.
//!
//! A [`State`] is an ordered mapping from declared field name to JSON value,
//! created once per invocation and merged exactly once per node execution.
//! Nodes see it as a read-only borrow and return a [`StateUpdate`] (a partial
//! mapping of fields to new values); the run loop owns the container and
//! applies each field's declared [`MergePolicy`].
//!
//! Schema enforcement is strict: an update or initial value naming an
//! undeclared field is rejected with [`SchemaError::UndeclaredField`].

mod merge;
mod schema;

pub use merge::MergePolicy;
pub use schema::{FieldSpec, SchemaBuilder, SchemaError, StateSchema};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// Partial state update: an ordered list of `(field, value)` pairs.
///
/// Returned by nodes and supplied by callers as initial values. Order matters
/// for append fields when an update touches the same field twice.
#[derive(Debug, Clone, Default)]
pub struct StateUpdate {
    entries: Vec<(String, Value)>,
}

impl StateUpdate {
    /// An empty update (a no-op when merged).
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field entry, builder style.
    pub fn with(mut self, field: impl Into<String>, value: Value) -> Self {
        self.entries.push((field.into(), value));
        self
    }

    /// Adds a field entry in place.
    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.entries.push((field.into(), value));
    }

    /// Whether the update carries no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl From<Vec<(String, Value)>> for StateUpdate {
    fn from(entries: Vec<(String, Value)>) -> Self {
        Self { entries }
    }
}

/// The mutable context of one graph invocation.
///
/// Owned by the compiled graph's run loop; handed to node functions as
/// `&State` for the duration of each call. Field iteration order is the
/// schema's declaration order. Discarded when the invocation completes;
/// there is no cross-invocation persistence.
#[derive(Clone)]
pub struct State {
    schema: Arc<StateSchema>,
    values: HashMap<String, Value>,
}

impl State {
    /// Builds a state from caller-supplied initial values.
    ///
    /// Fields not named in `initial` start at their schema default. Initial
    /// values are taken as-is (they replace the default, they are not merged
    /// onto it). Fails if `initial` names an undeclared field.
    pub fn initialize(schema: Arc<StateSchema>, initial: StateUpdate) -> Result<Self, SchemaError> {
        let mut values: HashMap<String, Value> = schema
            .fields()
            .map(|f| (f.name().to_string(), f.default().clone()))
            .collect();
        for (field, value) in initial.entries {
            if !schema.contains(&field) {
                return Err(SchemaError::UndeclaredField(field));
            }
            values.insert(field, value);
        }
        Ok(Self { schema, values })
    }

    /// Merges a node's partial update, applying each field's declared policy
    /// in entry order. Fails on an undeclared field or a policy type
    /// mismatch; entries before the failing one stay applied (no rollback).
    pub fn merge(&mut self, update: StateUpdate) -> Result<(), SchemaError> {
        for (field, incoming) in update.entries {
            let spec = self
                .schema
                .spec(&field)
                .ok_or_else(|| SchemaError::UndeclaredField(field.clone()))?;
            let existing = self
                .values
                .get_mut(&field)
                .expect("every declared field has a value");
            spec.policy().apply(&field, existing, incoming)?;
        }
        Ok(())
    }

    /// Value of a declared field; `None` for undeclared names.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    /// String content of a field, when it holds a string.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    /// Integer content of a field, when it holds an integer.
    pub fn get_i64(&self, field: &str) -> Option<i64> {
        self.get(field).and_then(Value::as_i64)
    }

    /// Array content of a field, when it holds an array.
    pub fn get_array(&self, field: &str) -> Option<&Vec<Value>> {
        self.get(field).and_then(Value::as_array)
    }

    /// `(field, value)` pairs in schema declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.schema.fields().map(move |f| {
            (
                f.name(),
                self.values
                    .get(f.name())
                    .expect("every declared field has a value"),
            )
        })
    }

    /// The schema this state was built from.
    pub fn schema(&self) -> &Arc<StateSchema> {
        &self.schema
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (field, value) in self.iter() {
            map.entry(&field, value);
        }
        map.finish()
    }
}

impl PartialEq for State {
    /// States compare by field values in schema order; schemas with the same
    /// declarations produce comparable states.
    fn eq(&self, other: &Self) -> bool {
        self.schema.len() == other.schema.len()
            && self
                .iter()
                .zip(other.iter())
                .all(|((ka, va), (kb, vb))| ka == kb && va == vb)
    }
}
