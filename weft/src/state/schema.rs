//! State schema: the ordered set of field declarations for a graph's state.
//!
//! A schema is fixed before any graph is built over it. Each field declares a
//! [`MergePolicy`] and a default value; declaration order is preserved and is
//! the iteration order of every `State` built from the schema.
//!
//! **Interaction**: `StateGraph::new` takes an `Arc<StateSchema>`; `State`
//! consults the schema on every initialize and merge (strict mode: undeclared
//! fields are rejected, not ignored).

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use super::MergePolicy;

/// Schema violation raised by state initialization or merge.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    /// The same field name was declared twice while building a schema.
    #[error("field {0:?} is declared more than once")]
    DuplicateField(String),

    /// An update or initial value named a field the schema does not declare.
    #[error("field {0:?} is not declared in the state schema")]
    UndeclaredField(String),

    /// An append-policy field received or held a non-array value.
    #[error("append merge on field {0:?} requires array values")]
    NotASequence(String),
}

/// One declared field: name, merge policy, and default value.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    name: String,
    policy: MergePolicy,
    default: Value,
}

impl FieldSpec {
    /// Field name as declared.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Merge policy applied to every update of this field.
    pub fn policy(&self) -> MergePolicy {
        self.policy
    }

    /// Value the field starts with when the caller supplies none.
    pub fn default(&self) -> &Value {
        &self.default
    }
}

/// Ordered collection of field declarations.
///
/// Immutable once built; shared between the graph builder, the compiled graph,
/// and every state instance via `Arc`.
#[derive(Debug)]
pub struct StateSchema {
    fields: Vec<FieldSpec>,
    index: HashMap<String, usize>,
}

impl StateSchema {
    /// Starts an empty schema builder.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder { fields: Vec::new() }
    }

    /// Looks up a field declaration by name.
    pub fn spec(&self, name: &str) -> Option<&FieldSpec> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    /// Whether `name` is a declared field.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Field declarations in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter()
    }

    /// Number of declared fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the schema declares no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Incremental schema builder; finished by [`SchemaBuilder::build`].
#[derive(Debug)]
pub struct SchemaBuilder {
    fields: Vec<FieldSpec>,
}

impl SchemaBuilder {
    /// Declares a field with the policy's zero value as default
    /// (`null` for overwrite, `[]` for append).
    pub fn field(self, name: impl Into<String>, policy: MergePolicy) -> Self {
        let default = policy.zero_value();
        self.field_with_default(name, policy, default)
    }

    /// Declares a field with an explicit default value.
    pub fn field_with_default(
        mut self,
        name: impl Into<String>,
        policy: MergePolicy,
        default: Value,
    ) -> Self {
        self.fields.push(FieldSpec {
            name: name.into(),
            policy,
            default,
        });
        self
    }

    /// Finishes the schema, rejecting duplicate field names.
    pub fn build(self) -> Result<Arc<StateSchema>, SchemaError> {
        let mut index = HashMap::with_capacity(self.fields.len());
        for (i, spec) in self.fields.iter().enumerate() {
            if index.insert(spec.name.clone(), i).is_some() {
                return Err(SchemaError::DuplicateField(spec.name.clone()));
            }
        }
        Ok(Arc::new(StateSchema {
            fields: self.fields,
            index,
        }))
    }
}
