//! Per-field merge policies: overwrite (last write wins) or append (ordered accumulation).
//!
//! Each schema field declares one policy at definition time. The policy decides
//! how a node's partial update combines with the value already in the state.
//!
//! **Interaction**: `State::merge` looks up the field's policy in the schema and
//! calls [`MergePolicy::apply`] for each entry of a `StateUpdate`.

use serde_json::Value;

use super::SchemaError;

/// How a field combines an incoming value with its existing value.
///
/// - `Overwrite`: the incoming value replaces the existing one. The default
///   for scalar fields (strings, numbers, session ids, ...).
/// - `Append`: existing and incoming must both be JSON arrays; the result is
///   the existing elements followed by the incoming elements, in order, with
///   no deduplication. Used for message logs and other ordered histories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// Keep only the last written value.
    Overwrite,
    /// Concatenate incoming array elements onto the existing array.
    Append,
}

impl MergePolicy {
    /// Default value for a field with this policy when the caller supplies none
    /// and the field declares no explicit default.
    pub fn zero_value(&self) -> Value {
        match self {
            MergePolicy::Overwrite => Value::Null,
            MergePolicy::Append => Value::Array(Vec::new()),
        }
    }

    /// Applies this policy to `existing`, consuming `incoming`.
    ///
    /// `field` is used only for error reporting. For `Append`, both sides must
    /// be arrays; anything else is a [`SchemaError::NotASequence`].
    pub fn apply(
        &self,
        field: &str,
        existing: &mut Value,
        incoming: Value,
    ) -> Result<(), SchemaError> {
        match self {
            MergePolicy::Overwrite => {
                *existing = incoming;
                Ok(())
            }
            MergePolicy::Append => {
                let additions = match incoming {
                    Value::Array(items) => items,
                    _ => return Err(SchemaError::NotASequence(field.to_string())),
                };
                match existing {
                    Value::Array(items) => {
                        items.extend(additions);
                        Ok(())
                    }
                    _ => Err(SchemaError::NotASequence(field.to_string())),
                }
            }
        }
    }
}
