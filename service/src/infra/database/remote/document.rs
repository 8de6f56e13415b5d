//! [`Document`] conversions of [`Section`] values.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing as log;

#[cfg(doc)]
use crate::domain::Section;
use crate::domain::{
    BrokerProfile, Collection, Entry, Id, Singleton, SocialLinks,
};

/// [`Section`] value stored as a JSON document in a [`Remote`] database.
///
/// [`Remote`]: super::Remote
pub trait Document: Sized {
    /// Decodes a snapshot of this [`Document`].
    ///
    /// Never fails: malformed parts are skipped or replaced with defaults.
    fn decode(snapshot: &Value) -> Self;

    /// Encodes this [`Document`] to be stored as a whole.
    ///
    /// # Errors
    ///
    /// If any record fails to serialize.
    fn encode(&self) -> serde_json::Result<Value>;
}

impl<T: Collection> Document for Vec<Entry<T>> {
    fn decode(snapshot: &Value) -> Self {
        let records: Vec<(Id, &Value)> = match snapshot {
            Value::Null => vec![],
            Value::Object(map) => map
                .iter()
                .map(|(key, v)| {
                    (key.parse().unwrap_or_else(|e| match e {}), v)
                })
                .collect(),
            // Objects with sequential integer keys are served as arrays.
            Value::Array(items) => (0..)
                .zip(items)
                .filter(|(_, v)| !v.is_null())
                .map(|(i, v)| (Id::Numeric(i), v))
                .collect(),
            Value::Bool(_) | Value::Number(_) | Value::String(_) => {
                log::warn!(
                    "`{}` snapshot is not a collection, treating as empty",
                    T::KIND,
                );
                vec![]
            }
        };

        let mut entries: Self = records
            .into_iter()
            .filter_map(|(id, record)| {
                T::deserialize(record)
                    .map(|value| Entry {
                        id: id.clone(),
                        value,
                    })
                    .map_err(|e| {
                        log::warn!(
                            "skipping malformed `{}({id})` record: {e}",
                            T::KIND,
                        );
                    })
                    .ok()
            })
            .collect();
        entries.sort_by(|a, b| a.id.cmp(&b.id));
        if T::NEWEST_FIRST {
            entries.reverse();
        }
        entries
    }

    fn encode(&self) -> serde_json::Result<Value> {
        self.iter()
            .map(|e| Ok((e.id.to_string(), serde_json::to_value(&e.value)?)))
            .collect::<serde_json::Result<Map<_, _>>>()
            .map(Value::Object)
    }
}

impl Document for BrokerProfile {
    fn decode(snapshot: &Value) -> Self {
        singleton::<Self>(snapshot)
    }

    fn encode(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

impl Document for SocialLinks {
    fn decode(snapshot: &Value) -> Self {
        singleton::<Self>(snapshot)
    }

    fn encode(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

/// Decodes a [`Singleton`] snapshot, falling back to its defaults.
fn singleton<S: Singleton + DeserializeOwned>(snapshot: &Value) -> S::Value {
    if snapshot.is_null() {
        return S::defaults();
    }
    serde_json::from_value(snapshot.clone()).unwrap_or_else(|e| {
        log::warn!("malformed `{}` snapshot, using defaults: {e}", S::KIND);
        S::defaults()
    })
}
