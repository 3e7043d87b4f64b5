use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::Result;

/// Decodes a node payload, reporting fields this crate does not model.
///
/// Node responses carry many fields the pipeline never reads, so they are reported at `trace`
/// rather than treated as drift.
#[cfg(feature = "tracing")]
pub(crate) fn deserialize_with_warnings<T: DeserializeOwned>(value: Value) -> Result<T> {
    let mut ignored = Vec::new();
    let mut record = |path: serde_ignored::Path<'_>| ignored.push(path.to_string());
    let deserializer = serde_ignored::Deserializer::new(value, &mut record);
    let decoded: T = serde_path_to_error::deserialize(deserializer)?;

    if !ignored.is_empty() {
        tracing::trace!(
            target_type = std::any::type_name::<T>(),
            fields = ?ignored,
            "ignored unmodelled fields in node response"
        );
    }

    Ok(decoded)
}

#[cfg(not(feature = "tracing"))]
pub(crate) fn deserialize_with_warnings<T: DeserializeOwned>(value: Value) -> Result<T> {
    Ok(serde_json::from_value(value)?)
}
