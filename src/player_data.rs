use anyhow::Result;

/// Opaque save blob owned by the game. Only checked to be valid JSON, then
/// re-serialized the way `JSON.stringify(JSON.parse(raw))` would.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerData(String);

impl PlayerData {
    /// Parse a stored file. A missing file parses like an empty string,
    /// which is an error.
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        canonical(raw.unwrap_or("")).map(PlayerData)
    }

    /// Canonical form sent back to the game
    pub fn to_json(&self) -> String {
        self.0.clone()
    }
}

#[cfg(target_arch = "wasm32")]
fn canonical(raw: &str) -> Result<String> {
    use anyhow::anyhow;
    use js_sys::JSON;

    use crate::browser;

    let value = JSON::parse(raw).map_err(|err| {
        anyhow!(
            "Stored player data is not JSON : {:.64} : {}",
            raw,
            browser::js_error_message(&err)
        )
    })?;
    JSON::stringify(&value)
        .map(String::from)
        .map_err(|err| anyhow!("Could not stringify player data : {}", browser::js_error_message(&err)))
}

#[cfg(not(target_arch = "wasm32"))]
fn canonical(raw: &str) -> Result<String> {
    use anyhow::Context;

    let value: serde_json::Value = serde_json::from_str(raw)
        .with_context(|| format!("Stored player data is not JSON : {:.64}", raw))?;
    Ok(js::normalize(value).to_string())
}

/// serde_json output nudged to match `JSON.stringify`
#[cfg(not(target_arch = "wasm32"))]
mod js {
    use serde_json::Value;

    // below 2^63, so the i64 cast is exact
    const MAX_INTEGRAL: f64 = 9.0e18;

    /// Integral floats print without a fraction (`100.0`, `1e2` and `-0`
    /// become `100`, `100` and `0`). Array-index keys come first in ascending
    /// order, other keys keep insertion order.
    pub fn normalize(value: Value) -> Value {
        match value {
            Value::Number(number) => match number.as_f64() {
                Some(float) if number.is_f64() && float.fract() == 0.0 && float.abs() < MAX_INTEGRAL => {
                    Value::from(float as i64)
                }
                _ => Value::Number(number),
            },
            Value::Array(items) => Value::Array(items.into_iter().map(normalize).collect()),
            Value::Object(map) => {
                let (mut indices, names): (Vec<_>, Vec<_>) =
                    map.into_iter().partition(|(key, _)| array_index(key).is_some());
                indices.sort_by_key(|(key, _)| array_index(key));
                Value::Object(
                    indices
                        .into_iter()
                        .chain(names)
                        .map(|(key, value)| (key, normalize(value)))
                        .collect(),
                )
            }
            other => other,
        }
    }

    /// Canonical decimal below 2^32 - 1, "01" and "-1" are plain names
    fn array_index(key: &str) -> Option<u32> {
        key.parse::<u32>()
            .ok()
            .filter(|index| *index != u32::MAX && index.to_string() == key)
    }
}
