use serde::{Deserialize, Deserializer, Serialize};

/// A single catalog entry. `produce_code` is the identity and is always
/// stored upper-cased; `name` and `unit_price` are kept as formatted strings.
///
/// Missing or `null` fields deserialize to empty strings so validation can
/// report them per field instead of failing the whole body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProduceItem {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub produce_code: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub unit_price: String,
}

impl ProduceItem {
    pub fn new(
        produce_code: impl Into<String>,
        name: impl Into<String>,
        unit_price: impl Into<String>,
    ) -> Self {
        Self {
            produce_code: produce_code.into(),
            name: name.into(),
            unit_price: unit_price.into(),
        }
    }

    /// Returns the item with its code upper-cased.
    pub fn normalized(mut self) -> Self {
        self.produce_code = normalize_code(&self.produce_code);
        self
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Produce codes compare case-insensitively; everything is keyed upper-case.
pub fn normalize_code(code: &str) -> String {
    code.to_ascii_uppercase()
}

// ── Query parameters ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct SeedParams {
    pub count: Option<usize>,
}
