//! Format checks for produce item fields.
//!
//! The predicates are pure and only answer yes/no; `validate_item` collects
//! per-field messages for the HTTP layer.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::models::{normalize_code, ProduceItem};

// Word characters are spelled out so the patterns stay ASCII-only.
static CODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_]{4}-[A-Za-z0-9_]{4}-[A-Za-z0-9_]{4}-[A-Za-z0-9_]{4}$")
        .expect("valid produce code regex")
});
static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]+(?: [A-Za-z0-9_]+)*$").expect("valid name regex"));
static PRICE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\$(?:[1-9][0-9]{0,2}(?:,[0-9]{3})*|(?:[1-9][0-9]*)?[0-9])(?:\.[0-9]{1,2})?$")
        .expect("valid unit price regex")
});

/// Four groups of four alphanumerics separated by hyphens, e.g. `AAAA-BBBB-CCCC-DDDD`.
pub fn valid_code(code: &str) -> bool {
    CODE_RE.is_match(code)
}

/// Single-space separated words with no leading or trailing whitespace.
pub fn valid_name(name: &str) -> bool {
    NAME_RE.is_match(name)
}

/// `$` followed by a whole amount (bare or comma-grouped in thousands, no
/// leading zeros) and an optional one or two digit fraction.
pub fn valid_price(price: &str) -> bool {
    PRICE_RE.is_match(price)
}

// ── Per-field errors ─────────────────────────────────────────────────────────

/// Field name → messages. Serializes as a plain JSON object with sorted keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<&'static str, Vec<String>>);

impl ValidationErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }
}

/// Checks every field of an item. Empty fields get both a "required" and an
/// "invalid format" message.
pub fn validate_item(item: &ProduceItem) -> ValidationErrors {
    let mut errs = ValidationErrors::default();

    if item.produce_code.is_empty() {
        errs.add("produce_code", "produce code field is required");
    }
    if item.name.is_empty() {
        errs.add("name", "name field is required");
    }
    if item.unit_price.is_empty() {
        errs.add("unit_price", "unit price field is required");
    }

    if !valid_code(&normalize_code(&item.produce_code)) {
        errs.add("produce_code", "invalid produce code format");
    }
    if !valid_name(&item.name) {
        errs.add("name", "invalid name format");
    }
    if !valid_price(&item.unit_price) {
        errs.add("unit_price", "invalid unit price format");
    }

    errs
}
