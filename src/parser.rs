//! JSON decoding of Nextbike `list.json` responses.

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::debug;

use crate::models::RawAccountItem;

/// Decodes the `account.items` array of a `list.json` body. A bare JSON array
/// of items is accepted as well.
///
/// # Errors
///
/// Returns an error only if the bytes are not valid JSON. Items that do not
/// fit [`RawAccountItem`] are skipped.
pub fn parse_account_items(bytes: &[u8]) -> Result<Vec<RawAccountItem>> {
    let json: Value = serde_json::from_slice(bytes).context("Response body is not valid JSON")?;

    let raw_items = match json {
        Value::Array(items) => items,
        Value::Object(mut body) => match body
            .remove("account")
            .and_then(|mut account| account.get_mut("items").map(Value::take))
        {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    let total = raw_items.len();
    let items: Vec<RawAccountItem> = raw_items
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(item) => Some(item),
            Err(e) => {
                debug!(error = %e, "Skipping malformed account item");
                None
            }
        })
        .collect();

    debug!(total, decoded = items.len(), "Account items decoded");
    Ok(items)
}
