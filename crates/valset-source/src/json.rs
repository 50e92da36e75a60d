/*!
JSON documents: either one value, or newline-delimited values.
 */

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::io::Read;
use valset_core::source::{ItemStream, SourceItem};

use crate::fetch::Body;

fn parse_document(bytes: &[u8]) -> Result<Vec<Value>> {
    if let Ok(value) = serde_json::from_slice::<Value>(bytes) {
        return Ok(vec![value]);
    }

    serde_json::Deserializer::from_slice(bytes)
        .into_iter::<Value>()
        .collect::<Result<Vec<_>, _>>()
        .context("document is neither JSON nor JSON lines")
}

/// Pick the records out of the parsed document.
pub(crate) fn select(values: Vec<Value>, field: Option<&str>) -> Result<Vec<Value>> {
    let values = match field {
        None => values,
        Some(field) => {
            let mut selected = vec![];
            for mut value in values {
                match value.get_mut(field) {
                    Some(inner) => selected.push(inner.take()),
                    None => bail!("field {:?} not found in document", field),
                }
            }
            selected
        }
    };

    // A single top-level array holds the records; anything else is a record.
    Ok(values
        .into_iter()
        .flat_map(|value| match value {
            Value::Array(items) => items,
            other => vec![other],
        })
        .collect())
}

pub(crate) fn stream(mut body: Body, location: &str, field: Option<&str>) -> Result<ItemStream> {
    let mut bytes = vec![];
    body.read_to_end(&mut bytes)
        .with_context(|| format!("failed to read {}", location))?;

    let values = parse_document(&bytes).with_context(|| format!("failed to parse {}", location))?;
    let records = select(values, field).with_context(|| format!("in {}", location))?;

    log::debug!("{} records in {}", records.len(), location);

    Ok(Box::new(
        records.into_iter().map(|value| Ok(SourceItem::Row(value))),
    ))
}
