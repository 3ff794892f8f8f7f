//! Line parsing for tab-separated contact logs.

use std::str::FromStr;

use linkdrift_core::NodeId;

use crate::{errors::ContactLogError, log::ContactEvent};

const FIELDS: [&str; 5] = ["time", "source", "target", "class1", "class2"];

/// Parses one record. Blank lines yield `Ok(None)`.
///
/// `line` is one-based and only used for error reporting.
pub(crate) fn parse_line(line: usize, raw: &str) -> Result<Option<ContactEvent>, ContactLogError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let mut columns = trimmed.split('\t').map(str::trim);
    let mut next = |field: &'static str| {
        columns
            .next()
            .filter(|value| !value.is_empty())
            .ok_or(ContactLogError::MissingField { line, field })
    };
    let [time, source, target, source_class, target_class] = FIELDS;
    let time = parse_number::<u64>(line, time, next(time)?)?;
    let source = NodeId::new(parse_number(line, source, next(source)?)?);
    let target = NodeId::new(parse_number(line, target, next(target)?)?);
    let source_class = next(source_class)?.to_owned();
    let target_class = next(target_class)?.to_owned();
    Ok(Some(ContactEvent {
        time,
        source,
        target,
        source_class,
        target_class,
    }))
}

fn parse_number<T: FromStr>(
    line: usize,
    field: &'static str,
    value: &str,
) -> Result<T, ContactLogError> {
    value.parse().map_err(|_| ContactLogError::InvalidField {
        line,
        field,
        value: value.to_owned(),
    })
}
