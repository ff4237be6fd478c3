//! Small helpers for pulling typed fields out of a parameter list.

use crate::error::MessageParseError;

/// The parameter at `index`, or an arity error naming how many were needed.
#[inline]
pub(crate) fn required<'a>(params: &[&'a str], index: usize) -> Result<&'a str, MessageParseError> {
    params
        .get(index)
        .copied()
        .ok_or_else(|| MessageParseError::arity(index + 1, params.len()))
}

#[inline]
pub(crate) fn optional(params: &[&str], index: usize) -> Option<String> {
    params.get(index).map(|s| s.to_string())
}

/// Free text at `index`; missing text reads as empty.
#[inline]
pub(crate) fn text(params: &[&str], index: usize) -> String {
    params.get(index).copied().unwrap_or_default().to_string()
}

/// Split a delimited list, dropping empty items.
pub(crate) fn split_list(s: &str, separator: char) -> Vec<String> {
    s.split(separator)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a numeric field, naming the field on failure.
pub(crate) fn number<T: std::str::FromStr>(value: &str, field: &str) -> Result<T, MessageParseError> {
    value
        .parse()
        .map_err(|_| MessageParseError::InvalidArgument(format!("{} is not a number: {:?}", field, value)))
}
