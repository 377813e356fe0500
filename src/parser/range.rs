//! Index and range selection expressions (`"1-3,5,7-9"`, `"a"`, `"all"`).

use std::collections::BTreeSet;
use std::num::IntErrorKind;

use tracing::trace;

use super::error::ParseError;

/// Selects indices from an expression using the default lower bound of 1.
///
/// See [`select_indices_with_min`] for the full grammar.
///
/// # Errors
///
/// Returns [`ParseError`] if the expression is empty or contains a
/// malformed token.
///
/// # Examples
///
/// ```
/// use edu_downloader::parser::select_indices;
///
/// let selected = select_indices("1-3,5,7-9", 9).unwrap();
/// assert_eq!(selected.into_iter().collect::<Vec<_>>(), vec![1, 2, 3, 5, 7, 8, 9]);
/// ```
pub fn select_indices(expression: &str, max_index: usize) -> Result<BTreeSet<usize>, ParseError> {
    select_indices_with_min(expression, max_index, 1)
}

/// Parses a selection expression into a sorted, deduplicated set of indices
/// within `[min_index, max_index]`.
///
/// - `a` / `all` (case-insensitive) select the whole range.
/// - Otherwise the expression is a comma-separated list of bare integers and
///   `start-end` ranges. Range bounds are clamped into the allowed interval
///   and ranges that end up empty contribute nothing. Out-of-range bare
///   integers are dropped.
///
/// # Errors
///
/// Returns [`ParseError::Empty`] for a blank expression and
/// [`ParseError::InvalidToken`] for any token with a non-numeric part.
pub fn select_indices_with_min(
    expression: &str,
    max_index: usize,
    min_index: usize,
) -> Result<BTreeSet<usize>, ParseError> {
    let normalized = expression.trim().to_lowercase();
    if normalized.is_empty() {
        return Err(ParseError::Empty);
    }

    if normalized == "a" || normalized == "all" {
        return Ok((min_index..=max_index).collect());
    }

    let mut selected = BTreeSet::new();
    for raw_token in normalized.split(',') {
        let token = raw_token.trim();
        if token.is_empty() {
            return Err(ParseError::empty_token());
        }

        if token.contains('-') {
            let mut bounds = token.split('-');
            let (Some(start), Some(end), None) = (bounds.next(), bounds.next(), bounds.next())
            else {
                return Err(ParseError::bad_range(token));
            };
            let start = parse_index(token, start)?.max(min_index);
            let end = parse_index(token, end)?.min(max_index);
            if start <= end {
                trace!(start, end, "range token selected");
                selected.extend(start..=end);
            }
        } else {
            let index = parse_index(token, token)?;
            if (min_index..=max_index).contains(&index) {
                selected.insert(index);
            }
        }
    }

    Ok(selected)
}

/// Parses one numeric part of a token. Values too large for `usize` saturate,
/// so they behave as "beyond any maximum" instead of failing.
fn parse_index(token: &str, part: &str) -> Result<usize, ParseError> {
    let part = part.trim();
    match part.parse::<usize>() {
        Ok(value) => Ok(value),
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Ok(usize::MAX),
        Err(_) => Err(ParseError::not_a_number(token, part)),
    }
}
