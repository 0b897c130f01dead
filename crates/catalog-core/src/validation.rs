//! Small predicates shared by the query filter builder and the HTTP layer.

/// Returns `true` if `value` is strictly greater than zero.
#[must_use]
pub fn is_positive_integer(value: i64) -> bool {
    value > 0
}

/// Returns `true` if `value` has at least one non-whitespace character.
#[must_use]
pub fn is_non_empty_string(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Parses a base-10 integer. A single leading `+` or `-` is accepted;
/// fractions, a bare sign, and trailing junk are rejected.
///
/// Surrounding whitespace is ignored.
#[must_use]
pub fn parse_integer(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok()
}

/// Parses `"true"`/`"false"` case-insensitively.
///
/// Returns `None` for anything else; callers treat that as "no filter", not as
/// `false`.
#[must_use]
pub fn parse_boolean(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Parses a path/query id and accepts it only when it is a positive integer.
#[must_use]
pub fn parse_positive_id(value: &str) -> Option<i64> {
    parse_integer(value).filter(|v| is_positive_integer(*v))
}
