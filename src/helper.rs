use itertools::Itertools;

/// Build a query string from key/value pairs. Pairs with an empty value
/// are left out.
pub fn query_string<'a>(params: impl IntoIterator<Item = (&'a str, String)>) -> String {
    params
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(&value)))
        .join("&")
}

/// Cut `value` down to at most `max` characters (not bytes)
pub fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}
