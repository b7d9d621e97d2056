/// Interprets a boolean-ish form value.
///
/// Browsers submit checked checkboxes as `on`; scripted clients tend to send
/// `true` or `1`. Anything else, including an absent field, is `false`.
pub fn parse_flag(value: Option<&str>) -> bool {
    match value.map(str::trim) {
        Some(v) => ["on", "true", "1", "yes"]
            .iter()
            .any(|accepted| v.eq_ignore_ascii_case(accepted)),
        None => false,
    }
}
