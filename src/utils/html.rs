/// Sanitises admin-authored question text with ammonia's whitelist.
///
/// Safe formatting tags (<b>, <sub>, <sup>) survive because chemistry and
/// physics questions use them; <script>, <iframe> and event attributes are removed.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

/// Sanitises an optional field, treating blank input as absent.
pub fn clean_optional(input: Option<&str>) -> Option<String> {
    input
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(clean_html)
}
