use ammonia;

/// Strips markup that could execute in a browser from user-entered text.
///
/// Safe formatting tags survive; `<script>` (with its content), event
/// handler attributes and the like are dropped.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

pub fn clean_optional(input: Option<String>) -> Option<String> {
    input.map(|text| clean_html(&text))
}
