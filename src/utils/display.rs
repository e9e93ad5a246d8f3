/// Prepare model or user text for display in the chat view.
pub fn prepare_text_for_display(text: &str) -> String {
    remove_inline_math_mode(text)
}

/// Escape `$` inline-math delimiters while keeping `$$` block delimiters.
pub fn remove_inline_math_mode(text: &str) -> String {
    text.replace('$', "&#36;").replace("&#36;&#36;", "$$")
}
