//! Final textual clean-up of rendered HTML.

/// Paragraph markup for an empty line once normalized.
pub const EMPTY_PARAGRAPH: &str = "<p class=\"empty\"><br/></p>";

const BARE_EMPTY_PARAGRAPHS: [&str; 2] = ["<p><br></p>", "<p><br/></p>"];

/// Tag paragraphs holding nothing but a line break with the `empty` class.
pub fn mark_empty_paragraphs(html: &str) -> String {
    BARE_EMPTY_PARAGRAPHS
        .iter()
        .fold(html.to_owned(), |out, bare| out.replace(bare, EMPTY_PARAGRAPH))
}
