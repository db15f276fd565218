//! Blog post rendering.
//!
//! Shared by the inline `enhanced-blog-writing` capability and the
//! standalone blog agent (see [`agent`]). Rendering is a plain formatter:
//! notes go in, an HTML fragment comes out.

pub mod agent;

/// Heading used when no title is supplied.
pub const DEFAULT_TITLE: &str = "Blog Post";

/// Render notes as a blog post with the default heading.
pub fn write_blog(notes: &str) -> String {
    write_titled_blog(DEFAULT_TITLE, notes)
}

/// Render notes as a blog post under the given heading.
///
/// Both title and notes are HTML-escaped.
pub fn write_titled_blog(title: &str, notes: &str) -> String {
    format!(
        "<h2>{}</h2><p>{}</p>",
        escape_html(title),
        escape_html(notes)
    )
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_blog_wraps_notes() {
        assert_eq!(
            write_blog("rust is fun"),
            "<h2>Blog Post</h2><p>rust is fun</p>"
        );
    }

    #[test]
    fn test_write_blog_escapes_markup() {
        let html = write_blog("<script>alert('x')</script> & more");
        assert_eq!(
            html,
            "<h2>Blog Post</h2><p>&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; &amp; more</p>"
        );
    }

    #[test]
    fn test_write_titled_blog() {
        assert_eq!(
            write_titled_blog("Trip \"notes\"", ""),
            "<h2>Trip &quot;notes&quot;</h2><p></p>"
        );
    }
}
