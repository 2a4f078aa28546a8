//! Render a script as HTML. Intended as an example display function more
//! than a styling commitment.

use super::{Diff, Differ, Op};

impl Differ {
    /// Render a script with insertions and deletions highlighted inline.
    /// Newlines are shown as a pilcrow followed by `<br>`.
    pub fn pretty_html(diffs: &[Diff]) -> String {
        let mut html = String::new();
        for diff in diffs {
            let text = diff
                .text()
                .replace('&', "&amp;")
                .replace('<', "&lt;")
                .replace('>', "&gt;")
                .replace('\n', "&para;<br>");
            match diff.op() {
                Op::Insert => {
                    html.push_str("<ins style=\"background:#e6ffe6;\">");
                    html.push_str(&text);
                    html.push_str("</ins>");
                }
                Op::Delete => {
                    html.push_str("<del style=\"background:#ffe6e6;\">");
                    html.push_str(&text);
                    html.push_str("</del>");
                }
                Op::Equal => {
                    html.push_str("<span>");
                    html.push_str(&text);
                    html.push_str("</span>");
                }
            }
        }
        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pretty_html() {
        let diffs = [
            Diff::equal("a\n"),
            Diff::delete("<B>b</B>"),
            Diff::insert("c&d"),
        ];
        assert_eq!(
            "<span>a&para;<br></span>\
             <del style=\"background:#ffe6e6;\">&lt;B&gt;b&lt;/B&gt;</del>\
             <ins style=\"background:#e6ffe6;\">c&amp;d</ins>",
            Differ::pretty_html(&diffs)
        );
    }
}
