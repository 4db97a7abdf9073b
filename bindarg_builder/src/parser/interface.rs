use crate::parser::{ErrorContext, UsageError};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

#[derive(Debug)]
pub(crate) struct PaddingWidth(usize);

impl PaddingWidth {
    pub(crate) fn new(width: usize) -> Result<Self, ()> {
        // padding must be at least 1
        if width >= 1 {
            Ok(PaddingWidth(width))
        } else {
            Err(())
        }
    }
}

#[derive(Debug)]
pub(crate) struct LeftWidth(usize);

impl LeftWidth {
    pub(crate) fn new(width: usize) -> Result<Self, ()> {
        // left must be at least 1
        if width >= 1 {
            Ok(LeftWidth(width))
        } else {
            Err(())
        }
    }
}

#[derive(Debug)]
pub(crate) struct MiddleWidth(usize);

impl MiddleWidth {
    pub(crate) fn new(width: usize) -> Result<Self, ()> {
        // middle must be at least 2 (so we can hyphenate)
        if width >= 2 {
            Ok(MiddleWidth(width))
        } else {
            Err(())
        }
    }
}

#[derive(Debug)]
pub(crate) struct TotalWidth(pub usize);

/// Lays out a left column (the parameter grammar, including its indent) and a wrapped middle column (the description).
#[derive(Debug)]
pub(crate) struct ColumnRenderer {
    padding: PaddingWidth,
    left: LeftWidth,
    middle: MiddleWidth,
}

// Target 95% of the total width, so the renderer never fills the terminal to the edge.
const TARGET_TOTAL_FACTOR: f64 = 0.95;

// 17 fits precisely 3 words of average length 5, with a space between them.
pub(crate) const MINIMUM_MIDDLE_WIDTH: usize = 17;

impl ColumnRenderer {
    /// Produce a renderer based off the provided widths.
    /// The middle width is widened or narrowed to fit the total width, but never below [`MINIMUM_MIDDLE_WIDTH`].
    pub(crate) fn guided(
        padding: PaddingWidth,
        left: LeftWidth,
        middle: MiddleWidth,
        total_width: TotalWidth,
    ) -> Self {
        let non_middle = left.0 + padding.0;
        let target_total_width = (total_width.0 as f64 * TARGET_TOTAL_FACTOR) as usize;
        let guided_middle = std::cmp::max(middle.0, MINIMUM_MIDDLE_WIDTH);

        let selected = if guided_middle + non_middle <= target_total_width {
            guided_middle
        } else if non_middle < target_total_width {
            std::cmp::max(target_total_width - non_middle, MINIMUM_MIDDLE_WIDTH)
        } else {
            MINIMUM_MIDDLE_WIDTH
        };

        #[cfg(feature = "tracing_debug")]
        {
            debug!(
                "Left column {non_middle} within total {}: selecting middle {selected}.",
                total_width.0
            );
        }

        Self::new(padding, left, MiddleWidth(selected))
    }

    pub(crate) fn new(padding: PaddingWidth, left: LeftWidth, middle: MiddleWidth) -> Self {
        Self {
            padding,
            left,
            middle,
        }
    }

    pub(crate) fn render(&self, indent: usize, left: &str, middle: &str) -> Vec<String> {
        let left = format!("{:indent$}{left}", "");
        let left_width = self.left.0;
        let padding = format!("{:width$}", "", width = self.padding.0);
        let parts = chunk(middle, self.middle.0);
        let mut out = Vec::default();

        if parts.is_empty() {
            out.push(left);
            return out;
        }

        let mut parts = parts.into_iter();

        if left.len() <= left_width {
            let first = parts
                .next()
                .expect("internal error - parts must not be empty");
            out.push(format!("{left:left_width$}{padding}{first}"));
        } else {
            out.push(left);
        }

        for part in parts {
            out.push(format!("{:left_width$}{padding}{part}", ""));
        }

        out
    }
}

pub(crate) fn chunk(paragraph: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::default();
    let mut current = String::default();

    for word in paragraph.split(' ').filter(|w| !w.is_empty()) {
        let length = word.chars().count();

        if current.is_empty() {
            hyphenate(width, &mut lines, &mut current, word);
        } else if current.chars().count() + length + 1 <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            hyphenate(width, &mut lines, &mut current, word);
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

fn hyphenate(width: usize, lines: &mut Vec<String>, current: &mut String, word: &str) {
    let characters: Vec<char> = word.chars().collect();
    let increment = width - 1;
    let mut start = 0;

    while characters.len() - start > width {
        let piece: String = characters[start..start + increment].iter().collect();
        lines.push(format!("{piece}-"));
        start += increment;
    }

    current.extend(&characters[start..]);
}

pub(crate) trait UserInterface {
    fn print(&self, message: String);
    fn print_error(&self, error: UsageError);
    fn print_error_context(&self, error_context: ErrorContext);
}

#[derive(Default)]
pub(crate) struct ConsoleInterface {}

impl UserInterface for ConsoleInterface {
    fn print(&self, message: String) {
        println!("{message}");
    }

    fn print_error(&self, error: UsageError) {
        eprintln!("{error}");
    }

    fn print_error_context(&self, error_context: ErrorContext) {
        eprintln!("{error_context}");
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn renderer(left: usize, middle: usize) -> ColumnRenderer {
        ColumnRenderer::new(
            PaddingWidth::new(3).unwrap(),
            LeftWidth::new(left).unwrap(),
            MiddleWidth::new(middle).unwrap(),
        )
    }

    #[test]
    fn column_renderer_simple() {
        let cr = renderer(6, 10);
        assert_eq!(cr.render(1, "abc", "def"), vec![" abc     def"]);
        assert_eq!(cr.render(1, "abc", ""), vec![" abc"]);
        assert_eq!(cr.render(0, "abcdef", "1"), vec!["abcdef   1"]);
    }

    #[test]
    fn column_renderer_wrap() {
        let cr = renderer(4, 10);
        assert_eq!(
            cr.render(1, "ab", "one two three four"),
            vec![" ab    one two", "       three four"]
        );
    }

    #[test]
    fn column_renderer_left_overflow() {
        let cr = renderer(4, 10);
        assert_eq!(
            cr.render(1, "abcdefgh", "one"),
            vec![" abcdefgh", "       one"]
        );
    }

    #[test]
    fn column_renderer_guided() {
        let cr = ColumnRenderer::guided(
            PaddingWidth::new(3).unwrap(),
            LeftWidth::new(10).unwrap(),
            MiddleWidth::new(50).unwrap(),
            TotalWidth(100),
        );
        assert_eq!(cr.middle.0, 50);

        let cr = ColumnRenderer::guided(
            PaddingWidth::new(3).unwrap(),
            LeftWidth::new(10).unwrap(),
            MiddleWidth::new(200).unwrap(),
            TotalWidth(100),
        );
        assert_eq!(cr.middle.0, 82);

        let cr = ColumnRenderer::guided(
            PaddingWidth::new(3).unwrap(),
            LeftWidth::new(100).unwrap(),
            MiddleWidth::new(200).unwrap(),
            TotalWidth(100),
        );
        assert_eq!(cr.middle.0, MINIMUM_MIDDLE_WIDTH);
    }

    #[rstest]
    #[case("", 5, vec![])]
    #[case("a", 5, vec!["a"])]
    #[case("a b c", 3, vec!["a b", "c"])]
    #[case("  a   b  ", 5, vec!["a b"])]
    #[case("abcdef", 3, vec!["ab-", "cd-", "ef"])]
    #[case("abcdefg", 3, vec!["ab-", "cd-", "efg"])]
    #[case("x abcdef", 4, vec!["x", "abc-", "def"])]
    #[case("héllo wörld", 5, vec!["héllo", "wörld"])]
    fn chunk_paragraph(#[case] paragraph: &str, #[case] width: usize, #[case] expected: Vec<&str>) {
        assert_eq!(chunk(paragraph, width), expected);
    }

    #[rstest]
    #[case(0, false)]
    #[case(1, true)]
    fn padding_width(#[case] width: usize, #[case] ok: bool) {
        assert_eq!(PaddingWidth::new(width).is_ok(), ok);
    }

    #[rstest]
    #[case(1, false)]
    #[case(2, true)]
    fn middle_width(#[case] width: usize, #[case] ok: bool) {
        assert_eq!(MiddleWidth::new(width).is_ok(), ok);
    }
}
