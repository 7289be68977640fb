//! Comment stripping for header lines
//!
//! Line-local: a `//` inside a string literal opened earlier on the same line
//! is kept. Line continuations and multi-line or raw string literals are not
//! modelled.

/// Strip trailing whitespace and a trailing `//` comment from one line
pub fn sanitize_line(line: &str) -> String {
    let line = line.trim_end();
    let mut in_string = false;
    let mut rest = line;
    let mut offset = 0;

    loop {
        let next_quote = rest.find('"');
        let next_comment = rest.find("//");
        match (next_quote, next_comment) {
            (Some(q), Some(c)) if c < q => {
                if !in_string {
                    return line[..offset + c].trim_end().to_string();
                }
                offset += c + 2;
                rest = &rest[c + 2..];
            }
            (Some(q), _) => {
                in_string = !in_string;
                offset += q + 1;
                rest = &rest[q + 1..];
            }
            (None, Some(c)) => {
                if !in_string {
                    return line[..offset + c].trim_end().to_string();
                }
                offset += c + 2;
                rest = &rest[c + 2..];
            }
            (None, None) => return line.to_string(),
        }
    }
}

/// Lazy sanitizing adapter over any line iterator
#[derive(Debug, Clone)]
pub struct SanitizedLines<I> {
    inner: I,
}

impl<I> SanitizedLines<I> {
    pub fn new(inner: I) -> Self {
        Self { inner }
    }
}

impl<I> Iterator for SanitizedLines<I>
where
    I: Iterator,
    I::Item: AsRef<str>,
{
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.inner.next().map(|line| sanitize_line(line.as_ref()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Sanitize every line of `text`
pub fn sanitize_lines(text: &str) -> SanitizedLines<std::str::Lines<'_>> {
    SanitizedLines::new(text.lines())
}
