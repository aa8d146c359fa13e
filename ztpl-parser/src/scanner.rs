// MIT License
//
// Copyright (c) 2024 Jerome Johnson
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.


//! Marker scanning
//!
//! This module walks a template and splits it into static text and markers.
//! A marker opens with the start delimiter and closes with the first end
//! delimiter found outside of a quoted region of its content.
//!
//! # Marker Types
//!
//! - Code: `[[ if (z.ok) { ]]` - emitted verbatim, produces no output
//! - Raw: `[[- z.name ]]` - outputs the value of the expression
//! - Escaped: `[[= z.name ]]` - outputs the HTML escaped value
//!
//! Expression markers accept a trim suffix: `>` strips line endings from both
//! ends of the value, `>>` strips all whitespace.
//!
//! # Examples
//!
//! ```rust
//! use ztpl_parser::scanner::{Delimiters, MarkerKind, Scanner, Segment};
//!
//! let delimiters = Delimiters::default();
//! let mut scanner = Scanner::new("Hello [[= z.name ]]!", &delimiters);
//! assert!(matches!(scanner.next(), Some(Segment::Text("Hello "))));
//! match scanner.next() {
//!     Some(Segment::Marker(marker)) => {
//!         assert_eq!(marker.kind, MarkerKind::Escaped);
//!         assert_eq!(marker.content, " z.name ");
//!     }
//!     _ => unreachable!(),
//! }
//! ```

use std::ops::Range;

/// Default start delimiter
pub static DEFAULT_START: &str = "[[";
/// Default end delimiter
pub static DEFAULT_END: &str = "]]";

const BOM: char = '\u{feff}';

/// The literal strings bounding a marker, never empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiters {
    start: String,
    end: String,
}

impl Delimiters {
    /// Creates a delimiter pair, using the default for an empty string
    pub fn new(start: &str, end: &str) -> Self {
        Self {
            start: if start.is_empty() { DEFAULT_START } else { start }.to_string(),
            end: if end.is_empty() { DEFAULT_END } else { end }.to_string(),
        }
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn end(&self) -> &str {
        &self.end
    }
}

impl Default for Delimiters {
    fn default() -> Self {
        Self::new(DEFAULT_START, DEFAULT_END)
    }
}

/// What a marker does with its content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// Bare code, no output
    Code,
    /// Expression output as is: `[[- expr ]]`
    Raw,
    /// Expression output HTML escaped: `[[= expr ]]`
    Escaped,
}

/// Trimming applied to the value of an expression marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Trim {
    #[default]
    None,
    /// Strip CR/LF from both ends: `[[- expr >]]`
    Eol,
    /// Strip all whitespace from both ends: `[[- expr >>]]`
    Whitespace,
}

/// A delimited region of the template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker<'a> {
    /// Byte range of the marker, delimiters included
    pub range: Range<usize>,
    /// The content with the kind prefix and trim suffix removed
    pub content: &'a str,
    pub kind: MarkerKind,
    /// Always `Trim::None` for code markers
    pub trim: Trim,
}

/// A piece of the template produced by the scanner
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Marker(Marker<'a>),
}

/// Lazy iterator over the segments of a template
///
/// Static text between markers is yielded as `Segment::Text`, empty text is
/// never yielded. A marker without an end delimiter is not an error: the rest
/// of the template is yielded as text and scanning stops.
pub struct Scanner<'a, 'd> {
    src: &'a str,
    start: &'d str,
    end: &'d [u8],
    pos: usize,
    pending: Option<Marker<'a>>,
    done: bool,
}

impl<'a, 'd> Scanner<'a, 'd> {
    /// Creates a scanner over `src`, skipping a leading byte order mark
    pub fn new(src: &'a str, delimiters: &'d Delimiters) -> Self {
        Self {
            src,
            start: &delimiters.start,
            end: delimiters.end.as_bytes(),
            pos: if src.starts_with(BOM) { BOM.len_utf8() } else { 0 },
            pending: None,
            done: false,
        }
    }

    /// Yields whatever text is left and stops
    fn rest(&mut self) -> Option<Segment<'a>> {
        self.done = true;
        if self.pos < self.src.len() {
            let text = &self.src[self.pos..];
            self.pos = self.src.len();
            return Some(Segment::Text(text));
        }
        None
    }

    /// Finds the end delimiter of the marker opened at `open`
    fn close(&self, open: usize) -> Option<Marker<'a>> {
        let bytes = self.src.as_bytes();
        let content_start = open + self.start.len();
        let mut quote: Option<u8> = None;
        let mut escaped = false;
        let mut matched = 0;
        for (j, &ch) in bytes.iter().enumerate().skip(content_start) {
            if escaped {
                escaped = false;
                continue;
            }
            match quote {
                Some(_) if ch == b'\\' => escaped = true,
                Some(q) if ch == q => quote = None,
                Some(_) => (),
                // the end delimiter only counts when its bytes are contiguous
                None => match ch {
                    b'"' | b'\'' | b'`' => {
                        quote = Some(ch);
                        matched = 0;
                    }
                    _ if ch == self.end[matched] => {
                        matched += 1;
                        if matched == self.end.len() {
                            return Some(self.marker(open, content_start, j + 1));
                        }
                    }
                    _ => matched = 0,
                },
            }
        }
        None
    }

    /// Classifies a closed marker spanning `open..close`
    fn marker(&self, open: usize, content_start: usize, close: usize) -> Marker<'a> {
        let bytes = self.src.as_bytes();
        let mut start = content_start;
        let mut end = close - self.end.len();
        let eol = end - start >= 2 && bytes[end - 1] == b'>';
        let whitespace = eol && end - start >= 3 && bytes[end - 2] == b'>';
        let trim = if whitespace {
            end -= 2;
            Trim::Whitespace
        } else if eol {
            end -= 1;
            Trim::Eol
        } else {
            Trim::None
        };
        let kind = match &bytes[start..end] {
            [b'-', _, ..] => MarkerKind::Raw,
            [b'=', _, ..] => MarkerKind::Escaped,
            _ => MarkerKind::Code,
        };
        if kind != MarkerKind::Code {
            start += 1;
        }
        Marker {
            range: open..close,
            content: &self.src[start..end],
            kind,
            trim: if kind == MarkerKind::Code { Trim::None } else { trim },
        }
    }
}

impl<'a> Iterator for Scanner<'a, '_> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(marker) = self.pending.take() {
            return Some(Segment::Marker(marker));
        }
        if self.done {
            return None;
        }
        let open = match self.src[self.pos..].find(self.start) {
            Some(offset) => self.pos + offset,
            None => return self.rest(),
        };
        let marker = match self.close(open) {
            Some(marker) => marker,
            None => return self.rest(),
        };
        let text = &self.src[self.pos..open];
        self.pos = marker.range.end;
        if text.is_empty() {
            return Some(Segment::Marker(marker));
        }
        self.pending = Some(marker);
        Some(Segment::Text(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(src: &str) -> Vec<Segment<'_>> {
        Scanner::new(src, &Delimiters::default()).collect()
    }

    fn markers(src: &str) -> Vec<(MarkerKind, Trim, &str)> {
        scan(src)
            .into_iter()
            .filter_map(|segment| match segment {
                Segment::Marker(marker) => Some((marker.kind, marker.trim, marker.content)),
                Segment::Text(_) => None,
            })
            .collect()
    }

    #[test]
    fn text_only() {
        assert_eq!(scan("<hello world>"), vec![Segment::Text("<hello world>")]);
        assert!(scan("").is_empty());
    }

    #[test]
    fn marker_kinds() {
        assert_eq!(
            markers("[[ if (x) { ]][[- a ]][[= b ]]"),
            vec![
                (MarkerKind::Code, Trim::None, " if (x) { "),
                (MarkerKind::Raw, Trim::None, " a "),
                (MarkerKind::Escaped, Trim::None, " b "),
            ]
        );
    }

    #[test]
    fn interleaved_text() {
        let segments = scan("A[[ if (z.n===5) { ]]B[[ } ]]C");
        assert_eq!(segments.len(), 5);
        assert_eq!(segments[0], Segment::Text("A"));
        assert_eq!(segments[2], Segment::Text("B"));
        assert_eq!(segments[4], Segment::Text("C"));
        match &segments[1] {
            Segment::Marker(marker) => {
                assert_eq!(marker.range, 1..21);
                assert_eq!(marker.content, " if (z.n===5) { ");
            }
            other => panic!("expected marker, got {:?}", other),
        }
    }

    #[test]
    fn trim_suffixes() {
        assert_eq!(
            markers("[[- a >]][[= b >>]][[- c>>>]]"),
            vec![
                (MarkerKind::Raw, Trim::Eol, " a "),
                (MarkerKind::Escaped, Trim::Whitespace, " b "),
                (MarkerKind::Raw, Trim::Whitespace, " c>"),
            ]
        );
    }

    #[test]
    fn code_markers_never_trim() {
        assert_eq!(
            markers("[[ } >]][[ } >>]]"),
            vec![
                (MarkerKind::Code, Trim::None, " } "),
                (MarkerKind::Code, Trim::None, " } "),
            ]
        );
    }

    #[test]
    fn prefix_needs_content() {
        assert_eq!(markers("[[-]]"), vec![(MarkerKind::Code, Trim::None, "-")]);
        assert_eq!(markers("[[=>]]"), vec![(MarkerKind::Code, Trim::None, "=")]);
        assert_eq!(markers("[[-x]]"), vec![(MarkerKind::Raw, Trim::None, "x")]);
        assert_eq!(markers("[[]]"), vec![(MarkerKind::Code, Trim::None, "")]);
        assert_eq!(markers("[[>]]"), vec![(MarkerKind::Code, Trim::None, ">")]);
    }

    #[test]
    fn end_inside_quotes() {
        assert_eq!(
            markers(r#"[[- "321 [[ so sneaky! ]] 123" ]]"#),
            vec![(MarkerKind::Raw, Trim::None, r#" "321 [[ so sneaky! ]] 123" "#)]
        );
        assert_eq!(
            markers("[[- '321 ]] 123' ]]"),
            vec![(MarkerKind::Raw, Trim::None, " '321 ]] 123' ")]
        );
        assert_eq!(
            markers("[[- `a \" ]] ' b` ]]"),
            vec![(MarkerKind::Raw, Trim::None, " `a \" ]] ' b` ")]
        );
    }

    #[test]
    fn escaped_quotes() {
        assert_eq!(
            markers(r#"[[- "a \" ]] b" ]]"#),
            vec![(MarkerKind::Raw, Trim::None, r#" "a \" ]] b" "#)]
        );
        assert_eq!(
            markers(r#"[[- "a \\" ]]tail"#),
            vec![(MarkerKind::Raw, Trim::None, r#" "a \\" "#)]
        );
    }

    #[test]
    fn unterminated_marker_is_text() {
        assert_eq!(scan("a [[- b"), vec![Segment::Text("a [[- b")]);
        let segments = scan("x[[- a ]]y[[ b");
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[2], Segment::Text("y[[ b"));
        assert_eq!(scan("[[- \"open ]]"), vec![Segment::Text("[[- \"open ]]")]);
    }

    #[test]
    fn partial_end_match_resets() {
        let delimiters = Delimiters::new("<%", "%>");
        let segments: Vec<_> = Scanner::new("<%- a %%> %>", &delimiters).collect();
        match &segments[0] {
            Segment::Marker(marker) => assert_eq!(marker.content, " a %%> "),
            other => panic!("expected marker, got {:?}", other),
        }
    }

    #[test]
    fn custom_delimiters() {
        let delimiters = Delimiters::new("!@", "$$");
        let segments: Vec<_> = Scanner::new("x!@- z.str $$y", &delimiters).collect();
        assert_eq!(segments.len(), 3);
        match &segments[1] {
            Segment::Marker(marker) => {
                assert_eq!(marker.kind, MarkerKind::Raw);
                assert_eq!(marker.content, " z.str ");
            }
            other => panic!("expected marker, got {:?}", other),
        }
    }

    #[test]
    fn empty_delimiters_fall_back() {
        assert_eq!(Delimiters::new("", ""), Delimiters::default());
        assert_eq!(Delimiters::new("{{", "").end(), "]]");
        assert_eq!(Delimiters::new("{{", "").start(), "{{");
    }

    #[test]
    fn byte_order_mark_skipped() {
        assert_eq!(scan("\u{feff}a[[- b ]]")[0], Segment::Text("a"));
        assert_eq!(scan("\u{feff}[[- b ]]").len(), 1);
    }

    #[test]
    fn multibyte_text() {
        assert_eq!(
            scan("héllo [[- «x» ]] wörld")[2],
            Segment::Text(" wörld")
        );
    }

    #[test]
    fn interrupted_end_does_not_close() {
        assert_eq!(
            markers("[[- a ]\\] b ]]"),
            vec![(MarkerKind::Raw, Trim::None, " a ]\\] b ")]
        );
        assert_eq!(
            markers("[[- a ]\"x\"] b ]]"),
            vec![(MarkerKind::Raw, Trim::None, " a ]\"x\"] b ")]
        );
        assert_eq!(scan("[[- a ]'x']"), vec![Segment::Text("[[- a ]'x']")]);
    }

    #[test]
    fn multibyte_delimiters() {
        let delimiters = Delimiters::new("«", "éé");
        let segments: Vec<_> = Scanner::new("«- aé\\é tail", &delimiters).collect();
        assert_eq!(segments, vec![Segment::Text("«- aé\\é tail")]);

        let segments: Vec<_> = Scanner::new("x«= «b» éé!", &delimiters).collect();
        assert_eq!(segments.len(), 3);
        match &segments[1] {
            Segment::Marker(marker) => {
                assert_eq!(marker.kind, MarkerKind::Escaped);
                assert_eq!(marker.content, " «b» ");
                assert_eq!(marker.range, 1..15);
            }
            other => panic!("expected marker, got {:?}", other),
        }
        assert_eq!(segments[2], Segment::Text("!"));

        let delimiters = Delimiters::new("[[", "éé");
        let segments: Vec<_> = Scanner::new("[[- aé\\é tail", &delimiters).collect();
        assert_eq!(segments, vec![Segment::Text("[[- aé\\é tail")]);
    }
}
