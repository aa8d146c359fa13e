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


//! String literal encoding for generated Rust code

use std::sync::LazyLock;

use regex::{Captures, Regex};

static SPECIAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[\"\\\\\r\n\u{2028}\u{2029}]").unwrap());

/// Encodes `src` as a double quoted Rust string literal
///
/// Quotes, backslashes, carriage returns, line feeds and the unicode line and
/// paragraph separators are escaped, everything else is copied as is.
pub fn string_literal(src: &str) -> String {
    let escaped = SPECIAL.replace_all(src, |captures: &Captures| match &captures[0] {
        "\r" => "\\r".to_string(),
        "\n" => "\\n".to_string(),
        "\u{2028}" => "\\u{2028}".to_string(),
        "\u{2029}" => "\\u{2029}".to_string(),
        other => format!("\\{}", other),
    });
    format!("\"{}\"", escaped)
}
