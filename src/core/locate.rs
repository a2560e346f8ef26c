// RunShape - core/locate.rs
//
// Fragment location: narrow a raw document to the element carrying an
// identifying class token, or fall back to the whole document.
// Malformed and truncated markup is a normal input here, never an error.

use crate::core::markers::{class_tag_pattern, compile};
use crate::util::error::MarkerError;
use regex::Regex;

/// The region of a document the extractors should look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment<'a> {
    pub html: &'a str,
    /// False when no marked element was found and `html` is the whole input.
    pub located: bool,
}

/// Finds the first element whose `class` contains a given token.
#[derive(Debug, Clone)]
pub struct Locator {
    open: Regex,
}

impl Locator {
    /// Build a locator for `token`. `field` names the marker for errors.
    pub fn new(field: &'static str, token: &str) -> Result<Self, MarkerError> {
        let pattern = format!(r"(?i)<([a-z][a-z0-9]*){}", class_tag_pattern(token));
        Ok(Self {
            open: compile(field, &pattern)?,
        })
    }

    /// Return the marked element (opening tag through its matching close
    /// tag), or the whole document when nothing is marked.
    ///
    /// An element that is never closed extends to the end of the document.
    /// A truncated opening tag (no `>`) does not count as a match.
    pub fn locate<'a>(&self, html: &'a str) -> Fragment<'a> {
        let Some(caps) = self.open.captures(html) else {
            return Fragment {
                html,
                located: false,
            };
        };
        let (Some(whole), Some(tag)) = (caps.get(0), caps.get(1)) else {
            return Fragment {
                html,
                located: false,
            };
        };
        let start = whole.start();
        let open_end = whole.end();
        if html[..open_end].ends_with("/>") {
            return Fragment {
                html: &html[start..open_end],
                located: true,
            };
        }

        // ASCII lowercasing keeps byte offsets identical to `html`.
        let lc = html.to_ascii_lowercase();
        let tag = tag.as_str().to_ascii_lowercase();
        let end = block_end(&lc, &tag, open_end).unwrap_or(html.len());

        Fragment {
            html: &html[start..end],
            located: true,
        }
    }
}

/// An element's opening tag and inner markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Block<'a> {
    pub open: &'a str,
    pub inner: &'a str,
}

/// Split `html` into the elements whose opening tags match `open`.
///
/// Each element ends at its first `close` match, at the next opening tag,
/// or at the end of the input, whichever comes first, so unclosed elements
/// (`<p>a<p>b`) still split correctly. Nesting is not tracked.
pub(crate) fn blocks<'a>(html: &'a str, open: &Regex, close: &Regex) -> Vec<Block<'a>> {
    let opens: Vec<_> = open.find_iter(html).collect();
    let mut out = Vec::with_capacity(opens.len());
    for (i, m) in opens.iter().enumerate() {
        let limit = opens.get(i + 1).map_or(html.len(), |next| next.start());
        let body = &html[m.end()..limit];
        let end = close.find(body).map_or(body.len(), |c| c.start());
        out.push(Block {
            open: m.as_str(),
            inner: &body[..end],
        });
    }
    out
}

/// Byte offset just past the close tag balancing an element of `tag`
/// opened before `from`. Nested elements of the same name are counted.
///
/// One forward pass over the `<` positions, so deep nesting stays linear.
fn block_end(lc: &str, tag: &str, from: usize) -> Option<usize> {
    let bytes = lc.as_bytes();
    let mut depth = 1usize;
    let mut pos = from;

    while let Some(rel) = lc.get(pos..)?.find('<') {
        let at = pos + rel;
        let closing = bytes.get(at + 1) == Some(&b'/');
        let name_start = if closing { at + 2 } else { at + 1 };
        pos = at + 1;
        if !names_tag(bytes, name_start, tag) {
            continue;
        }
        if !closing {
            depth += 1;
            continue;
        }
        let end = lc[at..].find('>').map_or(lc.len(), |i| at + i + 1);
        depth -= 1;
        if depth == 0 {
            return Some(end);
        }
        pos = end;
    }
    None
}

/// True if the tag name starting at `start` is exactly `tag`, so `p` does
/// not match `pre`.
fn names_tag(bytes: &[u8], start: usize, tag: &str) -> bool {
    let end = start + tag.len();
    bytes.get(start..end) == Some(tag.as_bytes())
        && !bytes.get(end).is_some_and(|b| b.is_ascii_alphanumeric())
}
