use std::mem;
use std::path::MAIN_SEPARATOR;

use regex::Regex;

use crate::error::CompileError;
use crate::root::{is_separator, GLOB_META};
use crate::segment::Segment;

// ---------------------------------------------------------------------------
// Component accumulator
// ---------------------------------------------------------------------------

/// The two parallel buffers built for one path component: the raw glob
/// text and its regex translation.
#[derive(Default)]
struct Component {
    literal: String,
    regex:   String,
    braces:  usize,
}

impl Component {
    fn push_literal(&mut self, c: char) {
        self.literal.push(c);
        let mut buf = [0u8; 4];
        self.regex.push_str(&regex::escape(c.encode_utf8(&mut buf)));
    }

    /// Turn the buffered component into a segment. Empty components
    /// (doubled separators) produce nothing.
    fn finish(self) -> Result<Option<Segment>, CompileError> {
        if self.literal.is_empty() {
            return Ok(None);
        }
        if self.literal == "**" {
            return Ok(Some(Segment::Recurse));
        }
        if self.literal.contains("**") {
            return Err(CompileError::RecurseNotAlone(self.literal));
        }
        if !self.literal.contains(GLOB_META) {
            return Ok(Some(Segment::Constant(self.literal)));
        }

        let source = format!("(?i)^{}$", self.regex);
        match Regex::new(&source) {
            Ok(re) => Ok(Some(Segment::Filter(re))),
            Err(source) => Err(CompileError::InvalidRegex {
                component: self.literal,
                source,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// compile_segments()
// ---------------------------------------------------------------------------

/// Compile the glob remainder of a pattern (everything after its constant
/// root) into an ordered segment list.
///
/// Each component between `/` or `\` separators becomes a
/// [`Segment::Constant`] when it holds no glob syntax, a
/// [`Segment::Recurse`] when it is exactly `**`, and a [`Segment::Filter`]
/// otherwise. A trailing `**` is completed with a catch-all filter.
///
/// ```
/// use globex::{compile_segments, Segment};
///
/// let segs = compile_segments("src/**/*.rs").unwrap();
/// assert_eq!(segs.len(), 3);
/// assert_eq!(segs[0], Segment::Constant("src".into()));
/// assert!(segs[1].is_recurse());
/// assert!(segs[2].is_match("LIB.RS"));
/// ```
pub fn compile_segments(remainder: &str) -> Result<Vec<Segment>, CompileError> {
    let mut normalized = remainder.to_string();
    if !normalized.ends_with(is_separator) {
        normalized.push(MAIN_SEPARATOR);
    }
    let chars: Vec<char> = normalized.chars().collect();

    let mut segments = Vec::new();
    let mut comp = Component::default();
    let mut start = 0;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if is_separator(c) => {
                if comp.braces > 0 {
                    let text = component_at(&chars, start);
                    return Err(if chars[i..].contains(&'}') {
                        CompileError::SeparatorInBrace(text)
                    } else {
                        CompileError::UnclosedBrace(text)
                    });
                }
                if let Some(seg) = mem::take(&mut comp).finish()? {
                    segments.push(seg);
                }
                start = i + 1;
            }
            '*' => {
                comp.literal.push(c);
                comp.regex.push_str(".*");
            }
            '?' => {
                comp.literal.push(c);
                comp.regex.push('.');
            }
            '{' => {
                comp.braces += 1;
                comp.literal.push(c);
                comp.regex.push('(');
            }
            '}' => {
                if comp.braces == 0 {
                    return Err(CompileError::UnmatchedBrace(component_at(&chars, start)));
                }
                comp.braces -= 1;
                comp.literal.push(c);
                comp.regex.push(')');
            }
            ',' if comp.braces > 0 => {
                comp.literal.push(c);
                comp.regex.push('|');
            }
            '[' => {
                let end = class_end(&chars, i)
                    .ok_or_else(|| CompileError::UnclosedBracket(component_at(&chars, start)))?;
                comp.literal.extend(&chars[i..=end]);
                translate_class(&chars[i + 1..end], &mut comp.regex);
                i = end;
            }
            _ => comp.push_literal(c),
        }
        i += 1;
    }

    if segments.last().is_some_and(Segment::is_recurse) {
        segments.push(catch_all()?);
    }

    Ok(segments)
}

/// The filter completing a trailing `**`: any name at all.
pub(crate) fn catch_all() -> Result<Segment, CompileError> {
    Regex::new(Segment::CATCH_ALL)
        .map(Segment::Filter)
        .map_err(|source| CompileError::InvalidRegex {
            component: "**".into(),
            source,
        })
}

// ---------------------------------------------------------------------------
// Character classes
// ---------------------------------------------------------------------------

/// Index of the `]` closing the class opened at `open`, skipping `\`-escapes.
/// A `]` right after `[` or `[!` is part of the class, not its end.
fn class_end(chars: &[char], open: usize) -> Option<usize> {
    let mut j = open + 1;
    if matches!(chars.get(j), Some('!' | '^')) {
        j += 1;
    }
    if chars.get(j) == Some(&']') {
        j += 1;
    }
    while j < chars.len() {
        match chars[j] {
            '\\' => j += 2,
            ']' => return Some(j),
            '/' => return None,
            _ => j += 1,
        }
    }
    None
}

/// Copy a glob class body into `regex` as a regex class. `[!...]` becomes
/// `[^...]`; characters the regex engine treats specially inside a class
/// are escaped, and `-` stays a range operator only between two members.
fn translate_class(body: &[char], regex: &mut String) {
    regex.push('[');
    let body = match body.split_first() {
        Some(('!' | '^', rest)) => {
            regex.push('^');
            rest
        }
        _ => body,
    };

    let mut k = 0;
    while k < body.len() {
        let c = body[k];
        match c {
            '\\' => {
                regex.push('\\');
                match body.get(k + 1) {
                    Some(&next) => {
                        regex.push(next);
                        k += 1;
                    }
                    None => regex.push('\\'),
                }
            }
            '-' if k == 0 || k + 1 == body.len() => regex.push_str("\\-"),
            '[' | ']' | '&' | '~' | '^' => {
                regex.push('\\');
                regex.push(c);
            }
            _ => regex.push(c),
        }
        k += 1;
    }
    regex.push(']');
}

/// The text of the component starting at `start`, for error messages.
fn component_at(chars: &[char], start: usize) -> String {
    chars[start..]
        .iter()
        .take_while(|c| !is_separator(**c))
        .collect()
}
