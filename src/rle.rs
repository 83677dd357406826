use thiserror::Error;
use tracing::warn;

use crate::GridOffset;
use crate::cell::CellState;
use crate::parse_util;
use crate::parse_util::ConvertError;
use crate::parse_util::ParseError;
use crate::parse_util::convert;
use crate::pattern::Pattern;
use crate::pattern::PatternError;
use crate::rule_set::RuleError;
use crate::rule_set::RuleSet;

pub struct RleFile<'a> {
    pub name: Option<&'a [u8]>,
    pub author: Option<&'a [u8]>,

    /// Suggested position of the pattern's top-left corner, from a `#P` or `#R` line
    pub offset: Option<(GridOffset, GridOffset)>,

    /// Rule from the header or an `#r` line, if any
    pub rules: Option<RuleSet>,

    pub pattern: Pattern,
}

impl RleFile<'_> {
    /// The pattern name, lossily decoded
    pub fn name_lossy(&self) -> Option<String> {
        self.name
            .map(|name| String::from_utf8_lossy(name).trim().to_string())
    }
}

#[derive(Debug, Error)]
pub enum RleError {
    #[error("Comment line error: {0}")]
    CommentLine(#[from] RleCommentLineError),

    #[error("Header line error: {0}")]
    HeaderLine(#[from] RleHeaderLineError),

    #[error("Encoding error: {0}")]
    Encoding(#[from] RleEncodingError),
}

/// Parse the RLE file format. Assumes the bytes are valid Ascii.
///
/// See: https://conwaylife.com/wiki/Run_Length_Encoded
pub fn read_rle(mut bytes: &[u8]) -> Result<RleFile<'_>, RleError> {
    let (mut name, mut author, mut offset, mut rules) = (None, None, None, None);

    // Parse as many comment lines as possible
    loop {
        let bytes_ = parse_util::take_ws(bytes);
        let (Some(line), rest) = read_line_comment(bytes_)? else {
            bytes = bytes_;
            break;
        };

        match line {
            RleCommentLine::Comment => {}
            RleCommentLine::Name { name: n } => {
                if name.is_some() {
                    warn!("RLE file name already defined. Using latest");
                }

                name = Some(n);
            }
            RleCommentLine::Author { author: a } => {
                if author.is_some() {
                    warn!("RLE author already defined. Using latest");
                }

                author = Some(a);
            }
            RleCommentLine::Offset { x, y } => {
                if offset.is_some() {
                    warn!("RLE offset already defined. Using latest");
                }

                offset = Some((x, y))
            }
            RleCommentLine::RuleSet { set } => {
                rules = Some(set);
            }
        }

        bytes = rest;
    }

    let (header, bytes) = read_line_header(bytes)?;

    if let Some(set) = header.set {
        if rules.is_some_and(|r| r != set) {
            warn!(%set, "RLE rule already defined. Using the header's");
        }

        rules = Some(set);
    }

    let pattern = read_encoding(bytes, header.width, header.height)?;

    Ok(RleFile {
        name,
        author,
        offset,
        rules,
        pattern,
    })
}

enum RleCommentLine<'a> {
    Comment,
    Name { name: &'a [u8] },
    Author { author: &'a [u8] },
    Offset { x: GridOffset, y: GridOffset },
    RuleSet { set: RuleSet },
}

#[derive(Debug, Error)]
pub enum RleCommentLineError {
    #[error("No comment type")]
    NoType,

    #[error("Empty name line")]
    EmptyName,

    #[error("Empty author line")]
    EmptyAuthor,

    #[error("Invalid rule: {0}")]
    InvalidRule(#[from] RuleError),

    #[error("Expected an offset \"x y\"")]
    NoOffset,

    #[error("Invalid offset: {0}")]
    InvalidOffset(#[from] ConvertError),

    #[error("Invalid comment type, found '{got}'")]
    InvalidType { got: char },
}

/// Attempt to parse a comment line, otherwise leaves `bytes` as-is.
fn read_line_comment(
    bytes: &'_ [u8],
) -> Result<(Option<RleCommentLine<'_>>, &'_ [u8]), RleCommentLineError> {
    let Ok(bytes) = parse_util::expect(b'#', bytes) else {
        return Ok((None, bytes));
    };

    let (Some(b), bytes) = parse_util::take_1(bytes) else {
        return Err(RleCommentLineError::NoType);
    };

    let bytes = parse_util::take_blanks(bytes);
    let (line, bytes) = parse_util::take_with(b'\n', bytes);
    let line = line.map(<[u8]>::trim_ascii).filter(|l| !l.is_empty());

    match b {
        // Comment line
        b'C' | b'c' => Ok((Some(RleCommentLine::Comment), bytes)),

        // Pattern name
        b'N' => {
            let name = line.ok_or(RleCommentLineError::EmptyName)?;

            Ok((Some(RleCommentLine::Name { name }), bytes))
        }

        // Pattern author
        b'O' => {
            let author = line.ok_or(RleCommentLineError::EmptyAuthor)?;

            Ok((Some(RleCommentLine::Author { author }), bytes))
        }

        // Pattern offset
        b'R' | b'P' => {
            let line = line.ok_or(RleCommentLineError::NoOffset)?;

            let (Some(x), rest) = parse_util::take_until_ws(line) else {
                return Err(RleCommentLineError::NoOffset);
            };
            let rest = parse_util::take_ws(rest);
            let (Some(y), _) = parse_util::take_until_ws(rest) else {
                return Err(RleCommentLineError::NoOffset);
            };

            let line = RleCommentLine::Offset {
                x: convert(x)?,
                y: convert(y)?,
            };

            Ok((Some(line), bytes))
        }

        // Pattern rules
        b'r' => {
            let line = line.unwrap_or_default();
            let set = String::from_utf8_lossy(line).parse()?;

            Ok((Some(RleCommentLine::RuleSet { set }), bytes))
        }

        b => Err(RleCommentLineError::InvalidType { got: b as char }),
    }
}

struct RleHeaderLine {
    width: usize,
    height: usize,
    set: Option<RuleSet>,
}

#[derive(Debug, Error)]
pub enum RleHeaderLineError {
    #[error("Parse error: {0}")]
    ParseError(#[from] ParseError),

    #[error("Invalid token: expected ',' or '\\n', found '{got}'")]
    InvalidToken { got: char },

    #[error("Expected x dimension, found end of input")]
    NoX,

    #[error("Failed to parse x dimension: {0}")]
    ParseX(#[source] ConvertError),

    #[error("Expected y dimension, found end of input")]
    NoY,

    #[error("Failed to parse y dimension: {0}")]
    ParseY(#[source] ConvertError),

    #[error("Expected a rule, found end of input")]
    NoRule,

    #[error("Invalid rule: {0}")]
    InvalidRule(#[from] RuleError),
}

/// Parse the `x = m, y = n[, rule = abc]` line
fn read_line_header(bytes: &[u8]) -> Result<(RleHeaderLine, &[u8]), RleHeaderLineError> {
    let bytes = parse_util::expect(b'x', bytes)?;
    let bytes = parse_util::take_ws(bytes);
    let bytes = parse_util::expect(b'=', bytes)?;
    let bytes = parse_util::take_ws(bytes);

    let (Some(x_bytes), bytes) = parse_util::take_with(b',', bytes) else {
        return Err(RleHeaderLineError::NoX);
    };
    let width: usize = convert(x_bytes).map_err(RleHeaderLineError::ParseX)?;

    let bytes = parse_util::take_ws(bytes);
    let bytes = parse_util::expect(b'y', bytes)?;
    let bytes = parse_util::take_ws(bytes);
    let bytes = parse_util::expect(b'=', bytes)?;
    let bytes = parse_util::take_ws(bytes);

    // Dimensions can be terminated with either `,` or a line break.
    let p = |b| b == b',' || b == b'\n' || b == b'\r';
    let (Some(y_bytes), bytes) = parse_util::take_until_fn(p, bytes) else {
        return Err(RleHeaderLineError::NoY);
    };
    let height: usize = convert(y_bytes).map_err(RleHeaderLineError::ParseY)?;

    let bytes = parse_util::take_blanks(bytes);

    match parse_util::take_1(bytes) {
        (Some(b','), bytes) => {
            let bytes = parse_util::take_ws(bytes);
            let bytes = parse_util::expect_slice(b"rule", bytes)?;
            let bytes = parse_util::take_ws(bytes);
            let bytes = parse_util::expect(b'=', bytes)?;
            let bytes = parse_util::take_ws(bytes);

            let (Some(rule), bytes) = parse_util::take_until_ws(bytes) else {
                return Err(RleHeaderLineError::NoRule);
            };

            let set = String::from_utf8_lossy(rule).parse()?;

            let line = RleHeaderLine {
                width,
                height,
                set: Some(set),
            };

            Ok((line, bytes))
        }
        (Some(b'\r' | b'\n'), bytes) | (None, bytes) => {
            let line = RleHeaderLine {
                width,
                height,
                set: None,
            };

            Ok((line, bytes))
        }
        (Some(b), _) => Err(RleHeaderLineError::InvalidToken { got: b as char }),
    }
}

#[derive(Debug, Error)]
pub enum RleEncodingError {
    #[error("Unexpected EOF, expected '!'")]
    UnexpectedEof,

    #[error("Failed to convert run length: {0}")]
    RunLength(#[from] ConvertError),

    #[error("Unrecognized byte: 0x{got:0X}")]
    UnrecognizedByte { got: u8 },

    #[error("Cell ({x}, {y}) is outside the {width}x{height} bounding box")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] PatternError),
}

/// Decode the run length encoded body into a `width` by `height` pattern. Row `0` is the first
/// line of the encoding.
fn read_encoding(
    mut bytes: &[u8],
    width: usize,
    height: usize,
) -> Result<Pattern, RleEncodingError> {
    let mut pattern = Pattern::empty(width, height)?;

    let mut rep: usize = 1;
    let (mut x, mut y): (usize, usize) = (0, 0);

    loop {
        let Some(b) = parse_util::peek_1(bytes) else {
            return Err(RleEncodingError::UnexpectedEof);
        };

        match b {
            w if w.is_ascii_whitespace() => {
                let (_, rest) = parse_util::take_1(bytes);
                bytes = rest;
            }

            // End of input
            b'!' => break,

            // Dead cell
            b'b' => {
                let (_, rest) = parse_util::take_1(bytes);
                bytes = rest;

                x = x.saturating_add(rep);
                rep = 1;
            }

            // Live cell
            b'o' => {
                let (_, rest) = parse_util::take_1(bytes);
                bytes = rest;

                // Saturated runs always end outside the box
                let end = x.saturating_add(rep);

                if end > width || y >= height {
                    return Err(RleEncodingError::OutOfBounds {
                        x: if y >= height { x } else { x.max(width) },
                        y,
                        width,
                        height,
                    });
                }

                for x in x..end {
                    pattern.set(x, y, CellState::Alive);
                }

                x = end;
                rep = 1;
            }

            // End of line
            b'$' => {
                let (_, rest) = parse_util::take_1(bytes);
                bytes = rest;

                y = y.saturating_add(rep);
                x = 0;
                rep = 1;
            }

            n if n.is_ascii_digit() => {
                let (Some(n), rest) = parse_util::take_until_fn(|b| !b.is_ascii_digit(), bytes)
                else {
                    unreachable!("We peeked and found a digit")
                };
                bytes = rest;

                rep = convert(n)?;
            }

            b => return Err(RleEncodingError::UnrecognizedByte { got: b }),
        }
    }

    Ok(pattern)
}
