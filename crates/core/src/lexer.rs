//! Content-stream tokenizer.
//!
//! Two layers: [`ContentLexer`] scans raw lexical units left to right,
//! and [`tokenize`] drives it with a context stack that assembles
//! `[ ... ]` and `<< ... >>` runs into composite operands.
//!
//! Tokenization is a pure function of the input buffer. Whitespace and
//! `%` comments are delimiters only and never emitted. An empty buffer
//! yields an empty sequence. Input the grammar cannot classify fails with
//! [`DiffError::MalformedContentStream`] carrying the byte offset.

use crate::error::{DiffError, Result};
use crate::token::{CompositeKind, PrecisionHint, Token, TokenSequence};

/// A raw lexical unit: a complete scalar token or a composite delimiter.
#[derive(Debug, Clone, PartialEq)]
pub enum RawToken {
    /// An operator, numeric, name or string token.
    Scalar(Token),
    /// `[`
    ArrayStart,
    /// `]`
    ArrayEnd,
    /// `<<`
    DictStart,
    /// `>>`
    DictEnd,
}

/// Scans a content-stream byte buffer into raw lexical units.
pub struct ContentLexer<'a> {
    data: &'a [u8],
    pos: usize,
    /// Offset where the token currently being lexed started.
    token_pos: usize,
}

impl<'a> ContentLexer<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            token_pos: 0,
        }
    }

    /// Current position in the stream.
    pub fn tell(&self) -> usize {
        self.pos
    }

    fn at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Peek at current byte without advancing.
    fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    /// Peek at byte at offset from current position.
    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.data.get(self.pos + offset).copied()
    }

    /// Advance position by one.
    fn advance(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    /// Check if byte is whitespace.
    fn is_whitespace(b: u8) -> bool {
        matches!(b, b' ' | b'\t' | b'\r' | b'\n' | b'\x00' | b'\x0c')
    }

    /// Check if byte is a delimiter.
    fn is_delimiter(b: u8) -> bool {
        matches!(
            b,
            b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
        )
    }

    /// Check if byte is a regular character (continues an operator or name).
    fn is_regular(b: u8) -> bool {
        !Self::is_whitespace(b) && !Self::is_delimiter(b)
    }

    fn malformed(offset: usize, reason: impl Into<String>) -> DiffError {
        DiffError::MalformedContentStream {
            offset,
            reason: reason.into(),
        }
    }

    /// Skip whitespace and comments.
    fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek() {
            if Self::is_whitespace(b) {
                self.advance();
            } else if b == b'%' {
                // Comment runs to end of line
                while let Some(c) = self.advance() {
                    if c == b'\r' || c == b'\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    /// Parse a name (/Name).
    fn parse_name(&mut self) -> Result<Token> {
        self.advance(); // Skip '/'
        let mut name = Vec::new();

        while let Some(b) = self.peek() {
            if !Self::is_regular(b) {
                break;
            }
            if b == b'#' {
                // Two-digit hex escape in name
                let h1 = self.peek_at(1);
                let h2 = self.peek_at(2);

                if let (Some(c1), Some(c2)) = (h1, h2) {
                    if c1.is_ascii_hexdigit() && c2.is_ascii_hexdigit() {
                        self.advance(); // consume #
                        self.advance();
                        self.advance();
                        let byte = (hex_value(c1) << 4) | hex_value(c2);
                        name.push(byte);
                        continue;
                    }
                }
                // Invalid escape: the '#' is dropped, following characters kept
                self.advance();
            } else {
                name.push(self.advance().unwrap());
            }
        }

        let name = String::from_utf8(name.clone())
            .unwrap_or_else(|_| String::from_utf8_lossy(&name).into_owned());

        Ok(Token::Name(name))
    }

    /// Parse a numeric literal (optional sign, digits, at most one dot).
    fn parse_number(&mut self) -> Result<Token> {
        let start = self.pos;
        let mut has_dot = false;

        if matches!(self.peek(), Some(b'+') | Some(b'-')) {
            self.advance();
        }

        if self.peek() == Some(b'.') {
            has_dot = true;
            self.advance();
        }

        while let Some(b) = self.peek() {
            if b.is_ascii_digit() {
                self.advance();
            } else if b == b'.' && !has_dot {
                has_dot = true;
                self.advance();
            } else {
                break;
            }
        }

        let s = std::str::from_utf8(&self.data[start..self.pos])
            .map_err(|_| Self::malformed(start, "invalid numeric literal"))?;

        let value: f64 = s
            .parse()
            .map_err(|_| Self::malformed(start, format!("invalid numeric literal: {s}")))?;

        let precision = if has_dot {
            PrecisionHint::Single
        } else {
            PrecisionHint::Double
        };

        Ok(Token::Numeric { value, precision })
    }

    /// Parse a literal string ( ... ) with escapes resolved.
    fn parse_literal_string(&mut self) -> Result<Token> {
        let start = self.pos;
        self.advance(); // Skip '('
        let mut result = Vec::new();
        let mut depth = 1;

        while depth > 0 {
            match self.advance() {
                Some(b'(') => {
                    depth += 1;
                    result.push(b'(');
                }
                Some(b')') => {
                    depth -= 1;
                    if depth > 0 {
                        result.push(b')');
                    }
                }
                Some(b'\\') => match self.advance() {
                    Some(b'n') => result.push(b'\n'),
                    Some(b'r') => result.push(b'\r'),
                    Some(b't') => result.push(b'\t'),
                    Some(b'b') => result.push(0x08),
                    Some(b'f') => result.push(0x0c),
                    Some(b'(') => result.push(b'('),
                    Some(b')') => result.push(b')'),
                    Some(b'\\') => result.push(b'\\'),
                    Some(b'\r') => {
                        // Line continuation, \r optionally followed by \n
                        if self.peek() == Some(b'\n') {
                            self.advance();
                        }
                    }
                    Some(b'\n') => {
                        // Line continuation
                    }
                    Some(c) if c.is_ascii_digit() && c < b'8' => {
                        // Octal escape, 1-3 digits
                        let mut octal = u32::from(c - b'0');
                        for _ in 0..2 {
                            match self.peek() {
                                Some(d) if d.is_ascii_digit() && d < b'8' => {
                                    self.advance();
                                    octal = octal * 8 + u32::from(d - b'0');
                                }
                                _ => break,
                            }
                        }
                        result.push((octal & 0xff) as u8);
                    }
                    Some(c) => {
                        // Unknown escape keeps the character
                        result.push(c);
                    }
                    None => {
                        return Err(Self::malformed(start, "unterminated string literal"));
                    }
                },
                Some(c) => result.push(c),
                None => {
                    return Err(Self::malformed(start, "unterminated string literal"));
                }
            }
        }

        Ok(Token::StringLiteral(result))
    }

    /// Parse a hex string < ... >.
    fn parse_hex_string(&mut self) -> Result<Token> {
        let start = self.pos;
        self.advance(); // Skip '<'
        let mut hex_digits = Vec::new();

        loop {
            match self.peek() {
                Some(b'>') => {
                    self.advance();
                    break;
                }
                Some(c) if c.is_ascii_hexdigit() => {
                    self.advance();
                    hex_digits.push(c);
                }
                Some(c) if Self::is_whitespace(c) => {
                    self.advance();
                }
                Some(c) => {
                    return Err(Self::malformed(
                        self.pos,
                        format!("invalid character {:?} in hex string", c as char),
                    ));
                }
                None => {
                    return Err(Self::malformed(start, "unterminated hex string"));
                }
            }
        }

        // Pairs of digits become bytes; an odd trailing digit is a
        // single-digit value
        let mut result = Vec::with_capacity(hex_digits.len().div_ceil(2));
        for chunk in hex_digits.chunks(2) {
            let byte = match *chunk {
                [hi, lo] => (hex_value(hi) << 4) | hex_value(lo),
                [lo] => hex_value(lo),
                _ => unreachable!(),
            };
            result.push(byte);
        }

        Ok(Token::StringLiteral(result))
    }

    /// Parse an operator: a run of regular characters.
    fn parse_operator(&mut self) -> Result<Token> {
        let start = self.pos;

        while let Some(b) = self.peek() {
            if !Self::is_regular(b) {
                break;
            }
            self.advance();
        }

        let name = &self.data[start..self.pos];
        let name = String::from_utf8(name.to_vec())
            .unwrap_or_else(|_| String::from_utf8_lossy(name).into_owned());

        Ok(Token::Operator(name))
    }

    /// Get the next raw token with the byte offset it started at.
    pub fn next_token(&mut self) -> Option<Result<(usize, RawToken)>> {
        self.skip_whitespace();

        if self.at_end() {
            return None;
        }

        self.token_pos = self.pos;
        let b = self.peek()?;

        let result = match b {
            b'/' => self.parse_name().map(RawToken::Scalar),
            b'(' => self.parse_literal_string().map(RawToken::Scalar),
            b'<' => {
                if self.peek_at(1) == Some(b'<') {
                    self.advance();
                    self.advance();
                    Ok(RawToken::DictStart)
                } else {
                    self.parse_hex_string().map(RawToken::Scalar)
                }
            }
            b'>' => {
                if self.peek_at(1) == Some(b'>') {
                    self.advance();
                    self.advance();
                    Ok(RawToken::DictEnd)
                } else {
                    Err(Self::malformed(self.pos, "stray '>'"))
                }
            }
            b'[' => {
                self.advance();
                Ok(RawToken::ArrayStart)
            }
            b']' => {
                self.advance();
                Ok(RawToken::ArrayEnd)
            }
            b')' => Err(Self::malformed(self.pos, "stray ')'")),
            b'{' | b'}' => Err(Self::malformed(
                self.pos,
                format!("{:?} is not content-stream syntax", b as char),
            )),
            b'+' | b'-' => {
                if matches!(self.peek_at(1), Some(c) if c.is_ascii_digit() || c == b'.') {
                    self.parse_number().map(RawToken::Scalar)
                } else {
                    self.parse_operator().map(RawToken::Scalar)
                }
            }
            b'.' => {
                if matches!(self.peek_at(1), Some(c) if c.is_ascii_digit()) {
                    self.parse_number().map(RawToken::Scalar)
                } else {
                    self.parse_operator().map(RawToken::Scalar)
                }
            }
            c if c.is_ascii_digit() => self.parse_number().map(RawToken::Scalar),
            _ => self.parse_operator().map(RawToken::Scalar),
        };

        Some(result.map(|token| (self.token_pos, token)))
    }
}

const fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        _ => digit - b'A' + 10,
    }
}

/// An open composite: offset of its opening delimiter, its kind, and the
/// token stack saved when it was opened.
struct Frame {
    start: usize,
    kind: CompositeKind,
    saved: Vec<(usize, Token)>,
}

/// Tokenize a content-stream buffer into a [`TokenSequence`].
///
/// Array and dictionary runs are assembled into
/// [`Token::CompositeOperand`]s; unbalanced delimiters are
/// [`DiffError::MalformedContentStream`] errors. Result ordering is
/// exactly source order.
pub fn tokenize(data: &[u8]) -> Result<TokenSequence> {
    let mut lexer = ContentLexer::new(data);
    let mut stack: Vec<(usize, Token)> = Vec::new();
    let mut frames: Vec<Frame> = Vec::new();

    while let Some(item) = lexer.next_token() {
        let (pos, raw) = item?;
        match raw {
            RawToken::Scalar(token) => stack.push((pos, token)),
            RawToken::ArrayStart => {
                frames.push(Frame {
                    start: pos,
                    kind: CompositeKind::Array,
                    saved: std::mem::take(&mut stack),
                });
            }
            RawToken::DictStart => {
                frames.push(Frame {
                    start: pos,
                    kind: CompositeKind::Dictionary,
                    saved: std::mem::take(&mut stack),
                });
            }
            RawToken::ArrayEnd => close_frame(&mut stack, &mut frames, pos, CompositeKind::Array)?,
            RawToken::DictEnd => {
                close_frame(&mut stack, &mut frames, pos, CompositeKind::Dictionary)?;
            }
        }
    }

    if let Some(frame) = frames.last() {
        return Err(DiffError::MalformedContentStream {
            offset: frame.start,
            reason: format!("unterminated {}", frame.kind.as_str()),
        });
    }

    let (offsets, tokens) = stack.into_iter().unzip();
    Ok(TokenSequence::from_parts(tokens, offsets))
}

fn close_frame(
    stack: &mut Vec<(usize, Token)>,
    frames: &mut Vec<Frame>,
    pos: usize,
    kind: CompositeKind,
) -> Result<()> {
    let closer = match kind {
        CompositeKind::Array => "']'",
        CompositeKind::Dictionary => "'>>'",
    };
    match frames.pop() {
        Some(frame) if frame.kind == kind => {
            let elements = stack.drain(..).map(|(_, token)| token).collect();
            *stack = frame.saved;
            stack.push((
                frame.start,
                Token::CompositeOperand {
                    kind,
                    elements,
                },
            ));
            Ok(())
        }
        Some(frame) => Err(DiffError::MalformedContentStream {
            offset: pos,
            reason: format!(
                "{closer} does not close the {} opened at offset {}",
                frame.kind.as_str(),
                frame.start
            ),
        }),
        None => Err(DiffError::MalformedContentStream {
            offset: pos,
            reason: format!("unbalanced {closer}"),
        }),
    }
}
