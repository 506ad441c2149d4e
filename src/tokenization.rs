use crate::{CodepointWithRange, IEncoding, LexError, Position, Range, Tokenizer, Utf8};

impl<'i> From<&'i str> for Tokenizer<'i, Utf8> {
    fn from(text: &'i str) -> Self {
        Tokenizer::new(text.as_bytes())
    }
}

impl<'i, E: IEncoding> Tokenizer<'i, E> {
    pub fn new(input: &'i [E::Unit]) -> Self {
        Self { input }
    }

    pub fn input(&self) -> &'i [E::Unit] {
        self.input
    }

    /// The position of the first code unit.
    pub fn begin(&self) -> Position {
        Position::default()
    }

    pub fn at_end(&self, position: Position) -> bool {
        position.offset >= self.input.len()
    }

    fn range(&self, begin: Position, end: Position) -> Range<'i, E> {
        Range::new(begin, end, &self.input[begin.offset..end.offset])
    }

    /// Decode one unicode scalar value at `begin` and return it with the range it
    /// occupied. [None] at end of input; malformed sequences follow the decoder's
    /// lossy behavior.
    pub fn next_codepoint(&self, begin: Position) -> Option<CodepointWithRange<'i, E>> {
        let (codepoint, consumed) = E::decode(&self.input[begin.offset..])?;
        let end = begin.advance(codepoint, consumed);
        Some(CodepointWithRange {
            codepoint,
            range: self.range(begin, end),
        })
    }

    /// The longest range starting at `begin` whose codepoints precede the first one
    /// for which `stop` returns true. May be empty.
    pub fn next_until<F>(&self, begin: Position, stop: F) -> Range<'i, E>
    where
        F: Fn(&CodepointWithRange<'i, E>) -> bool,
    {
        let mut end = begin;
        while let Some(next) = self.next_codepoint(end) {
            if stop(&next) {
                break;
            }
            end = next.range.end;
        }
        self.range(begin, end)
    }

    /// The longest range starting at `begin` whose every codepoint satisfies `keep`.
    pub fn next_if<F>(&self, begin: Position, keep: F) -> Range<'i, E>
    where
        F: Fn(&CodepointWithRange<'i, E>) -> bool,
    {
        self.next_until(begin, |next| !keep(next))
    }

    /// The longest run of unicode whitespace starting at `begin`.
    pub fn next_whitespace(&self, begin: Position) -> Range<'i, E> {
        self.next_if(begin, |next| next.codepoint.is_whitespace())
    }

    /// An identifier `[A-Za-z_][A-Za-z0-9_]*`, or an empty range if the first
    /// codepoint does not start one.
    pub fn next_identifier(&self, begin: Position) -> Range<'i, E> {
        let first = match self.next_codepoint(begin) {
            Some(first) => first,
            None => return self.range(begin, begin),
        };
        if !first.codepoint.is_ascii_alphabetic() && first.codepoint != '_' {
            return self.range(begin, begin);
        }
        let rest = self.next_if(first.range.end, |next| {
            next.codepoint.is_ascii_alphanumeric() || next.codepoint == '_'
        });
        self.range(begin, rest.end)
    }

    /// A number: a decimal digit run, optionally followed by `.` and another digit
    /// run. A trailing dot at end of input is left unconsumed, and a dot with no
    /// digit on either side is not a number.
    pub fn next_number(&self, begin: Position) -> Range<'i, E> {
        let first_half = self.next_if(begin, |next| next.codepoint.is_ascii_digit());
        let dot = match self.next_codepoint(first_half.end) {
            Some(dot) => dot,
            None => return first_half,
        };
        if dot.codepoint != '.' {
            return first_half;
        }
        if self.at_end(dot.range.end) {
            return first_half;
        }
        let second_half = self.next_if(dot.range.end, |next| next.codepoint.is_ascii_digit());
        if first_half.is_empty() && second_half.is_empty() {
            return first_half;
        }
        self.range(begin, second_half.end)
    }

    /// A double quoted string starting at `begin`, consuming up to and including the
    /// closing quote. `\"` does not close. A string missing its closing quote runs
    /// to the end of the input; an empty range if `begin` is not a quote.
    pub fn next_string(&self, begin: Position) -> Range<'i, E> {
        let first = match self.next_codepoint(begin) {
            Some(first) => first,
            None => return self.range(begin, begin),
        };
        if first.codepoint != '"' {
            return self.range(begin, begin);
        }
        let mut previous = first;
        while let Some(current) = self.next_codepoint(previous.range.end) {
            if current.codepoint == '"' && previous.codepoint != '\\' {
                return self.range(begin, current.range.end);
            }
            previous = current;
        }
        self.range(begin, previous.range.end)
    }

    fn covers_all(&self, range: &Range<'i, E>) -> bool {
        !self.input.is_empty() && range.begin.offset == 0 && range.end.offset == self.input.len()
    }

    /// Whether the whole input is one whitespace run.
    pub fn is_whitespace(&self) -> bool {
        let range = self.next_whitespace(self.begin());
        self.covers_all(&range)
    }

    /// Whether the whole input is one identifier.
    pub fn is_identifier(&self) -> bool {
        let range = self.next_identifier(self.begin());
        self.covers_all(&range)
    }

    /// Whether the whole input is one number.
    pub fn is_number(&self) -> bool {
        let range = self.next_number(self.begin());
        self.covers_all(&range)
    }

    /// Whether the whole input is one quoted string.
    pub fn is_string(&self) -> bool {
        let range = self.next_string(self.begin());
        self.covers_all(&range)
    }

    /// The numeric value of the whole input, accumulated digit by digit: `acc =
    /// acc * 10 + d` for the integer part, then fractional digits weighted from 0.1
    /// downwards. Best effort reading; precision loss on long fractions is accepted.
    pub fn extract_number(&self) -> Result<f64, LexError> {
        if !self.is_number() {
            return Err(LexError::new(
                self.begin(),
                "tokenizer does not contain a number; check with \"is_number\" before calling \"extract_number\"".to_string(),
            ));
        }
        let mut value = 0.0f64;
        let mut cursor = self.begin();
        while let Some(next) = self.next_codepoint(cursor) {
            cursor = next.range.end;
            if next.codepoint == '.' {
                break;
            }
            value = value * 10.0 + f64::from(next.codepoint as u8 - b'0');
        }
        let mut weight = 0.1f64;
        while let Some(next) = self.next_codepoint(cursor) {
            cursor = next.range.end;
            value += f64::from(next.codepoint as u8 - b'0') * weight;
            weight *= 0.1;
        }
        Ok(value)
    }

    /// The decoded value of the whole input as a quoted string, with the escape
    /// sequences `\\`, `\"`, `\t` and `\n` translated. Any other escape is a
    /// [LexError]. End of input acts as the closing quote.
    pub fn extract_string(&self) -> Result<String, LexError> {
        if !self.is_string() {
            return Err(LexError::new(
                self.begin(),
                "tokenizer does not contain a string; check with \"is_string\" before calling \"extract_string\"".to_string(),
            ));
        }
        let opening = match self.next_codepoint(self.begin()) {
            Some(opening) => opening,
            None => return Ok(String::new()),
        };
        let mut decoded = String::new();
        let mut cursor = opening.range.end;
        while let Some(next) = self.next_codepoint(cursor) {
            match next.codepoint {
                '\\' => {
                    let escaped = self.next_codepoint(next.range.end).ok_or_else(|| {
                        LexError::new(
                            next.range.begin,
                            "unfinished escape sequence at end of string".to_string(),
                        )
                    })?;
                    let translated = match escaped.codepoint {
                        '\\' => '\\',
                        '"' => '"',
                        't' => '\t',
                        'n' => '\n',
                        other => {
                            return Err(LexError::new(
                                next.range.begin,
                                format!("invalid escape sequence \"\\{}\"", other),
                            ))
                        }
                    };
                    decoded.push(translated);
                    cursor = escaped.range.end;
                }
                '"' => return Ok(decoded),
                other => {
                    decoded.push(other);
                    cursor = next.range.end;
                }
            }
        }
        Ok(decoded)
    }
}
