use crate::{
    Command, CodepointWithRange, IEncoding, ParseError, Position, Range, Sequence,
    SequenceElement, Tokenizer, TreeParser,
};

impl<'i, E: IEncoding> TreeParser<'i, E> {
    pub fn new() -> Self {
        Self {
            root: Command::synthetic_root(),
            open: Vec::new(),
        }
    }

    /// The synthetic root whose children are the elements parsed so far.
    pub fn root(&self) -> &Command<'i, E> {
        &self.root
    }

    /// Number of sequences currently open, the root one included. A balanced parse
    /// leaves the depth at 1.
    pub fn depth(&self) -> usize {
        self.open.len() + 1
    }

    /// Consume the tokenizer's whole input, appending to the currently open body.
    pub fn parse_all(&mut self, tokenizer: &Tokenizer<'i, E>) -> Result<(), ParseError> {
        let mut cursor = tokenizer.begin();
        while let Some(first) = tokenizer.next_codepoint(cursor) {
            cursor = self.step(tokenizer, first)?;
        }
        Ok(())
    }

    /// Finish parsing and hand back the root command. A body opened with `{` but
    /// never closed is reported here, not by [parse_all](TreeParser::parse_all).
    pub fn finish(self) -> Result<Command<'i, E>, ParseError> {
        if let Some(unclosed) = self.open.last() {
            return Err(ParseError::new(
                unclosed.name.begin,
                format!(
                    "body of command \"\\{}\" is never closed; expected \"}}\"",
                    unclosed.name.text()
                ),
            ));
        }
        Ok(self.root)
    }

    /// Append already parsed elements to the currently open body.
    pub(crate) fn splice(&mut self, elements: &[SequenceElement<'i, E>]) {
        self.current_sequence().extend_from_slice(elements);
    }

    fn current_sequence(&mut self) -> &mut Sequence<'i, E> {
        match self.open.last_mut() {
            Some(command) => &mut command.children,
            None => &mut self.root.children,
        }
    }

    fn step(
        &mut self,
        tokenizer: &Tokenizer<'i, E>,
        first: CodepointWithRange<'i, E>,
    ) -> Result<Position, ParseError> {
        match first.codepoint {
            '}' => match self.open.pop() {
                Some(finished) => {
                    self.current_sequence().push(SequenceElement::Command(finished));
                    Ok(first.range.end)
                }
                None => Err(ParseError::new(
                    first.range.begin,
                    "closing curly bracket without a matching opening".to_string(),
                )),
            },
            '\\' => self.step_command(tokenizer, first.range.end),
            _ => Ok(self.step_raw(tokenizer, first.range.begin)),
        }
    }

    fn step_raw(&mut self, tokenizer: &Tokenizer<'i, E>, begin: Position) -> Position {
        let raw_text = tokenizer.next_until(begin, |next| {
            next.codepoint == '}' || next.codepoint == '\\'
        });
        if !raw_text.is_empty() {
            self.current_sequence().push(SequenceElement::Raw(raw_text));
        }
        raw_text.end
    }

    fn step_command(
        &mut self,
        tokenizer: &Tokenizer<'i, E>,
        begin: Position,
    ) -> Result<Position, ParseError> {
        let name = tokenizer.next_identifier(begin);
        if name.is_empty() {
            return Err(ParseError::new(
                begin,
                "empty command: \"\\\" must be followed by an identifier".to_string(),
            ));
        }

        let mut command = Command {
            name,
            parameters: Vec::new(),
            children: Vec::new(),
        };

        let mut next = match tokenizer.next_codepoint(name.end) {
            Some(next) => next,
            None => return Err(Self::termination_error(begin)),
        };
        if next.codepoint == '(' {
            let parameters_end =
                Self::step_parameters(tokenizer, next.range.end, &mut command.parameters)?;
            next = match tokenizer.next_codepoint(parameters_end) {
                Some(next) => next,
                None => return Err(Self::termination_error(begin)),
            };
        }

        match next.codepoint {
            '{' => {
                self.open.push(command);
                Ok(next.range.end)
            }
            ';' => {
                self.current_sequence().push(SequenceElement::Command(command));
                Ok(next.range.end)
            }
            _ => Err(Self::termination_error(begin)),
        }
    }

    fn termination_error(position: Position) -> ParseError {
        ParseError::new(
            position,
            "invalid command termination: a command ends with \";\" or a \"{...}\" body"
                .to_string(),
        )
    }

    fn next_parameter(
        tokenizer: &Tokenizer<'i, E>,
        begin: Position,
    ) -> Result<Range<'i, E>, ParseError> {
        let identifier = tokenizer.next_identifier(begin);
        if !identifier.is_empty() {
            return Ok(identifier);
        }
        let number = tokenizer.next_number(begin);
        if !number.is_empty() {
            return Ok(number);
        }
        Err(ParseError::new(
            begin,
            "invalid command parameter: expected an identifier or a number".to_string(),
        ))
    }

    fn step_parameters(
        tokenizer: &Tokenizer<'i, E>,
        begin: Position,
        parameters_out: &mut Vec<Range<'i, E>>,
    ) -> Result<Position, ParseError> {
        let mut cursor = begin;
        loop {
            cursor = tokenizer.next_whitespace(cursor).end;
            let parameter = Self::next_parameter(tokenizer, cursor)?;
            cursor = parameter.end;
            parameters_out.push(parameter);
            cursor = tokenizer.next_whitespace(cursor).end;
            match tokenizer.next_codepoint(cursor) {
                Some(next) if next.codepoint == ')' => return Ok(next.range.end),
                Some(next) if next.codepoint == ',' => cursor = next.range.end,
                Some(next) => {
                    return Err(ParseError::new(
                        next.range.begin,
                        "invalid command parameters: expected \",\" or \")\"".to_string(),
                    ))
                }
                None => {
                    return Err(ParseError::new(
                        cursor,
                        "unexpected end of input inside a parameter list".to_string(),
                    ))
                }
            }
        }
    }
}
