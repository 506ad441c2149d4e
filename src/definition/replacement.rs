use super::{
    CommandPrototype, CreateInfo, ParametersType, ReplacementPiece, RuntimeDefinedReplacement,
    TemplateHole,
};
use crate::{
    Command, CommandsExecutor, ExecuteError, ICommandDefinition, IEncoding, ImplementationError,
    ParseError, Tokenizer, TreeParser,
};
use once_cell::unsync::OnceCell;
use std::rc::{Rc, Weak};

impl<E: IEncoding> ReplacementPiece<E> {
    /// Scan `template` for `\#N` holes and build the piece.
    /// A `\#` not followed by a decimal digit run is a [ParseError].
    pub fn new(template: Vec<E::Unit>) -> Result<Self, ParseError> {
        let (holes, required_parameter_count) = Self::scan_holes(&template)?;
        Ok(Self {
            template,
            holes,
            required_parameter_count,
        })
    }

    /// One more than the highest hole index, 0 without holes.
    pub fn required_parameter_count(&self) -> usize {
        self.required_parameter_count
    }

    pub fn holes(&self) -> &[TemplateHole] {
        &self.holes
    }

    fn scan_holes(template: &[E::Unit]) -> Result<(Vec<TemplateHole>, usize), ParseError> {
        let tokenizer = Tokenizer::<E>::new(template);
        let mut holes = Vec::new();
        let mut required = 0usize;
        let mut cursor = tokenizer.begin();
        while let Some(next) = tokenizer.next_codepoint(cursor) {
            cursor = next.range.end;
            if next.codepoint != '\\' {
                continue;
            }
            let marker = match tokenizer.next_codepoint(cursor) {
                Some(marker) => marker,
                None => break,
            };
            if marker.codepoint != '#' {
                continue;
            }
            let digits = tokenizer.next_if(marker.range.end, |c| c.codepoint.is_ascii_digit());
            if digits.is_empty() {
                return Err(ParseError::new(
                    next.range.begin,
                    "expects a number after \"\\#\" in a replacement template".to_string(),
                ));
            }
            let parameter_index: usize = digits.text().parse().map_err(|_| {
                ParseError::new(
                    digits.begin,
                    "replacement parameter index is too large".to_string(),
                )
            })?;
            required = required.max(parameter_index + 1);
            holes.push(TemplateHole {
                parameter_index,
                index_begin: next.range.begin.offset,
                index_end: digits.end.offset,
            });
            cursor = digits.end;
        }
        Ok((holes, required))
    }

    /// Instantiate the template with the call site's parameters.
    pub(crate) fn generate(&self, command: &Command<E>) -> Vec<E::Unit> {
        let mut generated = Vec::with_capacity(self.template.len());
        let mut cursor = 0usize;
        for hole in &self.holes {
            generated.extend_from_slice(&self.template[cursor..hole.index_begin]);
            if let Some(parameter) = command.parameters.get(hole.parameter_index) {
                generated.extend_from_slice(parameter.units());
            }
            cursor = hole.index_end;
        }
        generated.extend_from_slice(&self.template[cursor..]);
        generated
    }

    pub(crate) fn validate(&self, name: &str, command: &Command<E>) -> Result<(), ExecuteError> {
        if command.parameters.len() < self.required_parameter_count {
            return Err(ExecuteError::Validation {
                command: name.to_string(),
                position: command.name.begin,
                message: format!(
                    "expects at least {} parameters, received {}",
                    self.required_parameter_count,
                    command.parameters.len()
                ),
            });
        }
        Ok(())
    }
}

impl<E: IEncoding> RuntimeDefinedReplacement<E> {
    /// Build the definition, scanning both templates and checking them against the
    /// declared parameter constraint.
    pub fn new(create_info: CreateInfo<E>) -> Result<Self, ImplementationError> {
        let CreateInfo {
            name,
            before_body,
            after_body,
            parameters,
            body,
        } = create_info;

        let before_body = ReplacementPiece::new(before_body).map_err(|err| {
            ImplementationError::new(name.clone(), format!("invalid before body template: {}", err))
        })?;
        let after_body = ReplacementPiece::new(after_body).map_err(|err| {
            ImplementationError::new(name.clone(), format!("invalid after body template: {}", err))
        })?;

        let declared = match &parameters {
            ParametersType::Any => None,
            ParametersType::Exact(slots) => Some(slots.len()),
            ParametersType::Absent => Some(0),
        };
        if let Some(declared) = declared {
            for (label, piece) in [("before body", &before_body), ("after body", &after_body)] {
                if piece.required_parameter_count > declared {
                    return Err(ImplementationError::new(
                        name.clone(),
                        format!(
                            "the {} template references parameter #{} but the prototype declares {} parameters",
                            label,
                            piece.required_parameter_count - 1,
                            declared
                        ),
                    ));
                }
            }
        }

        Ok(Self {
            name,
            prototype: CommandPrototype::new(parameters, body),
            before_body,
            after_body,
            executor: OnceCell::new(),
        })
    }

    /// Inject the executor back reference. Must be called once before the definition
    /// is first executed.
    pub fn set_executor(&self, executor: &Rc<CommandsExecutor<E>>) -> Result<(), String> {
        self.executor
            .set(Rc::downgrade(executor))
            .map_err(|_| format!("Executor for command \"{}\" is already assigned.", self.name))
    }

    fn expand<'t>(
        &self,
        executor: &CommandsExecutor<E>,
        command: &Command<'t, E>,
        before: &'t [E::Unit],
        after: &'t [E::Unit],
    ) -> Result<(), ExecuteError> {
        let mut parser = TreeParser::new();
        parser.parse_all(&Tokenizer::new(before))?;
        parser.splice(&command.children);
        parser.parse_all(&Tokenizer::new(after))?;
        let expansion = parser.finish()?;
        executor.execute(&expansion)
    }
}

impl<E: IEncoding> ICommandDefinition<E> for RuntimeDefinedReplacement<E> {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self, command: &Command<E>) -> Result<(), ExecuteError> {
        self.prototype.validate(&self.name, command)?;
        self.before_body.validate(&self.name, command)?;
        self.after_body.validate(&self.name, command)
    }

    /// The expansion consumes the children by splicing; the executor must not also
    /// recurse into them.
    fn execute_child_commands(&self) -> bool {
        false
    }

    fn on_begin(&self, command: &Command<E>) -> Result<(), ExecuteError> {
        let executor = self
            .executor
            .get()
            .and_then(Weak::upgrade)
            .ok_or_else(|| ExecuteError::Runtime {
                position: command.name.begin,
                message: format!(
                    "an executor must be assigned to \"{}\" before executing a tree containing it",
                    self.name
                ),
            })?;

        let generated_before = self.before_body.generate(command);
        let generated_after = self.after_body.generate(command);
        self.expand(&executor, command, &generated_before, &generated_after)
            .map_err(|source| ExecuteError::Expansion {
                command: self.name.clone(),
                position: command.name.begin,
                source: Box::new(source),
            })
    }
}
