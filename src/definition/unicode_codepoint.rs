use super::UnicodeCodepoint;
use crate::{
    Command, ExecuteError, ICommandDefinition, IEncoding, ImplementationError, OutputBuffer,
};
use regex::Regex;
use std::marker::PhantomData;

impl<E: IEncoding, O: IEncoding> UnicodeCodepoint<E, O> {
    /// Create the `unicode_codepoint` definition writing to `output`.
    pub fn new(output: Option<OutputBuffer<O>>) -> Result<Self, ImplementationError> {
        let parameter_shape = Regex::new("^u[0-9a-fA-F]+$").map_err(|err| {
            ImplementationError::new(
                "unicode_codepoint".to_string(),
                format!("parameter pattern should be a valid regex expression.{:?}", err),
            )
        })?;
        Ok(Self {
            output,
            parameter_shape,
            _input: PhantomData,
        })
    }

    fn fault(&self, command: &Command<E>, message: &str) -> ExecuteError {
        ExecuteError::Validation {
            command: "unicode_codepoint".to_string(),
            position: command.name.begin,
            message: message.to_string(),
        }
    }
}

impl<E: IEncoding, O: IEncoding> ICommandDefinition<E> for UnicodeCodepoint<E, O> {
    fn name(&self) -> &str {
        "unicode_codepoint"
    }

    fn validate(&self, command: &Command<E>) -> Result<(), ExecuteError> {
        if command.parameters.len() != 1 {
            return Err(self.fault(
                command,
                "expects a unicode escape sequence (without prior backslash) as its only parameter, e.g. \"\\unicode_codepoint(u1F604);\"",
            ));
        }
        if !command.children.is_empty() {
            return Err(self.fault(command, "expects no body"));
        }
        if !self.parameter_shape.is_match(&command.parameters[0].text()) {
            return Err(self.fault(
                command,
                "expects a \"u\" followed by a hexadecimal number as parameter, e.g. \"u1F604\"",
            ));
        }
        Ok(())
    }

    fn on_begin(&self, command: &Command<E>) -> Result<(), ExecuteError> {
        let parameter = match command.parameters.first() {
            Some(parameter) => parameter,
            None => return Ok(()),
        };
        let text = parameter.text();
        let hex = &text[1..];
        let value = u32::from_str_radix(hex, 16).map_err(|_| ExecuteError::Runtime {
            position: parameter.begin,
            message: format!("\"{}\" is not a valid codepoint value", text),
        })?;
        let codepoint = char::from_u32(value).ok_or_else(|| ExecuteError::Runtime {
            position: parameter.begin,
            message: format!("\"{}\" is not a unicode scalar value", text),
        })?;
        if let Some(output) = &self.output {
            O::encode_codepoint(codepoint, &mut output.borrow_mut());
        }
        Ok(())
    }
}
