use super::{emit, OutputBody};
use crate::{Command, ExecuteError, ICommandDefinition, IEncoding, OutputBuffer, Range};
use std::marker::PhantomData;

impl<E: IEncoding, O: IEncoding> OutputBody<E, O> {
    /// The definition of the synthetic root command, registered under the empty name.
    pub fn root(output: Option<OutputBuffer<O>>) -> Self {
        Self {
            name: String::new(),
            output,
            _input: PhantomData,
        }
    }

    /// The same behavior registered under `output_body`, for explicit use in markup.
    pub fn named(output: Option<OutputBuffer<O>>) -> Self {
        Self {
            name: "output_body".to_string(),
            output,
            _input: PhantomData,
        }
    }
}

impl<E: IEncoding, O: IEncoding> ICommandDefinition<E> for OutputBody<E, O> {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self, command: &Command<E>) -> Result<(), ExecuteError> {
        if !command.parameters.is_empty() {
            return Err(ExecuteError::Validation {
                command: self.name.clone(),
                position: command.name.begin,
                message: "expects no parameters".to_string(),
            });
        }
        Ok(())
    }

    fn on_child_raw(&self, _command: &Command<E>, child: &Range<E>) -> Result<(), ExecuteError> {
        emit::<E, O>(&self.output, child.units());
        Ok(())
    }
}
