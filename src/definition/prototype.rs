use super::{BodyRequirement, CommandPrototype, ParameterType, ParametersType};
use crate::{Command, ExecuteError, IEncoding, Position, Range, Tokenizer};

impl ParameterType {
    /// A number slot without bounds.
    pub fn number() -> Self {
        ParameterType::Number {
            min: f64::NEG_INFINITY,
            max: f64::INFINITY,
        }
    }

    /// A number slot accepting values within `[min, max]`.
    pub fn number_between(min: f64, max: f64) -> Self {
        ParameterType::Number { min, max }
    }

    /// An identifier slot accepting any identifier.
    pub fn identifier() -> Self {
        ParameterType::Identifier { one_of: Vec::new() }
    }

    /// An identifier slot restricted to the given candidates.
    pub fn identifier_one_of<I, S>(one_of: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ParameterType::Identifier {
            one_of: one_of.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for CommandPrototype {
    fn default() -> Self {
        Self {
            parameters: ParametersType::Any,
            body: BodyRequirement::Optional,
        }
    }
}

impl CommandPrototype {
    pub fn new(parameters: ParametersType, body: BodyRequirement) -> Self {
        Self { parameters, body }
    }

    /// Check a parsed command against this prototype, anchored to the definition
    /// registered under `name`.
    pub fn validate<E: IEncoding>(
        &self,
        name: &str,
        command: &Command<E>,
    ) -> Result<(), ExecuteError> {
        let received = command.name.text();
        if received != name {
            return Err(Self::fault(
                name,
                command.name.begin,
                format!(
                    "name does not match: expected \"{}\", received \"{}\"",
                    name, received
                ),
            ));
        }

        match &self.parameters {
            ParametersType::Any => {}
            ParametersType::Exact(slots) => {
                if command.parameters.len() != slots.len() {
                    return Err(Self::fault(
                        name,
                        command.name.begin,
                        format!(
                            "expects {} parameters, received {}",
                            slots.len(),
                            command.parameters.len()
                        ),
                    ));
                }
                for (index, (slot, parameter)) in
                    slots.iter().zip(&command.parameters).enumerate()
                {
                    Self::validate_parameter::<E>(name, index, slot, parameter)?;
                }
            }
            ParametersType::Absent => {
                if !command.parameters.is_empty() {
                    return Err(Self::fault(
                        name,
                        command.name.begin,
                        "expects no parameters".to_string(),
                    ));
                }
            }
        }

        match self.body {
            BodyRequirement::Optional => {}
            BodyRequirement::Required => {
                if command.children.is_empty() {
                    return Err(Self::fault(
                        name,
                        command.name.begin,
                        "expects a body".to_string(),
                    ));
                }
            }
            BodyRequirement::Absent => {
                if !command.children.is_empty() {
                    return Err(Self::fault(
                        name,
                        command.name.begin,
                        "expects no body".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    fn fault(name: &str, position: Position, message: String) -> ExecuteError {
        ExecuteError::Validation {
            command: name.to_string(),
            position,
            message,
        }
    }

    fn validate_parameter<E: IEncoding>(
        name: &str,
        index: usize,
        slot: &ParameterType,
        parameter: &Range<E>,
    ) -> Result<(), ExecuteError> {
        let tokenizer = Tokenizer::<E>::new(parameter.units());
        match slot {
            ParameterType::Any => {}
            ParameterType::Number { min, max } => {
                if !tokenizer.is_number() {
                    return Err(Self::fault(
                        name,
                        parameter.begin,
                        format!(
                            "expects a number as parameter #{}, received \"{}\"",
                            index,
                            parameter.text()
                        ),
                    ));
                }
                let value = tokenizer.extract_number()?;
                if value < *min || value > *max {
                    return Err(Self::fault(
                        name,
                        parameter.begin,
                        format!(
                            "parameter #{} is out of range: {} is not within [{}, {}]",
                            index, value, min, max
                        ),
                    ));
                }
            }
            ParameterType::Identifier { one_of } => {
                if !tokenizer.is_identifier() {
                    return Err(Self::fault(
                        name,
                        parameter.begin,
                        format!(
                            "expects an identifier as parameter #{}, received \"{}\"",
                            index,
                            parameter.text()
                        ),
                    ));
                }
                let received = parameter.text();
                if !one_of.is_empty() && !one_of.iter().any(|candidate| candidate == &received) {
                    return Err(Self::fault(
                        name,
                        parameter.begin,
                        format!(
                            "parameter #{} must be one of {:?}, received \"{}\"",
                            index, one_of, received
                        ),
                    ));
                }
            }
            ParameterType::String => {
                if !tokenizer.is_string() {
                    return Err(Self::fault(
                        name,
                        parameter.begin,
                        format!(
                            "expects a string as parameter #{}, received \"{}\"",
                            index,
                            parameter.text()
                        ),
                    ));
                }
            }
        }
        Ok(())
    }
}
