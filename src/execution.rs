use crate::{
    Command, CommandsExecutor, ExecuteError, ICommandDefinition, IEncoding, SequenceElement,
};
use once_cell::unsync::OnceCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// What the executor prints about its dispatch, tagged with a label that prefixes
/// every line. Failed lookups are always included; [Dispatch](ExecutionTrace::Dispatch)
/// additionally prints every resolved command. Without a trace nothing is printed.
pub enum ExecutionTrace {
    Failures(&'static str),
    Dispatch(&'static str),
}

impl ExecutionTrace {
    pub fn label(&self) -> &'static str {
        match self {
            ExecutionTrace::Failures(label) | ExecutionTrace::Dispatch(label) => label,
        }
    }

    /// Whether resolved commands are printed, not just failed lookups.
    pub fn includes_dispatch(&self) -> bool {
        matches!(self, ExecutionTrace::Dispatch(_))
    }
}

impl<E: IEncoding> CommandsExecutor<E> {
    pub fn new() -> Self {
        Self {
            definitions: HashMap::new(),
            trace: OnceCell::new(),
        }
    }

    /// Register one definition under its [name](ICommandDefinition::name).
    /// Registering a name twice replaces the earlier entry.
    pub fn add_command(&mut self, definition: Rc<dyn ICommandDefinition<E>>) {
        self.definitions
            .insert(definition.name().to_string(), definition);
    }

    /// Register every definition of the iterable.
    pub fn add_commands<I>(&mut self, definitions: I)
    where
        I: IntoIterator<Item = Rc<dyn ICommandDefinition<E>>>,
    {
        for definition in definitions {
            self.add_command(definition);
        }
    }

    /// Replace the whole registry with the given definitions.
    pub fn set_commands<I>(&mut self, definitions: I)
    where
        I: IntoIterator<Item = Rc<dyn ICommandDefinition<E>>>,
    {
        self.definitions.clear();
        self.add_commands(definitions);
    }

    /// Set the dispatch trace. Tracing stays off until this is called.
    pub fn set_trace(&self, trace: ExecutionTrace) -> Result<(), String> {
        self.trace.set(trace).map_err(|rejected| {
            format!("Trace label {} is already assigned.", rejected.label())
        })
    }

    /// Execute one command: resolve its definition, validate, then drive the
    /// begin/child/end lifecycle, recursing into child commands unless the
    /// definition opts out. The first failure aborts the walk and propagates.
    pub fn execute(&self, command: &Command<E>) -> Result<(), ExecuteError> {
        let name = command.name.text();
        let definition = match self.definitions.get(&name) {
            Some(definition) => definition,
            None => {
                self.trace_not_found(&name, command);
                return Err(ExecuteError::CommandNotFound {
                    name,
                    position: command.name.begin,
                });
            }
        };
        self.trace_execute(&name, command);

        definition.validate(command)?;
        definition.on_begin(command)?;
        for child in &command.children {
            match child {
                SequenceElement::Command(child_command) => {
                    definition.on_child_command(command, child_command)?;
                    if definition.execute_child_commands() {
                        self.execute(child_command)?;
                    }
                }
                SequenceElement::Raw(child_range) => {
                    definition.on_child_raw(command, child_range)?;
                }
            }
        }
        definition.on_end(command)?;
        Ok(())
    }

    fn trace_execute(&self, _name: &str, _command: &Command<E>) {
        #[cfg(debug_assertions)]
        if let Some(trace) = self.trace.get() {
            if trace.includes_dispatch() {
                println!(
                    "[{}; Execute]: command \"\\{}\" at {}",
                    trace.label(),
                    _name,
                    _command.name.begin
                );
            }
        }
    }

    fn trace_not_found(&self, _name: &str, _command: &Command<E>) {
        #[cfg(debug_assertions)]
        if let Some(trace) = self.trace.get() {
            println!(
                "[{}; ExecuteError]: command \"\\{}\" not found at {}",
                trace.label(),
                _name,
                _command.name.begin
            );
        }
    }
}
