//! Markup parsing tool (markup_pt) is a library to tokenize, parse and execute a small
//! command markup language embedded in free text.
//!
//! # Overview
//! A document is raw text interleaved with commands written as `\name(param1, param2){body}`.
//! Bodies nest, so a command tree is the natural shape of a parsed document.
//! The library is split along that shape: a [Tokenizer] scans the input as unicode
//! codepoints while tracking line and column information, a [TreeParser] assembles the
//! token stream into a tree of [Command] and raw text nodes, and a [CommandsExecutor]
//! walks the tree and dispatches every command to a registered [ICommandDefinition].
//!
//! # Design
//! The executor does not interpret commands itself.
//! Each command name is bound to a definition object implementing [ICommandDefinition],
//! which validates the call against its prototype and observes the command through a
//! begin/child/end lifecycle.
//! The [definition] module ships the reusable definitions: comments, output emission,
//! unicode codepoint injection, output region annotation, and runtime defined
//! replacements whose expansion is re-tokenized, re-parsed and re-executed with the
//! call's body spliced into the generated tree.
//!
//! The pipeline is generic over the code unit type of the input through [IEncoding];
//! [Utf8] and [Utf16] instantiations are provided.
//! Tokens are [Range] views into the input, never copies.
//!
//! # Example
//!
//! ```
//! use markup_pt::definition::{
//!     BodyRequirement, Comment, CreateInfo, OutputBody, ParametersType,
//!     RuntimeDefinedReplacement, UnicodeCodepoint,
//! };
//! use markup_pt::{
//!     CommandsExecutor, IEncoding, OutputBuffer, Tokenizer, TreeParser, Utf8,
//! };
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let output: OutputBuffer<Utf8> = Rc::new(RefCell::new(Vec::new()));
//!
//! let root = Rc::new(OutputBody::<Utf8>::root(Some(output.clone())));
//! let comment = Rc::new(Comment::new());
//! let unicode = Rc::new(UnicodeCodepoint::<Utf8>::new(Some(output.clone())).unwrap());
//! let bold = Rc::new(
//!     RuntimeDefinedReplacement::new(CreateInfo {
//!         name: "bold".to_string(),
//!         before_body: Utf8::encode_string("<b>"),
//!         after_body: Utf8::encode_string("</b>"),
//!         parameters: ParametersType::Absent,
//!         body: BodyRequirement::Required,
//!     })
//!     .unwrap(),
//! );
//!
//! let mut executor = CommandsExecutor::<Utf8>::new();
//! executor.add_command(root);
//! executor.add_command(comment);
//! executor.add_command(unicode);
//! executor.add_command(bold.clone());
//! let executor = Rc::new(executor);
//! bold.set_executor(&executor).unwrap();
//!
//! let source = "hello \\bold{world}\\unicode_codepoint(u21);";
//! let tokenizer = Tokenizer::from(source);
//! let mut parser = TreeParser::new();
//! parser.parse_all(&tokenizer).unwrap();
//! let tree = parser.finish().unwrap();
//!
//! executor.execute(&tree).unwrap();
//!
//! assert_eq!(Utf8::decode_string(&output.borrow()), "hello <b>world</b>!");
//! ```
//!
//! # License
//! [markup_pt](crate) is provided under the MIT license.

mod encoding;
mod error;
mod execution;
mod position;
mod range;
mod regions;
mod tokenization;
mod tree;
mod tree_parser;
pub mod definition;

#[cfg(test)]
mod __tests__;

pub use encoding::{transcode, DefaultEncoding, Utf16, Utf8};
pub use execution::ExecutionTrace;
pub use regions::Regions;

use once_cell::unsync::OnceCell;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Debug;
use std::rc::Rc;

/// The code unit seam of the pipeline.
///
/// The tokenizer walks the input one unicode scalar value at a time; this trait supplies
/// the per-encoding decode and encode steps so the same scanning, parsing and execution
/// logic serves 8 bit and 16 bit inputs alike.
/// A malformed unit sequence decodes to U+FFFD consuming one unit, mirroring a lossy
/// decoder, so scanning never fails on broken input.
pub trait IEncoding: Copy + Eq + Debug {
    type Unit: Copy + Eq + Debug;

    /// Decode one unicode scalar value from the front of `units` and return it together
    /// with the number of units consumed. [None] only on empty input.
    fn decode(units: &[Self::Unit]) -> Option<(char, usize)>;

    /// Append the encoding of one unicode scalar value to `out`.
    fn encode_codepoint(codepoint: char, out: &mut Vec<Self::Unit>);

    /// Encode a string into a unit vector.
    fn encode_string(text: &str) -> Vec<Self::Unit> {
        let mut units = Vec::new();
        for codepoint in text.chars() {
            Self::encode_codepoint(codepoint, &mut units);
        }
        units
    }

    /// Decode a unit slice into a [String], lossily.
    fn decode_string(units: &[Self::Unit]) -> String {
        let mut text = String::new();
        let mut cursor = 0;
        while let Some((codepoint, consumed)) = Self::decode(&units[cursor..]) {
            text.push(codepoint);
            cursor += consumed;
        }
        text
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// A cursor into the input: absolute code unit offset plus zero based line and column.
///
/// The column counts code units within the current line; a line feed increments the
/// line and resets the column. Equality, ordering and hashing are by offset, which is
/// only meaningful between positions of the same input.
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// A half open span of the input between two [Position]s, carrying its unit view.
///
/// Every token and every syntactic construct is recorded as a range into the original
/// input; ranges stay valid for the lifetime `'i` of that input.
pub struct Range<'i, E: IEncoding> {
    pub begin: Position,
    pub end: Position,
    units: &'i [E::Unit],
}

#[derive(Debug, Clone, Copy)]
/// One decoded unicode scalar value together with the [Range] it occupied.
pub struct CodepointWithRange<'i, E: IEncoding> {
    pub codepoint: char,
    pub range: Range<'i, E>,
}

#[derive(Clone)]
/// An element of a command body: either a nested [Command] or a raw text [Range].
pub enum SequenceElement<'i, E: IEncoding> {
    Command(Command<'i, E>),
    Raw(Range<'i, E>),
}

/// An ordered command body.
pub type Sequence<'i, E> = Vec<SequenceElement<'i, E>>;

#[derive(Clone)]
/// One parsed `\name(params){children}` invocation.
///
/// The root of a parse tree is a synthetic command with an empty name and no
/// parameters whose children are the top level elements of the document.
pub struct Command<'i, E: IEncoding> {
    pub name: Range<'i, E>,
    pub parameters: Vec<Range<'i, E>>,
    pub children: Sequence<'i, E>,
}

/// A codepoint granular scanner over one immutable input.
///
/// The tokenizer is configured with the input view and is otherwise stateless: every
/// scanning function takes a starting [Position] and returns a [Range] or a codepoint,
/// so scans can be freely retried and interleaved.
/// Higher level scanners recognize the grammar's primitive tokens:
/// whitespace runs, identifiers, numbers and quoted strings.
/// The `is_*` predicates tell whether the whole input is exactly one such token, and the
/// `extract_*` functions turn a predicate checked input into its value.
pub struct Tokenizer<'i, E: IEncoding> {
    input: &'i [E::Unit],
}

/// Consumes a [Tokenizer]'s input and assembles the command tree.
///
/// `{` opens the body of the command preceding it and `}` closes the innermost open
/// body; the parser keeps the open bodies on an internal stack and appends every parsed
/// element to the innermost one. [parse_all](TreeParser::parse_all) may be called
/// repeatedly with tokenizers over different inputs; open bodies carry across calls.
/// [finish](TreeParser::finish) returns the root command and reports a body that was
/// never closed.
pub struct TreeParser<'i, E: IEncoding> {
    root: Command<'i, E>,
    open: Vec<Command<'i, E>>,
}

/// The capability set of one command definition.
///
/// The executor drives each dispatched command through a fixed lifecycle:
/// [validate](ICommandDefinition::validate), [on_begin](ICommandDefinition::on_begin),
/// one `on_child_*` call per child in document order, then
/// [on_end](ICommandDefinition::on_end).
/// After `on_child_command` the executor recurses into the child command unless
/// [execute_child_commands](ICommandDefinition::execute_child_commands) is false, in
/// which case the definition is expected to consume its children itself.
pub trait ICommandDefinition<E: IEncoding> {
    /// The identifier this definition is registered under.
    fn name(&self) -> &str;

    /// Check the command's parameters and body against the definition's prototype.
    fn validate(&self, _command: &Command<E>) -> Result<(), ExecuteError> {
        Ok(())
    }

    /// Pre-order hook.
    fn on_begin(&self, _command: &Command<E>) -> Result<(), ExecuteError> {
        Ok(())
    }

    /// Post-order hook.
    fn on_end(&self, _command: &Command<E>) -> Result<(), ExecuteError> {
        Ok(())
    }

    fn on_child_command(
        &self,
        _command: &Command<E>,
        _child: &Command<E>,
    ) -> Result<(), ExecuteError> {
        Ok(())
    }

    fn on_child_raw(&self, _command: &Command<E>, _child: &Range<E>) -> Result<(), ExecuteError> {
        Ok(())
    }

    /// Whether the executor should recurse into child commands after `on_child_command`.
    fn execute_child_commands(&self) -> bool {
        true
    }
}

/// Dispatches parsed commands to their registered [ICommandDefinition]s.
///
/// The registry maps command names to shared definition objects; registering a name
/// twice replaces the earlier entry. Execution is synchronous and single threaded, and
/// the first failing definition aborts the walk.
pub struct CommandsExecutor<E: IEncoding> {
    definitions: HashMap<String, Rc<dyn ICommandDefinition<E>>>,
    trace: OnceCell<ExecutionTrace>,
}

/// A growable, externally owned output buffer definitions append to.
///
/// Emitting definitions hold an [Option] of this; when absent, emission is a no-op
/// while the lifecycle hooks still fire.
pub type OutputBuffer<O> = Rc<RefCell<Vec<<O as IEncoding>::Unit>>>;

#[derive(Debug)]
/// An error from the value extractors of the [Tokenizer]: a malformed escape sequence,
/// or an extractor called on an input that is not the expected token.
pub struct LexError {
    pub position: Position,
    pub message: String,
}

#[derive(Debug)]
/// An error raised while assembling the command tree or while scanning a replacement
/// template.
pub struct ParseError {
    pub position: Position,
    pub message: String,
}

#[derive(Debug)]
/// An error returned when a command definition is constructed with an invalid
/// configuration, such as a replacement template referencing more parameters than its
/// prototype declares.
pub struct ImplementationError {
    message: String,
    what: String,
}

#[derive(Debug)]
/// An error raised while executing a command tree.
pub enum ExecuteError {
    /// The command's name has no registered definition.
    CommandNotFound { name: String, position: Position },
    /// The command does not satisfy its definition's prototype.
    Validation {
        command: String,
        position: Position,
        message: String,
    },
    /// A definition failed outside of validation.
    Runtime { position: Position, message: String },
    Lex(LexError),
    Parse(ParseError),
    /// A failure inside the nested parse or execute of a replacement expansion,
    /// wrapped with the name and position of the expanded command.
    Expansion {
        command: String,
        position: Position,
        source: Box<ExecuteError>,
    },
}
