use crate::{Command, IEncoding, Range, SequenceElement};
use ptree::TreeItem;
use std::borrow::Cow;
use std::fmt::{Debug, Formatter};

impl<'i, E: IEncoding> Command<'i, E> {
    /// The root of a parse tree: empty name, no parameters.
    pub(crate) fn synthetic_root() -> Self {
        Self {
            name: Range::empty(),
            parameters: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Print the command tree to stdout.
    pub fn print(&self) -> Result<(), std::io::Error> {
        ptree::print_tree(&SequenceElement::Command(self.clone()))
    }
}

impl<'i, E: IEncoding> Debug for Command<'i, E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut debug_struct = f.debug_struct("Command");
        debug_struct.field("name", &self.name.text());
        if !self.parameters.is_empty() {
            debug_struct.field(
                "parameters",
                &self
                    .parameters
                    .iter()
                    .map(|parameter| parameter.text())
                    .collect::<Vec<_>>(),
            );
        }
        if !self.children.is_empty() {
            debug_struct.field("children", &self.children);
        }
        debug_struct.finish()
    }
}

impl<'i, E: IEncoding> Debug for SequenceElement<'i, E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SequenceElement::Command(command) => command.fmt(f),
            SequenceElement::Raw(range) => write!(f, "Raw({:?})", range.text()),
        }
    }
}

impl<'i, E: IEncoding> TreeItem for SequenceElement<'i, E> {
    type Child = Self;

    fn write_self<W: std::io::Write>(&self, f: &mut W, _: &ptree::Style) -> std::io::Result<()> {
        match self {
            SequenceElement::Command(command) => {
                write!(f, "\\{}", command.name.text())?;
                if !command.parameters.is_empty() {
                    let parameters = command
                        .parameters
                        .iter()
                        .map(|parameter| parameter.text())
                        .collect::<Vec<_>>()
                        .join(", ");
                    write!(f, "({})", parameters)?;
                }
                write!(f, " # {}-{}", command.name.begin.offset, command.name.end.offset)
            }
            SequenceElement::Raw(range) => {
                write!(f, "{:?} # {}-{}", range.text(), range.begin.offset, range.end.offset)
            }
        }
    }

    fn children(&self) -> Cow<[Self::Child]> {
        match self {
            SequenceElement::Command(command) => Cow::from(&command.children),
            SequenceElement::Raw(_) => Cow::Borrowed(&[]),
        }
    }
}
