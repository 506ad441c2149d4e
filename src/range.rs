use crate::{IEncoding, Position, Range};

impl<'i, E: IEncoding> Range<'i, E> {
    pub(crate) fn new(begin: Position, end: Position, units: &'i [E::Unit]) -> Self {
        Self { begin, end, units }
    }

    /// An empty range at the origin, used for the synthetic root's name.
    pub(crate) fn empty() -> Self {
        Self {
            begin: Position::default(),
            end: Position::default(),
            units: &[],
        }
    }

    /// The code units the range covers.
    pub fn units(&self) -> &'i [E::Unit] {
        self.units
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Length in code units.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Decode the covered units into a [String], lossily.
    pub fn text(&self) -> String {
        E::decode_string(self.units)
    }
}
