use super::Comment;
use crate::{ICommandDefinition, IEncoding};

impl Comment {
    pub fn new() -> Self {
        Self
    }
}

impl Default for Comment {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: IEncoding> ICommandDefinition<E> for Comment {
    fn name(&self) -> &str {
        "comment"
    }
}
