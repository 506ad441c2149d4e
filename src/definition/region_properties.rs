use super::{emit, RegionProperties};
use crate::{
    Command, ExecuteError, ICommandDefinition, IEncoding, OutputBuffer, Range, Regions,
};
use std::cell::RefCell;
use std::marker::PhantomData;
use std::rc::Rc;

impl<E: IEncoding, O: IEncoding, V: Clone, F> RegionProperties<E, O, V, F>
where
    F: for<'i> Fn(&Command<'i, E>) -> V,
{
    /// Create a region annotating definition registered under `name`.
    /// `region_value` computes the annotation value from the invoked command.
    pub fn new(
        name: impl Into<String>,
        output: Option<OutputBuffer<O>>,
        regions: Option<Rc<RefCell<Regions<V>>>>,
        region_value: F,
    ) -> Self {
        Self {
            name: name.into(),
            output,
            regions,
            previous: RefCell::new(Vec::new()),
            region_value,
            _input: PhantomData,
        }
    }

    fn output_end(&self) -> usize {
        self.output.as_ref().map_or(0, |output| output.borrow().len())
    }
}

impl<E: IEncoding, O: IEncoding, V: Clone, F> ICommandDefinition<E>
    for RegionProperties<E, O, V, F>
where
    F: for<'i> Fn(&Command<'i, E>) -> V,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn on_begin(&self, command: &Command<E>) -> Result<(), ExecuteError> {
        if let Some(regions) = &self.regions {
            let start = self.output_end();
            let mut regions = regions.borrow_mut();
            let previous = regions.value_at(start).clone();
            self.previous.borrow_mut().push(previous);
            regions.add((self.region_value)(command), start);
        }
        Ok(())
    }

    fn on_end(&self, _command: &Command<E>) -> Result<(), ExecuteError> {
        if let Some(regions) = &self.regions {
            if let Some(previous) = self.previous.borrow_mut().pop() {
                regions.borrow_mut().add(previous, self.output_end());
            }
        }
        Ok(())
    }

    fn on_child_raw(&self, _command: &Command<E>, child: &Range<E>) -> Result<(), ExecuteError> {
        emit::<E, O>(&self.output, child.units());
        Ok(())
    }
}
