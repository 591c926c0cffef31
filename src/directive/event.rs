//! Event directive: routes surface events to the current render's handler.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::{Directive, DirectiveError};
use crate::surface::{ListenerId, Surface, SurfaceEvent, SurfaceId};
use crate::vnode::DirectiveBinding;

/// A cloneable event callback.
#[derive(Clone)]
pub struct Handler(Rc<dyn Fn(&SurfaceEvent)>);

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Handler(..)")
    }
}

impl Handler {
    pub fn new(f: impl Fn(&SurfaceEvent) + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, event: &SurfaceEvent) {
        (self.0)(event)
    }
}

/// Registers a single surface listener on bind. Each update swaps the handler
/// the listener forwards to, so re-renders never re-register.
#[derive(Debug, Default)]
pub struct Event {
    handler: Rc<RefCell<Option<Handler>>>,
    listener: Option<ListenerId>,
}

impl Event {
    pub fn new() -> Self {
        Self::default()
    }

    fn handler(binding: &DirectiveBinding) -> Result<Handler, DirectiveError> {
        binding
            .value
            .as_handler()
            .cloned()
            .ok_or_else(|| DirectiveError::invalid_value(binding, "an event handler"))
    }
}

impl Directive for Event {
    fn bind(
        &mut self,
        surface: &Surface,
        el: SurfaceId,
        binding: &DirectiveBinding,
    ) -> Result<(), DirectiveError> {
        *self.handler.borrow_mut() = Some(Self::handler(binding)?);
        let current = Rc::clone(&self.handler);
        let listener = surface.add_listener(
            el,
            &binding.name,
            Rc::new(move |event: &SurfaceEvent| {
                // Clone out first: the handler may trigger a patch that updates this cell.
                let handler = current.borrow().clone();
                if let Some(handler) = handler {
                    handler.call(event);
                }
            }),
        )?;
        self.listener = Some(listener);
        Ok(())
    }

    fn update(
        &mut self,
        _surface: &Surface,
        _el: SurfaceId,
        binding: &DirectiveBinding,
        _old: &DirectiveBinding,
    ) -> Result<(), DirectiveError> {
        *self.handler.borrow_mut() = Some(Self::handler(binding)?);
        Ok(())
    }

    fn unbind(
        &mut self,
        surface: &Surface,
        el: SurfaceId,
        _old: &DirectiveBinding,
    ) -> Result<(), DirectiveError> {
        self.handler.borrow_mut().take();
        if let Some(listener) = self.listener.take() {
            surface.remove_listener(el, listener)?;
        }
        Ok(())
    }
}
