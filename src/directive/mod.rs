//! Directives: pluggable surface behavior attached to nodes.
//!
//! A directive instance is created the first time its binding reaches a
//! surface element, then receives exactly one [`Directive::bind`], one
//! [`Directive::update`] per later patch, and exactly one
//! [`Directive::unbind`] when the binding disappears.

pub mod attribute;
pub mod event;
pub mod registry;

pub use attribute::Attribute;
pub use event::{Event, Handler};
pub use registry::{DirectiveFactory, DirectiveRegistry};

use crate::surface::{Surface, SurfaceError, SurfaceId};
use crate::vnode::DirectiveBinding;

/// Errors raised by directive hooks. Any of them aborts the patch in progress.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DirectiveError {
    #[error(transparent)]
    Surface(#[from] SurfaceError),
    #[error("directive {kind}:{name} expects {expected}")]
    InvalidValue {
        kind: String,
        name: String,
        expected: &'static str,
    },
    #[error("directive {kind}:{name} failed: {message}")]
    Failed {
        kind: String,
        name: String,
        message: String,
    },
}

impl DirectiveError {
    pub(crate) fn invalid_value(binding: &DirectiveBinding, expected: &'static str) -> Self {
        DirectiveError::InvalidValue {
            kind: binding.kind.clone(),
            name: binding.name.clone(),
            expected,
        }
    }
}

/// Imperative behavior bound to one directive slot of one surface element.
///
/// All hooks default to no-ops.
pub trait Directive {
    /// First attachment to `el`.
    fn bind(
        &mut self,
        surface: &Surface,
        el: SurfaceId,
        binding: &DirectiveBinding,
    ) -> Result<(), DirectiveError> {
        let _ = (surface, el, binding);
        Ok(())
    }

    /// Every later patch that keeps the slot.
    fn update(
        &mut self,
        surface: &Surface,
        el: SurfaceId,
        binding: &DirectiveBinding,
        old: &DirectiveBinding,
    ) -> Result<(), DirectiveError> {
        let _ = (surface, el, binding, old);
        Ok(())
    }

    /// The slot is gone from the new options.
    fn unbind(
        &mut self,
        surface: &Surface,
        el: SurfaceId,
        old: &DirectiveBinding,
    ) -> Result<(), DirectiveError> {
        let _ = (surface, el, old);
        Ok(())
    }
}
