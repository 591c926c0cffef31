//! Attribute directive: keeps one surface attribute in sync with a value.

use std::collections::BTreeSet;
use std::rc::Rc;

use super::{Directive, DirectiveError};
use crate::reactive::Value;
use crate::surface::{Surface, SurfaceId};
use crate::vnode::DirectiveBinding;

/// Attributes whose presence, not value, carries meaning.
pub const BOOLEAN_ATTRIBUTES: &[&str] = &[
    "autofocus",
    "checked",
    "disabled",
    "hidden",
    "multiple",
    "readonly",
    "required",
    "selected",
];

/// Sets the attribute on bind, rewrites it on update only when the value
/// changed, removes it on unbind.
///
/// Boolean attributes are present (with an empty value) when the bound value is
/// truthy and not the string `"false"`, and absent otherwise.
#[derive(Debug, Clone)]
pub struct Attribute {
    boolean_attributes: Rc<BTreeSet<String>>,
}

impl Default for Attribute {
    fn default() -> Self {
        Self::new(Rc::new(
            BOOLEAN_ATTRIBUTES.iter().map(|s| (*s).to_owned()).collect(),
        ))
    }
}

impl Attribute {
    pub fn new(boolean_attributes: Rc<BTreeSet<String>>) -> Self {
        Self { boolean_attributes }
    }

    fn value<'a>(binding: &'a DirectiveBinding) -> Result<&'a Value, DirectiveError> {
        binding
            .value
            .as_value()
            .ok_or_else(|| DirectiveError::invalid_value(binding, "a value"))
    }

    fn apply(
        &self,
        surface: &Surface,
        el: SurfaceId,
        name: &str,
        value: &Value,
    ) -> Result<(), DirectiveError> {
        if self.boolean_attributes.contains(name) {
            if value.is_truthy() && value.as_str() != Some("false") {
                surface.set_attribute(el, name, "")?;
            } else {
                surface.remove_attribute(el, name)?;
            }
        } else {
            surface.set_attribute(el, name, &value.to_string())?;
        }
        Ok(())
    }
}

impl Directive for Attribute {
    fn bind(
        &mut self,
        surface: &Surface,
        el: SurfaceId,
        binding: &DirectiveBinding,
    ) -> Result<(), DirectiveError> {
        self.apply(surface, el, &binding.name, Self::value(binding)?)
    }

    fn update(
        &mut self,
        surface: &Surface,
        el: SurfaceId,
        binding: &DirectiveBinding,
        old: &DirectiveBinding,
    ) -> Result<(), DirectiveError> {
        let value = Self::value(binding)?;
        if binding.name != old.name {
            surface.remove_attribute(el, &old.name)?;
        } else if old.value.as_value() == Some(value) {
            return Ok(());
        }
        self.apply(surface, el, &binding.name, value)
    }

    fn unbind(
        &mut self,
        surface: &Surface,
        el: SurfaceId,
        old: &DirectiveBinding,
    ) -> Result<(), DirectiveError> {
        surface.remove_attribute(el, &old.name)?;
        Ok(())
    }
}
