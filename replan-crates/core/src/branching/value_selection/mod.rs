//! [`ValueSelector`]s pick the value the selected variable is fixed to.
mod in_domain_min;
mod preferred_value;
mod value_selector;

pub(crate) use in_domain_min::InDomainMin;
pub(crate) use preferred_value::PreferredValue;
pub(crate) use value_selector::ValueSelector;
