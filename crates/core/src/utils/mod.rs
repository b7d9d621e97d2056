pub mod form_values;
pub mod money;
