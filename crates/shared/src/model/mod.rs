use crate::error::ValidationError;

pub mod constants;

mod exercise;
pub use exercise::*;

mod routine;
pub use routine::*;

mod template;
pub use template::*;

pub trait ValidateModel {
    fn validate(&self) -> Result<(), ValidationError>;
}

pub(crate) fn check_name(field: &str, name: &str, messages: &mut Vec<String>) {
    if name.trim().is_empty() {
        messages.push(format!("{field} name can't be empty"));
    }
}
