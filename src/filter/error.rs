use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("Field '{0}' cannot be modified")]
    ImmutableField(String),
}
