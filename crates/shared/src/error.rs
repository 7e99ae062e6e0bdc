use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainParseError {
    #[error("unknown file role '{0}', expected 'md' or 'csv'")]
    UnknownRole(String),
    #[error("unknown behavior mode '{0}', expected 'cache-persist' or 'submit-gated'")]
    UnknownMode(String),
}
