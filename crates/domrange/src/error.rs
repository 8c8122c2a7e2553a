use core_types::HostError;

/// Failure of a range operation.
///
/// Every operation validates its preconditions before touching the member
/// list or the host tree, so an error never leaves a range half-updated.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("invalid state: {0}")]
    InvalidState(&'static str),
    #[error("index {index} out of range in {op} (len {len})")]
    IndexOutOfRange {
        op: &'static str,
        index: usize,
        len: usize,
    },
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(&'static str),
}

impl From<HostError> for RangeError {
    fn from(err: HostError) -> Self {
        match err {
            HostError::UnsupportedRoot => {
                RangeError::UnsupportedOperation("cannot select in an off-tree range")
            }
            HostError::InvalidSelector(msg) => RangeError::InvalidArgument(msg),
        }
    }
}
