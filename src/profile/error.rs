//! Profile error types

use crate::profile::gatt::FieldId;
use crate::profile::transport::TransportError;

/// Errors moving values between the record, the live set and the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileError {
    /// Live buffer and record field sizes disagree
    FieldSize(FieldId),
    /// A characteristic value could not be read back
    Transport(TransportError),
}

impl From<TransportError> for ProfileError {
    fn from(error: TransportError) -> Self {
        ProfileError::Transport(error)
    }
}

/// Reasons `ConfigProfile::setup` refuses to publish the profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupError {
    /// Initial record could not be imported
    Import(ProfileError),
    MissingSaveHandler,
    MissingRestartHandler,
    /// Transport refused a service, characteristic or advertising
    Transport(TransportError),
}

impl SetupError {
    /// Distinct negative code per failure
    pub const fn code(&self) -> i32 {
        match self {
            SetupError::Import(_) => -1,
            SetupError::MissingSaveHandler => -2,
            SetupError::MissingRestartHandler => -3,
            SetupError::Transport(_) => -4,
        }
    }
}

impl From<TransportError> for SetupError {
    fn from(error: TransportError) -> Self {
        SetupError::Transport(error)
    }
}
