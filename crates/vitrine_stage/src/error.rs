//! Stage configuration errors
//!
//! Only genuine setup mistakes surface as errors. Conditions the transition
//! machinery tolerates by design (duplicate registration, removing an
//! adjacency that was never added, a transition requested mid-flight) are
//! debug-logged no-ops instead — see the respective methods on
//! [`ScreenManager`](crate::ScreenManager).

use crate::{ObjectId, ScreenId};
use thiserror::Error;

/// Errors raised by stage setup and transition requests
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StageError {
    /// The referenced screen is not registered with this manager
    #[error("screen {0:?} is not registered with this manager")]
    ScreenNotFound(ScreenId),

    /// The referenced object is not registered with this manager
    #[error("object {0:?} is not registered with this manager")]
    ObjectNotFound(ObjectId),
}
