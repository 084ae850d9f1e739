//! Core types for credential provisioning

mod error;
mod request;
mod response;
mod username;

pub use error::{ErrorKind, Operation, ProvisionError, StatementKind};
pub use request::{Action, Attributes, ProvisioningRequest, parse_statement, single_statement};
pub use response::{ProvisioningResponse, ResponseError};
pub use username::{MAX_USERNAME_LEN, Privilege, UsernameGenerator, suffixed, truncate};
