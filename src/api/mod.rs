//! Backend contract: failure taxonomy, response envelope, transport and
//! mutation gateway.

mod envelope;
mod error;
mod gateway;
pub mod mock;
mod transport;

pub use envelope::Envelope;
pub use error::{Failure, FailureKind, STATUS_OK};
pub use gateway::{MutationGateway, MutationSuccess};
pub use transport::{HttpTransport, Transport};
