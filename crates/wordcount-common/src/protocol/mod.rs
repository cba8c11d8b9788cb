pub mod command;
pub mod endpoint;
pub mod error;
pub mod requests;
pub mod responses;


pub use command::{ClientCommand, QueryPair};
pub use endpoint::EndpointId;
pub use error::{BalancerError, Result};
pub use requests::{MethodName, Request, RequestId, RpcArgs};
pub use responses::{Response, RpcResult};
