mod error;
mod interface;
mod session;

pub use error::ToolSessionError;
pub use interface::ToolInterface;
pub use session::{ToolDescriptor, ToolSession};
