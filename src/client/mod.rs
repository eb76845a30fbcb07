//! Client side of the portal: the request dispatcher, its gateway transport, role
//! resolution and the UI gating state they drive.

pub mod dispatcher;
pub mod portal;
pub mod role;
pub mod state;
pub mod transport;

pub use dispatcher::Dispatcher;
pub use portal::{check_s3_path, Portal};
pub use role::{Role, RoleResolver, UnknownReason};
pub use state::{reduce, Phase, UiEvent, UiState, UiStore};
pub use transport::{GatewayRequest, GatewayResponse, GatewayTransport, HttpTransport};
