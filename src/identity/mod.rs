//! Caller identity: the opaque session token, the providers that produce it, and the
//! per-request context the gateway logs with.

mod session;
mod provider;
mod request_context;

pub use session::SessionToken;
pub use provider::{SessionProvider, StaticSessionProvider, EnvSessionProvider};
pub use request_context::RequestContext;
