// Cross-boundary sync channel
// Endpoints and subscriptions, the host's link to its preview surface, runtime
// messaging from the popup, and textarea to surface Markdown sync.

pub mod bus;
pub mod link;
pub mod markdown_sync;
pub mod runtime;

pub use bus::{Endpoint, MessageTarget, Subscription};
pub use link::{LinkState, PanelLink};
pub use markdown_sync::MarkdownSync;
pub use runtime::{LocalRuntime, RuntimeMessenger, TabId};
