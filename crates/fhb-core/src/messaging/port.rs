use async_trait::async_trait;

use crate::{domain::ChatId, messaging::types::MessagingCapabilities, Result};

/// Outbound messaging port.
///
/// Implementations render `html` in the messenger's rich-text mode with link
/// previews disabled. Delivery is best-effort: a failed send is reported, not retried here.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    fn capabilities(&self) -> MessagingCapabilities;

    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<()>;
}
