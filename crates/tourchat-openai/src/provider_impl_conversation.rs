use std::{future::Future, pin::Pin, sync::Arc};

use tourchat_core::{
    error::Result, generic::ConversationId, provider::ConversationProvider,
};

use crate::OpenAiAssistantAdapter;

/// Every session gets its own assistant thread.
impl ConversationProvider for OpenAiAssistantAdapter {
    fn create_conversation<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<ConversationId>> + Send + 'a>> {
        let client = Arc::clone(&self.client);

        Box::pin(async move {
            let thread = client.create_thread().await?;
            tracing::info!(thread_id = %thread.id, "created assistant thread");
            Ok(ConversationId::new(thread.id))
        })
    }
}
