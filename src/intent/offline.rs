use async_trait::async_trait;

use super::fallback::{classify, fallback_response};
use super::{Intent, IntentService};

/// Intent service that never leaves the process
///
/// Used when no API key is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineIntentService;

#[async_trait]
impl IntentService for OfflineIntentService {
    fn name(&self) -> &'static str {
        "offline"
    }

    async fn parse_intent(&self, text: &str) -> Intent {
        classify(text)
    }

    async fn conversational_response(&self, text: &str) -> String {
        fallback_response(text).to_string()
    }
}
