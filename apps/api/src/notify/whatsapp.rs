//! WhatsApp delivery via the Facebook Graph API, plus the multi-message
//! digest formatter. Long digests split into several messages, each kept
//! under the WhatsApp text limit.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use crate::models::plan::{MonthPlan, PlanBook, RecommendationRecord};
use crate::notify::NotifyError;

const GRAPH_API_BASE: &str = "https://graph.facebook.com/v22.0";

/// Hard WhatsApp text limit is 4096 chars; anything longer is truncated.
const MESSAGE_CHAR_LIMIT: usize = 4000;
const TRUNCATED_AT: usize = 3950;
/// Soft per-message budget used when chunking the series digest.
const CHUNK_LIMIT: usize = 3800;
/// Delay between consecutive sends to stay under the rate limit.
const SEND_DELAY: std::time::Duration = std::time::Duration::from_secs(1);

#[derive(Clone)]
pub struct WhatsAppClient {
    client: Client,
    access_token: Option<String>,
    phone_number_id: Option<String>,
}

/// Outcome of one message in a multi-message send.
#[derive(Debug, Clone, Serialize)]
pub struct MessageDelivery {
    pub status: String,
    pub message_number: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Per-message delivery report for a digest send.
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryReport {
    pub total_messages: usize,
    pub successful_messages: usize,
    pub message_responses: Vec<MessageDelivery>,
    pub recipient_phone: String,
}

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    #[serde(default)]
    messages: Vec<SentMessage>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    id: String,
}

impl WhatsAppClient {
    pub fn new(access_token: Option<String>, phone_number_id: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            access_token,
            phone_number_id,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.access_token.is_some() && self.phone_number_id.is_some()
    }

    /// Sends a batch of text messages with a delay between each, returning
    /// a per-message delivery report. A failed message does not stop the
    /// rest of the batch.
    pub async fn send_messages(
        &self,
        to: &str,
        messages: &[String],
    ) -> Result<DeliveryReport, NotifyError> {
        let access_token = self
            .access_token
            .as_deref()
            .ok_or(NotifyError::NotConfigured("whatsapp"))?;
        let phone_number_id = self
            .phone_number_id
            .as_deref()
            .ok_or(NotifyError::NotConfigured("whatsapp"))?;

        let recipient = format_phone_number(to);
        let url = format!("{GRAPH_API_BASE}/{phone_number_id}/messages");

        let mut message_responses = Vec::with_capacity(messages.len());
        let mut successful_messages = 0usize;

        for (i, message) in messages.iter().enumerate() {
            let body = clamp_message(message);
            let payload = json!({
                "messaging_product": "whatsapp",
                "to": recipient,
                "type": "text",
                "text": {"body": body},
            });

            let delivery = match self
                .client
                .post(&url)
                .bearer_auth(access_token)
                .json(&payload)
                .send()
                .await
            {
                Ok(response) if response.status().is_success() => {
                    let message_id = response
                        .json::<SendMessageResponse>()
                        .await
                        .ok()
                        .and_then(|r| r.messages.into_iter().next())
                        .map(|m| m.id);
                    successful_messages += 1;
                    MessageDelivery {
                        status: "sent".to_string(),
                        message_number: i + 1,
                        message_id,
                        error: None,
                    }
                }
                Ok(response) => {
                    let status = response.status().as_u16();
                    let text = response.text().await.unwrap_or_default();
                    warn!("WhatsApp API error for message {}: {status} - {text}", i + 1);
                    MessageDelivery {
                        status: "failed".to_string(),
                        message_number: i + 1,
                        message_id: None,
                        error: Some(format!("{status}: {text}")),
                    }
                }
                Err(e) => {
                    warn!("WhatsApp request failed for message {}: {e}", i + 1);
                    MessageDelivery {
                        status: "failed".to_string(),
                        message_number: i + 1,
                        message_id: None,
                        error: Some(e.to_string()),
                    }
                }
            };
            message_responses.push(delivery);

            if i + 1 < messages.len() {
                tokio::time::sleep(SEND_DELAY).await;
            }
        }

        Ok(DeliveryReport {
            total_messages: messages.len(),
            successful_messages,
            message_responses,
            recipient_phone: recipient,
        })
    }
}

/// Normalizes a phone number for the Graph API: digits only, no leading
/// `+`, bare 10-digit numbers get the US country code.
pub fn format_phone_number(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() == 10 {
        format!("1{digits}")
    } else {
        digits
    }
}

/// Enforces the WhatsApp length limit on one message body.
fn clamp_message(message: &str) -> String {
    if message.chars().count() <= MESSAGE_CHAR_LIMIT {
        return message.to_string();
    }
    let mut clamped: String = message.chars().take(TRUNCATED_AT).collect();
    clamped.push_str("...\n(Message truncated)");
    clamped
}

fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

/// Formats a recommendation plan into the WhatsApp digest messages:
/// top picks, chunked series recommendations, and one message per month.
pub fn format_recommendation_messages(
    name: &str,
    current: &[PlanBook],
    recommendations: &[RecommendationRecord],
    future: &[MonthPlan],
) -> Vec<String> {
    let header = format!("📚 Book Recommendations for {name} 📚\n");
    let mut messages = Vec::new();

    if !current.is_empty() {
        let mut picks = String::from("⭐ TOP PICKS FOR YOU ⭐\n");
        for book in current {
            picks.push_str(&format!("• {} by {}\n", book.title, book.author));
            if !book.explanation.is_empty() {
                picks.push_str(&format!(
                    "  Why: {}...\n",
                    truncate_chars(&book.explanation, 100)
                ));
            }
            picks.push('\n');
        }
        messages.push(format!("{header}{picks}"));
    }

    if !recommendations.is_empty() {
        let series_header = "📖 RECOMMENDED SERIES & AUTHORS 📖\n";
        let empty_chunk = format!("{header}{series_header}");
        let mut chunk = empty_chunk.clone();
        for rec in recommendations {
            let mut block = format!("\n{} (Score: {}/10)\n", rec.name, rec.confidence_score);
            if !rec.rationale.is_empty() {
                block.push_str(&format!("Why: {}...\n", truncate_chars(&rec.rationale, 100)));
            }
            if !rec.sample_books.is_empty() {
                block.push_str("Featured Books:\n");
                for book in rec.sample_books.iter().take(2) {
                    block.push_str(&format!("• {} by {}\n", book.title, book.author));
                }
            }
            block.push_str(&format!("🔍 View More: {}\n", rec.justbookify_link));

            if chunk != empty_chunk && chunk.chars().count() + block.chars().count() > CHUNK_LIMIT
            {
                messages.push(std::mem::replace(&mut chunk, empty_chunk.clone()));
            }
            chunk.push_str(&block);
        }
        if chunk != empty_chunk {
            messages.push(chunk);
        }
    }

    for month in future {
        let mut body = format!("📅 {} READING PLAN 📅\n", month.month.to_uppercase());
        if month.books.is_empty() {
            body.push_str("More recommendations coming soon!\n");
        } else {
            for book in &month.books {
                body.push_str(&format!("• {} by {}\n", book.title, book.author));
            }
        }
        messages.push(format!("{header}{body}\n"));
    }

    if let Some(last) = messages.last_mut() {
        last.push_str("\n📚 Happy Reading! 📚");
    }

    messages
}
