//! Email delivery via the SendGrid JSON mail API, plus the HTML digest
//! builder for recommendation plans.

use reqwest::Client;
use serde_json::json;
use tracing::debug;

use crate::models::plan::{MonthPlan, PlanBook, RecommendationRecord};
use crate::notify::NotifyError;

const SENDGRID_API_URL: &str = "https://api.sendgrid.com/v3/mail/send";

#[derive(Clone)]
pub struct EmailClient {
    client: Client,
    api_key: Option<String>,
    from_email: String,
}

impl EmailClient {
    pub fn new(api_key: Option<String>, from_email: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            from_email,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Sends one HTML email.
    pub async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), NotifyError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(NotifyError::NotConfigured("email"))?;

        let payload = json!({
            "personalizations": [{"to": [{"email": to}]}],
            "from": {"email": self.from_email},
            "subject": subject,
            "content": [{"type": "text/html", "value": html}],
        });

        let response = self
            .client
            .post(SENDGRID_API_URL)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(NotifyError::Api {
                status: status.as_u16(),
                message,
            });
        }

        debug!("email sent to {to}");
        Ok(())
    }
}

/// Builds the HTML digest sent to parents: current picks, ranked series
/// with storefront links, and the monthly reading plan.
pub fn build_recommendations_html(
    name: &str,
    current: &[PlanBook],
    series: &[RecommendationRecord],
    reading_plan: &[MonthPlan],
) -> String {
    let mut html = String::new();
    html.push_str(&format!("<h2>Hello {name}'s Parent!</h2>\n"));
    html.push_str(&format!(
        "<p>Here are the book recommendations for {name}:</p>\n"
    ));

    html.push_str("<h3>Current Recommendations:</h3>\n<ul>\n");
    for book in current {
        html.push_str(&format!(
            "<li><strong>{}</strong> by {}<br/><em>{}</em></li>\n",
            book.title, book.author, book.explanation
        ));
    }
    html.push_str("</ul>\n");

    html.push_str("<h3>Recommended Series and Authors:</h3>\n");
    for rec in series {
        html.push_str(&format!(
            "<div style=\"margin-bottom: 20px;\">\n\
             <h4><a href=\"{}\" target=\"_blank\">{}</a> (Confidence Score: {}/10)</h4>\n\
             <p><em>{}</em></p>\n<ul>\n",
            rec.justbookify_link, rec.name, rec.confidence_score, rec.rationale
        ));
        for book in &rec.sample_books {
            html.push_str(&format!(
                "<li><strong>{}</strong> by {}</li>\n",
                book.title, book.author
            ));
        }
        html.push_str("</ul>\n</div>\n");
    }

    html.push_str("<h3>3-Month Reading Plan:</h3>\n");
    for month in reading_plan {
        html.push_str(&format!(
            "<div style=\"margin-bottom: 20px;\">\n<h4>{}</h4>\n<ul>\n",
            month.month
        ));
        for book in &month.books {
            html.push_str(&format!(
                "<li><strong>{}</strong> by {}<br/><em>{}</em></li>\n",
                book.title, book.author, book.explanation
            ));
        }
        html.push_str("</ul>\n</div>\n");
    }

    html.push_str("<p>Happy Reading!</p>\n");
    html
}
