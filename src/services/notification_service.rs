// Notifications - best-effort emails after purchases and borrows
// Delivery failures are logged and never undo the state change that triggered them

use std::sync::Arc;

use crate::entities::{EntDonatedItem, EntListing, EntUser};
use crate::framework::Record;
use crate::infrastructure::{EmailMessage, Mailer};
use crate::schemas::{BorrowerInfo, BuyerInfo};

#[derive(Clone)]
pub struct NotificationService {
    mailer: Arc<dyn Mailer>,
}

impl NotificationService {
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        Self { mailer }
    }

    async fn deliver(&self, message: EmailMessage) {
        if let Err(e) = self.mailer.send(&message).await {
            tracing::warn!(to = %message.to, subject = %message.subject, error = %e, "email delivery failed");
        }
    }

    /// Seller notice (when the seller has an email) and buyer confirmation
    pub async fn listing_purchased(
        &self,
        listing: &Record<EntListing>,
        seller: Option<&EntUser>,
        buyer: &BuyerInfo,
    ) {
        match seller {
            Some(seller) if !seller.email.is_empty() => {
                self.deliver(seller_sale_notice(listing, seller, buyer)).await;
            }
            _ => {
                tracing::warn!(listing_id = %listing.id, "seller has no email, skipping sale notice");
            }
        }
        self.deliver(buyer_confirmation(listing, buyer)).await;
    }

    pub async fn item_borrowed(&self, item: &Record<EntDonatedItem>, borrower: &BorrowerInfo) {
        let Some(donor_email) = item.data.donor_email.as_deref() else {
            tracing::debug!(item_id = %item.id, "donor left no email, skipping borrow notice");
            return;
        };
        self.deliver(donor_borrow_notice(item, donor_email, borrower)).await;
    }
}

fn contact_lines(email: Option<&str>, phone: Option<&str>) -> Vec<(&'static str, String)> {
    let mut lines = Vec::new();
    if let Some(email) = email {
        lines.push(("Email", email.to_string()));
    }
    if let Some(phone) = phone {
        lines.push(("Phone", phone.to_string()));
    }
    lines
}

/// User-supplied text (names, titles, locations) is escaped before it lands in markup
fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn render(greeting: &str, intro: &str, details: &[(&str, String)], outro: &str) -> (String, String) {
    let mut text = format!("{}\n\n{}\n\n", greeting, intro);
    let mut html = format!(
        "<p>{}</p><p>{}</p><ul>",
        escape_html(greeting),
        escape_html(intro)
    );
    for (label, value) in details {
        text.push_str(&format!("{}: {}\n", label, value));
        html.push_str(&format!(
            "<li><strong>{}:</strong> {}</li>",
            escape_html(label),
            escape_html(value)
        ));
    }
    text.push_str(&format!("\n{}\n", outro));
    html.push_str(&format!("</ul><p>{}</p>", escape_html(outro)));
    (text, html)
}

fn seller_sale_notice(listing: &Record<EntListing>, seller: &EntUser, buyer: &BuyerInfo) -> EmailMessage {
    let mut details = vec![
        ("Item", listing.data.title.clone()),
        ("Price", format!("${:.2}", listing.data.price)),
        ("Buyer", buyer.name.clone()),
    ];
    details.extend(contact_lines(Some(buyer.email.as_str()), buyer.phone.as_deref()));

    let (text, html) = render(
        &format!("Hi {},", seller.display_name()),
        "Your item has been purchased.",
        &details,
        "Please contact the buyer to arrange the handover.",
    );
    EmailMessage {
        to: seller.email.clone(),
        subject: format!("Your item \"{}\" has been sold", listing.data.title),
        text,
        html,
    }
}

fn buyer_confirmation(listing: &Record<EntListing>, buyer: &BuyerInfo) -> EmailMessage {
    let details = vec![
        ("Item", listing.data.title.clone()),
        ("Price", format!("${:.2}", listing.data.price)),
        ("Pickup location", listing.data.location.clone()),
    ];
    let (text, html) = render(
        &format!("Hi {},", buyer.name),
        "Thank you for your purchase.",
        &details,
        "The seller has been notified and will contact you soon.",
    );
    EmailMessage {
        to: buyer.email.clone(),
        subject: format!("Purchase confirmation: {}", listing.data.title),
        text,
        html,
    }
}

fn donor_borrow_notice(
    item: &Record<EntDonatedItem>,
    donor_email: &str,
    borrower: &BorrowerInfo,
) -> EmailMessage {
    let mut details = vec![
        ("Item", item.data.title.clone()),
        ("Borrower", borrower.name.clone()),
    ];
    details.extend(contact_lines(borrower.email.as_deref(), borrower.phone.as_deref()));

    let (text, html) = render(
        &format!("Hi {},", item.data.donor_name),
        "Someone has borrowed the item you donated.",
        &details,
        "Thank you for supporting your campus community.",
    );
    EmailMessage {
        to: donor_email.to_string(),
        subject: format!("Your donated item \"{}\" was borrowed", item.data.title),
        text,
        html,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DocId;
    use crate::error::{AppError, AppResult};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Outbox {
        sent: Mutex<Vec<EmailMessage>>,
        fail: bool,
    }

    #[async_trait]
    impl Mailer for Outbox {
        async fn send(&self, message: &EmailMessage) -> AppResult<()> {
            if self.fail {
                return Err(AppError::Upstream("relay down".to_string()));
            }
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    fn record<T>(data: T) -> Record<T> {
        Record {
            id: DocId::new(10),
            version: 1,
            data,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn listing() -> Record<EntListing> {
        record(
            serde_json::from_value(serde_json::json!({
                "sellerId": "1",
                "title": "Calculus Textbook",
                "description": "Barely used",
                "price": 20,
                "category": "Books",
                "condition": "good",
                "location": "Campus A",
                "status": "sold"
            }))
            .unwrap(),
        )
    }

    fn buyer() -> BuyerInfo {
        BuyerInfo {
            name: "Grace".to_string(),
            email: "grace@campus.edu".to_string(),
            phone: None,
        }
    }

    #[tokio::test]
    async fn test_purchase_sends_seller_and_buyer_mail() {
        let outbox = Arc::new(Outbox::default());
        let service = NotificationService::new(outbox.clone());
        let seller = EntUser {
            email: "ada@campus.edu".to_string(),
            first_name: "Ada".to_string(),
            ..EntUser::default()
        };

        service.listing_purchased(&listing(), Some(&seller), &buyer()).await;

        let sent = outbox.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, "ada@campus.edu");
        assert!(sent[0].text.contains("Grace"));
        assert!(sent[0].html.contains("$20.00"));
        assert_eq!(sent[1].to, "grace@campus.edu");
    }

    #[tokio::test]
    async fn test_markup_in_user_text_is_escaped() {
        let outbox = Arc::new(Outbox::default());
        let service = NotificationService::new(outbox.clone());
        let seller = EntUser {
            email: "ada@campus.edu".to_string(),
            first_name: "Ada".to_string(),
            ..EntUser::default()
        };
        let mut listing = listing();
        listing.data.title = "Lamp & <b>shade</b>".to_string();
        let buyer = BuyerInfo {
            name: "<script>alert('x')</script>".to_string(),
            ..buyer()
        };

        service.listing_purchased(&listing, Some(&seller), &buyer).await;

        let sent = outbox.sent.lock().unwrap();
        let notice = &sent[0].html;
        assert!(!notice.contains("<script>"));
        assert!(!notice.contains("<b>shade"));
        assert!(notice.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
        assert!(notice.contains("Lamp &amp; &lt;b&gt;shade&lt;/b&gt;"));
        // Plain text keeps the original characters
        assert!(sent[0].text.contains("<script>alert('x')</script>"));
        assert!(!sent[1].html.contains("<script>"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"a<b>&"c'"#), "a&lt;b&gt;&amp;&quot;c&#39;");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[tokio::test]
    async fn test_missing_seller_email_still_confirms_buyer() {
        let outbox = Arc::new(Outbox::default());
        let service = NotificationService::new(outbox.clone());

        service.listing_purchased(&listing(), None, &buyer()).await;
        assert_eq!(outbox.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delivery_failures_are_swallowed() {
        let outbox = Arc::new(Outbox {
            fail: true,
            ..Outbox::default()
        });
        let service = NotificationService::new(outbox.clone());
        service.listing_purchased(&listing(), None, &buyer()).await;
        assert!(outbox.sent.lock().unwrap().is_empty());
    }
}
