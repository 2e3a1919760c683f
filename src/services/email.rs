//! Email service module
//!
//! Provides email sending functionality including:
//! - SMTP configuration from environment variables
//! - Generic HTML email sending
//! - Booking confirmation emails, the only transactional email this domain sends
//!
//! Structured on the teacher's SMTP transport setup (implicit TLS on port 465,
//! STARTTLS otherwise) and `EmailService` trait/`NoOpEmailService` pairing;
//! the templates themselves are new, grounded on the booking fields in
//! `models::booking::Booking` and `models::cabin::Cabin`.

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use regex::Regex;
use std::sync::{Arc, OnceLock};
use tracing::{info, warn};

use crate::config::SmtpConfig;
use crate::error::AppError;
use crate::models::booking::Booking;
use crate::models::cabin::Cabin;

fn html_tag_regex() -> &'static Regex {
    static HTML_TAG_REGEX: OnceLock<Regex> = OnceLock::new();
    HTML_TAG_REGEX.get_or_init(|| Regex::new(r"<[^>]+>").expect("valid html-tag regex"))
}

/// Email templates module
pub mod templates {
    use crate::models::booking::Booking;
    use crate::models::cabin::Cabin;

    /// Booking confirmation email, sent best-effort after a booking commits
    /// (§4.E step 7).
    pub fn booking_confirmation_template(booking: &Booking, cabin: &Cabin) -> String {
        let calendar_link = booking
            .calendar_event_link
            .as_deref()
            .map(|link| format!(r#"<p><a href="{link}">View in calendar</a></p>"#))
            .unwrap_or_default();

        format!(
            r#"<!DOCTYPE html>
<html lang="he" dir="rtl">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>אישור הזמנה</title>
</head>
<body style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px; background-color: #f5f5f5;">
    <div style="background-color: #ffffff; padding: 30px; border-radius: 10px; box-shadow: 0 2px 10px rgba(0,0,0,0.1);">
        <h2 style="color: #2e7d32; margin-bottom: 20px;">ההזמנה שלך אושרה</h2>
        <p style="color: #666; line-height: 1.6;">
            תודה שהזמנת אצלנו. להלן פרטי ההזמנה:
        </p>
        <table style="width: 100%; border-collapse: collapse; margin: 20px 0;">
            <tr><td style="padding: 8px 0; color: #333; font-weight: bold;">צימר</td><td style="padding: 8px 0; color: #666;">{cabin_name}</td></tr>
            <tr><td style="padding: 8px 0; color: #333; font-weight: bold;">צ'ק אין</td><td style="padding: 8px 0; color: #666;">{check_in}</td></tr>
            <tr><td style="padding: 8px 0; color: #333; font-weight: bold;">צ'ק אאוט</td><td style="padding: 8px 0; color: #666;">{check_out}</td></tr>
            <tr><td style="padding: 8px 0; color: #333; font-weight: bold;">לילות</td><td style="padding: 8px 0; color: #666;">{nights}</td></tr>
            <tr><td style="padding: 8px 0; color: #333; font-weight: bold;">מחיר כולל</td><td style="padding: 8px 0; color: #666;">{total_price} ₪</td></tr>
        </table>
        {calendar_link}
        <p style="color: #999; font-size: 12px; margin-top: 30px; border-top: 1px solid #eee; padding-top: 20px;">
            מספר הזמנה: {booking_id}
        </p>
    </div>
</body>
</html>"#,
            cabin_name = cabin.name,
            check_in = booking.check_in_date,
            check_out = booking.check_out_date,
            nights = booking.nights(),
            total_price = booking.total_price,
            calendar_link = calendar_link,
            booking_id = booking.id,
        )
    }

    pub fn booking_confirmation_subject(cabin: &Cabin) -> String {
        format!("אישור הזמנה - {}", cabin.name)
    }

    /// Payment receipt email, sent best-effort after the payment gateway's
    /// webhook confirms a transaction as completed (§4.E webhook
    /// reconciliation).
    pub fn payment_receipt_template(booking: &Booking, cabin: &Cabin, amount: rust_decimal::Decimal) -> String {
        format!(
            r#"<!DOCTYPE html>
<html lang="he" dir="rtl">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>קבלה על תשלום</title>
</head>
<body style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px; background-color: #f5f5f5;">
    <div style="background-color: #ffffff; padding: 30px; border-radius: 10px; box-shadow: 0 2px 10px rgba(0,0,0,0.1);">
        <h2 style="color: #2e7d32; margin-bottom: 20px;">התשלום התקבל בהצלחה</h2>
        <p style="color: #666; line-height: 1.6;">
            קיבלנו את התשלום עבור ההזמנה שלך. להלן פרטי הקבלה:
        </p>
        <table style="width: 100%; border-collapse: collapse; margin: 20px 0;">
            <tr><td style="padding: 8px 0; color: #333; font-weight: bold;">צימר</td><td style="padding: 8px 0; color: #666;">{cabin_name}</td></tr>
            <tr><td style="padding: 8px 0; color: #333; font-weight: bold;">צ'ק אין</td><td style="padding: 8px 0; color: #666;">{check_in}</td></tr>
            <tr><td style="padding: 8px 0; color: #333; font-weight: bold;">צ'ק אאוט</td><td style="padding: 8px 0; color: #666;">{check_out}</td></tr>
            <tr><td style="padding: 8px 0; color: #333; font-weight: bold;">סכום ששולם</td><td style="padding: 8px 0; color: #666;">{amount} ₪</td></tr>
        </table>
        <p style="color: #999; font-size: 12px; margin-top: 30px; border-top: 1px solid #eee; padding-top: 20px;">
            מספר הזמנה: {booking_id}
        </p>
    </div>
</body>
</html>"#,
            cabin_name = cabin.name,
            check_in = booking.check_in_date,
            check_out = booking.check_out_date,
            amount = amount,
            booking_id = booking.id,
        )
    }

    pub fn payment_receipt_subject(cabin: &Cabin) -> String {
        format!("קבלה על תשלום - {}", cabin.name)
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use chrono::Utc;
        use rust_decimal::Decimal;
        use uuid::Uuid;

        fn booking() -> Booking {
            Booking {
                id: Uuid::new_v4(),
                cabin_id: Uuid::new_v4(),
                customer_id: None,
                check_in_date: "2026-03-10".parse().unwrap(),
                check_out_date: "2026-03-12".parse().unwrap(),
                adults: 2,
                kids: 0,
                total_price: Decimal::from(1200),
                status: crate::models::booking::BookingStatus::Confirmed,
                calendar_event_ref: Some("evt-1".to_string()),
                calendar_event_link: Some("https://calendar.example.test/evt-1".to_string()),
                notes: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }
        }

        fn cabin() -> Cabin {
            Cabin {
                id: Uuid::new_v4(),
                short_code: "ZB01".to_string(),
                name: "Zimmer Bayit".to_string(),
                area: None,
                max_adults: 4,
                max_kids: 2,
                features: vec![],
                base_price_per_night: Decimal::from(500),
                weekend_price_per_night: None,
                image_refs: vec![],
                calendar_ref: Some("cal-zb01".to_string()),
                street: None,
                city: None,
                postal_code: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }
        }

        #[test]
        fn template_contains_booking_fields() {
            let b = booking();
            let c = cabin();
            let html = booking_confirmation_template(&b, &c);
            assert!(html.contains("Zimmer Bayit"));
            assert!(html.contains("2026-03-10"));
            assert!(html.contains("2026-03-12"));
            assert!(html.contains(&b.id.to_string()));
            assert!(html.contains("https://calendar.example.test/evt-1"));
        }

        #[test]
        fn template_omits_calendar_link_when_absent() {
            let mut b = booking();
            b.calendar_event_link = None;
            let html = booking_confirmation_template(&b, &cabin());
            assert!(!html.contains("View in calendar"));
        }

        #[test]
        fn receipt_template_contains_booking_fields() {
            let b = booking();
            let c = cabin();
            let html = payment_receipt_template(&b, &c, Decimal::from(1200));
            assert!(html.contains("Zimmer Bayit"));
            assert!(html.contains("1200"));
            assert!(html.contains(&b.id.to_string()));
        }
    }
}

/// SMTP email configuration
#[derive(Clone)]
pub struct EmailConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub from: String,
}

impl EmailConfig {
    /// Create a new EmailConfig from SmtpConfig
    pub fn from_smtp_config(smtp: &SmtpConfig) -> Option<Self> {
        Some(Self {
            host: smtp.host.clone()?,
            port: smtp.port,
            user: smtp.user.clone()?,
            pass: smtp.pass.clone()?,
            from: smtp.from_address.clone(),
        })
    }
}

/// Email service trait defining email operations
#[async_trait]
pub trait EmailService: Send + Sync {
    /// Send an email with HTML content
    async fn send_email(&self, to: &str, subject: &str, html_body: &str) -> Result<(), AppError>;

    /// Best-effort booking confirmation, sent after a booking commits
    /// (§4.E step 7). Failure is logged by the caller, never fatal.
    async fn send_booking_confirmation(&self, to: &str, booking: &Booking, cabin: &Cabin) -> Result<(), AppError>;

    /// Best-effort payment receipt, sent when the payment gateway's webhook
    /// reconciles a transaction to `completed` (§4.E, §6). Failure is logged
    /// by the caller, never fatal.
    async fn send_payment_receipt(
        &self,
        to: &str,
        booking: &Booking,
        cabin: &Cabin,
        amount: rust_decimal::Decimal,
    ) -> Result<(), AppError>;

    /// Check if email service is configured
    fn is_configured(&self) -> bool;
}

/// Implementation of the EmailService trait
pub struct EmailServiceImpl {
    config: Option<EmailConfig>,
    mailer: Option<Arc<AsyncSmtpTransport<Tokio1Executor>>>,
}

impl EmailServiceImpl {
    pub fn new(config: Option<EmailConfig>) -> Self {
        let mailer = config.as_ref().and_then(|cfg| {
            let creds = Credentials::new(cfg.user.clone(), cfg.pass.clone());

            let transport = if cfg.port == 465 {
                AsyncSmtpTransport::<Tokio1Executor>::relay(&cfg.host)
                    .ok()?
                    .credentials(creds)
                    .port(cfg.port)
                    .build()
            } else {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.host)
                    .ok()?
                    .credentials(creds)
                    .port(cfg.port)
                    .build()
            };

            Some(Arc::new(transport))
        });

        Self { config, mailer }
    }

    pub fn from_smtp_config(smtp: &SmtpConfig) -> Self {
        Self::new(EmailConfig::from_smtp_config(smtp))
    }

    fn parse_mailbox(email: &str) -> Result<Mailbox, AppError> {
        email
            .parse()
            .map_err(|_| AppError::BadRequest(format!("Invalid email address: {email}")))
    }
}

#[async_trait]
impl EmailService for EmailServiceImpl {
    async fn send_email(&self, to: &str, subject: &str, html_body: &str) -> Result<(), AppError> {
        let config = match &self.config {
            Some(c) => c,
            None => {
                warn!("SMTP not configured, skipping email to {} with subject: {}", to, subject);
                return Ok(());
            },
        };

        let mailer = match &self.mailer {
            Some(m) => m,
            None => {
                warn!("SMTP mailer not initialized, skipping email to {}", to);
                return Ok(());
            },
        };

        let from_mailbox = Self::parse_mailbox(&config.from)?;
        let to_mailbox = Self::parse_mailbox(to)?;

        let plain_text = html_body
            .replace("<br>", "\n")
            .replace("<br/>", "\n")
            .replace("<br />", "\n")
            .replace("</p>", "\n\n")
            .replace("</tr>", "\n")
            .replace("</h1>", "\n\n")
            .replace("</h2>", "\n\n")
            .replace("</h3>", "\n\n");
        let plain_text = html_tag_regex().replace_all(&plain_text, "").to_string();

        let email = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(plain_text),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )
            .map_err(|e| AppError::Internal(format!("Failed to build email: {e}")))?;

        mailer
            .send(email)
            .await
            .map_err(|e| AppError::EmailService(format!("Failed to send email: {e}")))?;

        info!("Email sent to {} with subject: {}", to, subject);
        Ok(())
    }

    async fn send_booking_confirmation(&self, to: &str, booking: &Booking, cabin: &Cabin) -> Result<(), AppError> {
        let subject = templates::booking_confirmation_subject(cabin);
        let html_body = templates::booking_confirmation_template(booking, cabin);
        self.send_email(to, &subject, &html_body).await
    }

    async fn send_payment_receipt(
        &self,
        to: &str,
        booking: &Booking,
        cabin: &Cabin,
        amount: rust_decimal::Decimal,
    ) -> Result<(), AppError> {
        let subject = templates::payment_receipt_subject(cabin);
        let html_body = templates::payment_receipt_template(booking, cabin, amount);
        self.send_email(to, &subject, &html_body).await
    }

    fn is_configured(&self) -> bool {
        self.config.is_some() && self.mailer.is_some()
    }
}

/// No-op email service for testing or when email is disabled
#[derive(Default)]
pub struct NoOpEmailService;

impl NoOpEmailService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EmailService for NoOpEmailService {
    async fn send_email(&self, to: &str, subject: &str, _html_body: &str) -> Result<(), AppError> {
        info!("[NoOp] Would send email to {} with subject: {}", to, subject);
        Ok(())
    }

    async fn send_booking_confirmation(&self, to: &str, booking: &Booking, cabin: &Cabin) -> Result<(), AppError> {
        info!("[NoOp] Would send booking confirmation for {} to {}", booking.id, to);
        Ok(())
    }

    async fn send_payment_receipt(
        &self,
        to: &str,
        booking: &Booking,
        _cabin: &Cabin,
        amount: rust_decimal::Decimal,
    ) -> Result<(), AppError> {
        info!("[NoOp] Would send payment receipt for {} ({}) to {}", booking.id, amount, to);
        Ok(())
    }

    fn is_configured(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_service_not_configured() {
        let service = EmailServiceImpl::new(None);
        assert!(!service.is_configured());
    }

    #[test]
    fn test_noop_email_service_is_not_configured() {
        let service = NoOpEmailService::new();
        assert!(!service.is_configured());
    }

    #[tokio::test]
    async fn test_noop_send_email() {
        let service = NoOpEmailService::new();
        let result = service
            .send_email("test@example.com", "Test Subject", "<p>Test</p>")
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_unconfigured_service_gracefully_skips() {
        let service = EmailServiceImpl::new(None);
        let result = service
            .send_email("test@example.com", "Test", "<p>Test</p>")
            .await;
        assert!(result.is_ok());
    }
}
