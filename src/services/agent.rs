//! Conversational agent
//!
//! A thin orchestrator over the availability/pricing/hold/booking services:
//! classify the caller's intent, pull entities (dates, cabin, name) out of
//! free text, carry context over from the previous turn, dispatch to the
//! right service, and render a fixed Hebrew-prose reply. New module: the
//! teacher has no conversational surface, so the turn lifecycle below is
//! grounded directly on `examples/original_source/src/agent.py`
//! (intent scoring, entity regexes, context carry-over map) rather than an
//! adapted teacher file, while the service struct itself follows the
//! teacher's `XService`/`XServiceImpl` pairing (`services::booking`).

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Utc};
use serde_json::{json, Value};
use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::booking::CreateBookingRequest;
use crate::models::cabin::Cabin;
use crate::models::conversation::{
    ChatRequest, ChatResponse, Conversation, ConversationChannel, Message, MessageRole, TurnContext,
};
use crate::models::faq::{BusinessFact, Faq};
use crate::services::availability::{AvailabilityQuery, AvailabilityResolver};
use crate::services::booking::BookingService;
use crate::services::calendar_gateway::CalendarGatewayService;
use crate::services::hold_manager::HoldManager;
use crate::services::pricing::{Addon, PricingEngine};

#[async_trait]
pub trait AgentService: Send + Sync {
    async fn chat(&self, request: ChatRequest) -> AppResult<ChatResponse>;
}

/// Keyword hit-table for intent classification. Each entry is `(intent, keywords)`;
/// scoring is a plain hit count, not a weighted model.
const INTENT_KEYWORDS: &[(&str, &[&str])] = &[
    ("availability", &["פנוי", "פנויה", "פנויים", "תפוס", "available", "free", "vacancy"]),
    ("quote", &["מחיר", "עולה", "כמה עולה", "עלות", "price", "cost", "quote"]),
    ("hold", &["לשריין", "תפסו לי", "hold", "reserve temporarily"]),
    ("book", &["להזמין", "סגור לי", "book", "confirm the booking", "בוא נסגור"]),
    ("cabin_info", &["ספר לי על", "פרטים על", "תמונה", "tell me about", "photo", "picture"]),
    ("location", &["איפה", "כתובת", "מיקום", "where", "address", "location"]),
    ("list_cabins", &["אילו צימרים", "אילו בקתות", "מה יש לכם", "which cabins", "list cabins", "show me all"]),
    ("greeting", &["שלום", "היי", "בוקר טוב", "hello", "hi ", "good morning"]),
    ("confirm", &["כן", "מאשר", "מאשרת", "בסדר", "yes", "confirm", "sounds good"]),
    ("book_now", &["סגרתי", "קדימה תזמינו", "book it", "let's do it", "go ahead and book"]),
];

/// Keywords that, when they appear in a matched FAQ's own text, mean the
/// answer is about data that changes over time (inventory, prices) rather
/// than a fixed policy — so the agent should route to a live tool instead of
/// reciting the stale cached FAQ answer.
const DYNAMIC_DATA_KEYWORDS: &[&str] = &["מחיר", "פנוי", "זמין", "price", "available", "availability"];

const HEBREW_MONTHS: &[(&str, u32)] = &[
    ("ינואר", 1),
    ("פברואר", 2),
    ("מרץ", 3),
    ("אפריל", 4),
    ("מאי", 5),
    ("יוני", 6),
    ("יולי", 7),
    ("אוגוסט", 8),
    ("ספטמבר", 9),
    ("אוקטובר", 10),
    ("נובמבר", 11),
    ("דצמבר", 12),
];

/// short_code aliases the agent recognizes in free text, in addition to the
/// literal short_code itself (e.g. "ZB03").
const CABIN_ALIASES: &[(&str, &str)] = &[("מורן", "ZB03"), ("יולי", "ZB01"), ("אמי", "ZB02")];

pub struct AgentServiceImpl {
    pool: PgPool,
    calendar: Arc<dyn CalendarGatewayService>,
    pricing: PricingEngine,
    hold_manager: Arc<Mutex<HoldManager>>,
    booking: Arc<dyn BookingService>,
}

impl AgentServiceImpl {
    pub fn new(
        pool: PgPool,
        calendar: Arc<dyn CalendarGatewayService>,
        pricing: PricingEngine,
        hold_manager: Arc<Mutex<HoldManager>>,
        booking: Arc<dyn BookingService>,
    ) -> Self {
        Self {
            pool,
            calendar,
            pricing,
            hold_manager,
            booking,
        }
    }

    async fn get_or_create_conversation(
        &self,
        conversation_id: Option<Uuid>,
        channel: ConversationChannel,
        customer_id: Option<Uuid>,
    ) -> AppResult<Conversation> {
        if let Some(id) = conversation_id {
            if let Some(existing) =
                sqlx::query_as::<_, Conversation>("SELECT * FROM conversations WHERE id = $1")
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await?
            {
                return Ok(existing);
            }
        }

        let conversation = sqlx::query_as::<_, Conversation>(
            r#"
            INSERT INTO conversations (customer_id, channel, status)
            VALUES ($1, $2, 'active')
            RETURNING *
            "#,
        )
        .bind(customer_id)
        .bind(channel)
        .fetch_one(&self.pool)
        .await?;
        Ok(conversation)
    }

    async fn last_assistant_message(&self, conversation_id: Uuid) -> AppResult<Option<Message>> {
        let message = sqlx::query_as::<_, Message>(
            r#"
            SELECT * FROM messages
            WHERE conversation_id = $1 AND role = 'assistant'
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(conversation_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(message)
    }

    async fn insert_message(
        &self,
        conversation_id: Uuid,
        role: MessageRole,
        content: &str,
        metadata: Value,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO messages (conversation_id, role, content, metadata)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(conversation_id)
        .bind(role)
        .bind(content)
        .bind(metadata)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Rebuilds the carry-over context from the previous assistant turn's
    /// metadata (§4.F step 1). A fresh conversation gets an empty context.
    fn context_from_metadata(metadata: &Value) -> TurnContext {
        serde_json::from_value(metadata.get("context").cloned().unwrap_or(Value::Null)).unwrap_or_default()
    }

    async fn all_cabins(&self) -> AppResult<Vec<Cabin>> {
        let cabins = sqlx::query_as::<_, Cabin>("SELECT * FROM cabins ORDER BY short_code").fetch_all(&self.pool).await?;
        Ok(cabins)
    }

    async fn resolve_cabin_loose(&self, identifier: &str) -> AppResult<Option<Cabin>> {
        let trimmed = identifier.trim();
        if let Some(cabin) = sqlx::query_as::<_, Cabin>("SELECT * FROM cabins WHERE short_code = $1")
            .bind(trimmed)
            .fetch_optional(&self.pool)
            .await?
        {
            return Ok(Some(cabin));
        }
        if let Some(cabin) = sqlx::query_as::<_, Cabin>("SELECT * FROM cabins WHERE name = $1")
            .bind(trimmed)
            .fetch_optional(&self.pool)
            .await?
        {
            return Ok(Some(cabin));
        }
        Ok(None)
    }

    async fn matching_faq(&self, text: &str) -> AppResult<Option<Faq>> {
        let lowered = text.to_lowercase();
        let faqs = sqlx::query_as::<_, Faq>("SELECT * FROM faqs WHERE approved = true").fetch_all(&self.pool).await?;
        Ok(faqs.into_iter().find(|f| {
            let q = f.question.to_lowercase();
            !q.is_empty() && (lowered.contains(&q) || q.contains(&lowered))
        }))
    }

    async fn matching_business_fact(&self, text: &str) -> AppResult<Option<BusinessFact>> {
        let lowered = text.to_lowercase();
        let facts = sqlx::query_as::<_, BusinessFact>("SELECT * FROM business_facts WHERE is_active = true")
            .fetch_all(&self.pool)
            .await?;
        Ok(facts.into_iter().find(|f| {
            let key = f.fact_key.replace('_', " ").to_lowercase();
            lowered.contains(&key)
        }))
    }

    async fn bump_faq_usage(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE faqs SET usage_count = usage_count + 1, updated_at = now() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn suggest_faq(&self, question: &str, answer: &str) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO faqs (question, answer, approved, suggested_answer)
            VALUES ($1, '', false, $2)
            "#,
        )
        .bind(question)
        .bind(answer)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

struct Classification {
    intent: &'static str,
    confidence: f64,
}

/// Keyword-hit scoring: `confidence = min(0.95, 0.5 + maxScore/totalScore * 0.45)`.
/// Returns `None` when nothing scores (no keyword hits at all).
fn classify_intent(text: &str) -> Option<Classification> {
    let lowered = text.to_lowercase();
    let mut scores: Vec<(&'static str, u32)> = Vec::new();
    let mut total = 0u32;

    for (intent, keywords) in INTENT_KEYWORDS {
        let hits = keywords.iter().filter(|kw| lowered.contains(&kw.to_lowercase())).count() as u32;
        if hits > 0 {
            scores.push((intent, hits));
            total += hits;
        }
    }

    let (best_intent, best_score) = scores.into_iter().max_by_key(|(_, score)| *score)?;
    if total == 0 {
        return None;
    }
    let confidence = (0.5 + (best_score as f64 / total as f64) * 0.45).min(0.95);
    Some(Classification {
        intent: best_intent,
        confidence,
    })
}

struct ExtractedEntities {
    cabin: Option<String>,
    check_in: Option<NaiveDate>,
    check_out: Option<NaiveDate>,
    is_month_range: bool,
    customer_name: Option<String>,
}

fn extract_cabin(text: &str) -> Option<String> {
    for (alias, code) in CABIN_ALIASES {
        if text.contains(alias) {
            return Some(code.to_string());
        }
    }
    let upper = text.to_uppercase();
    let bytes = upper.as_bytes();
    let mut i = 0;
    while i + 4 <= bytes.len() {
        if bytes[i] == b'Z' && bytes[i + 1] == b'B' && bytes[i + 2].is_ascii_digit() && bytes[i + 3].is_ascii_digit() {
            return Some(upper[i..i + 4].to_string());
        }
        i += 1;
    }
    None
}

fn pivot_year(two_digit: i32) -> i32 {
    if two_digit < 50 {
        2000 + two_digit
    } else {
        1900 + two_digit
    }
}

/// Tries, in order: `DD/MM/YYYY` (or two-digit year), `DD.MM[.YY[YY]]`, a
/// Hebrew "<day> ב<month name>" phrase. Returns the first successful parse.
fn extract_dates(text: &str) -> (Option<NaiveDate>, Option<NaiveDate>, bool) {
    if let Some(d) = parse_slash_date(text) {
        return (Some(d), Some(d + chrono::Duration::days(1)), false);
    }
    if let Some(d) = parse_dotted_date(text) {
        return (Some(d), Some(d + chrono::Duration::days(1)), false);
    }
    if let Some((start, end)) = parse_hebrew_month_phrase(text) {
        return (Some(start), Some(end), true);
    }
    if let Some(d) = parse_hebrew_day_month(text) {
        return (Some(d), Some(d + chrono::Duration::days(1)), false);
    }
    (None, None, false)
}

fn parse_slash_date(text: &str) -> Option<NaiveDate> {
    for token in text.split(|c: char| c.is_whitespace() || c == ',') {
        let parts: Vec<&str> = token.split('/').collect();
        if parts.len() == 3 {
            let day: u32 = match parts[0].parse() {
                Ok(v) => v,
                Err(_) => continue,
            };
            let month: u32 = match parts[1].parse() {
                Ok(v) => v,
                Err(_) => continue,
            };
            let mut year: i32 = match parts[2].parse() {
                Ok(v) => v,
                Err(_) => continue,
            };
            if parts[2].len() == 2 {
                year = pivot_year(year);
            }
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                return Some(date);
            }
        }
    }
    None
}

fn parse_dotted_date(text: &str) -> Option<NaiveDate> {
    for token in text.split(|c: char| c.is_whitespace() || c == ',') {
        let parts: Vec<&str> = token.split('.').filter(|p| !p.is_empty()).collect();
        if parts.len() >= 2 {
            let day: u32 = match parts[0].parse() {
                Ok(v) => v,
                Err(_) => continue,
            };
            let month: u32 = match parts[1].parse() {
                Ok(v) => v,
                Err(_) => continue,
            };
            let year = if parts.len() == 3 {
                let raw: i32 = match parts[2].parse() {
                    Ok(v) => v,
                    Err(_) => continue,
                };
                if parts[2].len() == 2 {
                    pivot_year(raw)
                } else {
                    raw
                }
            } else {
                Utc::now().year()
            };
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                return Some(date);
            }
        }
    }
    None
}

/// "<day> ב<month name>", e.g. "12 ביולי".
fn parse_hebrew_day_month(text: &str) -> Option<NaiveDate> {
    let words: Vec<&str> = text.split_whitespace().collect();
    for (i, word) in words.iter().enumerate() {
        if let Ok(day) = word.parse::<u32>() {
            if let Some(next) = words.get(i + 1) {
                let stripped = next.trim_start_matches('ב');
                if let Some((_, month)) = HEBREW_MONTHS.iter().find(|(name, _)| *name == stripped) {
                    let year = Utc::now().year();
                    if let Some(date) = NaiveDate::from_ymd_opt(year, *month, day) {
                        return Some(date);
                    }
                }
            }
        }
    }
    None
}

/// A bare month name with no day, e.g. "פנוי ביולי" — implies the whole
/// calendar month (`is_month_range = true`).
fn parse_hebrew_month_phrase(text: &str) -> Option<(NaiveDate, NaiveDate)> {
    for (name, month) in HEBREW_MONTHS {
        if text.contains(name) {
            let year = Utc::now().year();
            let start = NaiveDate::from_ymd_opt(year, *month, 1)?;
            let end = if *month == 12 {
                NaiveDate::from_ymd_opt(year + 1, 1, 1)?
            } else {
                NaiveDate::from_ymd_opt(year, *month + 1, 1)?
            };
            return Some((start, end));
        }
    }
    None
}

/// "על שם X" / "שם: X" / "name: X".
fn extract_customer_name(text: &str) -> Option<String> {
    for marker in ["על שם ", "שם: ", "שם:", "name: ", "name:"] {
        if let Some(idx) = text.find(marker) {
            let rest = &text[idx + marker.len()..];
            let name: String = rest.split(|c: char| c == ',' || c == '.' || c == '\n').next()?.trim().to_string();
            if !name.is_empty() {
                return Some(name);
            }
        }
    }
    None
}

fn extract_entities(text: &str, context: &TurnContext) -> ExtractedEntities {
    let (check_in, check_out, is_month_range) = extract_dates(text);
    ExtractedEntities {
        cabin: extract_cabin(text).or_else(|| context.cabin_id.clone()),
        check_in: check_in.or(context.check_in),
        check_out: check_out.or(context.check_out),
        is_month_range,
        customer_name: extract_customer_name(text),
    }
}

/// Is this turn a bare affirmation ("כן"/"yes"/"confirm") with nothing else
/// informative in it? Used to detect "confirm last quote" turns.
fn is_bare_affirmation(text: &str) -> bool {
    let lowered = text.trim().to_lowercase();
    matches!(
        lowered.as_str(),
        "כן" | "כן בבקשה" | "מאשר" | "מאשרת" | "בסדר" | "yes" | "confirm" | "sounds good" | "ok" | "okay"
    )
}

#[async_trait]
impl AgentService for AgentServiceImpl {
    async fn chat(&self, request: ChatRequest) -> AppResult<ChatResponse> {
        let channel = request.channel.unwrap_or(ConversationChannel::Web);
        let conversation = self
            .get_or_create_conversation(request.conversation_id, channel, request.customer_id)
            .await?;

        let prior_context = match self.last_assistant_message(conversation.id).await? {
            Some(msg) => Self::context_from_metadata(&msg.metadata),
            None => TurnContext::default(),
        };

        self.insert_message(conversation.id, MessageRole::User, &request.message, json!({})).await?;

        let text = request.message.trim();

        // FAQ shortcut, unless the matched FAQ itself talks about dynamic data
        // (inventory/pricing) — route those to live tools instead. Matching a
        // FAQ bumps its usage count regardless of which branch answers the turn.
        if let Some(faq) = self.matching_faq(text).await? {
            self.bump_faq_usage(faq.id).await?;
            let faq_text = format!("{} {}", faq.question, faq.answer).to_lowercase();
            let is_dynamic = DYNAMIC_DATA_KEYWORDS.iter().any(|kw| faq_text.contains(kw));
            if !is_dynamic {
                let reply = faq.answer.clone();
                let metadata = json!({ "intent": "faq", "context": prior_context });
                self.insert_message(conversation.id, MessageRole::Assistant, &reply, metadata).await?;
                return Ok(ChatResponse {
                    conversation_id: conversation.id,
                    reply,
                    intent: Some("faq".to_string()),
                    confidence: Some(1.0),
                });
            }
        }

        // Business-fact shortcut: always a fixed fact, never stale relative
        // to inventory/pricing.
        if let Some(fact) = self.matching_business_fact(text).await? {
            let reply = fact.fact_value.clone();
            let metadata = json!({ "intent": "business_fact", "context": prior_context });
            self.insert_message(conversation.id, MessageRole::Assistant, &reply, metadata).await?;
            return Ok(ChatResponse {
                conversation_id: conversation.id,
                reply,
                intent: Some("business_fact".to_string()),
                confidence: Some(1.0),
            });
        }

        // Context carry-over: a bare affirmation with a cached quote means
        // "confirm", a bare cabin reference with a cached cabinId means
        // "cabin_info", ahead of running the general classifier.
        let forced_intent = if is_bare_affirmation(text) && prior_context.last_quote.is_some() {
            Some("confirm")
        } else if prior_context.cabin_id.is_some() && extract_cabin(text).is_none() && text.chars().count() < 20 {
            Some("cabin_info")
        } else {
            None
        };

        let classification = classify_intent(text);
        let intent = forced_intent.or_else(|| classification.as_ref().map(|c| c.intent)).unwrap_or("unknown");
        let confidence = if forced_intent.is_some() {
            0.95
        } else {
            classification.map(|c| c.confidence).unwrap_or(0.0)
        };

        let entities = extract_entities(text, &prior_context);

        let (reply, new_context) = self.dispatch(intent, &entities, &prior_context).await?;

        let metadata = json!({ "intent": intent, "confidence": confidence, "context": new_context });
        self.insert_message(conversation.id, MessageRole::Assistant, &reply, metadata).await?;

        // Reaching here means neither the FAQ nor the business-fact shortcut
        // answered this turn (both return early above), so per §4.F step 9
        // every such answer is recorded as an unapproved FAQ suggestion.
        self.suggest_faq(text, &reply).await.ok();

        Ok(ChatResponse {
            conversation_id: conversation.id,
            reply,
            intent: Some(intent.to_string()),
            confidence: Some(confidence),
        })
    }
}

impl AgentServiceImpl {
    async fn dispatch(
        &self,
        intent: &str,
        entities: &ExtractedEntities,
        prior_context: &TurnContext,
    ) -> AppResult<(String, TurnContext)> {
        match intent {
            "greeting" => Ok((
                "שלום! אני כאן כדי לעזור בבדיקת זמינות, מחירים והזמנות. איך אפשר לעזור?".to_string(),
                prior_context.clone(),
            )),
            "list_cabins" => self.handle_list_cabins(prior_context).await,
            "location" => self.handle_location(entities, prior_context).await,
            "cabin_info" => self.handle_cabin_info(entities, prior_context).await,
            "availability" => self.handle_availability(entities, prior_context).await,
            "quote" => self.handle_quote(entities, prior_context).await,
            "hold" => self.handle_hold(entities, prior_context).await,
            "confirm" | "book" | "book_now" => self.handle_book(entities, prior_context).await,
            _ => Ok((
                "לא הבנתי בדיוק את הבקשה. אפשר לשאול על זמינות, מחיר, שריון זמני או הזמנה של צימר."
                    .to_string(),
                prior_context.clone(),
            )),
        }
    }

    async fn handle_list_cabins(&self, prior_context: &TurnContext) -> AppResult<(String, TurnContext)> {
        let cabins = self.all_cabins().await?;
        if cabins.is_empty() {
            return Ok(("אין כרגע צימרים רשומים במערכת.".to_string(), prior_context.clone()));
        }
        let names: Vec<String> = cabins.iter().map(|c| format!("{} ({})", c.name, c.short_code)).collect();
        Ok((format!("הצימרים שלנו: {}.", names.join(", ")), prior_context.clone()))
    }

    async fn resolve_target_cabin(&self, entities: &ExtractedEntities) -> AppResult<Option<Cabin>> {
        match &entities.cabin {
            Some(identifier) => self.resolve_cabin_loose(identifier).await,
            None => Ok(None),
        }
    }

    async fn handle_location(&self, entities: &ExtractedEntities, prior_context: &TurnContext) -> AppResult<(String, TurnContext)> {
        match self.resolve_target_cabin(entities).await? {
            Some(cabin) => {
                let address = [cabin.street.as_deref(), cabin.city.as_deref()]
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>()
                    .join(", ");
                let reply = if address.is_empty() {
                    format!("לא רשומה כתובת עבור {}.", cabin.name)
                } else {
                    format!("{} נמצא ב: {}.", cabin.name, address)
                };
                let mut ctx = prior_context.clone();
                ctx.cabin_id = Some(cabin.short_code);
                Ok((reply, ctx))
            },
            None => Ok(("על איזה צימר מדובר?".to_string(), prior_context.clone())),
        }
    }

    async fn handle_cabin_info(&self, entities: &ExtractedEntities, prior_context: &TurnContext) -> AppResult<(String, TurnContext)> {
        match self.resolve_target_cabin(entities).await? {
            Some(cabin) => {
                let features = if cabin.features.is_empty() {
                    "אין מאפיינים מיוחדים רשומים".to_string()
                } else {
                    cabin.features.join(", ")
                };
                let reply = format!(
                    "{} (קוד {}): עד {} מבוגרים ו-{} ילדים, מחיר בסיס {} לילה. מאפיינים: {}.",
                    cabin.name,
                    cabin.short_code,
                    cabin.max_adults,
                    cabin.max_kids,
                    cabin.base_price_per_night,
                    features
                );
                let mut ctx = prior_context.clone();
                ctx.cabin_id = Some(cabin.short_code);
                Ok((reply, ctx))
            },
            None => Ok(("על איזה צימר תרצו לשמוע?".to_string(), prior_context.clone())),
        }
    }

    async fn handle_availability(&self, entities: &ExtractedEntities, prior_context: &TurnContext) -> AppResult<(String, TurnContext)> {
        let (Some(check_in), Some(check_out)) = (entities.check_in, entities.check_out) else {
            return Ok(("לאילו תאריכים תרצו לבדוק זמינות?".to_string(), prior_context.clone()));
        };

        let cabins = match self.resolve_target_cabin(entities).await? {
            Some(cabin) => vec![cabin],
            None => self.all_cabins().await?,
        };

        let check_in_utc = check_in.and_hms_opt(0, 0, 0).expect("valid time").and_utc();
        let check_out_utc = check_out.and_hms_opt(0, 0, 0).expect("valid time").and_utc();
        let resolver = AvailabilityResolver::new(self.calendar.as_ref());
        let available = resolver
            .resolve(&cabins, check_in_utc, check_out_utc, &AvailabilityQuery::default())
            .await;

        let mut ctx = prior_context.clone();
        ctx.check_in = Some(check_in);
        ctx.check_out = Some(check_out);
        if let Some(first) = available.first() {
            ctx.cabin_id = Some(first.short_code.clone());
        }

        if available.is_empty() {
            return Ok((
                format!("לצערי אין פניות בין {} ל-{}.", check_in, check_out),
                ctx,
            ));
        }
        let names: Vec<String> = available.iter().map(|c| format!("{} ({})", c.name, c.short_code)).collect();
        Ok((
            format!("פנויים בין {} ל-{}: {}.", check_in, check_out, names.join(", ")),
            ctx,
        ))
    }

    async fn handle_quote(&self, entities: &ExtractedEntities, prior_context: &TurnContext) -> AppResult<(String, TurnContext)> {
        let (Some(check_in), Some(check_out)) = (entities.check_in, entities.check_out) else {
            return Ok(("לאילו תאריכים תרצו הצעת מחיר?".to_string(), prior_context.clone()));
        };
        let Some(cabin) = self.resolve_target_cabin(entities).await? else {
            return Ok(("לאיזה צימר תרצו הצעת מחיר?".to_string(), prior_context.clone()));
        };

        let breakdown = self.pricing.calculate_price_breakdown(&cabin, check_in, check_out, &[] as &[Addon], true);

        let mut ctx = prior_context.clone();
        ctx.cabin_id = Some(cabin.short_code.clone());
        ctx.check_in = Some(check_in);
        ctx.check_out = Some(check_out);
        ctx.last_quote = Some(json!({
            "cabin": cabin.short_code,
            "check_in": check_in,
            "check_out": check_out,
            "total": breakdown.total,
        }));

        Ok((
            format!(
                "{} לילות ב{}, מ-{} עד {}: סה\"כ {} ש\"ח.",
                breakdown.nights, cabin.name, check_in, check_out, breakdown.total
            ),
            ctx,
        ))
    }

    async fn handle_hold(&self, entities: &ExtractedEntities, prior_context: &TurnContext) -> AppResult<(String, TurnContext)> {
        let (Some(check_in), Some(check_out)) = (entities.check_in, entities.check_out) else {
            return Ok(("לאילו תאריכים לשריין?".to_string(), prior_context.clone()));
        };
        let Some(cabin) = self.resolve_target_cabin(entities).await? else {
            return Ok(("איזה צימר לשריין?".to_string(), prior_context.clone()));
        };

        let mut hold_manager = self.hold_manager.lock().await;
        let created = hold_manager
            .create_hold(&cabin.short_code, check_in, check_out, None, entities.customer_name.clone())
            .await?;
        drop(hold_manager);

        let mut ctx = prior_context.clone();
        ctx.cabin_id = Some(cabin.short_code.clone());
        ctx.check_in = Some(check_in);
        ctx.check_out = Some(check_out);

        Ok((
            format!(
                "שריינתי את {} עבורכם מ-{} עד {} (מספר שריון {}). השריון בתוקף עד {}.",
                cabin.name, check_in, check_out, created.hold.id, created.hold.expires_at
            ),
            ctx,
        ))
    }

    async fn handle_book(&self, entities: &ExtractedEntities, prior_context: &TurnContext) -> AppResult<(String, TurnContext)> {
        let (Some(check_in), Some(check_out)) = (entities.check_in, entities.check_out) else {
            return Ok(("לאילו תאריכים להזמין?".to_string(), prior_context.clone()));
        };
        let Some(cabin) = self.resolve_target_cabin(entities).await? else {
            return Ok(("איזה צימר להזמין?".to_string(), prior_context.clone()));
        };

        let request = CreateBookingRequest {
            cabin: cabin.short_code.clone(),
            check_in: check_in.to_string(),
            check_out: check_out.to_string(),
            adults: 2,
            kids: 0,
            customer_name: entities.customer_name.clone(),
            customer_email: None,
            customer_phone: None,
            hold_id: None,
            total_price: None,
            notes: Some("הוזמן דרך הצ'אט".to_string()),
            create_payment: true,
        };

        match self.booking.create_booking(request).await {
            Ok(booking) => {
                let mut ctx = prior_context.clone();
                ctx.last_quote = None;
                Ok((
                    format!(
                        "ההזמנה אושרה! {} מ-{} עד {}, סה\"כ {} ש\"ח. מספר הזמנה: {}.",
                        cabin.name, booking.check_in_date, booking.check_out_date, booking.total_price, booking.id
                    ),
                    ctx,
                ))
            },
            Err(AppError::CabinBusy { .. }) | Err(AppError::CabinOnHold { .. }) => Ok((
                format!("לצערי {} כבר תפוס בתאריכים האלה.", cabin.name),
                prior_context.clone(),
            )),
            Err(err) => Err(err),
        }
    }
}
