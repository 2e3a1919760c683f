//! Admin surface: holds visibility, audit trail, and FAQ/business-fact
//! curation. Every handler here sits behind [`crate::middleware::admin_middleware`]
//! (wired in [`crate::routes::create_router`]), which checks the shared
//! `X-Admin-Api-Key` secret rather than a per-user role the way the
//! teacher's JWT-gated admin routes did — see the admin authentication
//! Open Question in `DESIGN.md`.

use axum::extract::{Path, Query, State};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult, OptionExt};
use crate::models::audit::{AuditAction, AuditEntry, AuditListFilter};
use crate::models::faq::{
    ApproveFaqRequest, BusinessFact, Faq, FaqResponse, UpdateFaqRequest, UpsertBusinessFactRequest,
};
use crate::models::hold::HoldResponse;
use crate::services::audit::AuditService;
use crate::state::AppState;

const AUDIT_LIST_LIMIT: i64 = 200;

async fn list_active_holds(State(state): State<AppState>) -> AppResult<Json<Vec<HoldResponse>>> {
    let hold_manager = state.hold_manager();
    let mut hold_manager = hold_manager.lock().await;
    let holds = hold_manager.list_active_holds().await;
    Ok(Json(holds.into_iter().map(Into::into).collect()))
}

#[derive(Debug, Deserialize)]
struct AuditQuery {
    table_name: Option<String>,
    record_id: Option<String>,
    action: Option<AuditAction>,
}

async fn list_audit_entries(
    State(state): State<AppState>,
    Query(query): Query<AuditQuery>,
) -> AppResult<Json<Vec<AuditEntry>>> {
    let filter = AuditListFilter {
        table_name: query.table_name,
        record_id: query.record_id,
        action: query.action,
    };
    let audit = AuditService::new(state.db());
    let entries = audit.list_filtered(&filter, AUDIT_LIST_LIMIT).await?;
    Ok(Json(entries))
}

async fn pending_faqs(State(state): State<AppState>) -> AppResult<Json<Vec<FaqResponse>>> {
    let faqs = sqlx::query_as::<_, Faq>(
        "SELECT * FROM faqs WHERE approved = false ORDER BY created_at ASC",
    )
    .fetch_all(state.db())
    .await?;
    Ok(Json(faqs.into_iter().map(Into::into).collect()))
}

async fn all_faqs(State(state): State<AppState>) -> AppResult<Json<Vec<FaqResponse>>> {
    let faqs = sqlx::query_as::<_, Faq>("SELECT * FROM faqs ORDER BY created_at DESC")
        .fetch_all(state.db())
        .await?;
    Ok(Json(faqs.into_iter().map(Into::into).collect()))
}

async fn approve_faq(
    State(state): State<AppState>,
    Json(request): Json<ApproveFaqRequest>,
) -> AppResult<Json<FaqResponse>> {
    let existing = sqlx::query_as::<_, Faq>("SELECT * FROM faqs WHERE id = $1")
        .bind(request.id)
        .fetch_optional(state.db())
        .await?
        .ok_or_not_found("faq")?;

    let question = request.question.unwrap_or(existing.question.clone());
    let answer = request
        .answer
        .unwrap_or_else(|| existing.suggested_answer.clone().unwrap_or_else(|| existing.answer.clone()));

    let faq = if request.approve {
        sqlx::query_as::<_, Faq>(
            r#"
            UPDATE faqs
            SET question = $1, answer = $2, approved = true, approved_by = $3, approved_at = now()
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(&question)
        .bind(&answer)
        .bind(&request.approved_by)
        .bind(request.id)
        .fetch_one(state.db())
        .await?
    } else {
        sqlx::query_as::<_, Faq>("DELETE FROM faqs WHERE id = $1 RETURNING *")
            .bind(request.id)
            .fetch_one(state.db())
            .await?
    };

    let audit = AuditService::new(state.db());
    if let Err(err) = audit
        .record_update(
            "faqs",
            &faq.id.to_string(),
            serde_json::to_value(&existing).unwrap_or(serde_json::Value::Null),
            serde_json::to_value(&faq).unwrap_or(serde_json::Value::Null),
        )
        .await
    {
        tracing::error!(error = %err, faq_id = %faq.id, "failed to write audit entry for faq approval");
    }

    Ok(Json(faq.into()))
}

async fn update_faq(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateFaqRequest>,
) -> AppResult<Json<FaqResponse>> {
    let existing = sqlx::query_as::<_, Faq>("SELECT * FROM faqs WHERE id = $1")
        .bind(id)
        .fetch_optional(state.db())
        .await?
        .ok_or_not_found("faq")?;

    let question = request.question.unwrap_or_else(|| existing.question.clone());
    let answer = request.answer.unwrap_or_else(|| existing.answer.clone());
    let approved = request.approved.unwrap_or(existing.approved);

    let faq = sqlx::query_as::<_, Faq>(
        r#"
        UPDATE faqs SET question = $1, answer = $2, approved = $3, updated_at = now()
        WHERE id = $4
        RETURNING *
        "#,
    )
    .bind(&question)
    .bind(&answer)
    .bind(approved)
    .bind(id)
    .fetch_one(state.db())
    .await?;

    let audit = AuditService::new(state.db());
    if let Err(err) = audit
        .record_update(
            "faqs",
            &id.to_string(),
            serde_json::to_value(&existing).unwrap_or(serde_json::Value::Null),
            serde_json::to_value(&faq).unwrap_or(serde_json::Value::Null),
        )
        .await
    {
        tracing::error!(error = %err, faq_id = %id, "failed to write audit entry for faq update");
    }

    Ok(Json(faq.into()))
}

async fn delete_faq(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<Json<serde_json::Value>> {
    let existing = sqlx::query_as::<_, Faq>("SELECT * FROM faqs WHERE id = $1")
        .bind(id)
        .fetch_optional(state.db())
        .await?
        .ok_or_not_found("faq")?;

    sqlx::query("DELETE FROM faqs WHERE id = $1").bind(id).execute(state.db()).await?;

    let audit = AuditService::new(state.db());
    if let Err(err) = audit
        .record(
            "faqs",
            &id.to_string(),
            AuditAction::Delete,
            Some(serde_json::to_value(&existing).unwrap_or(serde_json::Value::Null)),
            None,
            None,
        )
        .await
    {
        tracing::error!(error = %err, faq_id = %id, "failed to write audit entry for faq deletion");
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}

#[derive(Debug, Deserialize)]
struct BusinessFactQuery {
    category: Option<String>,
}

async fn list_business_facts(
    State(state): State<AppState>,
    Query(query): Query<BusinessFactQuery>,
) -> AppResult<Json<Vec<BusinessFact>>> {
    let facts = match query.category {
        Some(category) => {
            sqlx::query_as::<_, BusinessFact>(
                "SELECT * FROM business_facts WHERE category = $1 AND is_active = true ORDER BY fact_key",
            )
            .bind(category)
            .fetch_all(state.db())
            .await?
        },
        None => {
            sqlx::query_as::<_, BusinessFact>(
                "SELECT * FROM business_facts WHERE is_active = true ORDER BY category, fact_key",
            )
            .fetch_all(state.db())
            .await?
        },
    };
    Ok(Json(facts))
}

async fn upsert_business_fact(
    State(state): State<AppState>,
    Json(request): Json<UpsertBusinessFactRequest>,
) -> AppResult<Json<BusinessFact>> {
    let fact = sqlx::query_as::<_, BusinessFact>(
        r#"
        INSERT INTO business_facts (fact_key, fact_value, category, description, is_active)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (fact_key) DO UPDATE
        SET fact_value = EXCLUDED.fact_value,
            category = EXCLUDED.category,
            description = EXCLUDED.description,
            is_active = EXCLUDED.is_active,
            updated_at = now()
        RETURNING *
        "#,
    )
    .bind(&request.fact_key)
    .bind(&request.fact_value)
    .bind(&request.category)
    .bind(&request.description)
    .bind(request.is_active)
    .fetch_one(state.db())
    .await?;

    let audit = AuditService::new(state.db());
    if let Err(err) = audit
        .record_insert(
            "business_facts",
            &fact.fact_key,
            serde_json::to_value(&fact).unwrap_or(serde_json::Value::Null),
        )
        .await
    {
        tracing::error!(error = %err, fact_key = %fact.fact_key, "failed to write audit entry for business fact upsert");
    }

    Ok(Json(fact))
}

async fn deactivate_business_fact(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let fact = sqlx::query_as::<_, BusinessFact>(
        "UPDATE business_facts SET is_active = false, updated_at = now() WHERE fact_key = $1 RETURNING *",
    )
    .bind(&key)
    .fetch_optional(state.db())
    .await?
    .ok_or(AppError::NotFound(format!("business fact {key}")))?;

    let audit = AuditService::new(state.db());
    if let Err(err) = audit
        .record(
            "business_facts",
            &fact.fact_key,
            AuditAction::Update,
            None,
            Some(serde_json::to_value(&fact).unwrap_or(serde_json::Value::Null)),
            None,
        )
        .await
    {
        tracing::error!(error = %err, fact_key = %key, "failed to write audit entry for business fact deactivation");
    }

    Ok(Json(serde_json::json!({ "deactivated": true })))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/holds", get(list_active_holds))
        .route("/admin/audit", get(list_audit_entries))
        .route("/admin/faq/pending", get(pending_faqs))
        .route("/admin/faq/all", get(all_faqs))
        .route("/admin/faq/approve", post(approve_faq))
        .route("/admin/faq/:id", put(update_faq).delete(delete_faq))
        .route("/admin/business-facts", get(list_business_facts).post(upsert_business_fact))
        .route("/admin/business-facts/:key", delete(deactivate_business_fact))
}
