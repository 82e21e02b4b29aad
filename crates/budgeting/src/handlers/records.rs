//! CRUD routes shared by every stored entity.
//!
//! Each entity gets the same five handlers, monomorphized per record type:
//! `POST /{collection}`, `GET /{collection}`, `GET /{collection}/{id}`,
//! `PATCH /{collection}/{id}` and `DELETE /{collection}/{id}`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use budgeting_core::finance::{
    Account, Budget, Category, Goal, Notification, Record, Transaction, UpdateRequest,
};
use budgeting_core::storage::UpdateOutcome;

use crate::{
    handlers::error::AppError,
    services::{EntityService, Services},
    state::AppState,
};

/// A record type reachable over HTTP.
pub trait RecordRoute: Record {
    fn service(services: &Services) -> &EntityService<Self>;
}

macro_rules! impl_record_route {
    ($record:ty, $field:ident) => {
        impl RecordRoute for $record {
            fn service(services: &Services) -> &EntityService<Self> {
                &services.$field
            }
        }
    };
}

impl_record_route!(Account, accounts);
impl_record_route!(Budget, budgets);
impl_record_route!(Category, categories);
impl_record_route!(Goal, goals);
impl_record_route!(Notification, notifications);
impl_record_route!(Transaction, transactions);

/// Create a record (POST /api/{collection}).
pub async fn create_record<T: RecordRoute>(
    State(state): State<AppState>,
    Json(draft): Json<T::Draft>,
) -> Result<impl IntoResponse, AppError> {
    let record = T::service(&state.services).create(draft).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// List active records matching the query string (GET /api/{collection}).
pub async fn list_records<T: RecordRoute>(
    State(state): State<AppState>,
    Query(query): Query<T::Query>,
) -> Result<Json<Vec<T>>, AppError> {
    let records = T::service(&state.services).list(&query).await?;
    Ok(Json(records))
}

/// Get a single record by ID (GET /api/{collection}/{id}).
pub async fn get_record<T: RecordRoute>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let response = match T::service(&state.services).get(&id).await? {
        Some(record) => Json(record).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    };
    Ok(response)
}

/// Partially update a record (PATCH /api/{collection}/{id}).
///
/// Returns the updated record, 404 when no active record matches, or 204 when
/// the body carries nothing to change.
pub async fn update_record<T: RecordRoute>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<T::Patch>,
) -> Result<Response, AppError> {
    let outcome = T::service(&state.services)
        .update(UpdateRequest::new(id, patch))
        .await?;
    Ok(outcome_response(outcome))
}

/// Soft-delete a record (DELETE /api/{collection}/{id}).
pub async fn delete_record<T: RecordRoute>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    T::service(&state.services).delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) fn outcome_response<T: Record>(outcome: UpdateOutcome<T>) -> Response {
    match outcome {
        UpdateOutcome::Updated(record) => Json(record).into_response(),
        UpdateOutcome::NotFound => StatusCode::NOT_FOUND.into_response(),
        UpdateOutcome::NoChanges => StatusCode::NO_CONTENT.into_response(),
    }
}

/// Collection and item routes for one record type.
pub fn routes<T: RecordRoute>() -> Router<AppState> {
    Router::new()
        .route(
            &format!("/{}", T::COLLECTION),
            get(list_records::<T>).post(create_record::<T>),
        )
        .route(
            &format!("/{}/{{id}}", T::COLLECTION),
            get(get_record::<T>)
                .patch(update_record::<T>)
                .delete(delete_record::<T>),
        )
}

/// Collection routes only (create and list).
pub fn collection_routes<T: RecordRoute>() -> Router<AppState> {
    Router::new().route(
        &format!("/{}", T::COLLECTION),
        get(list_records::<T>).post(create_record::<T>),
    )
}
