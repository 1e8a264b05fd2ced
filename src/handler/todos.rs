// Todo operations: list, create, update, delete
// Each issues exactly one store call

use hyper::StatusCode;
use serde::Serialize;

use super::error::HandlerError;
use super::router::RequestBody;
use crate::http::GatewayResponse;
use crate::store::TodoStore;
use crate::todo::{
    self, CreateTodo, PublicTodo, TodoKey, TodoPatch, TodoRecord, UpdateTodo, ValidationError,
    PARTITION, SORT_KEY_PREFIX,
};

#[derive(Serialize)]
struct ListResponse {
    items: Vec<PublicTodo>,
}

#[derive(Serialize)]
struct ItemResponse {
    item: PublicTodo,
}

#[derive(Serialize)]
struct DeleteResponse<'a> {
    deleted: bool,
    id: &'a str,
}

pub async fn list(store: &dyn TodoStore) -> Result<GatewayResponse, HandlerError> {
    let records = store.query_prefix(PARTITION, SORT_KEY_PREFIX).await?;
    let items = records.iter().map(TodoRecord::to_public).collect();
    Ok(GatewayResponse::json(StatusCode::OK, &ListResponse { items }))
}

pub async fn create(
    store: &dyn TodoStore,
    body: &RequestBody,
) -> Result<GatewayResponse, HandlerError> {
    let input = CreateTodo::from_body(body)?;
    let record = TodoRecord::new(
        &todo::generate_id(),
        input.title,
        input.done,
        todo::timestamp_now(),
    );

    // Fresh ids are assumed unique, so no existence check here
    store.put(&record).await?;
    Ok(GatewayResponse::json(
        StatusCode::CREATED,
        &ItemResponse {
            item: record.to_public(),
        },
    ))
}

pub async fn update(
    store: &dyn TodoStore,
    id: &str,
    body: &RequestBody,
) -> Result<GatewayResponse, HandlerError> {
    if id.is_empty() {
        return Err(ValidationError::IdRequired.into());
    }
    let input = UpdateTodo::from_body(body)?;
    let patch = TodoPatch {
        title: input.title,
        done: input.done,
        updated_at: todo::timestamp_now(),
    };

    let record = store
        .update_existing(&TodoKey::for_id(id), &patch)
        .await?
        .ok_or(HandlerError::TodoNotFound)?;
    Ok(GatewayResponse::json(
        StatusCode::OK,
        &ItemResponse {
            item: record.to_public(),
        },
    ))
}

pub async fn delete(store: &dyn TodoStore, id: &str) -> Result<GatewayResponse, HandlerError> {
    if id.is_empty() {
        return Err(ValidationError::IdRequired.into());
    }
    if !store.delete_existing(&TodoKey::for_id(id)).await? {
        return Err(HandlerError::TodoNotFound);
    }
    Ok(GatewayResponse::json(
        StatusCode::OK,
        &DeleteResponse { deleted: true, id },
    ))
}
