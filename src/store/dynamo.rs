//! DynamoDB store backend
//!
//! Items live in a single table with partition key `pk` and sort key `sk`.
//! Update and delete carry `attribute_exists(pk)` so they never touch a
//! missing item; a failed condition is reported as "not found", not as an error.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client;
use std::collections::HashMap;

use super::{StoreError, TodoStore};
use crate::config::StoreConfig;
use crate::todo::{TodoKey, TodoPatch, TodoRecord};

const ATTR_PK: &str = "pk";
const ATTR_SK: &str = "sk";
const ATTR_TITLE: &str = "title";
const ATTR_DONE: &str = "done";
const ATTR_CREATED_AT: &str = "createdAt";
const ATTR_UPDATED_AT: &str = "updatedAt";

const ITEM_EXISTS: &str = "attribute_exists(pk)";

type Item = HashMap<String, AttributeValue>;

/// DynamoDB-backed todo store
#[derive(Clone)]
pub struct DynamoTodoStore {
    client: Client,
    table_name: String,
}

impl std::fmt::Debug for DynamoTodoStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamoTodoStore")
            .field("table_name", &self.table_name)
            .finish_non_exhaustive()
    }
}

impl DynamoTodoStore {
    /// Build a client from the default AWS provider chain plus the
    /// configured region/endpoint overrides
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest()).load().await;
        let mut builder = aws_sdk_dynamodb::config::Builder::from(&sdk_config);

        if let Some(region) = &config.region {
            builder = builder.region(aws_sdk_dynamodb::config::Region::new(region.clone()));
        }
        // e.g. LocalStack or dynamodb-local
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        Ok(Self::from_client(
            Client::from_conf(builder.build()),
            config.table_name.clone(),
        ))
    }

    pub fn from_client(client: Client, table_name: String) -> Self {
        Self { client, table_name }
    }
}

#[async_trait]
impl TodoStore for DynamoTodoStore {
    async fn query_prefix(
        &self,
        partition: &str,
        prefix: &str,
    ) -> Result<Vec<TodoRecord>, StoreError> {
        let mut records = Vec::new();
        let mut last_evaluated_key = None;

        loop {
            let response = self
                .client
                .query()
                .table_name(&self.table_name)
                .key_condition_expression("#pk = :pk AND begins_with(#sk, :prefix)")
                .expression_attribute_names("#pk", ATTR_PK)
                .expression_attribute_names("#sk", ATTR_SK)
                .expression_attribute_values(":pk", AttributeValue::S(partition.to_string()))
                .expression_attribute_values(":prefix", AttributeValue::S(prefix.to_string()))
                .set_exclusive_start_key(last_evaluated_key.take())
                .send()
                .await
                .map_err(|e| StoreError::backend("Query", DisplayErrorContext(&e).to_string()))?;

            for item in response.items() {
                records.push(record_from_item(item)?);
            }

            match response.last_evaluated_key() {
                Some(key) if !key.is_empty() => last_evaluated_key = Some(key.clone()),
                _ => break,
            }
        }

        Ok(records)
    }

    async fn put(&self, record: &TodoRecord) -> Result<(), StoreError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item_from_record(record)))
            .send()
            .await
            .map_err(|e| StoreError::backend("PutItem", DisplayErrorContext(&e).to_string()))?;
        Ok(())
    }

    async fn update_existing(
        &self,
        key: &TodoKey,
        patch: &TodoPatch,
    ) -> Result<Option<TodoRecord>, StoreError> {
        let mut assignments = Vec::with_capacity(3);
        let mut request = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key(ATTR_PK, AttributeValue::S(key.partition.clone()))
            .key(ATTR_SK, AttributeValue::S(key.sort_key.clone()));

        if let Some(title) = &patch.title {
            assignments.push("#title = :title");
            request = request
                .expression_attribute_names("#title", ATTR_TITLE)
                .expression_attribute_values(":title", AttributeValue::S(title.clone()));
        }
        if let Some(done) = patch.done {
            assignments.push("#done = :done");
            request = request
                .expression_attribute_names("#done", ATTR_DONE)
                .expression_attribute_values(":done", AttributeValue::Bool(done));
        }
        assignments.push("#updatedAt = :updatedAt");

        let result = request
            .update_expression(format!("SET {}", assignments.join(", ")))
            .expression_attribute_names("#updatedAt", ATTR_UPDATED_AT)
            .expression_attribute_values(
                ":updatedAt",
                AttributeValue::S(patch.updated_at.clone()),
            )
            .condition_expression(ITEM_EXISTS)
            .return_values(ReturnValue::AllNew)
            .send()
            .await;

        match result {
            Ok(output) => output.attributes().map(record_from_item).transpose(),
            Err(e)
                if e.as_service_error()
                    .is_some_and(|se| se.is_conditional_check_failed_exception()) =>
            {
                Ok(None)
            }
            Err(e) => Err(StoreError::backend(
                "UpdateItem",
                DisplayErrorContext(&e).to_string(),
            )),
        }
    }

    async fn delete_existing(&self, key: &TodoKey) -> Result<bool, StoreError> {
        let result = self
            .client
            .delete_item()
            .table_name(&self.table_name)
            .key(ATTR_PK, AttributeValue::S(key.partition.clone()))
            .key(ATTR_SK, AttributeValue::S(key.sort_key.clone()))
            .condition_expression(ITEM_EXISTS)
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(e)
                if e.as_service_error()
                    .is_some_and(|se| se.is_conditional_check_failed_exception()) =>
            {
                Ok(false)
            }
            Err(e) => Err(StoreError::backend(
                "DeleteItem",
                DisplayErrorContext(&e).to_string(),
            )),
        }
    }
}

fn item_from_record(record: &TodoRecord) -> Item {
    HashMap::from([
        (ATTR_PK.to_string(), AttributeValue::S(record.partition.clone())),
        (ATTR_SK.to_string(), AttributeValue::S(record.sort_key.clone())),
        (ATTR_TITLE.to_string(), AttributeValue::S(record.title.clone())),
        (ATTR_DONE.to_string(), AttributeValue::Bool(record.done)),
        (
            ATTR_CREATED_AT.to_string(),
            AttributeValue::S(record.created_at.clone()),
        ),
        (
            ATTR_UPDATED_AT.to_string(),
            AttributeValue::S(record.updated_at.clone()),
        ),
    ])
}

/// Read a stored item. Keys are mandatory; a missing `done` reads as false.
fn record_from_item(item: &Item) -> Result<TodoRecord, StoreError> {
    let string_attr = |name: &str| item.get(name).and_then(|v| v.as_s().ok()).cloned();
    let required = |name: &'static str| {
        string_attr(name).ok_or_else(|| StoreError::MalformedItem(format!("missing {name}")))
    };

    Ok(TodoRecord {
        partition: required(ATTR_PK)?,
        sort_key: required(ATTR_SK)?,
        title: string_attr(ATTR_TITLE).unwrap_or_default(),
        done: item
            .get(ATTR_DONE)
            .and_then(|v| v.as_bool().ok())
            .copied()
            .unwrap_or(false),
        created_at: string_attr(ATTR_CREATED_AT).unwrap_or_default(),
        updated_at: string_attr(ATTR_UPDATED_AT).unwrap_or_default(),
    })
}
