//! services/adm/src/adapters/object_store.rs
//!
//! This module contains the object storage adapter. It implements the
//! `ObjectStore` port from the `core` crate on top of any S3-compatible bucket
//! (AWS S3, or Google Cloud Storage in interoperability mode).

use async_stream::try_stream;
use async_trait::async_trait;
use audio_debug_core::domain::StoredObject;
use audio_debug_core::ports::{ObjectStore, ObjectStream, PortError, PortResult};
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::timeout::TimeoutConfig;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client as S3Client;
use futures::Stream;
use std::time::Duration;
use tracing::{debug, error};

use crate::config::StorageConfig;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `ObjectStore` port using the S3 API.
#[derive(Clone)]
pub struct S3ObjectStoreAdapter {
    client: S3Client,
    bucket: String,
}

impl S3ObjectStoreAdapter {
    /// Creates a new `S3ObjectStoreAdapter` for `bucket`.
    pub fn new(client: S3Client, bucket: String) -> Self {
        Self { client, bucket }
    }

    /// Builds the S3 client from configuration. Every operation is bounded by `timeout`.
    pub async fn from_config(config: &StorageConfig, timeout: Duration) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .timeout_config(TimeoutConfig::builder().operation_timeout(timeout).build());

        if let (Some(key_id), Some(secret)) = (&config.access_key_id, &config.secret_access_key) {
            loader = loader.credentials_provider(Credentials::new(
                key_id,
                secret,
                None,
                None,
                "environment",
            ));
        }

        let sdk_config = loader.load().await;
        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self::new(S3Client::from_conf(builder.build()), config.bucket.clone())
    }
}

/// Pages through `ListObjectsV2` and fetches each object's user metadata with `HeadObject`,
/// since S3 listings do not include it.
fn object_stream(
    client: S3Client,
    bucket: String,
    prefix: String,
) -> impl Stream<Item = PortResult<StoredObject>> + Send + 'static {
    try_stream! {
        let mut pages = client
            .list_objects_v2()
            .bucket(&bucket)
            .prefix(&prefix)
            .into_paginator()
            .send();

        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| {
                error!(
                    bucket = %bucket,
                    prefix = %prefix,
                    "Failed to list objects: {}",
                    DisplayErrorContext(&e)
                );
                PortError::Unexpected(format!("List failed for bucket '{}': {}", bucket, e))
            })?;

            for object in page.contents() {
                if let Some(key) = object.key() {
                    let head = client
                        .head_object()
                        .bucket(&bucket)
                        .key(key)
                        .send()
                        .await
                        .map_err(|e| {
                            error!(
                                key = %key,
                                "Failed to read object metadata: {}",
                                DisplayErrorContext(&e)
                            );
                            PortError::Unexpected(format!(
                                "Metadata lookup failed for '{}': {}",
                                key, e
                            ))
                        })?;

                    yield StoredObject {
                        name: key.to_string(),
                        metadata: head.metadata().cloned().unwrap_or_default(),
                    };
                }
            }
        }
    }
}

//=========================================================================================
// `ObjectStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl ObjectStore for S3ObjectStoreAdapter {
    async fn list(&self, prefix: &str) -> PortResult<ObjectStream> {
        debug!(bucket = %self.bucket, prefix = %prefix, "Listing objects");
        Ok(Box::pin(object_stream(
            self.client.clone(),
            self.bucket.clone(),
            prefix.to_string(),
        )))
    }

    async fn signed_url(&self, name: &str, ttl: Duration) -> PortResult<String> {
        let presigning = PresigningConfig::expires_in(ttl)
            .map_err(|e| PortError::Unexpected(format!("Invalid URL lifetime: {}", e)))?;

        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(name)
            .presigned(presigning)
            .await
            .map_err(|e| PortError::Unexpected(format!("Signing failed for '{}': {}", name, e)))?;

        Ok(request.uri().to_string())
    }
}
