pub mod dto;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::config::BackendConfig;
use crate::error::AppError;
use crate::models::Course;

/// Where course snapshots come from.
#[async_trait]
pub trait CourseSource: Send + Sync {
    async fn fetch_courses(&self) -> Result<Vec<Course>, AppError>;

    /// False for sources that have nothing to sync from.
    fn is_configured(&self) -> bool {
        true
    }
}

pub struct HttpCourseSource {
    client: Client,
    config: BackendConfig,
}

impl HttpCourseSource {
    pub fn new(config: BackendConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }

    async fn fetch_page<T: DeserializeOwned>(
        &self,
        resource: &str,
        page: u32,
    ) -> Result<dto::Envelope<Vec<T>>, AppError> {
        let url = format!("{}/{}", self.config.base_url, resource);

        let mut request = self
            .client
            .get(&url)
            .query(&[("pageNumber", page), ("pageSize", self.config.page_size)]);
        if let Some(token) = &self.config.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Remote(format!("{} returned {}: {}", resource, status, body)));
        }

        let body_text = response.text().await?;
        let envelope: dto::Envelope<Vec<T>> = serde_json::from_str(&body_text).map_err(|e| {
            tracing::error!("Failed to parse {} page {}: {}", resource, page, e);
            AppError::Remote(format!("Failed to parse {} response: {}", resource, e))
        })?;

        if !envelope.succeeded {
            return Err(AppError::Remote(format!(
                "{} request failed: {}",
                resource,
                envelope.message.as_deref().unwrap_or("no message")
            )));
        }
        Ok(envelope)
    }

    /// Walks `pageNumber` from 1 until `totalPages` is reached.
    async fn fetch_all<T: DeserializeOwned>(&self, resource: &str) -> Result<Vec<T>, AppError> {
        let mut items = Vec::new();
        let mut page = 1;
        loop {
            let envelope = self.fetch_page::<T>(resource, page).await?;
            let total_pages = envelope.total_pages.unwrap_or(1);
            let batch = envelope.data.unwrap_or_default();
            let empty = batch.is_empty();
            items.extend(batch);
            debug!("{} page {}/{}: {} items", resource, page, total_pages, items.len());

            if empty || page >= total_pages {
                break;
            }
            page += 1;
        }
        Ok(items)
    }
}

#[async_trait]
impl CourseSource for HttpCourseSource {
    async fn fetch_courses(&self) -> Result<Vec<Course>, AppError> {
        let courses = self.fetch_all::<dto::CourseDto>("Courses").await?;
        let schedules = self.fetch_all::<dto::ScheduleDto>("Schedules").await?;
        let assembly = dto::assemble(courses, schedules);

        info!(
            "Fetched {} courses from backend ({} invalid schedules, {} orphaned)",
            assembly.courses.len(),
            assembly.skipped_schedules,
            assembly.orphan_schedules
        );
        Ok(assembly.courses)
    }
}

pub struct NoopCourseSource;

#[async_trait]
impl CourseSource for NoopCourseSource {
    async fn fetch_courses(&self) -> Result<Vec<Course>, AppError> {
        Ok(vec![])
    }

    fn is_configured(&self) -> bool {
        false
    }
}
