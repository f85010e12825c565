//! Branch-details refresh job.
//!
//! Extract the branches linked to a place id, fetch fresh place details for
//! the ones whose cache is stale, then persist coordinates and details and
//! report a per-branch status.

use crate::domain::model::{BranchDetails, PlaceLinkedBranch};
use crate::domain::places::PlaceDetails;
use crate::domain::ports::{BranchDetailsStore, Pipeline, PlacesProvider, Storage};
use crate::utils::error::{AppError, Result};
use crate::utils::monitor::PhaseMonitor;
use async_trait::async_trait;
use chrono::{DateTime, Months, Utc};
use serde::Serialize;
use std::sync::Arc;

pub const FINISHED_MESSAGE: &str = "Update process finished.";
pub const NO_BRANCHES_MESSAGE: &str = "No branches with google_place_id found.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RefreshStatus {
    #[serde(rename = "Skipped, recently updated")]
    Skipped,
    #[serde(rename = "Details Updated")]
    DetailsUpdated,
    #[serde(rename = "Coordinates & Details Updated")]
    CoordinatesAndDetailsUpdated,
    #[serde(rename = "Failed to fetch from Google")]
    FetchFailed,
    #[serde(rename = "Failed with exception")]
    Exception,
    #[serde(rename = "Failed to save details")]
    SaveFailed,
}

impl RefreshStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefreshStatus::Skipped => "Skipped, recently updated",
            RefreshStatus::DetailsUpdated => "Details Updated",
            RefreshStatus::CoordinatesAndDetailsUpdated => "Coordinates & Details Updated",
            RefreshStatus::FetchFailed => "Failed to fetch from Google",
            RefreshStatus::Exception => "Failed with exception",
            RefreshStatus::SaveFailed => "Failed to save details",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            RefreshStatus::FetchFailed | RefreshStatus::Exception | RefreshStatus::SaveFailed
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefreshResult {
    pub branch_id: String,
    pub status: RefreshStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RefreshResult {
    fn new(branch_id: &str, status: RefreshStatus, error: Option<String>) -> Self {
        Self {
            branch_id: branch_id.to_string(),
            status,
            error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefreshReport {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<RefreshResult>>,
}

impl RefreshReport {
    pub fn no_branches() -> Self {
        Self {
            message: NO_BRANCHES_MESSAGE.to_string(),
            results: None,
        }
    }

    pub fn finished(results: Vec<RefreshResult>) -> Self {
        Self {
            message: FINISHED_MESSAGE.to_string(),
            results: Some(results),
        }
    }

    pub fn results(&self) -> &[RefreshResult] {
        self.results.as_deref().unwrap_or_default()
    }

    pub fn count(&self, status: RefreshStatus) -> usize {
        self.results().iter().filter(|r| r.status == status).count()
    }

    pub fn failures(&self) -> usize {
        self.results().iter().filter(|r| r.status.is_failure()).count()
    }
}

/// transform 的產出：略過、已取得細節，或已失敗
#[derive(Debug, Clone)]
pub enum RefreshTask {
    Skip { branch_id: String },
    Fetched { branch_id: String, details: PlaceDetails },
    Failed(RefreshResult),
}

pub struct RefreshPipeline {
    store: Arc<dyn BranchDetailsStore>,
    places: Arc<dyn PlacesProvider>,
    max_age_months: u32,
    now: Option<DateTime<Utc>>,
}

impl RefreshPipeline {
    pub fn new(
        store: Arc<dyn BranchDetailsStore>,
        places: Arc<dyn PlacesProvider>,
        max_age_months: u32,
    ) -> Self {
        Self {
            store,
            places,
            max_age_months,
            now: None,
        }
    }

    /// 固定「現在」時間 (測試用)
    pub fn with_clock(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    fn now(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }

    pub fn is_fresh(&self, branch: &PlaceLinkedBranch) -> bool {
        let Some(updated_at) = branch.details_updated_at() else {
            return false;
        };
        match self.now().checked_sub_months(Months::new(self.max_age_months)) {
            Some(cutoff) => updated_at > cutoff,
            None => false,
        }
    }

    async fn fetch(&self, branch: &PlaceLinkedBranch) -> RefreshTask {
        match self.places.place_details(&branch.google_place_id).await {
            Ok(response) => match response.into_details() {
                Ok(details) => RefreshTask::Fetched {
                    branch_id: branch.id.clone(),
                    details,
                },
                Err(status) => {
                    tracing::warn!("⚠️ Places provider returned {} for branch {}", status, branch.id);
                    RefreshTask::Failed(RefreshResult::new(
                        &branch.id,
                        RefreshStatus::FetchFailed,
                        Some(status),
                    ))
                }
            },
            Err(e) => {
                tracing::warn!("⚠️ Place details request failed for branch {}: {}", branch.id, e);
                RefreshTask::Failed(RefreshResult::new(
                    &branch.id,
                    RefreshStatus::Exception,
                    Some(e.to_string()),
                ))
            }
        }
    }

    async fn persist(&self, branch_id: &str, details: PlaceDetails) -> RefreshResult {
        let mut status = RefreshStatus::DetailsUpdated;

        if let Some(geometry) = &details.geometry {
            let location = geometry.location;
            match self
                .store
                .update_branch_coordinates(branch_id, location.lat, location.lng)
                .await
            {
                Ok(()) => status = RefreshStatus::CoordinatesAndDetailsUpdated,
                // 座標寫入失敗不影響細節的儲存
                Err(e) => tracing::error!("❌ Failed to update coords for branch {}: {}", branch_id, e),
            }
        }

        let row = BranchDetails {
            branch_id: Some(branch_id.to_string()),
            rating: details.rating,
            user_ratings_total: details.user_ratings_total,
            phone_number: details.formatted_phone_number,
            price_level: details.price_level,
            opening_hours: details.opening_hours,
            updated_at: Some(self.now()),
        };

        match self.store.upsert_branch_details(&row).await {
            Ok(()) => RefreshResult::new(branch_id, status, None),
            Err(e) => RefreshResult::new(
                branch_id,
                RefreshStatus::SaveFailed,
                Some(e.user_friendly_message()),
            ),
        }
    }
}

#[async_trait]
impl Pipeline for RefreshPipeline {
    type Item = PlaceLinkedBranch;
    type Staged = Vec<RefreshTask>;
    type Output = RefreshReport;

    async fn extract(&self) -> Result<Vec<PlaceLinkedBranch>> {
        self.store.place_linked_branches().await
    }

    async fn transform(&self, branches: Vec<PlaceLinkedBranch>) -> Result<Vec<RefreshTask>> {
        if !branches.is_empty() && !self.places.has_credentials() {
            return Err(AppError::MissingConfigError {
                field: "places.api_key".to_string(),
            });
        }

        let mut tasks = Vec::with_capacity(branches.len());
        for branch in &branches {
            if self.is_fresh(branch) {
                tracing::debug!("Skipping branch {}, details are recent", branch.id);
                tasks.push(RefreshTask::Skip {
                    branch_id: branch.id.clone(),
                });
                continue;
            }
            tasks.push(self.fetch(branch).await);
        }

        Ok(tasks)
    }

    async fn load(&self, tasks: Vec<RefreshTask>) -> Result<RefreshReport> {
        if tasks.is_empty() {
            return Ok(RefreshReport::no_branches());
        }

        let mut results = Vec::with_capacity(tasks.len());
        for task in tasks {
            let result = match task {
                RefreshTask::Skip { branch_id } => {
                    RefreshResult::new(&branch_id, RefreshStatus::Skipped, None)
                }
                RefreshTask::Fetched { branch_id, details } => {
                    self.persist(&branch_id, details).await
                }
                RefreshTask::Failed(result) => result,
            };
            results.push(result);
        }

        Ok(RefreshReport::finished(results))
    }
}

pub struct RefreshEngine<P: Pipeline> {
    pipeline: P,
    monitor: PhaseMonitor,
}

impl<P: Pipeline> RefreshEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: PhaseMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<P::Output> {
        tracing::info!("🚀 Starting branch details refresh...");

        let items = self.pipeline.extract().await?;
        tracing::info!("📥 Extracted {} branches with a place id", items.len());
        self.monitor.mark("Extract");

        let staged = self.pipeline.transform(items).await?;
        self.monitor.mark("Transform");

        let output = self.pipeline.load(staged).await?;
        tracing::info!("✅ Refresh finished");
        self.monitor.mark("Load");
        self.monitor.log_summary();

        Ok(output)
    }
}

#[derive(Serialize)]
struct CsvRow<'a> {
    branch_id: &'a str,
    status: &'a str,
    error: &'a str,
}

pub fn report_to_csv(report: &RefreshReport) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for result in report.results() {
        writer.serialize(CsvRow {
            branch_id: &result.branch_id,
            status: result.status.as_str(),
            error: result.error.as_deref().unwrap_or(""),
        })?;
    }
    writer
        .into_inner()
        .map_err(|e| AppError::ProcessingError {
            message: format!("CSV flush failed: {}", e),
        })
}

/// 依設定的格式寫出報表，回傳寫入的檔名
pub async fn write_report<S: Storage>(
    storage: &S,
    report: &RefreshReport,
    formats: &[String],
    run_at: DateTime<Utc>,
) -> Result<Vec<String>> {
    let stem = format!("branch_details_{}", run_at.format("%Y%m%dT%H%M%SZ"));
    let mut written = Vec::new();

    for format in formats {
        let (name, data) = match format.as_str() {
            "json" => (format!("{}.json", stem), serde_json::to_vec_pretty(report)?),
            "csv" => (format!("{}.csv", stem), report_to_csv(report)?),
            other => {
                return Err(AppError::InvalidConfigValueError {
                    field: "refresh.output_formats".to_string(),
                    value: other.to_string(),
                    reason: "Unsupported format".to_string(),
                })
            }
        };
        storage.write_file(&name, &data).await?;
        tracing::info!("💾 Report written: {}", name);
        written.push(name);
    }

    Ok(written)
}
