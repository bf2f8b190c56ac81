use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepName {
    BugAnalysis,
    BugLocalization,
    CodeFixGeneration,
    HumanReview,
    PatchApplication,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    InProgress,
    Completed,
    Failed,
}

/// One attempted stage. Terminal once `status` leaves `InProgress`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    pub step_name: StepName,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bugs_detected: Option<usize>,
}

impl StepRecord {
    pub fn begin(step_name: StepName) -> Self {
        Self {
            step_name,
            start_time: Utc::now(),
            end_time: None,
            status: StepStatus::InProgress,
            result: None,
            error: None,
            bugs_detected: None,
        }
    }

    pub fn complete(&mut self, result: Option<Value>) {
        if self.status != StepStatus::InProgress {
            return;
        }
        self.status = StepStatus::Completed;
        self.result = result;
        self.end_time = Some(Utc::now());
    }

    pub fn fail(&mut self, error: String) {
        if self.status != StepStatus::InProgress {
            return;
        }
        self.status = StepStatus::Failed;
        self.error = Some(error);
        self.end_time = Some(Utc::now());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BugStatus {
    InProgress,
    Completed,
    NoRelevantCodeFound,
    RejectedByHuman,
    Failed,
}

/// Outcome of driving one bug unit through the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BugUnitResult {
    /// 1-based, in detection order.
    pub bug_index: usize,
    pub bug_description: String,
    pub repository_name: Option<String>,
    pub steps: Vec<StepRecord>,
    pub status: BugStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BugUnitResult {
    pub fn new(bug_index: usize, bug_description: &str, repository_name: Option<&str>) -> Self {
        Self {
            bug_index,
            bug_description: bug_description.to_string(),
            repository_name: repository_name.map(str::to_string),
            steps: Vec::new(),
            status: BugStatus::InProgress,
            error: None,
        }
    }

    pub fn step_names(&self) -> Vec<StepName> {
        self.steps.iter().map(|s| s.step_name).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    InProgress,
    Completed,
    Failed,
}

/// Complete account of one debug run, returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowRecord {
    pub workflow_id: String,
    pub session_id: String,
    pub bug_description: String,
    pub repository_name: Option<String>,
    pub auto_edit_mode: bool,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub steps: Vec<StepRecord>,
    pub total_bugs: usize,
    pub bugs_processed: usize,
    pub results: Vec<BugUnitResult>,
    pub tools_used: Vec<String>,
    pub status: WorkflowStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WorkflowRecord {
    pub fn new(
        workflow_id: String,
        session_id: &str,
        bug_description: &str,
        repository_name: Option<&str>,
        auto_edit_mode: bool,
    ) -> Self {
        Self {
            workflow_id,
            session_id: session_id.to_string(),
            bug_description: bug_description.to_string(),
            repository_name: repository_name.map(str::to_string),
            auto_edit_mode,
            start_time: Utc::now(),
            end_time: None,
            steps: Vec::new(),
            total_bugs: 0,
            bugs_processed: 0,
            results: Vec::new(),
            tools_used: Vec::new(),
            status: WorkflowStatus::InProgress,
            error: None,
        }
    }
}
