use crate::capability::gateway::CapabilityGateway;
use crate::capability::CapabilityKind;
use crate::error::Result;
use crate::workflow::types::{BugStatus, BugUnitResult};

/// Drives one bug unit through locate, fix, review and patch.
pub struct BugUnitPipeline<'a> {
    gateway: &'a CapabilityGateway,
    auto_edit_mode: bool,
}

impl<'a> BugUnitPipeline<'a> {
    pub fn new(gateway: &'a CapabilityGateway, auto_edit_mode: bool) -> Self {
        Self {
            gateway,
            auto_edit_mode,
        }
    }

    /// Run the pipeline for one unit.
    ///
    /// Capability failures end the unit with [`BugStatus::Failed`]; they are
    /// never propagated to the caller so sibling units keep running.
    /// Successful capability calls are appended to `tools_used`.
    pub async fn run(
        &self,
        bug_index: usize,
        bug_description: &str,
        repository_name: Option<&str>,
        tools_used: &mut Vec<String>,
    ) -> BugUnitResult {
        let mut unit = BugUnitResult::new(bug_index, bug_description, repository_name);

        match self.drive(&mut unit, tools_used).await {
            Ok(status) => {
                unit.status = status;
                tracing::info!(bug_index, status = ?status, "Bug unit finished");
            }
            Err(e) => {
                tracing::warn!(bug_index, error = %e, "Bug unit failed");
                unit.status = BugStatus::Failed;
                unit.error = Some(e.to_string());
            }
        }

        unit
    }

    async fn drive(
        &self,
        unit: &mut BugUnitResult,
        tools_used: &mut Vec<String>,
    ) -> Result<BugStatus> {
        let localization = self
            .gateway
            .locate(
                &unit.bug_description,
                unit.repository_name.as_deref(),
                &mut unit.steps,
            )
            .await?;
        tools_used.push(CapabilityKind::BugLocator.to_string());

        if localization.total_found() == 0 {
            return Ok(BugStatus::NoRelevantCodeFound);
        }

        let fix = self
            .gateway
            .generate_fix(&localization, &mut unit.steps)
            .await?;
        tools_used.push(CapabilityKind::FixGenerator.to_string());

        if !self.auto_edit_mode {
            let review = self.gateway.request_review(&fix, &mut unit.steps).await?;
            tools_used.push(CapabilityKind::HumanReview.to_string());

            if !review.approved() {
                return Ok(BugStatus::RejectedByHuman);
            }
        }

        self.gateway.apply_patch(&fix, &mut unit.steps).await?;
        tools_used.push(CapabilityKind::PatchApplier.to_string());

        Ok(BugStatus::Completed)
    }
}
