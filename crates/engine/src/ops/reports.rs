use crate::{
    ResultEngine,
    reports::{ExportBundle, Report, ReportRequest, assemble, export_bundle},
};

use super::Engine;

impl Engine {
    /// Compute one report over a fresh snapshot of the user's records.
    pub async fn report(&self, user_id: &str, request: &ReportRequest) -> ResultEngine<Report> {
        let snapshot = self.snapshot(user_id).await?;
        tracing::debug!(
            user_id,
            report = request.name(),
            budgets = snapshot.budgets.len(),
            expenses = snapshot.expenses.len(),
            "computing report"
        );
        Ok(assemble(&snapshot, request))
    }

    /// Collect the rows printed by the PDF export.
    pub async fn export(&self, user_id: &str) -> ResultEngine<ExportBundle> {
        let snapshot = self.snapshot(user_id).await?;
        tracing::debug!(user_id, "building export bundle");
        Ok(export_bundle(&snapshot))
    }
}
