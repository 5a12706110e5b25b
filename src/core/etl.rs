use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("🚀 Starting clause extraction");

        // Extract
        tracing::info!("📄 Extracting document text...");
        let document = self.pipeline.extract().await?;
        tracing::info!(
            "Extracted {} characters from {} ({})",
            document.text.len(),
            document.source,
            document.format
        );
        self.monitor.log_stats("Extract");

        // Transform
        tracing::info!("🔄 Filtering and classifying clauses...");
        let result = self.pipeline.transform(document).await?;
        tracing::info!(
            "Kept {} clauses out of {} candidates",
            result.clauses.len(),
            result.stats.candidates
        );
        self.monitor.log_stats("Transform");

        // Load
        tracing::info!("💾 Writing report...");
        let output_path = self.pipeline.load(result).await?;
        tracing::info!("Output saved to: {}", output_path);
        self.monitor.log_stats("Load");

        self.monitor.log_final_stats();
        Ok(output_path)
    }
}
