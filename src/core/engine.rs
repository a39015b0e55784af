use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct CollectorEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> CollectorEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(false),
        }
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting ego-graph collection...");

        tracing::info!("Extracting friend data...");
        self.monitor.log_stats("Extract");
        let snapshot = self.pipeline.extract().await?;
        tracing::info!(
            "Extracted {} nodes ({} expanded, {} dead users)",
            snapshot.adjacency.len(),
            snapshot.hits,
            snapshot.dead_users
        );

        tracing::info!("Assembling graph artifacts...");
        self.monitor.log_stats("Transform");
        let artifacts = self.pipeline.transform(snapshot).await?;
        tracing::info!(
            "Graph has {} nodes and {} edges",
            artifacts.stats.nodes,
            artifacts.stats.edges
        );

        tracing::info!("Writing output files...");
        self.monitor.log_stats("Load");
        let output_path = self.pipeline.load(artifacts).await?;
        tracing::info!("Output saved to: {}", output_path);

        self.monitor.log_final_stats();
        Ok(output_path)
    }
}
