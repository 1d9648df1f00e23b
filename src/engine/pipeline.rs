//! Sequential execution of one file's pipeline inside a scoped work directory

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::errors::DomainError;
use crate::domain::model::Stage;
use crate::planner::PipelinePlan;
use crate::ports::EncoderGateway;

/// Runs plan steps in order, stopping at the first failure
#[derive(Clone)]
pub struct PipelineExecutor {
    gateway: Arc<dyn EncoderGateway>,
}

impl PipelineExecutor {
    pub fn new(gateway: Arc<dyn EncoderGateway>) -> Self {
        Self { gateway }
    }

    /// Create a temporary work directory, build the plan inside it and run
    /// it. The directory and every intermediate are removed on return,
    /// whether the run succeeded or not.
    pub async fn run_scoped<B>(&self, build: B) -> Result<PipelinePlan, DomainError>
    where
        B: FnOnce(&Path) -> Result<PipelinePlan, DomainError>,
    {
        let workdir = tempfile::Builder::new().prefix("reelcut-").tempdir()?;
        let plan = build(workdir.path())?;
        self.execute(&plan).await?;
        Ok(plan)
    }

    pub async fn execute(&self, plan: &PipelinePlan) -> Result<(), DomainError> {
        info!(strategy = ?plan.strategy, steps = plan.steps.len(), "Running pipeline");

        for (index, step) in plan.steps.iter().enumerate() {
            if step.stage == Stage::Concat {
                if let Some(manifest) = &plan.manifest {
                    tokio::fs::write(&manifest.path, manifest.render())
                        .await
                        .map_err(|e| DomainError::from(e).at_stage(Stage::Concat))?;
                }
            }

            debug!(stage = %step.stage, step = index + 1, "Pipeline step");
            self.gateway
                .encode(&step.request)
                .await
                .map_err(|e| e.at_stage(step.stage))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::domain::model::{DitherMethod, KeepSegment, MediaInfo, Resolution, TimeInterval};
    use crate::planner::{LoopSettings, OutputSpec, PipelineBuilder};
    use crate::ports::EncodeRequest;

    /// Records requests, checks the manifest exists at concat time and
    /// fails the stage named in `fail_on`
    struct RecordingGateway {
        calls: Mutex<Vec<(PathBuf, bool)>>,
        fail_on: Option<&'static str>,
    }

    #[async_trait]
    impl EncoderGateway for RecordingGateway {
        async fn probe(&self, _path: &Path) -> Result<MediaInfo, DomainError> {
            Err(DomainError::ProbeFail("not used".into()))
        }

        async fn encode(&self, request: &EncodeRequest) -> Result<(), DomainError> {
            let input_exists = request.inputs[0].path.exists();
            self.calls
                .lock()
                .unwrap()
                .push((request.output.clone(), input_exists));
            let name = request.output.file_name().unwrap().to_string_lossy().to_string();
            if self.fail_on.is_some_and(|f| name.contains(f)) {
                return Err(DomainError::tool("Invalid data found when processing input"));
            }
            std::fs::write(&request.output, b"data")?;
            Ok(())
        }

        async fn hardware_encoder_available(&self) -> bool {
            false
        }

        fn tool_path(&self) -> String {
            "mock".into()
        }
    }

    fn gateway(fail_on: Option<&'static str>) -> Arc<RecordingGateway> {
        Arc::new(RecordingGateway {
            calls: Mutex::new(Vec::new()),
            fail_on,
        })
    }

    fn keep() -> Vec<KeepSegment> {
        vec![
            TimeInterval::new(0.0, 5.0).unwrap(),
            TimeInterval::new(8.0, 15.0).unwrap(),
        ]
    }

    fn spec() -> OutputSpec {
        OutputSpec::AnimatedLoop(LoopSettings {
            resolution: Resolution::Original,
            frame_rate: 15.0,
            speed_multiplier: 1.0,
            loop_count: 0,
            dither: DitherMethod::Bayer,
            color_count: 128,
        })
    }

    #[tokio::test]
    async fn test_join_path_runs_in_order_and_cleans_up() {
        let out_dir = tempfile::tempdir().unwrap();
        let output = out_dir.path().join("clip.gif");
        let info = MediaInfo::new(640, 360, 20.0, 30.0, 1_000_000, "h264".into()).unwrap();
        let gw = gateway(None);
        let executor = PipelineExecutor::new(gw.clone());

        let mut workdir = PathBuf::new();
        let plan = executor
            .run_scoped(|dir| {
                workdir = dir.to_path_buf();
                PipelineBuilder::new(Path::new("source.mp4"), &info, dir, &output).build(&keep(), &spec())
            })
            .await
            .unwrap();

        let calls = gw.calls.lock().unwrap().clone();
        let names: Vec<String> = calls
            .iter()
            .map(|(p, _)| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(
            names,
            vec!["segment_000.mp4", "segment_001.mp4", "merged.mp4", "palette.png", "clip.gif"]
        );
        // the concat step read a manifest that had already been written
        assert!(calls[2].1);
        assert_eq!(plan.output, output);
        assert!(output.exists());
        assert!(!workdir.exists());
    }

    #[tokio::test]
    async fn test_failure_is_tagged_and_stops_pipeline() {
        let out_dir = tempfile::tempdir().unwrap();
        let output = out_dir.path().join("clip.gif");
        let info = MediaInfo::new(640, 360, 20.0, 30.0, 1_000_000, "h264".into()).unwrap();
        let gw = gateway(Some("palette"));
        let executor = PipelineExecutor::new(gw.clone());

        let mut workdir = PathBuf::new();
        let err = executor
            .run_scoped(|dir| {
                workdir = dir.to_path_buf();
                PipelineBuilder::new(Path::new("source.mp4"), &info, dir, &output).build(&keep(), &spec())
            })
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Palette generation failed: Invalid data found when processing input"
        );
        assert_eq!(gw.calls.lock().unwrap().len(), 4);
        assert!(!output.exists());
        assert!(!workdir.exists());
    }

    #[tokio::test]
    async fn test_build_error_runs_nothing() {
        let info = MediaInfo::new(640, 360, 20.0, 30.0, 1_000_000, "h264".into()).unwrap();
        let gw = gateway(None);
        let executor = PipelineExecutor::new(gw.clone());

        let err = executor
            .run_scoped(|dir| {
                PipelineBuilder::new(Path::new("source.mp4"), &info, dir, Path::new("out.gif")).build(&[], &spec())
            })
            .await
            .unwrap_err();

        assert_eq!(err, DomainError::EmptyTimeline);
        assert!(gw.calls.lock().unwrap().is_empty());
    }
}
