//! Pipeline strategy selection

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::errors::DomainError;
use crate::domain::model::{KeepSegment, MediaInfo, Stage};
use crate::planner::filters;
use crate::planner::{
    ConcatManifest, LoopSettings, OutputSpec, PipelinePlan, PipelineStep, PipelineStrategy,
};
use crate::ports::{
    AudioCodec, EncodeInput, EncodeRequest, FilterGraph, H264Params, InputFormat, TimestampPolicy,
    VideoCodec,
};

/// Quality of the intermediate clips on the join path
const INTERMEDIATE_PRESET: &str = "fast";
const INTERMEDIATE_CRF: u8 = 18;

/// Quality of a derived clip
const CLIP_PRESET: &str = "medium";
const CLIP_CRF: u8 = 20;

/// Builds the ordered invocations for one file
pub struct PipelineBuilder<'a> {
    source: &'a Path,
    info: &'a MediaInfo,
    workdir: &'a Path,
    output: &'a Path,
}

impl<'a> PipelineBuilder<'a> {
    /// `workdir` holds intermediates and must outlive the plan's execution
    pub fn new(source: &'a Path, info: &'a MediaInfo, workdir: &'a Path, output: &'a Path) -> Self {
        Self {
            source,
            info,
            workdir,
            output,
        }
    }

    pub fn strategy_for(keep: &[KeepSegment]) -> Option<PipelineStrategy> {
        match keep.len() {
            0 => None,
            1 => Some(PipelineStrategy::Direct),
            _ => Some(PipelineStrategy::ExtractAndJoin),
        }
    }

    pub fn build(&self, keep: &[KeepSegment], spec: &OutputSpec) -> Result<PipelinePlan, DomainError> {
        let strategy = Self::strategy_for(keep).ok_or(DomainError::EmptyTimeline)?;
        debug!(?strategy, segments = keep.len(), "Selected pipeline strategy");

        let (mut steps, manifest, finish_input, trim) = match strategy {
            PipelineStrategy::Direct => (Vec::new(), None, self.source.to_path_buf(), keep.first()),
            PipelineStrategy::ExtractAndJoin => {
                let (steps, manifest, merged) = self.extract_and_join(keep);
                (steps, Some(manifest), merged, None)
            }
        };

        let chain = filters::build_chain(trim, spec, self.info);
        match spec {
            OutputSpec::AnimatedLoop(settings) => {
                steps.extend(self.palette_steps(&finish_input, &chain, settings));
            }
            OutputSpec::Clip(_) => steps.push(PipelineStep {
                stage: Stage::EncodeClip,
                request: EncodeRequest::new(EncodeInput::file(&finish_input), self.output)
                    .filter(FilterGraph::Chain(chain))
                    .video(VideoCodec::H264(H264Params::software(CLIP_PRESET, CLIP_CRF)))
                    .audio(AudioCodec::Disabled),
            }),
        }

        Ok(PipelinePlan {
            strategy,
            steps,
            manifest,
            output: self.output.to_path_buf(),
        })
    }

    /// One re-encoded intermediate per keep segment, in ascending order,
    /// followed by a stream-copy join.
    fn extract_and_join(&self, keep: &[KeepSegment]) -> (Vec<PipelineStep>, ConcatManifest, PathBuf) {
        let mut steps = Vec::with_capacity(keep.len() + 1);
        let mut entries = Vec::with_capacity(keep.len());

        for (index, segment) in keep.iter().enumerate() {
            let path = self.workdir.join(format!("segment_{:03}.mp4", index));
            steps.push(PipelineStep {
                stage: Stage::ExtractSegment,
                request: EncodeRequest::new(EncodeInput::file(self.source), &path)
                    .window(*segment)
                    .video(VideoCodec::H264(H264Params::software(
                        INTERMEDIATE_PRESET,
                        INTERMEDIATE_CRF,
                    )))
                    .audio(AudioCodec::Aac)
                    .timestamps(TimestampPolicy::MakeZero),
            });
            entries.push(path);
        }

        let manifest = ConcatManifest {
            path: self.workdir.join("concat.txt"),
            entries,
        };
        let merged = self.workdir.join("merged.mp4");
        steps.push(PipelineStep {
            stage: Stage::Concat,
            request: EncodeRequest::new(
                EncodeInput::file(&manifest.path).with_format(InputFormat::Concat),
                &merged,
            )
            .video(VideoCodec::Copy)
            .audio(AudioCodec::Copy),
        });

        (steps, manifest, merged)
    }

    /// Two passes: palette from the filtered clip, then the mapped loop
    fn palette_steps(&self, input: &Path, chain: &str, settings: &LoopSettings) -> [PipelineStep; 2] {
        let palette = self.workdir.join("palette.png");
        [
            PipelineStep {
                stage: Stage::PaletteGen,
                request: EncodeRequest::new(EncodeInput::file(input), &palette)
                    .filter(FilterGraph::Chain(filters::palette_gen(chain, settings))),
            },
            PipelineStep {
                stage: Stage::RenderLoop,
                request: EncodeRequest::new(EncodeInput::file(input), self.output)
                    .add_input(EncodeInput::file(&palette))
                    .filter(FilterGraph::Complex(filters::palette_use(chain, settings)))
                    .loop_count(settings.loop_count),
            },
        ]
    }
}
