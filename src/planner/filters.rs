//! Filter chain construction

use crate::domain::model::{KeepSegment, MediaInfo};
use crate::domain::rules::ScaleRule;
use crate::planner::{LoopSettings, OutputSpec};
use crate::utils::format_seconds;

/// Frame-accurate trim that re-bases timestamps to zero
pub fn trim(segment: &KeepSegment) -> String {
    format!(
        "trim=start={}:duration={},setpts=PTS-STARTPTS",
        format_seconds(segment.start()),
        format_seconds(segment.duration())
    )
}

/// Filters shared by both strategies: speed, frame rate, scale
pub fn shared_chain(spec: &OutputSpec, info: &MediaInfo) -> Vec<String> {
    let mut chain = Vec::new();
    let speed = spec.speed_multiplier();
    if speed != 1.0 {
        chain.push(format!("setpts={}*PTS", 1.0 / speed));
    }
    if let Some(fps) = spec.frame_rate() {
        chain.push(format!("fps={}", fps));
    }
    chain.push(ScaleRule::filter(spec.resolution(), info.width, info.height));
    chain
}

/// Full chain for one pass, with the trim first when the direct path is used
pub fn build_chain(trim_segment: Option<&KeepSegment>, spec: &OutputSpec, info: &MediaInfo) -> String {
    let mut chain: Vec<String> = trim_segment.map(trim).into_iter().collect();
    chain.extend(shared_chain(spec, info));
    chain.join(",")
}

pub fn palette_gen(chain: &str, settings: &LoopSettings) -> String {
    format!("{},palettegen=max_colors={}", chain, settings.color_count)
}

pub fn palette_use(chain: &str, settings: &LoopSettings) -> String {
    format!(
        "[0:v]{}[v];[v][1:v]paletteuse=dither={}",
        chain,
        settings.dither.filter_name()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{DitherMethod, Resolution, TimeInterval};
    use crate::planner::ClipSettings;

    fn info() -> MediaInfo {
        MediaInfo::new(1920, 1080, 60.0, 30.0, 4_000_000, "h264".into()).unwrap()
    }

    fn loop_settings(speed: f64) -> LoopSettings {
        LoopSettings {
            resolution: Resolution::Width { width: 480 },
            frame_rate: 15.0,
            speed_multiplier: speed,
            loop_count: 0,
            dither: DitherMethod::Bayer,
            color_count: 128,
        }
    }

    #[test]
    fn test_direct_chain_order() {
        let segment = TimeInterval::new(2.5, 7.0).unwrap();
        let spec = OutputSpec::AnimatedLoop(loop_settings(2.0));
        assert_eq!(
            build_chain(Some(&segment), &spec, &info()),
            "trim=start=2.500000:duration=4.500000,setpts=PTS-STARTPTS,setpts=0.5*PTS,fps=15,scale=480:-2"
        );
    }

    #[test]
    fn test_unit_speed_has_no_setpts() {
        let spec = OutputSpec::AnimatedLoop(loop_settings(1.0));
        assert_eq!(build_chain(None, &spec, &info()), "fps=15,scale=480:-2");
    }

    #[test]
    fn test_clip_without_frame_rate() {
        let spec = OutputSpec::Clip(ClipSettings {
            resolution: Resolution::Original,
            frame_rate: None,
            speed_multiplier: 1.0,
        });
        assert_eq!(build_chain(None, &spec, &info()), "scale=1920:1080");
    }

    #[test]
    fn test_palette_filters() {
        let settings = loop_settings(1.0);
        assert_eq!(
            palette_gen("fps=15,scale=480:-2", &settings),
            "fps=15,scale=480:-2,palettegen=max_colors=128"
        );
        assert_eq!(
            palette_use("fps=15,scale=480:-2", &settings),
            "[0:v]fps=15,scale=480:-2[v];[v][1:v]paletteuse=dither=bayer"
        );
    }
}
