//! Output naming for derived artifacts

use std::path::{Path, PathBuf};

/// Where the artifacts derived from one source file are written
#[derive(Debug, Clone)]
pub struct OutputLayout {
    parent: PathBuf,
    file_name: String,
    stem: String,
    extension: String,
}

impl OutputLayout {
    pub fn for_source(source: &Path) -> Self {
        let parent = source
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "output".to_string());
        let extension = source
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_else(|| ".mp4".to_string());

        Self {
            parent,
            file_name: file_id(source),
            stem,
            extension,
        }
    }

    /// Stable identity of the source
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// `<stem>_parts/` next to the source
    pub fn parts_dir(&self) -> PathBuf {
        self.parent.join(format!("{}_parts", self.stem))
    }

    /// `<stem>_partNNN<ext>` inside the parts directory, numbered from 1
    pub fn part_path(&self, number: usize) -> PathBuf {
        self.parts_dir()
            .join(format!("{}_part{:03}{}", self.stem, number, self.extension))
    }

    /// `<stem>_separated/` next to the source
    pub fn separated_dir(&self) -> PathBuf {
        self.parent.join(format!("{}_separated", self.stem))
    }

    pub fn video_stream_path(&self) -> PathBuf {
        self.separated_dir().join(format!("{}_video.mp4", self.stem))
    }

    pub fn audio_stream_path(&self) -> PathBuf {
        self.separated_dir().join(format!("{}_audio.wav", self.stem))
    }

    /// Raw stream copy target used when WAV conversion is impossible
    pub fn audio_fallback_path(&self) -> PathBuf {
        self.separated_dir().join(format!("{}_audio.aac", self.stem))
    }

    pub fn gif_path(&self) -> PathBuf {
        self.parent.join(format!("{}.gif", self.stem))
    }

    pub fn clip_path(&self) -> PathBuf {
        self.parent.join(format!("{}_clip.mp4", self.stem))
    }
}

/// Last path component, used as the stable identity of a file
pub fn file_id(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_names() {
        let layout = OutputLayout::for_source(Path::new("/media/in/holiday.mov"));
        assert_eq!(layout.file_name(), "holiday.mov");
        assert_eq!(layout.parts_dir(), PathBuf::from("/media/in/holiday_parts"));
        assert_eq!(
            layout.part_path(7),
            PathBuf::from("/media/in/holiday_parts/holiday_part007.mov")
        );
        assert_eq!(
            layout.audio_stream_path(),
            PathBuf::from("/media/in/holiday_separated/holiday_audio.wav")
        );
        assert_eq!(layout.gif_path(), PathBuf::from("/media/in/holiday.gif"));
        assert_eq!(layout.clip_path(), PathBuf::from("/media/in/holiday_clip.mp4"));
    }

    #[test]
    fn test_layout_without_extension() {
        let layout = OutputLayout::for_source(Path::new("raw"));
        assert_eq!(layout.part_path(1), PathBuf::from("raw_parts/raw_part001.mp4"));
    }
}
