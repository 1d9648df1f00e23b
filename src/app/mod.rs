// Application layer - Batch orchestration and per-operation interactors

pub mod batch;
pub mod clip_interactor;
pub mod container;
pub mod gif_interactor;
pub mod render;
pub mod separate_interactor;
pub mod split_interactor;

// Re-export interactors
pub use batch::{BatchOrchestrator, FileOperation, FilePolicy, RunContext, SourceFile};
pub use clip_interactor::ClipInteractor;
pub use gif_interactor::GifInteractor;
pub use separate_interactor::SeparateInteractor;
pub use split_interactor::SplitInteractor;
