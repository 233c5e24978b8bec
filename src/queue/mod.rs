mod swap_pipeline;

pub use swap_pipeline::{PipelineConfig, SwapPipeline};
