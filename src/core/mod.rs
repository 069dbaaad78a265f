pub mod engine;
pub mod intervals;
pub mod pipeline;
pub mod regions;
pub mod text_fit;

pub use crate::domain::model::{
    Boundaries, BoundaryKey, BoxOrder, CardField, CardOutcome, ColorRange, InputField,
    IntervalLabel, Intervals, LayoutLine, Question, Record, Rect, RegionMap, RegionSpec,
    RenderedCard, RunSummary, SkipReason, SkippedField, TextLayout,
};
pub use crate::domain::ports::{
    ConfigProvider, GlyphExtent, OutputFormat, Paddings, Pipeline, Storage, Typeface,
};
pub use crate::utils::error::Result;
