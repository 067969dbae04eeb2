// Channels Module
// Channel source files and the loader that maps channel names onto them

pub mod loader;
pub mod source;

pub use loader::{
    channel_source, ChannelData, ChannelDataLoader, ChannelKind, ChannelSeries, ChannelSource,
    OUTER_DIAMETER_PARAM,
};
pub use source::{Column, SourceTable};
