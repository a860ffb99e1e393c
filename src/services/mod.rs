mod embed;

pub use embed::{normalize, EmbedError, EmbedTarget};
