mod broker;

pub use broker::{PreviewBroker, PreviewContent, PreviewError, PreviewSession};
