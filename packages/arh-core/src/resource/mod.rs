//! Files the watcher reads from disk before it starts polling.

mod template;

pub use template::TemplateAsset;
