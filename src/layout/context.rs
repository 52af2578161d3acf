use crate::config::LayoutConfig;
use crate::font::FontMetrics;

/// Everything layout needs besides the page itself: a way to measure text and the
/// engine's tunables
#[derive(Clone, Copy)]
pub struct LayoutContext<'a> {
    pub metrics: &'a dyn FontMetrics,
    pub config: LayoutConfig,
}

impl<'a> LayoutContext<'a> {
    pub fn new(metrics: &'a dyn FontMetrics) -> LayoutContext<'a> {
        LayoutContext {
            metrics,
            config: LayoutConfig::default(),
        }
    }

    pub fn with_config(mut self, config: LayoutConfig) -> LayoutContext<'a> {
        self.config = config;
        self
    }
}
