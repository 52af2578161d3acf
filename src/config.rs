use crate::units::Pt;

/// Tunables for the layout engine. The defaults match the classic behaviour of the
/// engine and rarely need changing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    /// The narrowest horizontal gap text will still flow into when wrapping around
    /// side-anchored parts. Anchors that would leave less than this next to their run are
    /// pushed further down or dropped.
    ///
    /// Defaults to `20pt`.
    pub min_wrap_width: Pt,
    /// Extra space left between a part anchored below a run and the run that follows it.
    ///
    /// Defaults to `6pt`.
    pub anchor_line_gap: Pt,
    /// Vertical gap inserted between consecutive runs of a paragraph.
    ///
    /// Defaults to `0pt`.
    pub leading: Pt,
    /// How many spaces a tab character expands to.
    ///
    /// Defaults to `4`.
    pub tab_size: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            min_wrap_width: Pt(20.0),
            anchor_line_gap: Pt(6.0),
            leading: Pt(0.0),
            tab_size: 4,
        }
    }
}
