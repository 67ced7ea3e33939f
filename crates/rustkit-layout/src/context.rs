//! Per-pass layout state threaded through the layout call chain.

use tracing::debug;

use crate::tree::{BoxId, LayoutTree};

/// Scoped suppression of scrollbar and scroll-offset work during layout.
///
/// Both scopes nest. Scrollbars stay frozen while any freeze scope is open,
/// and queued clamps run when the outermost delay scope closes.
#[derive(Debug, Default)]
pub struct LayoutContext {
    freeze_depth: u32,
    delay_clamp_depth: u32,
    pending_clamps: Vec<BoxId>,
}

impl LayoutContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scrollbar existence is kept as is.
    pub fn scrollbars_frozen(&self) -> bool {
        self.freeze_depth > 0
    }

    /// Scroll offset clamps are queued instead of applied.
    pub fn clamping_delayed(&self) -> bool {
        self.delay_clamp_depth > 0
    }

    /// Boxes waiting for a clamp, in queue order.
    pub fn pending_clamps(&self) -> &[BoxId] {
        &self.pending_clamps
    }

    /// Queue `id` for a clamp at the end of the outermost delay scope.
    pub fn set_needs_clamp(&mut self, id: BoxId) {
        if !self.pending_clamps.contains(&id) {
            self.pending_clamps.push(id);
        }
    }

    /// Run `f` with scrollbars frozen.
    pub fn with_frozen_scrollbars<R>(&mut self, f: impl FnOnce(&mut LayoutContext) -> R) -> R {
        self.freeze_depth += 1;
        let result = f(self);
        self.freeze_depth -= 1;
        result
    }

    /// Run `f` with clamping delayed, then clamp every queued box if this
    /// was the outermost scope.
    pub fn with_delayed_scroll_clamp<R>(
        &mut self,
        tree: &mut LayoutTree,
        f: impl FnOnce(&mut LayoutTree, &mut LayoutContext) -> R,
    ) -> R {
        self.delay_clamp_depth += 1;
        let result = f(tree, self);
        self.delay_clamp_depth -= 1;
        if self.delay_clamp_depth == 0 {
            let pending = std::mem::take(&mut self.pending_clamps);
            if !pending.is_empty() {
                debug!(count = pending.len(), "Flushing delayed scroll offset clamps");
                tree.clamp_pending_scroll_offsets(&pending);
            }
        }
        result
    }
}
