//! Platform configuration for geometry: scrollbar theme, paging and resizer.

use rustkit_css::ScrollbarWidth;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::LayoutError;

/// Platform scrollbar metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollbarTheme {
    /// Thickness of a `scrollbar-width: auto` scrollbar in px.
    pub thickness: i32,
    /// Thickness of a `scrollbar-width: thin` scrollbar in px.
    pub thin_thickness: i32,
    /// Scrollbars float over content and take no layout space.
    pub uses_overlay_scrollbars: bool,
    /// Overlay scrollbars receive pointer events.
    pub overlay_hit_testable: bool,
}

impl ScrollbarTheme {
    /// Classic desktop scrollbars.
    pub fn classic() -> Self {
        Self {
            thickness: 15,
            thin_thickness: 11,
            uses_overlay_scrollbars: false,
            overlay_hit_testable: false,
        }
    }

    /// Overlay scrollbars as used on touch platforms.
    pub fn overlay() -> Self {
        Self {
            thickness: 10,
            thin_thickness: 7,
            uses_overlay_scrollbars: true,
            overlay_hit_testable: true,
        }
    }

    /// Thickness of a native scrollbar for `scrollbar-width`.
    pub fn thickness_for(&self, width: ScrollbarWidth) -> i32 {
        match width {
            ScrollbarWidth::Auto => self.thickness,
            ScrollbarWidth::Thin => self.thin_thickness,
            ScrollbarWidth::None => 0,
        }
    }
}

impl Default for ScrollbarTheme {
    fn default() -> Self {
        Self::classic()
    }
}

/// Page step for scrolling by a page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagingConfig {
    /// Fraction of the visible length one page step covers at least.
    pub min_fraction_to_step: f32,
    /// Largest overlap in px kept between consecutive pages.
    pub max_overlap_between_pages: i32,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            min_fraction_to_step: 0.875,
            max_overlap_between_pages: 40,
        }
    }
}

/// Geometry configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub scrollbar_theme: ScrollbarTheme,
    pub paging: PagingConfig,
    /// Scale of the touch resizer hit area relative to the corner.
    pub resizer_touch_expand_ratio: i32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            scrollbar_theme: ScrollbarTheme::default(),
            paging: PagingConfig::default(),
            resizer_touch_expand_ratio: 2,
        }
    }
}

impl LayoutConfig {
    /// Parse and validate a JSON config. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, LayoutError> {
        let config: LayoutConfig = serde_json::from_str(json)?;
        config.validate()?;
        debug!(?config, "Loaded layout config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        let theme = &self.scrollbar_theme;
        if theme.thickness < 0 || theme.thin_thickness < 0 {
            return Err(LayoutError::InvalidConfig(
                "scrollbar thickness must be non-negative".into(),
            ));
        }
        if theme.thin_thickness > theme.thickness {
            return Err(LayoutError::InvalidConfig(format!(
                "thin_thickness {} exceeds thickness {}",
                theme.thin_thickness, theme.thickness
            )));
        }
        let fraction = self.paging.min_fraction_to_step;
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(LayoutError::InvalidConfig(format!(
                "min_fraction_to_step {fraction} outside (0, 1]"
            )));
        }
        if self.paging.max_overlap_between_pages < 0 {
            return Err(LayoutError::InvalidConfig(
                "max_overlap_between_pages must be non-negative".into(),
            ));
        }
        if self.resizer_touch_expand_ratio < 1 {
            return Err(LayoutError::InvalidConfig(
                "resizer_touch_expand_ratio must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Config with overlay scrollbars.
    pub fn with_overlay_scrollbars(mut self) -> Self {
        self.scrollbar_theme = ScrollbarTheme::overlay();
        self
    }
}
