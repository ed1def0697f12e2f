use anyhow::Result;
use std::cell::Cell;

use crate::bridge::GameHost;

/// Reference size the Unity build was authored at
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DesignSize {
    pub width: u32,
    pub height: u32,
}

impl DesignSize {
    /// height / width, e.g. 480 / 800 = 0.6
    pub fn ratio(&self) -> f64 {
        f64::from(self.height) / f64::from(self.width)
    }
}

/// Browser inner size in CSS pixels
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

/// Pixel box applied to the Unity container
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Geometry {
    pub width: i32,
    pub height: i32,
    pub top: i32,
    pub left: i32,
}

impl Geometry {
    /// Scale the design size into the viewport, keeping its aspect ratio.
    ///
    /// ELI5:
    /// ┌──────────────── viewport 1600 x 900 ───────────────┐
    /// │ 1600 * 0.6 = 960 > 900  -> too tall, clamp width   │
    /// │ width  = min(1600, ceil(900 / 0.6)) = 1500         │
    /// │ height = floor(1500 * 0.6)          = 900          │
    /// │ top    = floor((900 - 900) / 4)     = 0            │
    /// │ left   = floor((1600 - 1500) / 4)   = 25           │
    /// └────────────────────────────────────────────────────┘
    /// NOTE: the slack is split by 4, not 2, so the container sits left of
    /// and above true center. The game pages have always shipped it this way.
    pub fn fit(design: DesignSize, viewport: Viewport) -> Self {
        let ratio = design.ratio();
        let mut width = viewport.width;
        if width * ratio > viewport.height {
            width = width.min((viewport.height / ratio).ceil());
        }
        let height = (width * ratio).floor();
        Self::offset(width, height, viewport)
    }

    /// Keep the design size as-is and only compute the offsets
    pub fn fixed(design: DesignSize, viewport: Viewport) -> Self {
        Self::offset(f64::from(design.width), f64::from(design.height), viewport)
    }

    fn offset(width: f64, height: f64, viewport: Viewport) -> Self {
        Geometry {
            width: width as i32,
            height: height as i32,
            top: ((viewport.height - height) / 4.0).floor() as i32,
            left: ((viewport.width - width) / 4.0).floor() as i32,
        }
    }
}

/// Recomputes the container geometry. Stateless apart from remembering
/// whether the first post-load layout already happened.
pub struct LayoutManager {
    design: DesignSize,
    scale_to_fit: bool,
    resized: Cell<bool>,
}

impl LayoutManager {
    pub fn new(design: DesignSize, scale_to_fit: bool) -> Self {
        LayoutManager {
            design,
            scale_to_fit,
            resized: Cell::new(false),
        }
    }

    pub fn compute(&self, viewport: Viewport) -> Geometry {
        if self.scale_to_fit {
            Geometry::fit(self.design, viewport)
        } else {
            Geometry::fixed(self.design, viewport)
        }
    }

    /// Read the current viewport and push the result to the page
    pub fn resize(&self, host: &dyn GameHost) -> Result<Geometry> {
        let geometry = self.compute(host.viewport()?);
        host.apply_layout(&geometry)?;
        Ok(geometry)
    }

    /// Lay out exactly once, the first time loading reports completion
    pub fn on_progress(&self, host: &dyn GameHost, progress: f64) -> Result<Option<Geometry>> {
        if progress < 1.0 || self.resized.get() {
            return Ok(None);
        }
        let geometry = self.resize(host)?;
        self.resized.set(true);
        Ok(Some(geometry))
    }
}
