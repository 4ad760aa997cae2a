//! Page-space geometry
//!
//! Coordinates use the top-left corner of the page's MediaBox as origin,
//! with `top`/`bottom` measured downward, so a region reads the same way it
//! is measured on a rendered label.

use crate::error::{Result, SortError};
use serde::Serialize;

/// Width and height of a page in points
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// US Letter, used when a page declares no MediaBox
    pub fn letter() -> Self {
        Self::new(612.0, 792.0)
    }

    /// The whole page as a region
    pub fn bounds(&self) -> Region {
        Region::new(0.0, 0.0, self.width, self.height)
    }
}

/// An axis-aligned rectangle in top-left page coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Region {
    /// Left edge
    pub x0: f64,
    /// Top edge (distance from the top of the page)
    pub top: f64,
    /// Right edge
    pub x1: f64,
    /// Bottom edge (distance from the top of the page)
    pub bottom: f64,
}

impl Region {
    /// Create a region from its edges
    pub fn new(x0: f64, top: f64, x1: f64, bottom: f64) -> Self {
        Self {
            x0,
            top,
            x1,
            bottom,
        }
    }

    /// Create a region from its top-left corner and size
    pub fn from_position_and_size(x: f64, top: f64, width: f64, height: f64) -> Self {
        Self::new(x, top, x + width, top + height)
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// True when the region has no positive area
    pub fn is_empty(&self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
    }

    /// Intersect with the page bounds.
    ///
    /// Each edge is clamped independently, so a region lying entirely off the
    /// page (or given with inverted edges) comes back empty.
    pub fn clamp_to(&self, page: PageSize) -> Region {
        Region {
            x0: self.x0.clamp(0.0, page.width),
            top: self.top.clamp(0.0, page.height),
            x1: self.x1.clamp(0.0, page.width),
            bottom: self.bottom.clamp(0.0, page.height),
        }
    }

    /// True when `other` lies entirely inside this region
    pub fn contains(&self, other: &Region) -> bool {
        other.x0 >= self.x0
            && other.x1 <= self.x1
            && other.top >= self.top
            && other.bottom <= self.bottom
    }

    /// Parse a region from `"x0,top,x1,bottom"`
    ///
    /// Whitespace around the numbers is ignored. Inverted edges are accepted
    /// here and simply extract nothing later.
    pub fn parse(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(SortError::InvalidRegion(format!(
                "expected 4 comma-separated numbers, got {}",
                parts.len()
            )));
        }

        let mut values = [0.0f64; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            let value = part
                .parse::<f64>()
                .map_err(|_| SortError::InvalidRegion(format!("not a number: {part}")))?;
            if !value.is_finite() {
                return Err(SortError::InvalidRegion(format!("not finite: {part}")));
            }
            *slot = value;
        }

        Ok(Region::new(values[0], values[1], values[2], values[3]))
    }
}
