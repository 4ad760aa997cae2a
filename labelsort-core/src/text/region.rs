//! Best-effort region text extraction

use crate::document::PageSource;
use crate::geometry::Region;

/// Extract the text of page `index` inside `region` (the whole page when
/// `None`).
///
/// The region is clamped to the page first; if nothing of it remains the
/// result is empty. Failures in the text layer are logged and also yield an
/// empty string, so one bad page never stops a run.
pub fn extract_region(source: &dyn PageSource, index: usize, region: Option<&Region>) -> String {
    let result = match region {
        None => source.page_text(index),
        Some(region) => source.page_size(index).and_then(|size| {
            let clamped = region.clamp_to(size);
            if clamped.is_empty() {
                tracing::debug!("Region {region:?} is empty on page {index}");
                return Ok(String::new());
            }
            source.region_text(index, &clamped)
        }),
    };

    result.unwrap_or_else(|e| {
        tracing::warn!("Text extraction failed on page {}: {e}", index + 1);
        String::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, SortError};
    use crate::geometry::PageSize;
    use std::cell::RefCell;

    /// A page source that records the regions it was asked for
    struct RecordingSource {
        size: PageSize,
        fail: bool,
        requested: RefCell<Vec<Region>>,
    }

    impl RecordingSource {
        fn new(width: f64, height: f64) -> Self {
            Self {
                size: PageSize::new(width, height),
                fail: false,
                requested: RefCell::new(Vec::new()),
            }
        }
    }

    impl PageSource for RecordingSource {
        fn page_count(&self) -> usize {
            1
        }

        fn page_size(&self, _index: usize) -> Result<PageSize> {
            Ok(self.size)
        }

        fn page_text(&self, _index: usize) -> Result<String> {
            if self.fail {
                return Err(SortError::Extraction("broken stream".to_string()));
            }
            Ok("whole page".to_string())
        }

        fn region_text(&self, _index: usize, region: &Region) -> Result<String> {
            if self.fail {
                return Err(SortError::Extraction("broken stream".to_string()));
            }
            self.requested.borrow_mut().push(*region);
            Ok("inside".to_string())
        }
    }

    #[test]
    fn test_whole_page() {
        let source = RecordingSource::new(612.0, 792.0);
        assert_eq!(extract_region(&source, 0, None), "whole page");
    }

    #[test]
    fn test_region_is_clamped() {
        let source = RecordingSource::new(612.0, 792.0);
        let region = Region::new(325.0, 780.0, 710.0, 870.0);
        assert_eq!(extract_region(&source, 0, Some(&region)), "inside");
        assert_eq!(
            source.requested.borrow()[0],
            Region::new(325.0, 780.0, 612.0, 792.0)
        );
    }

    #[test]
    fn test_region_off_the_page_is_empty() {
        let source = RecordingSource::new(612.0, 792.0);
        let region = Region::new(325.0, 846.0, 710.0, 870.0);
        assert_eq!(extract_region(&source, 0, Some(&region)), "");
        assert!(source.requested.borrow().is_empty());
    }

    #[test]
    fn test_zero_area_region_is_empty() {
        let source = RecordingSource::new(612.0, 792.0);
        let region = Region::new(100.0, 100.0, 100.0, 200.0);
        assert_eq!(extract_region(&source, 0, Some(&region)), "");
    }

    #[test]
    fn test_failures_yield_empty_text() {
        let mut source = RecordingSource::new(612.0, 792.0);
        source.fail = true;
        assert_eq!(extract_region(&source, 0, None), "");
        let region = Region::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(extract_region(&source, 0, Some(&region)), "");
    }
}
