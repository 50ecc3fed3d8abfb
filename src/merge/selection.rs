//! Per-input page selection.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::ObjectId;

/// Which pages of an input take part in a merge.
///
/// Page numbers are 1-based positions in the input's page order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSelection {
    /// Every page
    #[default]
    All,
    /// Inclusive page number range
    Range(RangeInclusive<u32>),
    /// Specific page numbers, in any order
    Pages(Vec<u32>),
}

impl PageSelection {
    /// Check if a page number should be included.
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::Pages(pages) => pages.contains(&page),
        }
    }

    /// Keep the selected entries of a document's page list.
    ///
    /// Selected pages keep their document order.
    pub fn select(&self, pages: &[ObjectId]) -> Vec<ObjectId> {
        pages
            .iter()
            .zip(1u32..)
            .filter(|(_, number)| self.includes(*number))
            .map(|(&id, _)| id)
            .collect()
    }

    /// Parse a page selection string (e.g., "1-10", "1,3,5,7-10").
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(PageSelection::All);
        }

        // Simple range (e.g., "1-10")
        if let Some((start, end)) = s.split_once('-') {
            if !start.contains(',') && !end.contains(',') {
                let (start, end) = (page_number(start)?, page_number(end)?);
                check_order(start, end)?;
                return Ok(PageSelection::Range(start..=end));
            }
        }

        let mut pages = Vec::new();
        for part in s.split(',') {
            let part = part.trim();
            if let Some((start, end)) = part.split_once('-') {
                let (start, end) = (page_number(start)?, page_number(end)?);
                check_order(start, end)?;
                pages.extend(start..=end);
            } else {
                pages.push(page_number(part)?);
            }
        }

        pages.sort_unstable();
        pages.dedup();
        Ok(PageSelection::Pages(pages))
    }
}

fn page_number(s: &str) -> Result<u32> {
    match s.trim().parse::<u32>() {
        Ok(0) => Err(Error::InvalidPageSelection(
            "page numbers start at 1".to_string(),
        )),
        Ok(n) => Ok(n),
        Err(_) => Err(Error::InvalidPageSelection(format!(
            "invalid page number '{}'",
            s.trim()
        ))),
    }
}

fn check_order(start: u32, end: u32) -> Result<()> {
    if start > end {
        return Err(Error::InvalidPageSelection(format!(
            "range {}-{} is reversed",
            start, end
        )));
    }
    Ok(())
}
