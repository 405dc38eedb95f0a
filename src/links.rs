//! Ordered list of article links collected from a listing page.
//!
//! A [`LinkSet`] keeps links in page order, duplicates included. Access is
//! split into [`LinkSet::at`] for a single element and [`LinkSet::slice`]
//! for a stepped sub-range; both accept negative positions counted from the
//! end. Iteration borrows the set, so every pass starts from the first link.

use crate::error::NewsError;
use crate::outputs::{self, Persistable};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, instrument};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkSet {
    links: Vec<String>,
}

impl LinkSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of links, duplicates included.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub(crate) fn push(&mut self, link: String) {
        self.links.push(link);
    }

    /// Link at `index`; negative values count back from the end.
    ///
    /// # Errors
    ///
    /// [`NewsError::IndexOutOfRange`] when the resolved position is outside
    /// the set.
    pub fn at(&self, index: isize) -> Result<&str, NewsError> {
        let len = self.links.len() as isize;
        let resolved = if index < 0 { index + len } else { index };
        if resolved < 0 || resolved >= len {
            return Err(NewsError::IndexOutOfRange {
                index,
                len: self.links.len(),
            });
        }
        Ok(&self.links[resolved as usize])
    }

    /// New set holding the links from `start` towards `stop` (exclusive),
    /// advancing by `step`.
    ///
    /// Omitted bounds default to the whole set in the direction of `step`
    /// (which itself defaults to 1). Negative bounds count from the end and
    /// out-of-range bounds are clamped, so slicing never fails on bounds.
    ///
    /// # Errors
    ///
    /// [`NewsError::InvalidIndexType`] when `step` is zero.
    pub fn slice(
        &self,
        start: Option<isize>,
        stop: Option<isize>,
        step: Option<isize>,
    ) -> Result<LinkSet, NewsError> {
        let step = step.unwrap_or(1);
        if step == 0 {
            return Err(NewsError::InvalidIndexType(
                "slice step cannot be zero".to_string(),
            ));
        }

        let len = self.links.len() as isize;
        let backwards = step < 0;
        let clamp = |bound: isize| -> isize {
            let bound = if bound < 0 { bound + len } else { bound };
            if backwards {
                bound.clamp(-1, len - 1)
            } else {
                bound.clamp(0, len)
            }
        };
        let (first, last) = if backwards {
            (start.map_or(len - 1, clamp), stop.map_or(-1, clamp))
        } else {
            (start.map_or(0, clamp), stop.map_or(len, clamp))
        };

        let mut selected = LinkSet::new();
        let mut i = first;
        while (!backwards && i < last) || (backwards && i > last) {
            selected.push(self.links[i as usize].clone());
            match i.checked_add(step) {
                Some(next) => i = next,
                None => break,
            }
        }
        Ok(selected)
    }

    /// Iterate from the first link. Each call starts a fresh pass.
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.links.iter()
    }

    /// Consume the set, returning the links in order.
    pub fn into_vec(self) -> Vec<String> {
        self.links
    }

    /// Reload a list saved with [`Persistable::save_to_json`] or
    /// [`Persistable::save_to_file`]. The format follows the extension:
    /// `.bin` is the binary blob, anything else is read as JSON.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub async fn load(path: &Path) -> Result<LinkSet, NewsError> {
        let links: LinkSet = match path.extension().and_then(|e| e.to_str()) {
            Some(outputs::blob::EXTENSION) => outputs::blob::load(path).await?,
            _ => outputs::json::load(path).await?,
        };
        info!(count = links.len(), "Loaded link list");
        Ok(links)
    }
}

impl From<Vec<String>> for LinkSet {
    fn from(links: Vec<String>) -> Self {
        Self { links }
    }
}

impl FromIterator<String> for LinkSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            links: iter.into_iter().collect(),
        }
    }
}

impl Extend<String> for LinkSet {
    fn extend<I: IntoIterator<Item = String>>(&mut self, iter: I) {
        self.links.extend(iter);
    }
}

impl<'a> IntoIterator for &'a LinkSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.links.iter()
    }
}

impl IntoIterator for LinkSet {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.links.into_iter()
    }
}

impl Persistable for LinkSet {}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(n: usize) -> LinkSet {
        (0..n).map(|i| format!("https://example.com/news/{i}")).collect()
    }

    /// Walk indices by hand from already-normalized bounds.
    fn stepped(set: &LinkSet, first: isize, last: isize, step: isize) -> Vec<String> {
        let mut out = Vec::new();
        let mut i = first;
        while (step > 0 && i < last) || (step < 0 && i > last) {
            out.push(set.at(i).unwrap().to_string());
            i += step;
        }
        out
    }

    #[test]
    fn test_at_positive_and_negative() {
        let set = sample(5);
        assert_eq!(set.at(0).unwrap(), "https://example.com/news/0");
        assert_eq!(set.at(-1).unwrap(), set.at(set.len() as isize - 1).unwrap());
        assert_eq!(set.at(-5).unwrap(), "https://example.com/news/0");
    }

    #[test]
    fn test_at_out_of_range() {
        let set = sample(3);
        assert!(matches!(
            set.at(3),
            Err(NewsError::IndexOutOfRange { index: 3, len: 3 })
        ));
        assert!(matches!(
            set.at(-4),
            Err(NewsError::IndexOutOfRange { index: -4, len: 3 })
        ));
        assert!(LinkSet::new().at(0).is_err());
    }

    #[test]
    fn test_slice_matches_manual_stepping() {
        let set = sample(10);
        let cases: &[(Option<isize>, Option<isize>, Option<isize>, isize, isize, isize)] = &[
            (Some(1), Some(2), None, 1, 2, 1),
            (None, Some(2), Some(1), 0, 2, 1),
            (None, Some(-3), Some(1), 0, 7, 1),
            (Some(2), Some(9), Some(3), 2, 9, 3),
            (Some(-4), None, None, 6, 10, 1),
            (None, None, Some(-1), 9, -1, -1),
            (Some(8), Some(2), Some(-2), 8, 2, -2),
        ];
        for &(start, stop, step, first, last, by) in cases {
            let sliced = set.slice(start, stop, step).unwrap();
            assert_eq!(
                sliced.into_vec(),
                stepped(&set, first, last, by),
                "slice({start:?}, {stop:?}, {step:?})"
            );
        }
    }

    #[test]
    fn test_slice_clamps_bounds() {
        let set = sample(4);
        assert_eq!(set.slice(Some(-100), Some(100), None).unwrap(), set);
        assert!(set.slice(Some(10), None, None).unwrap().is_empty());
        assert!(set.slice(Some(3), Some(1), None).unwrap().is_empty());
    }

    #[test]
    fn test_slice_extreme_steps() {
        let set = sample(3);
        let forward = set.slice(Some(1), None, Some(isize::MAX)).unwrap();
        assert_eq!(forward.into_vec(), vec!["https://example.com/news/1"]);

        let backward = set.slice(None, None, Some(isize::MIN)).unwrap();
        assert_eq!(backward.into_vec(), vec!["https://example.com/news/2"]);

        let from_start = set.slice(Some(0), Some(isize::MAX), Some(isize::MAX)).unwrap();
        assert_eq!(from_start.into_vec(), vec!["https://example.com/news/0"]);
    }

    #[test]
    fn test_slice_zero_step() {
        assert!(matches!(
            sample(3).slice(None, None, Some(0)),
            Err(NewsError::InvalidIndexType(_))
        ));
    }

    #[test]
    fn test_slice_keeps_duplicates() {
        let set = LinkSet::from(vec![
            "https://example.com/a".to_string(),
            "https://example.com/a".to_string(),
            "https://example.com/b".to_string(),
        ]);
        let sliced = set.slice(None, Some(2), None).unwrap();
        assert_eq!(sliced.len(), 2);
        assert_eq!(sliced.at(0).unwrap(), sliced.at(1).unwrap());
    }

    #[test]
    fn test_iteration_restarts() {
        let set = sample(4);
        let first: Vec<_> = set.iter().collect();
        let mut partial = set.iter();
        partial.next();
        let second: Vec<_> = (&set).into_iter().collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
    }
}
