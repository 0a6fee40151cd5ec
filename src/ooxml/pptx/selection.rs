//! Slide selection expressions: `all`, or a comma separated list of slide
//! numbers and inclusive ranges (`1,3-5`).

use std::collections::BTreeSet;
use std::str::FromStr;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Empty slide selection")]
    Empty,

    #[error("Invalid slide selection item '{0}'")]
    InvalidItem(String),

    #[error("Slide numbers start at 1")]
    Zero,

    #[error("Slide range {start}-{end} is reversed")]
    Reversed { start: usize, end: usize },

    #[error("Slide {number} does not exist (presentation has {count})")]
    OutOfRange { number: usize, count: usize },
}

/// Which slides to transform, by 1-based slide number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SlideSelection {
    #[default]
    All,
    Only(BTreeSet<usize>),
}

impl SlideSelection {
    #[inline]
    pub fn contains(&self, number: usize) -> bool {
        match self {
            SlideSelection::All => true,
            SlideSelection::Only(set) => set.contains(&number),
        }
    }

    /// Check the selection against the slide count.
    pub fn validate(&self, count: usize) -> Result<(), SelectionError> {
        if let SlideSelection::Only(set) = self {
            if let Some(&number) = set.iter().next_back().filter(|&&n| n > count) {
                return Err(SelectionError::OutOfRange { number, count });
            }
        }
        Ok(())
    }
}

impl FromStr for SlideSelection {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(SelectionError::Empty);
        }
        if s.eq_ignore_ascii_case("all") {
            return Ok(SlideSelection::All);
        }

        let mut set = BTreeSet::new();
        for item in s.split(',').map(str::trim) {
            match item.split_once('-') {
                Some((start, end)) => {
                    let start = number(start.trim(), item)?;
                    let end = number(end.trim(), item)?;
                    if start > end {
                        return Err(SelectionError::Reversed { start, end });
                    }
                    set.extend(start..=end);
                },
                None => {
                    set.insert(number(item, item)?);
                },
            }
        }
        Ok(SlideSelection::Only(set))
    }
}

fn number(text: &str, item: &str) -> Result<usize, SelectionError> {
    match atoi_simd::parse::<u32, false, false>(text.as_bytes()) {
        Ok(0) => Err(SelectionError::Zero),
        Ok(n) => Ok(n as usize),
        Err(_) => Err(SelectionError::InvalidItem(item.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all() {
        assert_eq!("all".parse::<SlideSelection>(), Ok(SlideSelection::All));
        assert_eq!(" ALL ".parse::<SlideSelection>(), Ok(SlideSelection::All));
    }

    #[test]
    fn test_parse_list_and_ranges() {
        let selection: SlideSelection = "1, 3-5,4".parse().unwrap();
        assert!(selection.contains(1));
        assert!(!selection.contains(2));
        assert!(selection.contains(5));
        assert_eq!(selection, SlideSelection::Only([1, 3, 4, 5].into_iter().collect()));
        assert!(selection.validate(5).is_ok());
        assert_eq!(
            selection.validate(4),
            Err(SelectionError::OutOfRange { number: 5, count: 4 })
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<SlideSelection>(), Err(SelectionError::Empty));
        assert_eq!("0".parse::<SlideSelection>(), Err(SelectionError::Zero));
        assert_eq!(
            "5-3".parse::<SlideSelection>(),
            Err(SelectionError::Reversed { start: 5, end: 3 })
        );
        assert_eq!(
            "1,x".parse::<SlideSelection>(),
            Err(SelectionError::InvalidItem("x".to_string()))
        );
        assert!("1,,2".parse::<SlideSelection>().is_err());
    }
}
