// Mon Oct 19 2026 - Alex

use crate::pattern::{Captures, Pattern};
use std::iter::FusedIterator;

impl Pattern {
    pub fn match_start(&self, data: &[u8], offset: usize) -> Option<Captures> {
        let sub = data.get(offset..)?;
        if !self.matches(sub) {
            return None;
        }

        let mut captures = Captures::new(offset);
        for mark in self.marks() {
            captures.push(mark.label.as_deref(), offset + mark.index);
        }
        Some(captures)
    }

    pub fn find(&self, data: &[u8]) -> Option<usize> {
        let leading = self.leading();
        let mut i = 0;

        while i < data.len() {
            if !leading.is_empty() {
                i += find_literal(&data[i..], leading)?;
            }
            if self.matches(&data[i..]) {
                return Some(i);
            }
            i += 1;
        }

        None
    }

    pub fn find_all<'p, 'd>(&'p self, data: &'d [u8]) -> Matches<'p, 'd> {
        Matches {
            pattern: self,
            data,
            cursor: 0,
        }
    }
}

fn find_literal(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|window| window == needle)
}

pub struct Matches<'p, 'd> {
    pattern: &'p Pattern,
    data: &'d [u8],
    cursor: usize,
}

impl Iterator for Matches<'_, '_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.cursor >= self.data.len() {
            return None;
        }

        match self.pattern.find(&self.data[self.cursor..]) {
            Some(found) => {
                let start = self.cursor + found;
                self.cursor = start + 1;
                Some(start)
            }
            None => {
                self.cursor = self.data.len();
                None
            }
        }
    }
}

impl FusedIterator for Matches<'_, '_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::compile;
    use proptest::prelude::*;

    fn find_naive(pattern: &Pattern, data: &[u8]) -> Option<usize> {
        (0..data.len()).find(|&i| pattern.match_start(data, i).is_some())
    }

    fn find_all_naive(pattern: &Pattern, data: &[u8]) -> Vec<usize> {
        (0..data.len()).filter(|&i| pattern.match_start(data, i).is_some()).collect()
    }

    #[test]
    fn test_anchor_scenario_captures_wildcard() {
        let pattern = compile("0x55 * 0xcc/0x00 0xc3").unwrap();
        let data = [0x55, 0x42, 0xc3];

        let captures = pattern.match_start(&data, 0).unwrap();
        assert_eq!(captures.offsets(), &[1]);
        assert_eq!(data[captures.nth(0).unwrap()], 0x42);
    }

    #[test]
    fn test_match_start_short_buffer() {
        let pattern = compile("0x55 0x48 0x89").unwrap();

        assert!(pattern.match_start(&[0x55, 0x48], 0).is_none());
        assert!(pattern.match_start(&[0x00, 0x55, 0x48, 0x89], 1).is_some());
        assert!(pattern.match_start(&[0x55, 0x48, 0x89], 4).is_none());
    }

    #[test]
    fn test_find_skips_literal_false_positive() {
        let pattern = compile("0xeb 0x0f 0x49/0xff 0x8b").unwrap();
        let data = [0xeb, 0x0f, 0x00, 0x00, 0xeb, 0x0f, 0x49, 0x8b];

        assert_eq!(pattern.find(&data), Some(4));
    }

    #[test]
    fn test_find_without_leading_literal() {
        let pattern = compile("0x70/0xf8 0x11").unwrap();
        let data = [0x90, 0x90, 0x75, 0x11];

        assert!(pattern.leading().is_empty());
        assert_eq!(pattern.find(&data), Some(2));
    }

    #[test]
    fn test_find_all_overlapping() {
        let pattern = compile("0xaa 0xaa").unwrap();
        let data = [0xaa, 0xaa, 0xaa, 0x00, 0xaa, 0xaa];

        assert_eq!(pattern.find_all(&data).collect::<Vec<_>>(), vec![0, 1, 4]);
    }

    #[test]
    fn test_find_all_empty_when_absent() {
        let pattern = compile("0xde 0xad").unwrap();
        let mut matches = pattern.find_all(&[0xde, 0xbe, 0xef]);

        assert_eq!(matches.next(), None);
        assert_eq!(matches.next(), None);
    }

    #[test]
    fn test_find_all_is_lazy() {
        let pattern = compile("0x90").unwrap();
        let data = [0x90; 64];

        let first_three: Vec<usize> = pattern.find_all(&data).take(3).collect();
        assert_eq!(first_three, vec![0, 1, 2]);
    }

    fn masked_pattern() -> impl Strategy<Value = Pattern> {
        prop::collection::vec((any::<u8>(), prop_oneof![Just(0xffu8), Just(0x00u8), Just(0xf8u8)]), 1..5)
            .prop_map(|entries| {
                let (value, mask) = entries.into_iter().unzip();
                Pattern::new(value, mask, Vec::new())
            })
    }

    proptest! {
        #[test]
        fn prop_find_agrees_with_naive_scan(
            pattern in masked_pattern(),
            data in prop::collection::vec(prop_oneof![Just(0x90u8), Just(0x74u8), any::<u8>()], 0..64),
        ) {
            prop_assert_eq!(pattern.find(&data), find_naive(&pattern, &data));
        }

        #[test]
        fn prop_find_all_is_exhaustive_and_deterministic(
            pattern in masked_pattern(),
            data in prop::collection::vec(prop_oneof![Just(0x90u8), Just(0x74u8), any::<u8>()], 0..64),
        ) {
            let first: Vec<usize> = pattern.find_all(&data).collect();
            let second: Vec<usize> = pattern.find_all(&data).collect();

            prop_assert_eq!(&first, &second);
            prop_assert!(first.windows(2).all(|w| w[0] < w[1]));
            prop_assert_eq!(first, find_all_naive(&pattern, &data));
        }
    }
}
