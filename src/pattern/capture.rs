// Mon Oct 19 2026 - Alex

use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captures {
    start: usize,
    offsets: Vec<usize>,
    labels: IndexMap<String, usize>,
}

impl Captures {
    pub(crate) fn new(start: usize) -> Self {
        Self {
            start,
            offsets: Vec::new(),
            labels: IndexMap::new(),
        }
    }

    pub(crate) fn push(&mut self, label: Option<&str>, offset: usize) {
        if let Some(label) = label {
            self.labels.insert(label.to_string(), self.offsets.len());
        }
        self.offsets.push(offset);
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn nth(&self, ordinal: usize) -> Option<usize> {
        self.offsets.get(ordinal).copied()
    }

    pub fn offset(&self, label: &str) -> Option<usize> {
        self.labels.get(label).map(|&ordinal| self.offsets[ordinal])
    }

    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    pub fn named(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.labels.iter().map(|(label, &ordinal)| (label.as_str(), self.offsets[ordinal]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_label_and_ordinal() {
        let mut captures = Captures::new(16);
        captures.push(None, 17);
        captures.push(Some("tls"), 20);

        assert_eq!(captures.start(), 16);
        assert_eq!(captures.len(), 2);
        assert_eq!(captures.nth(0), Some(17));
        assert_eq!(captures.nth(1), Some(20));
        assert_eq!(captures.nth(2), None);
        assert_eq!(captures.offset("tls"), Some(20));
        assert_eq!(captures.offset("signal"), None);
        assert_eq!(captures.named().collect::<Vec<_>>(), vec![("tls", 20)]);
    }
}
