// Mon Oct 19 2026 - Alex

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mark {
    pub ordinal: usize,
    pub index: usize,
    pub label: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Pattern {
    value: Vec<u8>,
    mask: Vec<u8>,
    marks: Vec<Mark>,
    leading: usize,
    name: Option<String>,
}

impl Pattern {
    // value bits outside the mask are cleared, so 0xcc/0x00 matches anything
    pub(crate) fn new(mut value: Vec<u8>, mask: Vec<u8>, marks: Vec<Mark>) -> Self {
        assert_eq!(value.len(), mask.len(), "Pattern value and mask must have same length");
        for (v, m) in value.iter_mut().zip(mask.iter()) {
            *v &= m;
        }
        let leading = mask.iter().take_while(|&&m| m == 0xFF).count();
        Self {
            value,
            mask,
            marks,
            leading,
            name: None,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    pub fn mask(&self) -> &[u8] {
        &self.mask
    }

    pub fn marks(&self) -> &[Mark] {
        &self.marks
    }

    pub fn leading(&self) -> &[u8] {
        &self.value[..self.leading]
    }

    pub fn mark_by_label(&self, label: &str) -> Option<&Mark> {
        self.marks.iter().find(|m| m.label.as_deref() == Some(label))
    }

    pub fn matches(&self, data: &[u8]) -> bool {
        if data.len() < self.value.len() {
            return false;
        }

        self.value.iter()
            .zip(self.mask.iter())
            .zip(data.iter())
            .all(|((&value, &mask), &byte)| byte & mask == value)
    }

    pub fn to_hex_string(&self) -> String {
        let mut parts = Vec::with_capacity(self.value.len() + self.marks.len());
        let mut marks = self.marks.iter().peekable();

        for i in 0..=self.value.len() {
            while let Some(mark) = marks.next_if(|m| m.index == i) {
                match &mark.label {
                    Some(label) => parts.push(format!("*{}", label)),
                    None => parts.push("*".to_string()),
                }
            }
            if i == self.value.len() {
                break;
            }
            let part = match self.mask[i] {
                0xFF => format!("{:02x}", self.value[i]),
                0x00 => "??".to_string(),
                mask => format!("{:02x}/{:02x}", self.value[i], mask),
            };
            parts.push(part);
        }

        parts.join(" ")
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref name) = self.name {
            write!(f, "{}: ", name)?;
        }
        write!(f, "{}", self.to_hex_string())
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.mask == other.mask && self.marks == other.marks
    }
}

impl Eq for Pattern {}
