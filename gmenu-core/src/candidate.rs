//! Candidate store: the lines read from stdin, in input order.

use std::io::BufRead;
use std::ops::Index;

/// One selectable line. Never contains a newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    text: String,
}

impl Candidate {
    /// Build a candidate from a raw input line, trimming surrounding
    /// whitespace (line terminators included).
    pub fn from_line(line: &str) -> Self {
        Self {
            text: line.trim().to_string(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl AsRef<str> for Candidate {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

/// Ordered, immutable-after-load candidate list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateList {
    items: Vec<Candidate>,
}

impl CandidateList {
    /// Read every line until end of stream. Bytes that are not valid UTF-8
    /// are replaced rather than rejected.
    pub fn from_reader<R: BufRead>(mut reader: R) -> crate::Result<Self> {
        let mut items = Vec::new();
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let n = reader.read_until(b'\n', &mut buf)?;
            if n == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf);
            items.push(Candidate::from_line(&line));
        }
        tracing::info!(count = items.len(), "loaded candidates");
        Ok(Self { items })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Candidate> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
        self.items.iter()
    }
}

impl Index<usize> for CandidateList {
    type Output = Candidate;

    fn index(&self, index: usize) -> &Candidate {
        &self.items[index]
    }
}

impl<S: AsRef<str>> FromIterator<S> for CandidateList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            items: iter
                .into_iter()
                .map(|s| Candidate::from_line(s.as_ref()))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a CandidateList {
    type Item = &'a Candidate;
    type IntoIter = std::slice::Iter<'a, Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
