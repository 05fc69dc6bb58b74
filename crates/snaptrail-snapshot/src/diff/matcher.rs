//! Longest-matching-block sequence matcher.
//!
//! Finds the longest contiguous matching block, then recurses on the pieces
//! to its left and right. The resulting matching blocks drive both the line
//! diff (via opcodes) and the character similarity ratio.
//!
//! With `autojunk` enabled, elements of `b` that occur in more than 1% of a
//! sequence of 200 or more elements are never used to start a match. They can
//! still extend one.

use std::collections::HashMap;
use std::hash::Hash;

/// Sequences shorter than this never have popular elements pruned.
const AUTOJUNK_MIN_LEN: usize = 200;

/// A matching block: `a[a..a + size] == b[b..b + size]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub a: usize,
    pub b: usize,
    pub size: usize,
}

/// Edit operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Equal,
    Replace,
    Delete,
    Insert,
}

/// One step of an edit script: turn `a[a_start..a_end]` into `b[b_start..b_end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    pub tag: Tag,
    pub a_start: usize,
    pub a_end: usize,
    pub b_start: usize,
    pub b_end: usize,
}

impl Opcode {
    fn new(tag: Tag, a_start: usize, a_end: usize, b_start: usize, b_end: usize) -> Self {
        Self {
            tag,
            a_start,
            a_end,
            b_start,
            b_end,
        }
    }
}

/// Compares two sequences of hashable elements.
pub struct SequenceMatcher<'a, T> {
    a: &'a [T],
    b: &'a [T],
    b2j: HashMap<&'a T, Vec<usize>>,
}

impl<'a, T: Eq + Hash> SequenceMatcher<'a, T> {
    /// Create a matcher with popular-element pruning enabled.
    pub fn new(a: &'a [T], b: &'a [T]) -> Self {
        Self::with_autojunk(a, b, true)
    }

    /// Create a matcher, choosing whether popular elements are pruned.
    pub fn with_autojunk(a: &'a [T], b: &'a [T], autojunk: bool) -> Self {
        let mut b2j: HashMap<&'a T, Vec<usize>> = HashMap::new();
        for (j, elt) in b.iter().enumerate() {
            b2j.entry(elt).or_default().push(j);
        }

        if autojunk && b.len() >= AUTOJUNK_MIN_LEN {
            let limit = b.len() / 100 + 1;
            b2j.retain(|_, indices| indices.len() <= limit);
        }

        Self { a, b, b2j }
    }

    /// Longest matching block in `a[alo..ahi]` and `b[blo..bhi]`.
    ///
    /// Ties resolve to the block starting earliest in `a`, then earliest in `b`.
    pub fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> Match {
        let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0usize);

        // j2len[j] = length of the match ending at a[i - 1] and b[j]
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        for i in alo..ahi {
            let mut next_j2len = HashMap::new();
            if let Some(indices) = self.b2j.get(&self.a[i]) {
                for &j in indices {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| j2len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next_j2len.insert(j, k);
                    if k > best_size {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_size = k;
                    }
                }
            }
            j2len = next_j2len;
        }

        // Grow across elements the index skipped.
        while best_i > alo && best_j > blo && self.a[best_i - 1] == self.b[best_j - 1] {
            best_i -= 1;
            best_j -= 1;
            best_size += 1;
        }
        while best_i + best_size < ahi
            && best_j + best_size < bhi
            && self.a[best_i + best_size] == self.b[best_j + best_size]
        {
            best_size += 1;
        }

        Match {
            a: best_i,
            b: best_j,
            size: best_size,
        }
    }

    /// All matching blocks in order, adjacent blocks collapsed, terminated by
    /// a zero-size sentinel at `(a.len(), b.len())`.
    pub fn matching_blocks(&self) -> Vec<Match> {
        let (la, lb) = (self.a.len(), self.b.len());
        let mut pending = vec![(0, la, 0, lb)];
        let mut found = Vec::new();

        while let Some((alo, ahi, blo, bhi)) = pending.pop() {
            let m = self.find_longest_match(alo, ahi, blo, bhi);
            if m.size == 0 {
                continue;
            }
            if alo < m.a && blo < m.b {
                pending.push((alo, m.a, blo, m.b));
            }
            if m.a + m.size < ahi && m.b + m.size < bhi {
                pending.push((m.a + m.size, ahi, m.b + m.size, bhi));
            }
            found.push(m);
        }
        found.sort_by_key(|m| (m.a, m.b));

        let mut blocks: Vec<Match> = Vec::with_capacity(found.len() + 1);
        for m in found {
            match blocks.last_mut() {
                Some(last) if last.a + last.size == m.a && last.b + last.size == m.b => {
                    last.size += m.size;
                }
                _ => blocks.push(m),
            }
        }
        blocks.push(Match {
            a: la,
            b: lb,
            size: 0,
        });
        blocks
    }

    /// Edit script turning `a` into `b`.
    pub fn opcodes(&self) -> Vec<Opcode> {
        let (mut i, mut j) = (0, 0);
        let mut codes = Vec::new();

        for m in self.matching_blocks() {
            let tag = match (i < m.a, j < m.b) {
                (true, true) => Some(Tag::Replace),
                (true, false) => Some(Tag::Delete),
                (false, true) => Some(Tag::Insert),
                (false, false) => None,
            };
            if let Some(tag) = tag {
                codes.push(Opcode::new(tag, i, m.a, j, m.b));
            }
            i = m.a + m.size;
            j = m.b + m.size;
            if m.size > 0 {
                codes.push(Opcode::new(Tag::Equal, m.a, i, m.b, j));
            }
        }
        codes
    }

    /// Opcodes grouped into hunks with up to `context` equal elements around
    /// each change. Changes separated by at most `2 * context` equal elements
    /// share a group.
    pub fn grouped_opcodes(&self, context: usize) -> Vec<Vec<Opcode>> {
        let mut codes = self.opcodes();
        if codes.is_empty() {
            codes.push(Opcode::new(Tag::Equal, 0, 1, 0, 1));
        }

        if let Some(first) = codes.first_mut() {
            if first.tag == Tag::Equal {
                first.a_start = first.a_start.max(first.a_end.saturating_sub(context));
                first.b_start = first.b_start.max(first.b_end.saturating_sub(context));
            }
        }
        if let Some(last) = codes.last_mut() {
            if last.tag == Tag::Equal {
                last.a_end = last.a_end.min(last.a_start + context);
                last.b_end = last.b_end.min(last.b_start + context);
            }
        }

        let span = context * 2;
        let mut groups = Vec::new();
        let mut group = Vec::new();
        for mut code in codes {
            if code.tag == Tag::Equal && code.a_end - code.a_start > span {
                group.push(Opcode::new(
                    Tag::Equal,
                    code.a_start,
                    code.a_end.min(code.a_start + context),
                    code.b_start,
                    code.b_end.min(code.b_start + context),
                ));
                groups.push(std::mem::take(&mut group));
                code.a_start = code.a_start.max(code.a_end.saturating_sub(context));
                code.b_start = code.b_start.max(code.b_end.saturating_sub(context));
            }
            group.push(code);
        }

        let only_equal = group.len() == 1 && group[0].tag == Tag::Equal;
        if !group.is_empty() && !only_equal {
            groups.push(group);
        }
        groups
    }

    /// Similarity in `[0, 1]`: `2 * M / T`, where `M` is the number of matched
    /// elements and `T` the combined length. Two empty sequences are identical.
    pub fn ratio(&self) -> f64 {
        let total = self.a.len() + self.b.len();
        if total == 0 {
            return 1.0;
        }
        let matched: usize = self.matching_blocks().iter().map(|m| m.size).sum();
        2.0 * matched as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn longest_match_prefers_earliest() {
        let a = chars(" abcd");
        let b = chars("abcd abcd");
        let m = SequenceMatcher::new(&a, &b).find_longest_match(0, 5, 0, 9);
        assert_eq!(m, Match { a: 0, b: 4, size: 5 });
    }

    #[test]
    fn matching_blocks_end_with_sentinel() {
        let a = chars("abxcd");
        let b = chars("abcd");
        let blocks = SequenceMatcher::new(&a, &b).matching_blocks();
        assert_eq!(
            blocks,
            vec![
                Match { a: 0, b: 0, size: 2 },
                Match { a: 3, b: 2, size: 2 },
                Match { a: 5, b: 4, size: 0 },
            ]
        );
    }

    #[test]
    fn opcodes_describe_edit_script() {
        let a = chars("qabxcd");
        let b = chars("abycdf");
        let tags: Vec<Tag> = SequenceMatcher::new(&a, &b)
            .opcodes()
            .iter()
            .map(|op| op.tag)
            .collect();
        assert_eq!(
            tags,
            vec![Tag::Delete, Tag::Equal, Tag::Replace, Tag::Equal, Tag::Insert]
        );
    }

    #[test]
    fn ratio_matches_known_values() {
        let a = chars("abcd");
        let b = chars("bcde");
        assert!((SequenceMatcher::new(&a, &b).ratio() - 0.75).abs() < 1e-9);

        let empty: Vec<char> = Vec::new();
        assert_eq!(SequenceMatcher::new(&empty, &empty).ratio(), 1.0);
        assert_eq!(SequenceMatcher::new(&a, &empty).ratio(), 0.0);
    }

    #[test]
    fn grouped_opcodes_split_distant_changes() {
        let a: Vec<String> = (1..=20).map(|i| format!("line {i}")).collect();
        let mut b = a.clone();
        b[1] = "changed 2".to_string();
        b[17] = "changed 18".to_string();

        let groups = SequenceMatcher::new(&a, &b).grouped_opcodes(3);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].first().unwrap().a_start, 0);
        assert_eq!(groups[0].last().unwrap().a_end, 5);
        assert_eq!(groups[1].first().unwrap().a_start, 14);
        assert_eq!(groups[1].last().unwrap().a_end, 20);
    }

    #[test]
    fn grouped_opcodes_merge_nearby_changes() {
        let a: Vec<&str> = vec!["a", "b", "c", "d", "e", "f", "g", "h"];
        let b: Vec<&str> = vec!["a", "B", "c", "d", "e", "f", "G", "h"];
        let groups = SequenceMatcher::new(&a, &b).grouped_opcodes(3);
        assert_eq!(groups.len(), 1);
    }

    #[test]
    fn identical_sequences_have_no_groups() {
        let a = vec!["x", "y"];
        assert!(SequenceMatcher::new(&a, &a).grouped_opcodes(3).is_empty());
        let empty: Vec<&str> = Vec::new();
        assert!(SequenceMatcher::new(&empty, &empty)
            .grouped_opcodes(3)
            .is_empty());
    }

    #[test]
    fn autojunk_prunes_popular_elements_only_for_long_inputs() {
        let mut b = vec!['x'; 250];
        b.push('y');
        let a = b.clone();
        let with = SequenceMatcher::with_autojunk(&a, &b, true);
        assert!(!with.b2j.contains_key(&'x'));
        // Popular elements still extend a match seeded elsewhere.
        assert!((with.ratio() - 1.0).abs() < 1e-9);

        let without = SequenceMatcher::with_autojunk(&a, &b, false);
        assert!(without.b2j.contains_key(&'x'));
    }
}
