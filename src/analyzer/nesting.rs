use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LoopKind {
    While,
    DoWhile,
    For,
}

impl fmt::Display for LoopKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LoopKind::While => "while",
            LoopKind::DoWhile => "do-while",
            LoopKind::For => "for",
        })
    }
}

/// A loop that started while another loop was still open.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NestedLoop {
    pub outer: LoopKind,
    pub outer_line: usize,
    pub inner: LoopKind,
    pub inner_line: usize,
    /// Number of loops open once `inner` has started, so at least 2.
    pub depth: usize,
}

#[derive(Clone, Debug, Default)]
pub struct LoopTracker {
    active: Vec<(LoopKind, usize)>,
    nested: Vec<NestedLoop>,
}

impl LoopTracker {
    pub fn enter(&mut self, kind: LoopKind, line: usize) {
        if let Some(&(outer, outer_line)) = self.active.last() {
            self.nested.push(NestedLoop {
                outer,
                outer_line,
                inner: kind,
                inner_line: line,
                depth: self.active.len() + 1,
            });
        }
        self.active.push((kind, line));
    }

    pub fn exit(&mut self) {
        self.active.pop();
    }

    pub fn depth(&self) -> usize {
        self.active.len()
    }

    pub fn into_report(self) -> NestingReport {
        NestingReport {
            nested: self.nested,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NestingReport {
    pub nested: Vec<NestedLoop>,
}

impl NestingReport {
    pub fn is_empty(&self) -> bool {
        self.nested.is_empty()
    }

    /// `(outer, inner, count)` in order of first appearance.
    pub fn combinations(&self) -> Vec<(LoopKind, LoopKind, usize)> {
        let mut combinations: Vec<(LoopKind, LoopKind, usize)> = vec![];
        for entry in &self.nested {
            match combinations
                .iter_mut()
                .find(|(outer, inner, _)| *outer == entry.outer && *inner == entry.inner)
            {
                Some((_, _, count)) => *count += 1,
                None => combinations.push((entry.outer, entry.inner, 1)),
            }
        }
        combinations
    }

    pub fn max_depth(&self) -> usize {
        self.nested.iter().map(|entry| entry.depth).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_loops_are_not_nested() {
        let mut tracker = LoopTracker::default();
        tracker.enter(LoopKind::While, 1);
        tracker.exit();
        tracker.enter(LoopKind::For, 2);
        tracker.exit();
        assert_eq!(tracker.depth(), 0);
        assert!(tracker.into_report().is_empty());
    }

    #[test]
    fn test_depth_and_combinations() {
        let mut tracker = LoopTracker::default();
        tracker.enter(LoopKind::While, 1);
        tracker.enter(LoopKind::For, 2);
        tracker.enter(LoopKind::For, 3);
        tracker.exit();
        tracker.exit();
        tracker.enter(LoopKind::For, 5);
        tracker.exit();
        tracker.exit();

        let report = tracker.into_report();
        assert_eq!(report.nested.len(), 3);
        assert_eq!(
            report.nested[1],
            NestedLoop {
                outer: LoopKind::For,
                outer_line: 2,
                inner: LoopKind::For,
                inner_line: 3,
                depth: 3,
            }
        );
        assert_eq!(
            report.combinations(),
            vec![
                (LoopKind::While, LoopKind::For, 2),
                (LoopKind::For, LoopKind::For, 1),
            ]
        );
        assert_eq!(report.max_depth(), 3);
    }
}
