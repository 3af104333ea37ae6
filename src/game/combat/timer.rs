// Relative-time scheduled actions, drained against the simulation clock

/// Pending actions ordered by the time they fire
#[derive(Debug, Clone)]
pub struct Scheduler<A> {
    /// (fire_at, sequence, action); sequence keeps same-time actions in schedule order
    entries: Vec<(f32, u64, A)>,
    next_sequence: u64,
}

impl<A> Default for Scheduler<A> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_sequence: 0,
        }
    }
}

impl<A> Scheduler<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `action` once the clock reaches `now + delay`
    pub fn schedule(&mut self, now: f32, delay: f32, action: A) {
        self.entries.push((now + delay.max(0.0), self.next_sequence, action));
        self.next_sequence += 1;
    }

    /// Remove and return every action due at `now`, earliest first
    pub fn drain_due(&mut self, now: f32) -> Vec<A> {
        let mut due = Vec::new();
        let mut pending = Vec::with_capacity(self.entries.len());
        for entry in self.entries.drain(..) {
            if entry.0 <= now {
                due.push(entry);
            } else {
                pending.push(entry);
            }
        }
        self.entries = pending;

        due.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        due.into_iter().map(|(_, _, action)| action).collect()
    }

    /// Keep only actions matching `keep`
    pub fn retain(&mut self, mut keep: impl FnMut(&A) -> bool) {
        self.entries.retain(|(_, _, action)| keep(action));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actions_fire_in_time_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(0.0, 1.0, "release");
        scheduler.schedule(0.0, 0.4, "hit");

        assert!(scheduler.drain_due(0.3).is_empty());
        assert_eq!(scheduler.drain_due(0.5), vec!["hit"]);
        assert_eq!(scheduler.len(), 1);
        assert_eq!(scheduler.drain_due(2.0), vec!["release"]);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_same_time_keeps_schedule_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(1.0, 0.0, 1);
        scheduler.schedule(1.0, 0.0, 2);
        scheduler.schedule(0.5, 0.5, 3);
        assert_eq!(scheduler.drain_due(1.0), vec![1, 2, 3]);
    }

    #[test]
    fn test_retain_drops_actions() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(0.0, 1.0, 7u32);
        scheduler.schedule(0.0, 1.0, 8u32);
        scheduler.retain(|id| *id != 7);
        assert_eq!(scheduler.drain_due(1.0), vec![8]);
    }
}
