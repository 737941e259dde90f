use std::cell::Cell;
use std::rc::Rc;

/// Live GPU resource counts shared by everything that creates programs on one
/// graphics context. Clones observe and update the same counters.
#[derive(Debug, Clone, Default)]
pub struct MemoryStats {
    programs: Rc<Cell<u32>>,
}

impl MemoryStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of compiled programs currently alive.
    pub fn programs(&self) -> u32 {
        self.programs.get()
    }

    pub(crate) fn program_created(&self) {
        self.programs.set(self.programs.get() + 1);
    }

    pub(crate) fn program_destroyed(&self) {
        let count = self.programs.get();
        if count == 0 {
            log::warn!("Program counter would drop below zero; ignoring");
            return;
        }
        self.programs.set(count - 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_counters() {
        let stats = MemoryStats::new();
        let shared = stats.clone();

        stats.program_created();
        shared.program_created();
        assert_eq!(stats.programs(), 2);

        shared.program_destroyed();
        assert_eq!(stats.programs(), 1);
    }

    #[test]
    fn counter_never_underflows() {
        let stats = MemoryStats::new();
        stats.program_destroyed();
        assert_eq!(stats.programs(), 0);
    }
}
