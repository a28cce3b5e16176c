/// Repeat-on-hold: one primitive for every action that keeps firing while
/// its input stays down (cycling, digging, weapon damage, flashlight and
/// chest toggles).
///
/// Fires on the first held tick, then once every `interval` ticks for as
/// long as the input is held. Releasing resets the cadence, so a fresh
/// press always fires immediately.

#[derive(Clone, Copy, Debug)]
pub struct RepeatOnHold {
    interval: u32,
    held_ticks: u32,
}

impl RepeatOnHold {
    pub const fn new(interval: u32) -> Self {
        RepeatOnHold { interval: if interval == 0 { 1 } else { interval }, held_ticks: 0 }
    }

    /// Feed this tick's input state. Returns true when the action fires.
    pub fn tick(&mut self, held: bool) -> bool {
        if !held {
            self.held_ticks = 0;
            return false;
        }
        let fire = self.held_ticks % self.interval == 0;
        self.held_ticks = self.held_ticks.wrapping_add(1);
        fire
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fire_ticks(r: &mut RepeatOnHold, pattern: &[bool]) -> Vec<usize> {
        pattern
            .iter()
            .enumerate()
            .filter_map(|(i, &held)| r.tick(held).then_some(i))
            .collect()
    }

    #[test]
    fn fires_first_tick_then_every_interval() {
        let mut r = RepeatOnHold::new(40);
        let fired = fire_ticks(&mut r, &[true; 121]);
        assert_eq!(fired, vec![0, 40, 80, 120]);
    }

    #[test]
    fn release_resets_cadence() {
        let mut r = RepeatOnHold::new(10);
        let mut pattern = vec![true; 5];
        pattern.push(false);
        pattern.extend([true; 3]);
        assert_eq!(fire_ticks(&mut r, &pattern), vec![0, 6]);
    }

    #[test]
    fn never_fires_when_idle() {
        let mut r = RepeatOnHold::new(1);
        assert!(fire_ticks(&mut r, &[false; 20]).is_empty());
    }

    #[test]
    fn zero_interval_behaves_as_every_tick() {
        let mut r = RepeatOnHold::new(0);
        assert_eq!(r.interval(), 1);
        assert_eq!(fire_ticks(&mut r, &[true; 3]), vec![0, 1, 2]);
    }
}
