//! Four-state visibility cycle used by the twinkling starfield.

/// Visibility phase of a star. The cycle has no terminal state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FadeState {
    Hidden,
    FadingIn,
    Visible,
    FadingOut,
}

impl FadeState {
    pub fn next(self) -> Self {
        match self {
            FadeState::Hidden => FadeState::FadingIn,
            FadeState::FadingIn => FadeState::Visible,
            FadeState::Visible => FadeState::FadingOut,
            FadeState::FadingOut => FadeState::Hidden,
        }
    }
}

/// Progress is accumulated `speed` per tick; fades complete at 1, hidden and
/// visible spans complete at their own durations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FadeCycle {
    state: FadeState,
    progress: f64,
    speed: f64,
    hidden_for: f64,
    visible_for: f64,
    delay: f64,
}

const MIN_SPEED: f64 = 1e-4;

impl FadeCycle {
    pub fn new(state: FadeState, speed: f64, hidden_for: f64, visible_for: f64) -> Self {
        let progress = if state == FadeState::Visible { 1.0 } else { 0.0 };
        Self {
            state,
            progress,
            speed: speed.max(MIN_SPEED),
            hidden_for: hidden_for.max(0.0),
            visible_for: visible_for.max(0.0),
            delay: 0.0,
        }
    }

    /// Hold the cycle until `delay` seconds have elapsed.
    pub fn delayed(self, delay: f64) -> Self {
        Self {
            delay: delay.max(0.0),
            ..self
        }
    }

    pub fn state(&self) -> FadeState {
        self.state
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn is_hidden(&self) -> bool {
        self.state == FadeState::Hidden
    }

    fn span(&self) -> f64 {
        match self.state {
            FadeState::Hidden => self.hidden_for,
            FadeState::FadingIn | FadeState::FadingOut => 1.0,
            FadeState::Visible => self.visible_for,
        }
    }

    /// One tick. Returns whether anything draw-relevant changed.
    pub fn advance(&mut self, elapsed: f64) -> bool {
        if elapsed < self.delay {
            return false;
        }
        self.progress += self.speed;
        if self.progress >= self.span() {
            self.progress = 0.0;
            self.state = self.state.next();
        }
        true
    }

    pub fn opacity_factor(&self) -> f64 {
        match self.state {
            FadeState::Hidden => 0.0,
            FadeState::FadingIn => self.progress.min(1.0),
            FadeState::Visible => 1.0,
            FadeState::FadingOut => 1.0 - self.progress.min(1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn runs_through_all_states_repeatedly() {
        for start in [
            FadeState::Hidden,
            FadeState::FadingIn,
            FadeState::Visible,
            FadeState::FadingOut,
        ] {
            let mut cycle = FadeCycle::new(start, 0.01, 1.5, 3.0);
            let mut entered: HashMap<FadeState, u32> = HashMap::new();
            let mut last = cycle.state();
            for _ in 0..10_000 {
                cycle.advance(100.0);
                if cycle.state() != last {
                    assert_eq!(cycle.state(), last.next());
                    *entered.entry(cycle.state()).or_default() += 1;
                    last = cycle.state();
                }
            }
            assert_eq!(entered.len(), 4, "start {start:?}: {entered:?}");
            assert!(entered.values().all(|n| *n >= 2));
        }
    }

    #[test]
    fn delay_holds_state() {
        let mut cycle = FadeCycle::new(FadeState::Hidden, 0.5, 0.0, 1.0).delayed(2.0);
        assert!(!cycle.advance(1.9));
        assert_eq!(cycle.state(), FadeState::Hidden);
        assert!(cycle.advance(2.0));
        assert_eq!(cycle.state(), FadeState::FadingIn);
    }

    #[test]
    fn opacity_interpolates() {
        let mut cycle = FadeCycle::new(FadeState::FadingIn, 0.25, 1.0, 1.0);
        assert_eq!(cycle.opacity_factor(), 0.0);
        cycle.advance(0.0);
        cycle.advance(0.0);
        assert!((cycle.opacity_factor() - 0.5).abs() < 1e-12);
        cycle.advance(0.0);
        cycle.advance(0.0);
        assert_eq!(cycle.state(), FadeState::Visible);
        assert_eq!(cycle.opacity_factor(), 1.0);
    }

    #[test]
    fn zero_speed_still_cycles() {
        let mut cycle = FadeCycle::new(FadeState::FadingOut, 0.0, 0.0, 0.0);
        let mut seen_hidden = false;
        for _ in 0..20_000 {
            cycle.advance(0.0);
            seen_hidden |= cycle.is_hidden();
        }
        assert!(seen_hidden);
    }
}
