use crate::config::params::{PARAM_COUNT, Param};
use crate::config::store::ConfigStore;
use crate::foundation::error::{DepthflowError, DepthflowResult};
use crate::foundation::math::round_decimals;

// Decimal places kept after each step. Removes float drift without swallowing slow speeds.
const SNAP_PLACES: i32 = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Self::Up => 1.0,
            Self::Down => -1.0,
        }
    }

    #[inline]
    pub fn flipped(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }
}

/// Triangle-wave state of one looping parameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LoopState {
    pub speed: f64,
    pub range_min: f64,
    pub range_max: f64,
    pub direction: Direction,
}

impl LoopState {
    fn for_param(param: Param) -> Self {
        let spec = param.spec();
        Self {
            speed: 1.0,
            range_min: spec.min,
            range_max: spec.max,
            direction: Direction::Up,
        }
    }

    /// Next value from `current`, flipping direction when a bound is crossed.
    fn step(&mut self, current: f64, step: f64) -> f64 {
        let next = round_decimals(
            current + step * self.speed * self.direction.sign(),
            SNAP_PLACES,
        );
        if next > self.range_max {
            self.direction = self.direction.flipped();
            self.range_max
        } else if next < self.range_min {
            self.direction = self.direction.flipped();
            self.range_min
        } else {
            next
        }
    }
}

/// Set of independently looping parameters.
///
/// The engine holds only loop bookkeeping. Values live in the [`ConfigStore`], so a tick and
/// a user edit of the same parameter are both plain slot writes and the last one wins.
#[derive(Clone, Debug)]
pub struct LoopEngine {
    states: [Option<LoopState>; PARAM_COUNT],
}

impl Default for LoopEngine {
    fn default() -> Self {
        Self {
            states: [None; PARAM_COUNT],
        }
    }
}

impl LoopEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) looping over the full declared range at speed 1, moving up.
    pub fn enable(&mut self, param: Param) {
        self.states[param.index()] = Some(LoopState::for_param(param));
        tracing::debug!(%param, "loop enabled");
    }

    /// Stop looping; the parameter keeps its current value.
    pub fn disable(&mut self, param: Param) {
        if self.states[param.index()].take().is_some() {
            tracing::debug!(%param, "loop disabled");
        }
    }

    pub fn toggle(&mut self, param: Param) {
        if self.is_active(param) {
            self.disable(param);
        } else {
            self.enable(param);
        }
    }

    pub fn set_speed(&mut self, param: Param, speed: f64) -> DepthflowResult<()> {
        if !speed.is_finite() || speed <= 0.0 {
            return Err(DepthflowError::config(format!(
                "loop speed for {param} must be finite and > 0, got {speed}"
            )));
        }
        self.active_state_mut(param)?.speed = speed;
        Ok(())
    }

    /// Narrow the loop range. The current value is left alone; the next tick clamps it.
    pub fn set_range(&mut self, param: Param, min: f64, max: f64) -> DepthflowResult<()> {
        let spec = param.spec();
        if !(min.is_finite() && max.is_finite() && spec.min <= min && min <= max && max <= spec.max)
        {
            return Err(DepthflowError::config(format!(
                "loop range [{min}, {max}] for {param} must lie within [{}, {}] with min <= max",
                spec.min, spec.max
            )));
        }
        let state = self.active_state_mut(param)?;
        state.range_min = min;
        state.range_max = max;
        Ok(())
    }

    /// Drop every loop and restore every parameter to its default.
    pub fn reset_all(&mut self, store: &ConfigStore) {
        self.states = [None; PARAM_COUNT];
        store.reset();
        tracing::debug!("loops cleared, config reset");
    }

    /// Advance every active loop by one step. Returns how many parameters moved.
    pub fn tick(&mut self, store: &ConfigStore) -> DepthflowResult<usize> {
        let mut advanced = 0;
        for param in Param::ALL {
            let Some(state) = self.states[param.index()].as_mut() else {
                continue;
            };
            let next = state.step(store.get(param), param.spec().step);
            store.set(param, next)?;
            advanced += 1;
        }
        Ok(advanced)
    }

    #[inline]
    pub fn is_active(&self, param: Param) -> bool {
        self.states[param.index()].is_some()
    }

    pub fn state(&self, param: Param) -> Option<LoopState> {
        self.states[param.index()]
    }

    /// Active loops in parameter order.
    pub fn active(&self) -> impl Iterator<Item = (Param, LoopState)> + '_ {
        Param::ALL
            .into_iter()
            .filter_map(|p| self.states[p.index()].map(|s| (p, s)))
    }

    fn active_state_mut(&mut self, param: Param) -> DepthflowResult<&mut LoopState> {
        self.states[param.index()]
            .as_mut()
            .ok_or_else(|| DepthflowError::config(format!("{param} is not looping")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/loops.rs"]
mod tests;
