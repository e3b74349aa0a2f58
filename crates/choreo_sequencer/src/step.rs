// SPDX-License-Identifier: MIT OR Apache-2.0
//! A single timed tween inside a track.

use crate::ease::Ease;
use crate::error::ChoreoError;
use crate::property::PropertyMap;
use crate::scene::TargetId;
use std::str::FromStr;

/// Direction of a tween
#[derive(Debug, Clone, PartialEq)]
pub enum TweenKind {
    /// Animate from the element's current values to the step's values
    To,
    /// Animate from the step's values back to the element's current values
    From,
    /// Animate from explicit start values to the step's values
    FromTo(PropertyMap),
}

/// Where a step starts relative to the rest of its track
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Position {
    /// Right after the previous step ends
    #[default]
    Sequential,
    /// Previous step's end plus an offset (`"+=0.2"`, `"-=0.4"`)
    Offset(f32),
    /// Same start as the previous step (`"<"`)
    WithPrevious,
    /// Absolute time in seconds
    At(f32),
}

impl FromStr for Position {
    type Err = ChoreoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || ChoreoError::InvalidPosition(s.to_string());

        if s.is_empty() {
            return Ok(Position::Sequential);
        }
        if s == "<" {
            return Ok(Position::WithPrevious);
        }
        if let Some(rest) = s.strip_prefix("+=") {
            return rest.parse().map(Position::Offset).map_err(|_| invalid());
        }
        if let Some(rest) = s.strip_prefix("-=") {
            return rest
                .parse::<f32>()
                .map(|v| Position::Offset(-v))
                .map_err(|_| invalid());
        }
        s.parse::<f32>()
            .ok()
            .filter(|t| *t >= 0.0)
            .map(Position::At)
            .ok_or_else(invalid)
    }
}

/// How often a step plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Repeat {
    /// Play once
    #[default]
    Never,
    /// Extra iterations after the first
    Count(u32),
    /// Never finishes
    Forever,
}

/// An immutable tween description
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    targets: Vec<TargetId>,
    kind: TweenKind,
    properties: PropertyMap,
    duration: f32,
    ease: Ease,
    position: Position,
    delay: f32,
    stagger: f32,
    repeat: Repeat,
    yoyo: bool,
    label: Option<String>,
}

impl Step {
    fn new(targets: impl Into<Vec<TargetId>>, kind: TweenKind, properties: PropertyMap) -> Self {
        Self {
            targets: targets.into(),
            kind,
            properties,
            duration: 0.5,
            ease: Ease::default(),
            position: Position::Sequential,
            delay: 0.0,
            stagger: 0.0,
            repeat: Repeat::Never,
            yoyo: false,
            label: None,
        }
    }

    /// Tween from current values to `properties`
    pub fn to(targets: impl Into<Vec<TargetId>>, properties: PropertyMap) -> Self {
        Self::new(targets, TweenKind::To, properties)
    }

    /// Tween from `properties` to current values
    pub fn from(targets: impl Into<Vec<TargetId>>, properties: PropertyMap) -> Self {
        Self::new(targets, TweenKind::From, properties)
    }

    /// Tween from `from` to `to`
    pub fn from_to(targets: impl Into<Vec<TargetId>>, from: PropertyMap, to: PropertyMap) -> Self {
        Self::new(targets, TweenKind::FromTo(from), to)
    }

    /// An empty step that only occupies time
    pub fn hold(duration: f32) -> Self {
        Self::new(Vec::new(), TweenKind::To, PropertyMap::new()).duration(duration)
    }

    /// Set the duration in seconds
    pub fn duration(mut self, seconds: f32) -> Self {
        self.duration = seconds.max(0.0);
        self
    }

    /// Set the ease
    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    /// Set the position parameter
    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    /// Set a start delay in seconds
    pub fn delay(mut self, seconds: f32) -> Self {
        self.delay = seconds.max(0.0);
        self
    }

    /// Spacing between consecutive targets' start times
    pub fn stagger(mut self, seconds: f32) -> Self {
        self.stagger = seconds.max(0.0);
        self
    }

    /// Repeat behaviour
    pub fn repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    /// Reverse direction on every other iteration
    pub fn yoyo(mut self, yoyo: bool) -> Self {
        self.yoyo = yoyo;
        self
    }

    /// Name used in logs and completion records
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Animated elements
    pub fn targets(&self) -> &[TargetId] {
        &self.targets
    }

    /// Tween direction
    pub fn kind(&self) -> &TweenKind {
        &self.kind
    }

    /// End values (or start values for `From`)
    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    /// Ease curve
    pub fn easing(&self) -> Ease {
        self.ease
    }

    /// Position parameter
    pub fn position(&self) -> Position {
        self.position
    }

    /// Optional label
    pub fn label_text(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Time one target spends animating, from its own start
    pub fn target_span(&self) -> f32 {
        match self.repeat {
            Repeat::Forever => f32::INFINITY,
            Repeat::Never => self.duration,
            Repeat::Count(n) => self.duration * (n as f32 + 1.0),
        }
    }

    /// Offset of the `index`-th target's start from the step's start
    pub fn target_offset(&self, index: usize) -> f32 {
        self.delay + self.stagger * index as f32
    }

    /// Time from the step's start until its last target finishes
    pub fn span(&self) -> f32 {
        let last = self.targets.len().saturating_sub(1);
        self.target_offset(last) + self.target_span()
    }

    /// Linear progress of one target at `elapsed` seconds after its own start,
    /// with repeats and yoyo folded in. Returns `None` before the start.
    pub fn local_progress(&self, elapsed: f32) -> Option<f32> {
        if elapsed < 0.0 {
            return None;
        }
        if self.duration <= 0.0 {
            return Some(1.0);
        }

        let iterations = match self.repeat {
            Repeat::Never => 1.0,
            Repeat::Count(n) => n as f32 + 1.0,
            Repeat::Forever => f32::INFINITY,
        };

        let (iteration, t) = if elapsed >= self.duration * iterations {
            (iterations - 1.0, 1.0)
        } else {
            let iteration = (elapsed / self.duration).floor();
            (iteration, (elapsed - iteration * self.duration) / self.duration)
        };

        let backwards = self.yoyo && iteration % 2.0 == 1.0;
        Some(if backwards { 1.0 - t } else { t })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::Property;

    fn fade() -> PropertyMap {
        PropertyMap::new().with(Property::Opacity, 0.0)
    }

    #[test]
    fn parses_positions() {
        assert_eq!("".parse::<Position>().unwrap(), Position::Sequential);
        assert_eq!("<".parse::<Position>().unwrap(), Position::WithPrevious);
        assert_eq!("+=0.2".parse::<Position>().unwrap(), Position::Offset(0.2));
        assert_eq!("-=0.4".parse::<Position>().unwrap(), Position::Offset(-0.4));
        assert_eq!("1.5".parse::<Position>().unwrap(), Position::At(1.5));
        assert!("soon".parse::<Position>().is_err());
        assert!("-1".parse::<Position>().is_err());
    }

    #[test]
    fn span_includes_stagger_and_delay() {
        let targets = vec![TargetId(0), TargetId(1), TargetId(2)];
        let step = Step::from(targets, fade())
            .duration(1.4)
            .stagger(0.3)
            .delay(0.1);
        assert!((step.span() - (0.1 + 0.6 + 1.4)).abs() < 1e-6);
        assert!((step.target_offset(1) - 0.4).abs() < 1e-6);
    }

    #[test]
    fn repeats_extend_the_span() {
        let step = Step::to(vec![TargetId(0)], fade())
            .duration(1.5)
            .repeat(Repeat::Count(2));
        assert!((step.span() - 4.5).abs() < 1e-6);

        let forever = Step::to(vec![TargetId(0)], fade()).repeat(Repeat::Forever);
        assert!(forever.span().is_infinite());
    }

    #[test]
    fn yoyo_runs_odd_iterations_backwards() {
        let step = Step::to(vec![TargetId(0)], fade())
            .duration(1.0)
            .repeat(Repeat::Forever)
            .yoyo(true);
        assert_eq!(step.local_progress(0.25), Some(0.25));
        assert_eq!(step.local_progress(1.25), Some(0.75));
        assert_eq!(step.local_progress(2.25), Some(0.25));
        assert_eq!(step.local_progress(-0.1), None);
    }

    #[test]
    fn finished_steps_hold_their_end() {
        let step = Step::to(vec![TargetId(0)], fade()).duration(1.0);
        assert_eq!(step.local_progress(3.0), Some(1.0));

        let instant = Step::to(vec![TargetId(0)], fade()).duration(0.0);
        assert_eq!(instant.local_progress(0.0), Some(1.0));
    }
}
