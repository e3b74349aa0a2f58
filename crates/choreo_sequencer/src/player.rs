// SPDX-License-Identifier: MIT OR Apache-2.0
//! Track playback onto a scene.
//!
//! A [`TrackPlayer`] owns one resolved track and renders it at a playhead
//! time. The playhead is either advanced by the frame clock (one-shot and
//! free-running tracks) or set directly from scroll progress (scrubbed
//! tracks). Rendering is a function of the playhead: the same time always
//! produces the same styles.

use crate::journal::StyleJournal;
use crate::property::{lerp, Property, PropertyMap};
use crate::scene::{Scene, TargetId};
use crate::step::TweenKind;
use crate::track::{ResolvedStep, Track};
use std::collections::HashSet;

/// One target of one step
#[derive(Debug, Clone)]
struct TweenSlot {
    step: usize,
    target: TargetId,
    start: f32,
    from: Option<PropertyMap>,
    to: PropertyMap,
}

/// Plays a track
#[derive(Debug)]
pub struct TrackPlayer {
    track: Track,
    schedule: Vec<ResolvedStep>,
    slots: Vec<TweenSlot>,
    duration: f32,
    time: f32,
    completed_steps: Vec<usize>,
    finished: bool,
}

impl TrackPlayer {
    /// Resolve `track` and prepare it for playback.
    ///
    /// `From` and `FromTo` steps render their start values immediately,
    /// so elements do not flash in their final state before playback.
    /// Targets that are not mounted are skipped.
    pub fn new(track: Track, scene: &mut Scene, journal: &mut StyleJournal) -> Self {
        let schedule = track.resolve();
        let duration = schedule.iter().map(|r| r.end).fold(0.0, f32::max);
        let mut slots = Vec::new();

        for resolved in &schedule {
            let step = &track.steps()[resolved.index];
            for (k, target) in step.targets().iter().copied().enumerate() {
                if !scene.is_mounted(target) {
                    tracing::debug!(track = %track.name, step = resolved.index, "skipping missing target");
                    continue;
                }
                let start = resolved.start + step.target_offset(k);
                let slot = match step.kind() {
                    TweenKind::To => TweenSlot {
                        step: resolved.index,
                        target,
                        start,
                        from: None,
                        to: step.properties().clone(),
                    },
                    TweenKind::From => {
                        let to = current_values(scene, target, step.properties());
                        let from = step.properties().clone();
                        write_all(scene, journal, target, &from);
                        TweenSlot {
                            step: resolved.index,
                            target,
                            start,
                            from: Some(from),
                            to,
                        }
                    }
                    TweenKind::FromTo(from) => {
                        write_all(scene, journal, target, from);
                        TweenSlot {
                            step: resolved.index,
                            target,
                            start,
                            from: Some(from.clone()),
                            to: step.properties().clone(),
                        }
                    }
                };
                slots.push(slot);
            }
        }

        slots.sort_by(|a, b| a.start.total_cmp(&b.start));

        Self {
            track,
            schedule,
            slots,
            duration,
            time: 0.0,
            completed_steps: Vec::new(),
            finished: false,
        }
    }

    /// The played track
    pub fn track(&self) -> &Track {
        &self.track
    }

    /// Resolved step placement
    pub fn schedule(&self) -> &[ResolvedStep] {
        &self.schedule
    }

    /// Current playhead in seconds
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Total duration in seconds (infinite for endless tracks)
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Playhead as a fraction of the duration (zero for endless tracks)
    pub fn progress(&self) -> f32 {
        if self.duration.is_finite() && self.duration > 0.0 {
            self.time / self.duration
        } else if self.duration == 0.0 {
            1.0
        } else {
            0.0
        }
    }

    /// Whether the playhead reached the end of a finite track
    pub fn is_complete(&self) -> bool {
        self.duration.is_finite() && self.time >= self.duration
    }

    /// Step indices in the order they finished
    pub fn completed_steps(&self) -> &[usize] {
        &self.completed_steps
    }

    /// Labels of finished steps, in finishing order
    pub fn completed_labels(&self) -> Vec<&str> {
        self.completed_steps
            .iter()
            .filter_map(|i| self.track.steps()[*i].label_text())
            .collect()
    }

    /// Move the playhead forward by `dt` seconds and render.
    /// Returns true on the frame the track first completes.
    pub fn advance(&mut self, dt: f32, scene: &mut Scene, journal: &mut StyleJournal) -> bool {
        let target = self.time + dt.max(0.0);
        self.seek(target, scene, journal);
        if self.is_complete() && !self.finished {
            self.finished = true;
            return true;
        }
        false
    }

    /// Jump to a time and render
    pub fn seek(&mut self, time: f32, scene: &mut Scene, journal: &mut StyleJournal) {
        self.time = time.clamp(0.0, self.duration);
        self.render(scene, journal);
        self.record_completions();
    }

    /// Set the playhead from a [0, 1] progress value. Ignored for endless
    /// tracks, which have no end to scrub towards.
    pub fn set_progress(&mut self, progress: f32, scene: &mut Scene, journal: &mut StyleJournal) {
        if !self.duration.is_finite() {
            return;
        }
        self.seek(progress.clamp(0.0, 1.0) * self.duration, scene, journal);
    }

    /// Jump straight to the end of a finite track
    pub fn finish(&mut self, scene: &mut Scene, journal: &mut StyleJournal) {
        if self.duration.is_finite() {
            self.seek(self.duration, scene, journal);
        }
    }

    fn render(&mut self, scene: &mut Scene, journal: &mut StyleJournal) {
        let time = self.time;
        let mut touched: HashSet<(TargetId, Property)> = HashSet::new();

        for slot in &mut self.slots {
            let step = &self.track.steps()[slot.step];
            match step.local_progress(time - slot.start) {
                Some(linear) => {
                    if slot.from.is_none() {
                        slot.from = Some(current_values(scene, slot.target, &slot.to));
                    }
                    let eased = step.easing().apply(linear);
                    if let Some(from) = &slot.from {
                        for (property, end) in slot.to.iter() {
                            let start = from.get(property).unwrap_or(end);
                            journal.write(scene, slot.target, property, lerp(start, end, eased));
                            touched.insert((slot.target, property));
                        }
                    }
                }
                None => {
                    // Not started: only the earliest tween on a channel shows its start values
                    let Some(from) = &slot.from else { continue };
                    for (property, value) in from.iter() {
                        if touched.insert((slot.target, property)) {
                            journal.write(scene, slot.target, property, value);
                        }
                    }
                }
            }
        }
    }

    fn record_completions(&mut self) {
        let mut newly: Vec<&ResolvedStep> = self
            .schedule
            .iter()
            .filter(|r| self.time >= r.end && !self.completed_steps.contains(&r.index))
            .collect();
        newly.sort_by(|a, b| a.end.total_cmp(&b.end).then(a.index.cmp(&b.index)));
        let indices: Vec<usize> = newly.iter().map(|r| r.index).collect();

        for index in indices {
            if let Some(label) = self.track.steps()[index].label_text() {
                tracing::trace!(track = %self.track.name, step = label, "step complete");
            }
            self.completed_steps.push(index);
        }
    }
}

fn current_values(scene: &Scene, target: TargetId, properties: &PropertyMap) -> PropertyMap {
    properties
        .properties()
        .filter_map(|p| scene.value(target, p).map(|v| (p, v)))
        .collect()
}

fn write_all(scene: &mut Scene, journal: &mut StyleJournal, target: TargetId, values: &PropertyMap) {
    for (property, value) in values.iter() {
        journal.write(scene, target, property, value);
    }
}
