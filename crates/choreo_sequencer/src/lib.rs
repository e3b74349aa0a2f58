// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scroll-driven animation choreography.
//!
//! This crate sequences property animations against a page's scroll
//! position and a frame clock:
//! - Timeline tracks with relative step positions
//! - One-shot and scrubbed trigger bindings
//! - Per-view sequencers with symmetric setup and teardown
//! - Pinned stages with crossfading items and a live connector
//! - A page orchestrator with a shared, scroll-owned decoration
//!
//! ## Architecture
//!
//! The choreography is built on:
//! - A scene of named elements addressed by typed handles
//! - A live measurement capability instead of a layout engine
//! - A style journal that restores every touched inline value
//! - Explicit configuration passed at construction

pub mod config;
pub mod ease;
pub mod error;
pub mod journal;
pub mod measure;
pub mod orchestrator;
pub mod pinned;
pub mod player;
pub mod property;
pub mod scene;
pub mod scroll;
pub mod sequencer;
pub mod step;
pub mod track;
pub mod trigger;
pub mod ui;

pub use config::{ChoreoConfig, ConnectorConfig, SmoothScrollConfig};
pub use ease::{Ease, EaseKind};
pub use error::{ChoreoError, Result};
pub use journal::StyleJournal;
pub use measure::{Measure, StaticLayout, Viewport};
pub use orchestrator::{validate_handoffs, GlobalDecoration, Handoff, Orchestrator};
pub use pinned::{segment, Connector, PinnedStage, Segment};
pub use player::TrackPlayer;
pub use property::{lerp, Property, PropertyMap};
pub use scene::{Element, Scene, SharedScene, TargetId};
pub use scroll::{ScrollLock, SmoothScroll};
pub use sequencer::{CompletionCallback, Sequencer, SequencerScope, TeardownHook};
pub use step::{Position, Repeat, Step, TweenKind};
pub use track::{ResolvedStep, Track, TrackId};
pub use trigger::{
    Activation, Anchor, BindingId, BindingState, Edge, Length, RangeEnd, ScrollRange, TriggerBinding,
    TriggerPoint,
};
pub use ui::TimelineInspector;
