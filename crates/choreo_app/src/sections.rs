// SPDX-License-Identifier: MIT OR Apache-2.0
//! Page sections.
//!
//! Each function is the setup closure body of one section's sequencer:
//! a one-shot reveal when the section scrolls into view, scrubbed parallax
//! while it crosses the viewport, and whatever loops the section runs.

use crate::layout::{PROJECT_CARDS, SERVICE_DESC_WORDS, SERVICE_FEATURES, SERVICE_PANELS, TITLE_WORDS};
use choreo_sequencer::{
    Ease, PinnedStage, Position, Property, PropertyMap, Repeat, Result, Sequencer, SequencerScope, Step,
    TargetId, Track,
};

/// Scrub `target`'s vertical offset by `y_percent` while `trigger` crosses the viewport
fn parallax(scope: &mut SequencerScope<'_>, trigger: TargetId, target: TargetId, y_percent: f32) -> Result<()> {
    let track = Track::new("parallax").then(
        Step::to(vec![target], PropertyMap::new().with(Property::YPercent, y_percent))
            .duration(1.0)
            .ease(Ease::Linear),
    );
    scope.scrub(trigger, "top bottom", "bottom top", track)?;
    Ok(())
}

/// Side label sliding in from the left
fn label_in(label: TargetId) -> Step {
    Step::from(
        vec![label],
        PropertyMap::new().with(Property::Opacity, 0.0).with(Property::X, -40.0),
    )
    .duration(1.0)
    .ease(Ease::out(3))
}

/// Title words flipping up one after another
fn words_in(words: Vec<TargetId>, rise: f32, stagger: f32, duration: f32) -> Step {
    Step::from(
        words,
        PropertyMap::new()
            .with(Property::Opacity, 0.0)
            .with(Property::Y, rise)
            .with(Property::RotateX, -90.0),
    )
    .stagger(stagger)
    .duration(duration)
    .ease(Ease::out(4))
}

/// Fade in while moving by `y`
fn rise_in(targets: Vec<TargetId>, y: f32, duration: f32) -> Step {
    Step::from(
        targets,
        PropertyMap::new().with(Property::Opacity, 0.0).with(Property::Y, y),
    )
    .duration(duration)
    .ease(Ease::out(3))
}

/// Hero: plays its entrance as soon as content is ready
pub fn hero(scope: &mut SequencerScope<'_>) -> Result<()> {
    scope.element("hero");
    scope.element("hero-slot");
    let words = scope.elements("hero-word", TITLE_WORDS);
    let subtitle = scope.element("hero-subtitle");
    let cta = scope.element("hero-cta");

    let track = Track::new("hero-reveal")
        .then(words_in(words, 120.0, 0.15, 1.2).label("hero-title"))
        .then(
            rise_in(vec![subtitle], 40.0, 1.0)
                .at(Position::Offset(-0.8))
                .label("hero-subtitle"),
        )
        .then(
            rise_in(vec![cta], 30.0, 0.8)
                .at(Position::Offset(-0.6))
                .label("hero-cta"),
        );
    scope.play(track);
    Ok(())
}

/// About: staggered reveal plus layered parallax
pub fn about(scope: &mut SequencerScope<'_>) -> Result<()> {
    let section = scope.element("about");
    scope.element("about-slot");
    let label = scope.element("about-label");
    let number = scope.element("about-number");
    let heading = scope.element("about-heading");
    let lines = scope.elements("about-line", TITLE_WORDS);
    let body = scope.element("about-body");
    let image = scope.element("about-image");
    let laptop = scope.element("about-laptop");

    let track = Track::new("about-reveal")
        .then(label_in(label))
        .then(
            Step::from(
                vec![number],
                PropertyMap::new().with(Property::Opacity, 0.0).with(Property::Scale, 1.2),
            )
            .duration(1.2)
            .ease(Ease::out(3))
            .at(Position::Offset(0.2)),
        )
        .then(
            rise_in(vec![heading], 40.0, 1.0)
                .ease(Ease::out(2))
                .at(Position::Offset(-0.6)),
        )
        .then(words_in(lines.clone(), 120.0, 0.5, 1.4).at(Position::Offset(-1.4)))
        .then(rise_in(vec![body], 80.0, 1.2).at(Position::Offset(-0.5)))
        .then(
            Step::from(
                vec![image],
                PropertyMap::new().with(Property::Opacity, 0.0).with(Property::X, 80.0),
            )
            .duration(1.2)
            .ease(Ease::out(3))
            .at(Position::Offset(-0.4)),
        )
        .then(
            Step::from(
                vec![laptop],
                PropertyMap::new().with(Property::Opacity, 0.0).with(Property::Scale, 0.85),
            )
            .duration(1.4)
            .ease(Ease::out(3))
            .at(Position::Offset(-0.4)),
        );
    let start = scope.config().reveal_start.clone();
    scope.once(section, &start, track)?;

    parallax(scope, section, laptop, 15.0)?;
    parallax(scope, section, number, -80.0)?;
    parallax(scope, section, body, -10.0)?;
    parallax(scope, section, image, 20.0)?;
    parallax(scope, section, label, -20.0)?;
    parallax(scope, section, heading, 30.0)?;
    for line in lines {
        parallax(scope, section, line, 25.0)?;
    }
    Ok(())
}

/// One accordion panel's animated parts
#[derive(Debug, Clone)]
struct ServicePanel {
    words: Vec<TargetId>,
    description: Vec<TargetId>,
    features: Vec<TargetId>,
}

/// Services accordion: one panel open at a time
#[derive(Debug, Clone)]
pub struct ServiceAccordion {
    panels: Vec<ServicePanel>,
    active: usize,
}

impl ServiceAccordion {
    /// Index of the open panel
    pub fn active(&self) -> usize {
        self.active
    }

    /// Open panel `index` and replay its reveal on `sequencer`.
    /// Returns false when `index` is already open or does not exist.
    pub fn select(&mut self, index: usize, sequencer: &mut Sequencer) -> bool {
        if index == self.active || index >= self.panels.len() {
            return false;
        }
        let previous = self.active;
        self.active = index;
        tracing::debug!(from = previous, to = index, "service panel selected");
        sequencer.play(self.reveal(index, Some(previous)));
        true
    }

    fn reveal(&self, index: usize, collapse: Option<usize>) -> Track {
        let panel = &self.panels[index];
        let mut track = Track::new(format!("service-{index}-reveal"));

        if let Some(closing) = collapse.and_then(|i| self.panels.get(i)) {
            let targets: Vec<TargetId> = closing
                .words
                .iter()
                .chain(&closing.description)
                .chain(&closing.features)
                .copied()
                .collect();
            track.append(
                Step::to(targets, PropertyMap::new().with(Property::Opacity, 0.0))
                    .duration(0.3)
                    .ease(Ease::out(2)),
            );
        }

        track.append(
            Step::from_to(
                panel.words.clone(),
                PropertyMap::new().with(Property::Opacity, 0.0).with(Property::Y, 30.0),
                PropertyMap::new().with(Property::Opacity, 1.0).with(Property::Y, 0.0),
            )
            .stagger(0.03)
            .duration(0.4)
            .delay(0.3)
            .ease(Ease::out(2))
            .at(Position::At(0.0)),
        );
        track.append(
            Step::from_to(
                panel.description.clone(),
                PropertyMap::new().with(Property::Opacity, 0.0).with(Property::Y, 20.0),
                PropertyMap::new().with(Property::Opacity, 1.0).with(Property::Y, 0.0),
            )
            .stagger(0.02)
            .duration(0.3)
            .delay(0.5)
            .ease(Ease::out(2))
            .at(Position::At(0.0)),
        );
        track.append(
            Step::from_to(
                panel.features.clone(),
                PropertyMap::new().with(Property::Opacity, 0.0).with(Property::Y, 15.0),
                PropertyMap::new().with(Property::Opacity, 1.0).with(Property::Y, 0.0),
            )
            .stagger(0.05)
            .duration(0.3)
            .delay(0.7)
            .ease(Ease::out(2))
            .at(Position::At(0.0)),
        );
        track
    }
}

/// Services: reveal, parallax, looping panel dots and the accordion
pub fn services(scope: &mut SequencerScope<'_>) -> Result<ServiceAccordion> {
    let section = scope.element("services");
    scope.element("services-slot");
    let label = scope.element("services-label");
    let words = scope.elements("services-word", TITLE_WORDS);
    let accordion = scope.element("services-accordion");
    let catchy = scope.element("services-catchy");
    let title = scope.element("services-title");

    let track = Track::new("services-reveal")
        .then(label_in(label))
        .then(words_in(words, 120.0, 0.3, 1.4).at(Position::Offset(-1.2)))
        .then(rise_in(vec![accordion], 100.0, 1.2).at(Position::Offset(-0.5)));
    let start = scope.config().reveal_start.clone();
    scope.once(section, &start, track)?;

    parallax(scope, section, catchy, -150.0)?;
    parallax(scope, section, title, 30.0)?;

    let mut panels = Vec::with_capacity(SERVICE_PANELS);
    for index in 0..SERVICE_PANELS {
        let words = scope.elements(&format!("service-{index}-word"), TITLE_WORDS);
        let description = scope.elements(&format!("service-{index}-desc"), SERVICE_DESC_WORDS);
        let features = scope.elements(&format!("service-{index}-feature"), SERVICE_FEATURES);
        let dots = scope.elements(&format!("service-{index}-dot"), 2);
        let line = scope.element(&format!("service-{index}-line"));

        scope.set(line, &PropertyMap::new().with(Property::Y1, 40.0).with(Property::Y2, 60.0));
        let delay = index as f32 * 0.2;
        let bob = |targets: Vec<TargetId>, properties: PropertyMap| {
            Step::to(targets, properties)
                .duration(1.5)
                .ease(Ease::in_out(1))
                .repeat(Repeat::Forever)
                .yoyo(true)
                .delay(delay)
                .at(Position::WithPrevious)
        };
        scope.play(
            Track::new(format!("service-{index}-dots"))
                .then(bob(vec![dots[0]], PropertyMap::new().with(Property::Y, 30.0)))
                .then(bob(vec![dots[1]], PropertyMap::new().with(Property::Y, -30.0)))
                .then(bob(
                    vec![line],
                    PropertyMap::new().with(Property::Y1, 44.0).with(Property::Y2, 56.0),
                )),
        );

        if index != 0 {
            let hidden = PropertyMap::new().with(Property::Opacity, 0.0);
            for &target in words.iter().chain(&description).chain(&features) {
                scope.set(target, &hidden);
            }
        }
        panels.push(ServicePanel {
            words,
            description,
            features,
        });
    }

    let accordion = ServiceAccordion { panels, active: 0 };
    scope.play(accordion.reveal(0, None));
    Ok(accordion)
}

/// Projects: intro fade scrubbed over the section, then the pinned card stage
pub fn projects(scope: &mut SequencerScope<'_>) -> Result<()> {
    let section = scope.element("projects");
    let intro = scope.element("projects-intro");
    let title = scope.element("projects-title");
    let container = scope.element("projects-cards");
    let cards = scope.elements("project-card", PROJECT_CARDS);
    let connector = scope.element("projects-connector");

    let track = Track::new("projects-intro").then(
        Step::to(
            vec![intro, title],
            PropertyMap::new().with(Property::Opacity, 0.0).with(Property::Y, -100.0),
        )
        .duration(0.5)
        .ease(Ease::ease_in(2)),
    );
    scope.scrub(section, "top top", "+=500%", track)?;

    let stage = PinnedStage::new("projects-cards", container, "top top".parse()?, "+=400%".parse()?, cards)
        .with_connector(connector);
    scope.pin(stage);
    Ok(())
}

/// Experience: reveal, parallax and the endless marquee
pub fn experience(scope: &mut SequencerScope<'_>) -> Result<()> {
    let section = scope.element("experience");
    let label = scope.element("experience-label");
    let words = scope.elements("experience-word", TITLE_WORDS);
    let title = scope.element("experience-title");
    let desc = scope.element("experience-desc");
    let logos = scope.element("experience-logos");
    let marquee = scope.element("experience-marquee");

    let track = Track::new("experience-reveal")
        .then(label_in(label))
        .then(words_in(words, 120.0, 0.3, 1.4).at(Position::Offset(-1.2)))
        .then(rise_in(vec![desc], 60.0, 1.2).at(Position::Offset(-0.5)))
        .then(rise_in(vec![logos], 40.0, 1.0).at(Position::Offset(-0.8)));
    let start = scope.config().reveal_start.clone();
    scope.once(section, &start, track)?;

    scope.play(
        Track::new("experience-marquee").then(
            Step::to(vec![marquee], PropertyMap::new().with(Property::XPercent, -100.0))
                .duration(60.0)
                .ease(Ease::Linear)
                .repeat(Repeat::Forever),
        ),
    );

    parallax(scope, section, title, 30.0)?;
    parallax(scope, section, desc, 20.0)?;
    Ok(())
}

/// Footer: links drop in, then the title letters and logo
pub fn footer(scope: &mut SequencerScope<'_>) -> Result<()> {
    let section = scope.element("footer");
    let words = scope.elements("footer-word", TITLE_WORDS);
    let links = scope.element("footer-links");
    let logo = scope.element("footer-logo");

    let track = Track::new("footer-reveal")
        .then(rise_in(vec![links], -40.0, 1.0))
        .then(words_in(words.clone(), 100.0, 0.08, 0.8).at(Position::Offset(-0.6)))
        .then(
            Step::from(
                vec![logo],
                PropertyMap::new().with(Property::Opacity, 0.0).with(Property::Scale, 0.8),
            )
            .duration(1.0)
            .ease(Ease::out(3))
            .at(Position::Offset(-0.8)),
        );
    let start = scope.config().reveal_start.clone();
    scope.once(section, &start, track)?;

    for word in words {
        parallax(scope, section, word, 20.0)?;
    }
    parallax(scope, section, logo, -30.0)?;
    Ok(())
}
