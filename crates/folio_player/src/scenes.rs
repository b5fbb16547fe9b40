// SPDX-License-Identifier: MIT OR Apache-2.0
//! Portfolio scene timelines.

use crate::settings::ContentSettings;
use folio_sequencer::{
    Ease, Position, Property, SequencerResult, StaggerRule, Target, TargetId,
    Timeline, Tween, ValueSource, Zone,
};

/// Scene labels of the master timeline, in order
pub const SCENE_LABELS: [&str; 5] = ["hero", "welcome", "about", "skills", "projects"];

/// Label placed at the end of the master timeline
pub const END_LABEL: &str = "end";

/// Label of showcase slide `index`
pub fn slide_label(index: usize) -> String {
    format!("slide-{index}")
}

/// Targets of one content section
struct Section {
    root: TargetId,
    title: TargetId,
    text: Option<TargetId>,
}

impl Section {
    /// Register a hidden, non-interactive section
    fn add(timeline: &mut Timeline, name: &str, with_text: bool) -> Self {
        let root = timeline.add_target(
            Target::new(name)
                .with_initial(Property::Opacity, 0.0)
                .with_initial(Property::Interactive, false),
        );
        let title = timeline.add_target(Target::new(format!("{name}.title")));
        let text = with_text.then(|| timeline.add_target(Target::new(format!("{name}.text"))));
        Self { root, title, text }
    }
}

fn rise_in(target: TargetId) -> Tween {
    Tween::from_to([target])
        .from_prop(Property::Y, 50.0)
        .from_prop(Property::Opacity, 0.0)
        .prop(Property::Y, 0.0)
        .prop(Property::Opacity, 1.0)
        .duration(1.0)
        .ease(Ease::power_out(3))
}

fn slide_in(target: TargetId) -> Tween {
    Tween::from_to([target])
        .from_prop(Property::X, 100.0)
        .from_prop(Property::Opacity, 0.0)
        .prop(Property::X, 0.0)
        .prop(Property::Opacity, 1.0)
        .duration(1.0)
        .ease(Ease::power_out(3))
}

fn show(timeline: &mut Timeline, section: &Section) -> SequencerResult<()> {
    timeline.then(Tween::set([section.root]).prop(Property::Interactive, true))?;
    timeline.then(Tween::to([section.root]).prop(Property::Opacity, 1.0).duration(1.0))?;
    Ok(())
}

fn hide(timeline: &mut Timeline, section: &Section, exit_x: Option<f32>) -> SequencerResult<()> {
    let mut exit = Tween::to([section.root])
        .prop(Property::Opacity, 0.0)
        .duration(1.0)
        .ease(Ease::power_out(3));
    if let Some(x) = exit_x {
        exit = exit.prop(Property::X, x);
    }
    timeline.then(exit)?;
    timeline.then(Tween::set([section.root]).prop(Property::Interactive, false))?;
    Ok(())
}

/// Build the scroll-driven master timeline
///
/// Scenes run back to back with a label at the start of each one and an
/// [`END_LABEL`] at the end.
pub fn build_master(content: &ContentSettings, seed: u64) -> SequencerResult<Timeline> {
    let mut timeline = Timeline::with_seed("master", seed);

    let mut chars = timeline.add_targets(Target::split_chars("title", &content.title));
    chars.extend(timeline.add_targets(Target::split_chars("subtitle", &content.subtitle)));

    let welcome = Section::add(&mut timeline, "welcome", true);
    let words = timeline.add_targets(Target::split_words("welcome.word", &content.welcome_title));
    let about = Section::add(&mut timeline, "about", true);
    let skills = Section::add(&mut timeline, "skills", true);
    let projects = Section::add(&mut timeline, "projects", false);

    // Hero
    timeline.add_label("hero", 0.0)?;
    if !chars.is_empty() {
        timeline.then(
            Tween::to(chars)
                .prop(Property::X, ValueSource::Random { min: -1000.0, max: 1000.0 })
                .prop(Property::Y, ValueSource::Random { min: -500.0, max: 500.0 })
                .prop(Property::Rotation, ValueSource::Random { min: -720.0, max: 720.0 })
                .prop(Property::Scale, ValueSource::Random { min: 2.0, max: 10.0 })
                .prop(Property::Opacity, 0.0)
                .ease(Ease::power_out(3))
                .stagger(StaggerRule::each(0.02))
                .duration(1.5),
        )?;
    }

    // Welcome
    timeline.add_label_at("welcome", &Position::End)?;
    show(&mut timeline, &welcome)?;
    if !words.is_empty() {
        timeline.then(
            Tween::from(words)
                .prop(Property::Y, 50.0)
                .prop(Property::Opacity, 0.0)
                .stagger(StaggerRule::each(0.5))
                .duration(1.0)
                .ease(Ease::power_out(3)),
        )?;
    }
    if let Some(text) = welcome.text {
        timeline.then(rise_in(text))?;
    }
    hide(&mut timeline, &welcome, None)?;

    // About and skills share a layout
    for (label, section) in [("about", &about), ("skills", &skills)] {
        timeline.add_label_at(label, &Position::End)?;
        show(&mut timeline, section)?;
        timeline.then(rise_in(section.title))?;
        if let Some(text) = section.text {
            timeline.then(slide_in(text))?;
        }
        hide(&mut timeline, section, Some(-1000.0))?;
    }

    // Projects
    timeline.add_label_at("projects", &Position::End)?;
    show(&mut timeline, &projects)?;
    timeline.then(rise_in(projects.title))?;
    timeline.add_label_at(END_LABEL, &Position::End)?;

    tracing::debug!(
        duration = timeline.duration(),
        segments = timeline.segments().len(),
        "Built master timeline"
    );
    Ok(timeline)
}

/// One zone per scene, from its label to the next one
pub fn scene_zones(timeline: &Timeline) -> SequencerResult<Vec<Zone>> {
    let mut bounds: Vec<&str> = SCENE_LABELS.to_vec();
    bounds.push(END_LABEL);
    bounds
        .windows(2)
        .map(|pair| {
            let start = timeline.resolve(pair[0])?;
            let end = timeline.resolve(pair[1])?;
            Ok(Zone::new(pair[0], start, end))
        })
        .collect()
}

/// Entrance effects, cycled by slide index
fn slide_effect(index: usize, target: TargetId) -> Tween {
    let tween = Tween::from_to([target])
        .from_prop(Property::Opacity, 0.0)
        .prop(Property::Opacity, 1.0)
        .duration(1.2)
        .ease(Ease::power_out(3));
    match index % 5 {
        0 => tween.from_prop(Property::X, 100.0).prop(Property::X, 0.0),
        1 => tween.from_prop(Property::Scale, 0.8).prop(Property::Scale, 1.0),
        2 => tween.from_prop(Property::Y, 100.0).prop(Property::Y, 0.0),
        3 => tween.from_prop(Property::Rotation, 45.0).prop(Property::Rotation, 0.0),
        _ => tween.from_prop(Property::X, -100.0).prop(Property::X, 0.0),
    }
}

/// Build the project showcase timeline
///
/// Each slide change is a segment pair: the current slide leaves while the
/// next one enters. Label `slide-{i}` marks the moment slide `i` is fully in.
pub fn build_showcase(projects: &[String]) -> SequencerResult<Timeline> {
    let mut timeline = Timeline::new("showcase");
    let slides: Vec<TargetId> = projects
        .iter()
        .enumerate()
        .map(|(i, title)| {
            timeline.add_target(
                Target::new(format!("slide[{i}] {title}")).with_initial(Property::Opacity, 0.0),
            )
        })
        .collect();

    let Some(first) = slides.first() else {
        return Ok(timeline);
    };

    timeline.then(
        Tween::from_to([*first])
            .from_prop(Property::Opacity, 0.0)
            .from_prop(Property::Y, 50.0)
            .prop(Property::Opacity, 1.0)
            .prop(Property::Y, 0.0)
            .duration(1.2)
            .ease(Ease::power_out(3)),
    )?;
    timeline.add_label_at(slide_label(0), &Position::End)?;

    for (index, pair) in slides.windows(2).enumerate() {
        let next = index + 1;
        timeline.then(
            Tween::to([pair[0]])
                .prop(Property::Opacity, 0.0)
                .prop(Property::X, -100.0)
                .duration(0.8)
                .ease(Ease::power_in_out(2)),
        )?;
        timeline.append(slide_effect(next, pair[1]), Position::WithPrevious)?;
        timeline.add_label_at(slide_label(next), &Position::End)?;
    }

    tracing::debug!(slides = slides.len(), duration = timeline.duration(), "Built showcase timeline");
    Ok(timeline)
}

/// Build the loading bar timeline driven by the loading counter
pub fn build_loading() -> SequencerResult<Timeline> {
    let mut timeline = Timeline::new("loading");
    let bar = timeline.add_target(Target::new("loading.bar").with_initial(Property::XPercent, -100.0));
    timeline.then(
        Tween::to([bar])
            .prop(Property::XPercent, 0.0)
            .duration(1.0)
            .ease(Ease::Linear),
    )?;
    Ok(timeline)
}
