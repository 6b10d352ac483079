//! # Main Display Module
//!
//! This module contains the main display components and layout logic
//! for the ChordScope application.

use iced::widget::{
    Space, button, column, container, horizontal_space, row, scrollable, slider, text,
};
use iced::{Alignment, Element, Length};

use chordscope_core::display::{
    boosted, chroma_bars, fft_polyline, fft_summary, normalize_to_max, zoomed_fft,
};
use chordscope_core::protocol::Snapshot;
use chordscope_core::{SoloMode, chord_to_string, note_to_string};

use super::beat_indicator::BeatIndicator;
use super::chord_timeline::{ChordTimeline, TimelineItem};
use super::chroma_chart::{ChromaChart, ChromaRow};
use super::fft_plot::FftPlot;
use super::heat_grid::{Cell, GridColumn, HeatGrid};
use super::piano_keyboard::PianoKeyboard;
use crate::{AppDisplayData, Message};

const ACTIVE_MODE_COLOR: iced::Color = iced::Color::from_rgb(0.8, 0.2, 0.2);

/// Creates the complete main application view
pub fn create_main_view(data: &AppDisplayData) -> Element<'static, Message> {
    let header = create_header(data);
    let chord_panel = create_chord_panel(data);
    let keyboard_panel = create_keyboard_panel(data);
    let chroma_panel = create_chroma_panel(data);
    let timeline_panel = create_timeline_panel(data);
    let q_panel = create_q_panel(data);
    let observations_panel = create_observations_panel(data);
    let fft_panel = create_fft_panel(data);

    let top_row = row![chord_panel, Space::with_width(10), chroma_panel].align_y(Alignment::Start);

    let main_content = column![
        header,
        Space::with_height(10),
        top_row,
        keyboard_panel,
        timeline_panel,
        q_panel,
        observations_panel,
        fft_panel,
    ]
    .width(Length::Fill)
    .spacing(10)
    .padding(20);

    container(scrollable(main_content))
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

/// Title, connection status and the beat lamp.
fn create_header(data: &AppDisplayData) -> Element<'static, Message> {
    let status = data.session.connection().label();
    let beat = data.session.state().beat_pulse(data.now);

    row![
        text("ChordScope").size(28),
        horizontal_space(),
        text(status).size(16),
        Space::with_width(15),
        BeatIndicator::new(beat).view(),
    ]
    .align_y(Alignment::Center)
    .into()
}

/// Current chord and scale plus the solo-mode selector.
fn create_chord_panel(data: &AppDisplayData) -> Element<'static, Message> {
    let state = data.session.state();
    let chord = chord_to_string(&state.current_chord());
    let scale = state.current_scale().to_string();

    let modes = SoloMode::ALL.iter().fold(row![].spacing(8), |buttons, &mode| {
        buttons.push(make_mode_button(mode, state.solo_mode() == mode))
    });

    let panel = container(
        column![
            text("Chord").size(18),
            text(chord).size(64),
            text(scale).size(20),
            Space::with_height(15),
            text("Solo mode").size(14),
            modes,
        ]
        .spacing(5)
        .padding(15),
    )
    .width(Length::FillPortion(1))
    .height(Length::Fixed(260.0));

    panel.into()
}

/// A solo-mode button, highlighted while its mode is active.
fn make_mode_button(mode: SoloMode, active: bool) -> Element<'static, Message> {
    let mut button = button(text(mode.to_string()).size(14))
        .padding([6, 10])
        .on_press(Message::SoloModeSelected(mode));

    if active {
        button = button.style(|_theme, _status| {
            use iced::widget::button;
            button::Style {
                background: Some(iced::Background::Color(ACTIVE_MODE_COLOR)),
                text_color: iced::Color::WHITE,
                ..button::Style::default()
            }
        });
    }
    button.into()
}

/// Weight charts of the most recent inferences, newest first.
fn create_chroma_panel(data: &AppDisplayData) -> Element<'static, Message> {
    let rows = data
        .session
        .state()
        .recent_inferences()
        .map(|inference| ChromaRow {
            chord: chord_to_string(&inference.chord),
            bars: chroma_bars(inference),
        })
        .collect();

    let panel = container(
        column![
            text("Inferences").size(18),
            Space::with_height(10),
            ChromaChart::new(rows).view()
        ]
        .spacing(5)
        .padding(15),
    )
    .width(Length::FillPortion(2))
    .height(Length::Fixed(260.0));

    panel.into()
}

/// Keyboard with held notes and pitch-class heat.
fn create_keyboard_panel(data: &AppDisplayData) -> Element<'static, Message> {
    let state = data.session.state();
    let heat = state
        .spectrum()
        .map(pitch_class_heat)
        .unwrap_or([0.0; 12]);
    let keyboard = PianoKeyboard::new(
        state.active_notes().to_vec(),
        state.mapped_notes().to_vec(),
        heat,
    );

    container(
        column![text("Keyboard").size(18), Space::with_height(10), keyboard.view()]
            .spacing(5)
            .padding(15),
    )
    .width(Length::Fill)
    .into()
}

/// Normalized bucketed magnitude per pitch class.
fn pitch_class_heat(snapshot: &Snapshot) -> [f32; 12] {
    let mut heat = [0.0f32; 12];
    let values = normalize_to_max(&snapshot.bucketed_q.y);
    for (note, value) in snapshot.bucketed_q.x.iter().zip(values) {
        let slot = &mut heat[note.pitch_class()];
        *slot = slot.max(value);
    }
    heat
}

fn create_timeline_panel(data: &AppDisplayData) -> Element<'static, Message> {
    // Wide enough for any window; chips past the left edge are skipped when drawn.
    const TIMELINE_WIDTH: f32 = 4096.0;
    let items = data
        .session
        .timeline()
        .visible(data.now, TIMELINE_WIDTH, data.timeline_px_per_ms)
        .map(|(entry, offset)| TimelineItem {
            label: chord_to_string(&entry.chord),
            offset,
        })
        .collect();

    container(
        column![text("Timeline").size(18), ChordTimeline::new(items).view()]
            .spacing(5)
            .padding(15),
    )
    .width(Length::Fill)
    .into()
}

/// Full Q grid headed by the bucketed magnitudes, with the booster slider.
fn create_q_panel(data: &AppDisplayData) -> Element<'static, Message> {
    let columns = data
        .session
        .state()
        .spectrum()
        .map(|snapshot| q_columns(snapshot, data.boost))
        .unwrap_or_default();

    let booster = row![
        slider(0.1..=15.0, data.boost, Message::BoostChanged)
            .step(0.1)
            .width(Length::Fixed(200.0)),
        Space::with_width(10),
        text(format!("Booster {:.1}", data.boost)).size(14),
    ]
    .align_y(Alignment::Center);

    container(
        column![
            text("Q spectrum").size(18),
            booster,
            Space::with_height(10),
            HeatGrid::new(columns).view(320.0)
        ]
        .spacing(5)
        .padding(15),
    )
    .width(Length::Fill)
    .into()
}

fn q_columns(snapshot: &Snapshot, boost: f32) -> Vec<GridColumn> {
    let headers = normalize_to_max(&snapshot.bucketed_q.y);
    snapshot
        .full_q
        .y
        .iter()
        .enumerate()
        .map(|(i, values)| {
            let label = snapshot.full_q.x.get(i).map(note_to_string).unwrap_or_default();
            GridColumn {
                header: Some(Cell {
                    label: label.clone(),
                    value: headers.get(i).copied().unwrap_or(0.0),
                }),
                cells: values
                    .iter()
                    .map(|&v| Cell {
                        label: label.clone(),
                        value: boosted(v, boost),
                    })
                    .collect(),
                footer: None,
            }
        })
        .collect()
}

/// The engine's labeled observations, one column each.
fn create_observations_panel(data: &AppDisplayData) -> Element<'static, Message> {
    let columns = data
        .session
        .state()
        .spectrum()
        .map(|snapshot| observation_columns(snapshot, data.boost))
        .unwrap_or_default();

    container(
        column![
            text("Observations").size(18),
            Space::with_height(10),
            HeatGrid::new(columns).view(260.0)
        ]
        .spacing(5)
        .padding(15),
    )
    .width(Length::Fill)
    .into()
}

fn observation_columns(snapshot: &Snapshot, boost: f32) -> Vec<GridColumn> {
    let observations = &snapshot.observations;
    observations
        .y
        .iter()
        .enumerate()
        .map(|(i, values)| GridColumn {
            header: None,
            cells: values
                .iter()
                .enumerate()
                .map(|(j, &v)| Cell {
                    label: observations.x.get(j).map(note_to_string).unwrap_or_default(),
                    value: boosted(v, boost),
                })
                .collect(),
            footer: observations.chords.get(i).map(chord_to_string),
        })
        .collect()
}

/// Raw fft trace with its peak, length and zoom slider.
fn create_fft_panel(data: &AppDisplayData) -> Element<'static, Message> {
    let fft = data
        .session
        .state()
        .spectrum()
        .map(|snapshot| snapshot.fft.as_slice())
        .unwrap_or_default();
    let summary = fft_summary(fft);
    let points = fft_polyline(zoomed_fft(fft, data.zoom));

    let controls = row![
        text(format!("Peak {:.3}", summary.max)).size(14),
        Space::with_width(20),
        text(format!("{} bins", summary.len)).size(14),
        horizontal_space(),
        slider(0.0..=1.0, data.zoom, Message::ZoomChanged)
            .step(0.01)
            .width(Length::Fixed(200.0)),
        Space::with_width(10),
        text("Zoom").size(14),
    ]
    .align_y(Alignment::Center);

    container(
        column![
            text("Spectrum").size(18),
            controls,
            Space::with_height(10),
            FftPlot::new(points).view()
        ]
        .spacing(5)
        .padding(15),
    )
    .width(Length::Fill)
    .height(Length::Fixed(260.0))
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chordscope_core::{ServerEvent, decode};

    fn snapshot() -> Snapshot {
        let frame = r#"{
            "full_q": {"x": ["C", "E", "G"], "y": [[0.1, 0.3], [0.05], [0.0, 0.5]]},
            "bucketed_q": {"x": ["C", "E", "G"], "y": [2.0, 1.0, 0.0]},
            "chord": {"root": {"letter": "C"}, "flavor": "Major"},
            "fft": [0.0, 1.0],
            "beat": false,
            "observations": {"x": ["C", "E"], "y": [[0.2, 0.1]], "chords": [{"note": "A", "flavor": "Minor"}]}
        }"#;
        match decode(frame) {
            Ok(ServerEvent::Snapshot(snapshot)) => *snapshot,
            other => panic!("expected a snapshot, got {:?}", other),
        }
    }

    #[test]
    fn pitch_class_heat_follows_bucketed_magnitudes() {
        let heat = pitch_class_heat(&snapshot());
        assert_eq!(heat[0], 1.0);
        assert_eq!(heat[4], 0.5);
        assert_eq!(heat[7], 0.0);
        assert_eq!(heat[2], 0.0);
    }

    #[test]
    fn q_columns_are_headed_by_bucketed_values_and_boosted() {
        let columns = q_columns(&snapshot(), 5.0);
        assert_eq!(columns.len(), 3);

        let first = &columns[0];
        let header = first.header.as_ref().unwrap();
        assert_eq!(header.label, "C");
        assert_eq!(header.value, 1.0);
        let values: Vec<f32> = first.cells.iter().map(|c| c.value).collect();
        assert!((values[0] - 0.5).abs() < 1e-6);
        assert_eq!(values[1], 1.0);
        assert_eq!(columns[2].cells[1].value, 1.0);
    }

    #[test]
    fn observation_columns_carry_chord_footers() {
        let columns = observation_columns(&snapshot(), 1.0);
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].footer.as_deref(), Some("Am"));
        let labels: Vec<&str> = columns[0].cells.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, ["C", "E"]);
    }
}
