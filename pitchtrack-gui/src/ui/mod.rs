//! UI composition for the viewer window.

pub mod track_canvas;

use iced::widget::{button, column, container, row, scrollable, text};
use iced::{Element, Length};

use crate::{Message, ViewerApp};
use self::track_canvas::TrackCanvas;

/// Builds the whole window: header with file name, progress and cancel
/// control, then the horizontally scrollable pitch-track canvas.
pub fn viewer_view(app: &ViewerApp) -> Element<'_, Message> {
    let status = if app.is_finished() {
        text(format!("{} — done", app.file_name()))
    } else {
        text(format!(
            "{} — analyzing {:>3.0}%",
            app.file_name(),
            app.progress() * 100.0
        ))
    };

    let mut header = row![status.size(16)].spacing(16).padding(8);
    if !app.is_finished() {
        header = header.push(button(text("Cancel").size(14)).on_press(Message::CancelAnalysis));
    }

    let canvas = TrackCanvas::new(
        app.snapshot(),
        app.mapper(),
        app.scale(),
        app.width() as f32,
        app.config().canvas_height,
    );

    let track = scrollable(canvas.view())
        .direction(scrollable::Direction::Both {
            vertical: scrollable::Scrollbar::new(),
            horizontal: scrollable::Scrollbar::new(),
        })
        .width(Length::Fill)
        .height(Length::Fill);

    container(column![header, track].spacing(4))
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}
