use std::sync::{
  Arc,
  mpsc::{Receiver, Sender, channel},
};
use std::time::Duration;

use egui::{PointerButton, Rect, Response, Sense, Ui, Widget};
use log::{debug, warn};

use super::{
  coordinates::{BoundingBox, PixelPosition, Transform},
  markers::{MarkerSet, ShowOutcome},
  popup::{PopupContent, PopupState},
};
use crate::{
  catalog::Place,
  viewmodel::ViewModelEvent,
  wiki::{PageSummary, SummaryProvider},
};

pub const MAX_ZOOM: f32 = 524_288.;
pub const MIN_ZOOM: f32 = 1.;

const MARKER_RADIUS: f32 = 6.;
const CLICK_RADIUS: f32 = 10.;

/// Completion of one summary fetch task, sent back to the UI thread.
struct SummaryOutcome {
  place: usize,
  seq: u64,
  result: Result<PageSummary, String>,
}

/// The map pane: draws one marker per place, reconciles visibility and the
/// popup against view model events, and owns the async summary fetches.
pub struct Map {
  places: Vec<Place>,
  markers: MarkerSet,
  transform: Transform,
  selected: usize,
  clicked: Option<usize>,
  events: Receiver<ViewModelEvent>,
  provider: Arc<dyn SummaryProvider>,
  fetch_timeout: Duration,
  outcome_sender: Sender<SummaryOutcome>,
  outcome_receiver: Receiver<SummaryOutcome>,
  ctx: egui::Context,
}

impl Map {
  #[must_use]
  pub fn new(
    ctx: egui::Context,
    places: Vec<Place>,
    events: Receiver<ViewModelEvent>,
    provider: Arc<dyn SummaryProvider>,
    fetch_timeout: Duration,
  ) -> Self {
    let markers = MarkerSet::from_catalog(&places);
    let (outcome_sender, outcome_receiver) = channel();
    Self {
      places,
      markers,
      transform: Transform::invalid(),
      selected: 0,
      clicked: None,
      events,
      provider,
      fetch_timeout,
      outcome_sender,
      outcome_receiver,
      ctx,
    }
  }

  /// The marker clicked since the last call, if any. Polled by the app layer
  /// which forwards it to the view model.
  pub fn take_clicked(&mut self) -> Option<usize> {
    self.clicked.take()
  }

  /// Frames the view so that all markers are contained, with a margin.
  fn frame_all(&mut self, rect: Rect) {
    let mut bb = self.markers.bounding_box();
    if !bb.is_valid() {
      return;
    }
    bb.frame(0.02);
    fit_box(&mut self.transform, &bb, rect);
  }

  fn handle_events(&mut self, rect: Rect) {
    let events = self.events.try_iter().collect::<Vec<_>>();
    for event in &events {
      match event {
        ViewModelEvent::FilterChanged { visible } => {
          debug!("reconciling markers against {} visible places", visible.len());
          self.markers.reconcile(visible);
        }
        ViewModelEvent::SelectionChanged { index } => {
          self.selected = *index;
          self.show(*index, rect);
        }
      }
    }
    if !events.is_empty() {
      self.ctx.request_repaint();
    }
  }

  /// Opens (or re-focuses) the popup for `place` and centers the view on its
  /// marker. A place whose popup is already open or pending never triggers a
  /// second fetch.
  fn show(&mut self, place: usize, rect: Rect) {
    match self.markers.request_show(place) {
      ShowOutcome::FetchNeeded { seq } => self.spawn_fetch(place, seq),
      ShowOutcome::AlreadyShowing => {}
      ShowOutcome::Hidden => return,
    }
    let position = self.markers.markers()[place].position;
    self.transform.center_on(position, rect.center().into());
  }

  fn spawn_fetch(&self, place: usize, seq: u64) {
    let provider = Arc::clone(&self.provider);
    let sender = self.outcome_sender.clone();
    let ctx = self.ctx.clone();
    let page_title = self.places[place].page_title.clone();
    let timeout = self.fetch_timeout;

    debug!(
      "fetching summary for '{page_title}' via {} (seq {seq})",
      self.provider.name()
    );
    tokio::spawn(async move {
      let result = match tokio::time::timeout(timeout, provider.summary(&page_title)).await {
        Ok(Ok(summary)) => Ok(summary),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err("summary request timed out".to_string()),
      };
      let _ = sender.send(SummaryOutcome { place, seq, result });
      ctx.request_repaint();
    });
  }

  fn check_summary_results(&mut self) {
    while let Ok(outcome) = self.outcome_receiver.try_recv() {
      let place = &self.places[outcome.place];
      let content = match outcome.result {
        Ok(summary) => PopupContent::from_summary(place, &summary),
        Err(e) => {
          warn!("summary fetch for '{}' failed: {e}", place.name);
          PopupContent::fetch_failed(place)
        }
      };
      if self.markers.apply_summary(outcome.place, outcome.seq, content) {
        self.ctx.request_repaint();
      }
    }
  }

  fn handle_mouse_wheel(&mut self, ui: &Ui, response: &Response) {
    if response.hovered() {
      let delta = ui
        .input(|i| {
          i.events
            .iter()
            .find_map(move |e| match e {
              egui::Event::MouseWheel {
                unit: _,
                delta,
                modifiers: _,
                phase: _,
              } => Some(delta),
              _ => None,
            })
            .copied()
        })
        .map(|d| (d.y / 1. + 1.).clamp(0.8, 1.4).sqrt());
      if let Some(delta) = delta {
        let cursor = response.hover_pos().unwrap_or_default().into();
        self.zoom_with_center(delta, cursor);
      }
    }
  }

  fn zoom_with_center(&mut self, delta: f32, center: PixelPosition) {
    if self.transform.zoom * delta < MIN_ZOOM || self.transform.zoom * delta > MAX_ZOOM {
      return;
    }
    let hover_coord = self.transform.unapply(center);
    self.transform.zoom(delta);
    self.transform.center_on(hover_coord, center);
  }

  fn hit_test(&self, pos: egui::Pos2) -> Option<usize> {
    let mut closest: Option<(usize, f32)> = None;
    for marker in self.markers.markers().iter().filter(|m| m.visible) {
      let marker_pos: egui::Pos2 = self.transform.apply(marker.position).into();
      let sq_dist = marker_pos.distance_sq(pos);
      if sq_dist <= CLICK_RADIUS * CLICK_RADIUS
        && closest.is_none_or(|(_, best)| sq_dist < best)
      {
        closest = Some((marker.place, sq_dist));
      }
    }
    closest.map(|(place, _)| place)
  }

  fn draw(&self, ui: &Ui, rect: Rect) {
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 0., egui::Color32::from_gray(245));

    for marker in self.markers.markers().iter().filter(|m| m.visible) {
      let pos: egui::Pos2 = self.transform.apply(marker.position).into();
      let color = if marker.place == self.selected {
        egui::Color32::from_rgb(200, 40, 40)
      } else {
        egui::Color32::from_rgb(40, 90, 200)
      };
      painter.circle(
        pos,
        MARKER_RADIUS,
        color,
        egui::Stroke::new(1.5, egui::Color32::WHITE),
      );
      painter.text(
        pos + egui::vec2(MARKER_RADIUS + 4., 0.),
        egui::Align2::LEFT_CENTER,
        &marker.title,
        egui::FontId::proportional(12.),
        egui::Color32::DARK_GRAY,
      );
    }
  }

  fn show_popup(&mut self, ui: &Ui) {
    let Some((place, state)) = self
      .markers
      .displayed_popup()
      .map(|(place, state)| (place, state.clone()))
    else {
      return;
    };

    let marker_pos: egui::Pos2 = self
      .transform
      .apply(self.markers.markers()[place].position)
      .into();
    let mut close_requested = false;

    egui::Window::new(&self.places[place].name)
      .collapsible(false)
      .resizable(false)
      .current_pos(marker_pos + egui::vec2(MARKER_RADIUS + 8., -MARKER_RADIUS - 8.))
      .show(ui.ctx(), |ui| {
        ui.set_min_width(200.);
        match &state {
          PopupState::Pending { .. } => {
            ui.horizontal(|ui| {
              ui.spinner();
              ui.small("Fetching Wikipedia summary…");
            });
          }
          PopupState::Open { content } => {
            if let Some(url) = &content.page_url {
              ui.hyperlink_to(format!("{}'s page", content.title), url);
            }
            if let Some(extract) = &content.extract {
              ui.label(egui::RichText::new(extract).small());
            }
            if let Some(note) = content.note {
              ui.label(note);
            }
          }
        }
        ui.separator();
        if ui.button("Close").clicked() {
          close_requested = true;
        }
      });

    if close_requested {
      self.markers.close_popup();
    }
  }
}

impl Widget for &mut Map {
  fn ui(self, ui: &mut Ui) -> Response {
    let size = ui.available_size();
    let (rect, response) = ui.allocate_exact_size(size, Sense::click_and_drag());

    if self.transform.is_invalid() {
      self.transform = Transform::default();
      self.frame_all(rect);
    }

    self.handle_mouse_wheel(ui, &response);

    if response.dragged() && response.dragged_by(PointerButton::Primary) {
      self.transform.translate(response.drag_delta().into());
    }

    if response.clicked()
      && let Some(pos) = response.interact_pointer_pos()
      && let Some(place) = self.hit_test(pos)
    {
      debug!("marker {place} clicked");
      self.clicked = Some(place);
    }

    // Drain view model events before drawing so visibility is current for
    // this frame.
    self.handle_events(rect);
    self.check_summary_results();

    if ui.is_rect_visible(rect) {
      self.draw(ui, rect);
    }
    self.show_popup(ui);

    response
  }
}

/// Adjusts the transform so the given bounding box fills the screen rect.
fn fit_box(transform: &mut Transform, bb: &BoundingBox, rect: Rect) {
  if bb.is_valid() && bb.width() > 0. && bb.height() > 0. {
    let width_zoom = 1. / (bb.width() * transform.zoom / rect.width());
    let height_zoom = 1. / (bb.height() * transform.zoom / rect.height());
    transform.zoom(width_zoom.min(height_zoom).min(MAX_ZOOM));
    transform.zoom(0.95);
    transform.center_on(bb.center(), rect.center().into());
  }
}
