use std::sync::Arc;

use egui::Widget as _;

use crate::{
  catalog,
  config::Config,
  map::chimap_egui::Map,
  viewmodel::ViewModel,
  wiki::{SummaryProvider, WikipediaProvider},
};

/// Holds the UI data of chimap.
pub struct ChimapApp {
  viewmodel: ViewModel,
  map: Map,
  sidebar: Sidebar,
}

impl ChimapApp {
  #[must_use]
  pub fn new(ctx: egui::Context) -> Self {
    let config = Config::new();
    let provider = Arc::new(WikipediaProvider::new(&config));
    Self::with_provider(ctx, &config, provider)
  }

  /// Wires the app with an explicit summary backend; tests use this to swap
  /// Wikipedia for a stub.
  #[must_use]
  pub fn with_provider(
    ctx: egui::Context,
    config: &Config,
    provider: Arc<dyn SummaryProvider>,
  ) -> Self {
    let places = catalog::chicago_landmarks();
    let mut viewmodel = ViewModel::new(places.clone());
    let map = Map::new(
      ctx,
      places,
      viewmodel.subscribe(),
      provider,
      config.fetch_timeout(),
    );
    Self {
      viewmodel,
      map,
      sidebar: Sidebar::default(),
    }
  }
}

impl eframe::App for ChimapApp {
  fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
    // Marker clicks arrive from the map pane; route them through the view
    // model so every view observes the same selection change.
    if let Some(index) = self.map.take_clicked() {
      self.viewmodel.select(index);
    }

    egui::SidePanel::left("sidebar")
      .default_width(240.0)
      .width_range(180.0..=400.0)
      .show(ctx, |ui| {
        self.sidebar.ui(ui, &mut self.viewmodel);
      });

    egui::CentralPanel::default()
      .frame(egui::Frame::NONE)
      .show(ctx, |ui| {
        (&mut self.map).ui(ui);
      });
  }

  // `eframe::App` now requires `ui`; the app's per-frame logic lives in the
  // still-invoked `update` above, so this required hook is intentionally empty.
  fn ui(&mut self, _ui: &mut egui::Ui, _frame: &mut eframe::Frame) {}
}

/// The filter input plus the filtered landmark list.
#[derive(Default)]
struct Sidebar {
  query: String,
}

impl Sidebar {
  fn ui(&mut self, ui: &mut egui::Ui, viewmodel: &mut ViewModel) {
    ui.heading("Chicago Landmarks");
    ui.separator();

    let response = ui.add_sized(
      [ui.available_width(), 0.0],
      egui::TextEdit::singleline(&mut self.query).hint_text("Filter landmarks..."),
    );
    if response.changed() {
      viewmodel.set_filter(&self.query);
    }

    if !self.query.is_empty() {
      ui.horizontal(|ui| {
        if ui.small_button("Clear").clicked() {
          self.query.clear();
          viewmodel.set_filter("");
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
          let count = viewmodel.visible_indices().len();
          ui.small(format!(
            "{count} landmark{}",
            if count == 1 { "" } else { "s" }
          ));
        });
      });
    }
    ui.separator();

    // Clone to avoid borrow checker issues with the selection call below.
    let entries: Vec<(usize, String)> = viewmodel
      .visible_indices()
      .iter()
      .map(|&index| (index, viewmodel.places()[index].name.clone()))
      .collect();
    let selected = viewmodel.selected_index();

    let mut clicked_index = None;
    egui::ScrollArea::vertical().show(ui, |ui| {
      for (index, name) in &entries {
        let is_selected = *index == selected;
        let response = ui.add_sized(
          [ui.available_width(), 0.0],
          egui::Button::new(name)
            .fill(if is_selected {
              ui.style().visuals.selection.bg_fill
            } else {
              egui::Color32::TRANSPARENT
            })
            .stroke(egui::Stroke::NONE),
        );

        if response.clicked() {
          clicked_index = Some(*index);
        }
        if response.hovered() {
          ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
        }
      }
    });

    if entries.is_empty() {
      ui.small("No landmarks match the filter.");
    }

    if let Some(index) = clicked_index {
      viewmodel.select(index);
    }
  }
}
