use std::sync::mpsc::{Receiver, Sender, channel};

use log::debug;

use crate::catalog::Place;

/// Notifications sent to subscribers whenever the view model mutates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewModelEvent {
  /// The filter text changed; carries the indices of the places that remain
  /// visible, in catalog order.
  FilterChanged { visible: Vec<usize> },
  /// The selection changed to the place at this catalog index.
  SelectionChanged { index: usize },
}

/// Owns the place list, the current filter, and the current selection, and
/// derives the filtered view. Views register through [`ViewModel::subscribe`]
/// and are notified on every mutation.
pub struct ViewModel {
  places: Vec<Place>,
  filter: String,
  selected: usize,
  visible: Vec<usize>,
  subscribers: Vec<Sender<ViewModelEvent>>,
}

impl ViewModel {
  /// The catalog must not be empty: the first entry is the initial selection.
  #[must_use]
  pub fn new(places: Vec<Place>) -> Self {
    assert!(!places.is_empty(), "catalog must not be empty");
    let visible = (0..places.len()).collect();
    Self {
      places,
      filter: String::new(),
      selected: 0,
      visible,
      subscribers: Vec::new(),
    }
  }

  /// Registration point for views interested in filter and selection changes.
  pub fn subscribe(&mut self) -> Receiver<ViewModelEvent> {
    let (sender, receiver) = channel();
    self.subscribers.push(sender);
    receiver
  }

  /// Replaces the filter text and recomputes the visible subsequence. The
  /// empty string resets to the unfiltered view.
  pub fn set_filter(&mut self, text: &str) {
    self.filter = text.to_string();
    self.visible = self
      .places
      .iter()
      .enumerate()
      .filter(|(_, place)| Self::matches(&place.name, &self.filter))
      .map(|(index, _)| index)
      .collect();
    debug!(
      "filter '{}' leaves {} of {} places visible",
      self.filter,
      self.visible.len(),
      self.places.len()
    );
    let event = ViewModelEvent::FilterChanged {
      visible: self.visible.clone(),
    };
    self.notify(&event);
  }

  #[must_use]
  pub fn filter(&self) -> &str {
    &self.filter
  }

  /// Selects the place at `index`.
  ///
  /// # Panics
  /// Panics if `index` is not a catalog index. Selection of an unknown place
  /// is a programming error, not a user-reachable state.
  pub fn select(&mut self, index: usize) {
    assert!(
      index < self.places.len(),
      "selected index {index} is not in the catalog"
    );
    self.selected = index;
    self.notify(&ViewModelEvent::SelectionChanged { index });
  }

  /// Selects by place value, looked up by name.
  ///
  /// # Panics
  /// Panics if `place` is not a member of the catalog.
  pub fn select_place(&mut self, place: &Place) {
    let index = self
      .places
      .iter()
      .position(|p| p.name == place.name)
      .unwrap_or_else(|| panic!("place '{}' is not in the catalog", place.name));
    self.select(index);
  }

  #[must_use]
  pub fn places(&self) -> &[Place] {
    &self.places
  }

  /// Catalog indices of the places matching the current filter, in catalog
  /// order.
  #[must_use]
  pub fn visible_indices(&self) -> &[usize] {
    &self.visible
  }

  pub fn visible_places(&self) -> impl Iterator<Item = &Place> {
    self.visible.iter().map(|&index| &self.places[index])
  }

  #[must_use]
  pub fn selected_index(&self) -> usize {
    self.selected
  }

  #[must_use]
  pub fn selected_place(&self) -> &Place {
    &self.places[self.selected]
  }

  /// Case-insensitive substring match, uppercase-normalizing both sides.
  fn matches(name: &str, filter: &str) -> bool {
    name.to_uppercase().contains(&filter.to_uppercase())
  }

  fn notify(&self, event: &ViewModelEvent) {
    for subscriber in &self.subscribers {
      // A dropped receiver only means that view is gone.
      let _ = subscriber.send(event.clone());
    }
  }
}
