use log::debug;

use super::coordinates::{BoundingBox, PixelCoordinate, WGS84Coordinate};
use super::popup::{PopupContent, PopupState};
use crate::catalog::Place;

/// The visual map representation of one place. Created once at startup,
/// never destroyed; `place` is the catalog index it is correlated with.
#[derive(Debug, Clone)]
pub struct Marker {
  pub place: usize,
  pub title: String,
  pub coordinate: WGS84Coordinate,
  pub position: PixelCoordinate,
  pub visible: bool,
}

/// Outcome of a request to show a place's popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowOutcome {
  /// A popup for this place is already open or pending; re-focus only, no
  /// second fetch.
  AlreadyShowing,
  /// A fresh pending cycle started; issue one fetch with this sequence
  /// number.
  FetchNeeded { seq: u64 },
  /// The marker is hidden by the current filter; the request is ignored.
  Hidden,
}

/// One marker per catalog entry plus the popup side table. The popup is a
/// single slot keyed by place index, which enforces the at-most-one-popup
/// invariant by construction. The slot survives its owner being hidden by a
/// filter (the window just stops rendering) so clearing the filter restores
/// the user's context; only an explicit close or a show request for another
/// place releases it.
pub struct MarkerSet {
  markers: Vec<Marker>,
  popup: Option<(usize, PopupState)>,
  seq: u64,
}

impl MarkerSet {
  #[must_use]
  pub fn from_catalog(places: &[Place]) -> Self {
    let markers = places
      .iter()
      .enumerate()
      .map(|(index, place)| Marker {
        place: index,
        title: place.name.clone(),
        coordinate: place.coordinate,
        position: place.coordinate.into(),
        visible: true,
      })
      .collect();
    Self {
      markers,
      popup: None,
      seq: 0,
    }
  }

  #[must_use]
  pub fn markers(&self) -> &[Marker] {
    &self.markers
  }

  /// Canvas bounding box over all markers, for framing the initial view.
  #[must_use]
  pub fn bounding_box(&self) -> BoundingBox {
    BoundingBox::from_iterator(self.markers.iter().map(|m| m.position))
  }

  /// Mirrors marker visibility from the filtered view: everything off first,
  /// then the listed indices back on, so no stale visibility survives from a
  /// previous filter.
  pub fn reconcile(&mut self, visible: &[usize]) {
    for marker in &mut self.markers {
      marker.visible = false;
    }
    for &index in visible {
      if let Some(marker) = self.markers.get_mut(index) {
        marker.visible = true;
      }
    }
  }

  /// Requests the popup for `place`.
  ///
  /// # Panics
  /// Panics if `place` is not a marker index.
  pub fn request_show(&mut self, place: usize) -> ShowOutcome {
    assert!(place < self.markers.len(), "marker {place} does not exist");
    if !self.markers[place].visible {
      debug!("ignoring show request for hidden marker {place}");
      return ShowOutcome::Hidden;
    }
    if let Some((owner, _)) = &self.popup
      && *owner == place
    {
      return ShowOutcome::AlreadyShowing;
    }
    self.seq += 1;
    self.popup = Some((place, PopupState::Pending { seq: self.seq }));
    ShowOutcome::FetchNeeded { seq: self.seq }
  }

  /// Explicit close: ownership released, the next show starts a fresh
  /// pending cycle.
  pub fn close_popup(&mut self) {
    self.popup = None;
  }

  /// Applies a fetch completion. Returns false and discards the content when
  /// the popup was closed or replaced in the meantime (the seq no longer
  /// matches). A completion for a still-pending popup whose owner got hidden
  /// is applied; whether it is rendered is decided by [`Self::displayed_popup`].
  pub fn apply_summary(&mut self, place: usize, seq: u64, content: PopupContent) -> bool {
    match &self.popup {
      Some((owner, PopupState::Pending { seq: pending }))
        if *owner == place && *pending == seq =>
      {
        self.popup = Some((place, PopupState::Open { content }));
        true
      }
      _ => {
        debug!("discarding stale summary for marker {place} (seq {seq})");
        false
      }
    }
  }

  /// The popup slot including an entry whose owner is currently hidden.
  #[must_use]
  pub fn popup(&self) -> Option<(usize, &PopupState)> {
    self.popup.as_ref().map(|(owner, state)| (*owner, state))
  }

  /// The popup to render: `None` while the owning marker is hidden.
  #[must_use]
  pub fn displayed_popup(&self) -> Option<(usize, &PopupState)> {
    self
      .popup()
      .filter(|(owner, _)| self.markers[*owner].visible)
  }
}
