use std::sync::mpsc::Receiver;

use chimap::catalog::chicago_landmarks;
use chimap::map::markers::{MarkerSet, ShowOutcome};
use chimap::map::popup::{FETCH_FAILED_NOTE, PopupContent, PopupState};
use chimap::viewmodel::{ViewModel, ViewModelEvent};
use chimap::wiki::PageSummary;

/// Applies pending view model events to the marker set the way the map pane
/// does each frame, returning any show request that needs a fetch.
fn drain(events: &Receiver<ViewModelEvent>, markers: &mut MarkerSet) -> Option<(usize, u64)> {
  let mut fetch = None;
  for event in events.try_iter() {
    match event {
      ViewModelEvent::FilterChanged { visible } => markers.reconcile(&visible),
      ViewModelEvent::SelectionChanged { index } => {
        if let ShowOutcome::FetchNeeded { seq } = markers.request_show(index) {
          fetch = Some((index, seq));
        }
      }
    }
  }
  fetch
}

fn summary_for(page_title: &str) -> PageSummary {
  PageSummary {
    title: page_title.replace('_', " "),
    page_url: format!("https://en.wikipedia.org/wiki/{page_title}"),
    extract: None,
  }
}

#[test]
fn house_filter_keeps_catalog_order() {
  let places = chicago_landmarks();
  let mut vm = ViewModel::new(places.clone());
  let events = vm.subscribe();
  let mut markers = MarkerSet::from_catalog(&places);

  vm.set_filter("house");
  drain(&events, &mut markers);

  let names: Vec<_> = vm.visible_places().map(|p| p.name.as_str()).collect();
  assert_eq!(
    names,
    vec!["Hull House", "Chicago Union Station", "Civic Opera House"]
  );
  let visible: Vec<_> = markers.markers().iter().map(|m| m.visible).collect();
  assert_eq!(visible, vec![true, false, false, true, true]);
}

#[test]
fn selection_fetches_once_and_opens_with_url() {
  let places = chicago_landmarks();
  let mut vm = ViewModel::new(places.clone());
  let events = vm.subscribe();
  let mut markers = MarkerSet::from_catalog(&places);

  vm.select_place(&places[1]);
  let (place, seq) = drain(&events, &mut markers).expect("selection needs a fetch");
  assert_eq!(place, 1);

  // Selecting the same place again does not start a second fetch.
  vm.select(1);
  assert!(drain(&events, &mut markers).is_none());

  let summary = summary_for("Shedd_Aquarium");
  assert!(markers.apply_summary(
    place,
    seq,
    PopupContent::from_summary(&places[place], &summary)
  ));

  let (owner, state) = markers.displayed_popup().expect("popup open");
  assert_eq!(owner, 1);
  let PopupState::Open { content } = state else {
    panic!("popup should be open");
  };
  assert_eq!(content.title, "Shedd Aquarium");
  assert_eq!(
    content.page_url.as_deref(),
    Some("https://en.wikipedia.org/wiki/Shedd_Aquarium")
  );
}

#[test]
fn fetch_failure_degrades_to_the_note() {
  let places = chicago_landmarks();
  let mut vm = ViewModel::new(places.clone());
  let events = vm.subscribe();
  let mut markers = MarkerSet::from_catalog(&places);

  vm.select(2);
  let (place, seq) = drain(&events, &mut markers).expect("selection needs a fetch");

  assert!(markers.apply_summary(place, seq, PopupContent::fetch_failed(&places[place])));
  let (_, state) = markers.displayed_popup().expect("failure still opens");
  let PopupState::Open { content } = state else {
    panic!("failure is a terminal open state");
  };
  assert_eq!(content.title, "Pui Tak Center");
  assert_eq!(content.note, Some(FETCH_FAILED_NOTE));
  assert_eq!(content.page_url, None);
}

#[test]
fn no_match_filter_hides_everything_and_closes_the_popup() {
  let places = chicago_landmarks();
  let mut vm = ViewModel::new(places.clone());
  let events = vm.subscribe();
  let mut markers = MarkerSet::from_catalog(&places);

  vm.select(0);
  let (place, seq) = drain(&events, &mut markers).expect("selection needs a fetch");
  let summary = summary_for("Hull_House");
  markers.apply_summary(
    place,
    seq,
    PopupContent::from_summary(&places[place], &summary),
  );

  vm.set_filter("zzz");
  drain(&events, &mut markers);
  assert!(vm.visible_places().next().is_none());
  assert!(markers.markers().iter().all(|m| !m.visible));
  assert!(markers.displayed_popup().is_none());

  // Clearing the filter restores the popup for the same place.
  vm.set_filter("");
  drain(&events, &mut markers);
  let (owner, state) = markers.displayed_popup().expect("popup reopened");
  assert_eq!(owner, 0);
  assert!(state.is_open());
}

#[test]
fn completion_after_selection_moved_on_is_discarded() {
  let places = chicago_landmarks();
  let mut vm = ViewModel::new(places.clone());
  let events = vm.subscribe();
  let mut markers = MarkerSet::from_catalog(&places);

  vm.select(0);
  let (first_place, first_seq) = drain(&events, &mut markers).expect("first fetch");

  vm.select(3);
  let (second_place, second_seq) = drain(&events, &mut markers).expect("second fetch");

  // The late completion of the replaced popup must not resurrect it.
  let stale = summary_for("Hull_House");
  assert!(!markers.apply_summary(
    first_place,
    first_seq,
    PopupContent::from_summary(&places[first_place], &stale)
  ));

  let summary = summary_for("Chicago_Union_Station");
  assert!(markers.apply_summary(
    second_place,
    second_seq,
    PopupContent::from_summary(&places[second_place], &summary)
  ));
  assert_eq!(markers.displayed_popup().unwrap().0, 3);
}
