use crate::catalog::Place;
use crate::wiki::PageSummary;

/// Shown in place of the article link when the summary fetch fails.
pub const FETCH_FAILED_NOTE: &str = "Failed to fetch the Wikipedia article.";

/// What an open popup displays. Success carries the canonical page URL,
/// failure carries the fixed note instead; both keep the place name so the
/// popup stays informative either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupContent {
  pub title: String,
  pub page_url: Option<String>,
  pub extract: Option<String>,
  pub note: Option<&'static str>,
}

impl PopupContent {
  #[must_use]
  pub fn from_summary(place: &Place, summary: &PageSummary) -> Self {
    Self {
      title: place.name.clone(),
      page_url: Some(summary.page_url.clone()),
      extract: summary.extract.clone(),
      note: None,
    }
  }

  #[must_use]
  pub fn fetch_failed(place: &Place) -> Self {
    Self {
      title: place.name.clone(),
      page_url: None,
      extract: None,
      note: Some(FETCH_FAILED_NOTE),
    }
  }
}

/// Lifecycle of the single popup: a show request enters `Pending` and issues
/// one fetch; the completion (success or failure) moves it to `Open`. Closing
/// drops the state entirely, so the closed state has no variant here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopupState {
  Pending { seq: u64 },
  Open { content: PopupContent },
}

impl PopupState {
  #[must_use]
  pub fn is_pending(&self) -> bool {
    matches!(self, PopupState::Pending { .. })
  }

  #[must_use]
  pub fn is_open(&self) -> bool {
    matches!(self, PopupState::Open { .. })
  }
}
