use serde::{Deserialize, Serialize};

/// The fixed canvas size the Web Mercator projection maps onto.
pub const CANVAS_SIZE: f32 = 1024. * 2.;

const PI: f32 = std::f32::consts::PI;

/// The standard WGS84 coordinate system.
#[derive(Debug, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct WGS84Coordinate {
  #[serde(alias = "latitude")]
  pub lat: f32,
  #[serde(alias = "longitude")]
  pub lon: f32,
}

impl WGS84Coordinate {
  #[must_use]
  pub fn new(lat: f32, lon: f32) -> Self {
    Self { lat, lon }
  }

  #[must_use]
  pub fn is_valid(&self) -> bool {
    -90.0 < self.lat && self.lat < 90.0 && -180.0 < self.lon && self.lon < 180.0
  }
}

/// A coordinate on an imaginary canvas, equivalent to the Web Mercator
/// projection at a fixed zoom level.
#[derive(Debug, Default, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct PixelCoordinate {
  pub x: f32,
  pub y: f32,
}

impl PixelCoordinate {
  #[must_use]
  pub fn new(x: f32, y: f32) -> Self {
    Self { x, y }
  }

  #[must_use]
  pub fn sq_dist(&self, p: &Self) -> f32 {
    let dx = p.x - self.x;
    let dy = p.y - self.y;
    dx * dx + dy * dy
  }
}

impl From<WGS84Coordinate> for PixelCoordinate {
  fn from(coord: WGS84Coordinate) -> Self {
    let lat_rad = coord.lat * PI / 180.;
    PixelCoordinate {
      x: (coord.lon + 180.) / 360. * CANVAS_SIZE,
      y: (1. - (lat_rad.tan() + 1. / lat_rad.cos()).ln() / PI) / 2. * CANVAS_SIZE,
    }
  }
}

impl From<PixelCoordinate> for WGS84Coordinate {
  fn from(pixel: PixelCoordinate) -> Self {
    WGS84Coordinate {
      lat: f32::atan(f32::sinh(PI * (1. - 2. * pixel.y / CANVAS_SIZE))) * 180. / PI,
      lon: pixel.x / CANVAS_SIZE * 360. - 180.,
    }
  }
}

/// An actual pixel in the UI. Handled equivalently to a ``egui::Pos2``.
#[derive(Debug, Default, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct PixelPosition {
  pub x: f32,
  pub y: f32,
}

impl From<egui::Pos2> for PixelPosition {
  fn from(pos: egui::Pos2) -> Self {
    PixelPosition { x: pos.x, y: pos.y }
  }
}

impl From<PixelPosition> for egui::Pos2 {
  fn from(pp: PixelPosition) -> Self {
    egui::Pos2::new(pp.x, pp.y)
  }
}

impl From<egui::Vec2> for PixelPosition {
  fn from(delta: egui::Vec2) -> Self {
    PixelPosition {
      x: delta.x,
      y: delta.y,
    }
  }
}

/// Keeps track of the mapping between canvas coordinates and pixels on the
/// screen.
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Transform {
  pub zoom: f32,
  pub trans: PixelPosition,
}

impl Default for Transform {
  fn default() -> Self {
    Self {
      zoom: 1.,
      trans: PixelPosition::default(),
    }
  }
}

impl Transform {
  /// Returns an invalid transform, to be replaced on the first frame.
  #[must_use]
  pub fn invalid() -> Self {
    Self {
      zoom: 0.,
      trans: PixelPosition::default(),
    }
  }

  #[must_use]
  pub fn is_invalid(&self) -> bool {
    self.zoom == 0. || self.zoom.is_nan() || self.trans.x.is_nan() || self.trans.y.is_nan()
  }

  /// Applies the transform to a canvas coordinate.
  #[must_use]
  pub fn apply(&self, coord: PixelCoordinate) -> PixelPosition {
    PixelPosition {
      x: coord.x * self.zoom + self.trans.x,
      y: coord.y * self.zoom + self.trans.y,
    }
  }

  /// Converts a screen position, e.g. from a click, back to a canvas
  /// coordinate.
  #[must_use]
  pub fn unapply(&self, pos: PixelPosition) -> PixelCoordinate {
    PixelCoordinate {
      x: (pos.x - self.trans.x) / self.zoom,
      y: (pos.y - self.trans.y) / self.zoom,
    }
  }

  pub fn translate(&mut self, delta: PixelPosition) -> &mut Self {
    self.trans.x += delta.x;
    self.trans.y += delta.y;
    self
  }

  /// Zooms the transform.
  pub fn zoom(&mut self, factor: f32) -> &mut Self {
    self.zoom *= factor;
    self
  }

  /// Moves the transform so that `coord` lands on the screen position
  /// `cursor`.
  pub fn center_on(&mut self, coord: PixelCoordinate, cursor: PixelPosition) {
    let current = self.apply(coord);
    self.translate(PixelPosition {
      x: cursor.x - current.x,
      y: cursor.y - current.y,
    });
  }
}

#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
  max_x: f32,
  min_x: f32,
  max_y: f32,
  min_y: f32,
}

impl Default for BoundingBox {
  fn default() -> Self {
    Self::new()
  }
}

impl BoundingBox {
  #[must_use]
  pub fn new() -> Self {
    Self::get_invalid()
  }

  #[must_use]
  pub fn get_invalid() -> Self {
    Self {
      max_x: f32::MIN,
      min_x: f32::MAX,
      max_y: f32::MIN,
      min_y: f32::MAX,
    }
  }

  pub fn from_iterator<I: IntoIterator<Item = PixelCoordinate>>(positions: I) -> Self {
    let mut bb = Self::get_invalid();
    positions.into_iter().for_each(|pos| bb.add_coordinate(pos));
    bb
  }

  #[must_use]
  pub fn center(&self) -> PixelCoordinate {
    PixelCoordinate {
      x: f32::midpoint(self.max_x, self.min_x),
      y: f32::midpoint(self.max_y, self.min_y),
    }
  }

  #[must_use]
  pub fn is_valid(&self) -> bool {
    self.min_y <= self.max_y
      && self.min_x <= self.max_x
      && self.min_x.abs() < CANVAS_SIZE
      && self.min_y.abs() < CANVAS_SIZE
      && self.max_x.abs() < CANVAS_SIZE
      && self.max_y.abs() < CANVAS_SIZE
  }

  pub fn frame(&mut self, frame: f32) {
    self.min_x -= frame;
    self.min_y -= frame;
    self.max_x += frame;
    self.max_y += frame;
  }

  pub fn add_coordinate(&mut self, pp: PixelCoordinate) {
    self.min_y = self.min_y.min(pp.y);
    self.min_x = self.min_x.min(pp.x);
    self.max_y = self.max_y.max(pp.y);
    self.max_x = self.max_x.max(pp.x);
  }

  #[must_use]
  pub fn width(&self) -> f32 {
    self.max_x - self.min_x
  }

  #[must_use]
  pub fn height(&self) -> f32 {
    self.max_y - self.min_y
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use assert_approx_eq::assert_approx_eq;

  #[test]
  fn mercator_round_trip() {
    let chicago = WGS84Coordinate::new(41.873_999, -87.634_908);
    let pixel = PixelCoordinate::from(chicago);
    let back = WGS84Coordinate::from(pixel);
    assert_approx_eq!(back.lat, chicago.lat, 0.001);
    assert_approx_eq!(back.lon, chicago.lon, 0.001);
  }

  #[test]
  fn mercator_origin() {
    let origin = WGS84Coordinate::new(0., 0.);
    let pixel = PixelCoordinate::from(origin);
    assert_approx_eq!(pixel.x, CANVAS_SIZE / 2.);
    assert_approx_eq!(pixel.y, CANVAS_SIZE / 2.);
  }

  #[test]
  fn transform_round_trip() {
    let mut transform = Transform::default();
    transform.zoom(5.);
    transform.translate(PixelPosition { x: 10., y: 20. });

    let coord = PixelCoordinate::new(100., 200.);
    let pos = transform.apply(coord);
    assert_approx_eq!(pos.x, 510.);
    assert_approx_eq!(pos.y, 1020.);

    let back = transform.unapply(pos);
    assert_approx_eq!(back.x, coord.x);
    assert_approx_eq!(back.y, coord.y);
  }

  #[test]
  fn center_on_puts_coordinate_under_cursor() {
    let mut transform = Transform::default();
    transform.zoom(3.);
    let coord = PixelCoordinate::new(512., 512.);
    let cursor = PixelPosition { x: 400., y: 300. };
    transform.center_on(coord, cursor);

    let pos = transform.apply(coord);
    assert_approx_eq!(pos.x, cursor.x);
    assert_approx_eq!(pos.y, cursor.y);
  }

  #[test]
  fn bounding_box_collects_coordinates() {
    let bb = BoundingBox::from_iterator(vec![
      PixelCoordinate::new(10., 20.),
      PixelCoordinate::new(30., 5.),
    ]);
    assert!(bb.is_valid());
    assert_approx_eq!(bb.width(), 20.);
    assert_approx_eq!(bb.height(), 15.);
    assert_approx_eq!(bb.center().x, 20.);
    assert_approx_eq!(bb.center().y, 12.5);
  }

  #[test]
  fn empty_bounding_box_is_invalid() {
    assert!(!BoundingBox::new().is_valid());
  }
}
