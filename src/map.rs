//! Map data handed to `static/map.js`, which only draws what it is given.

use serde::Serialize;

use crate::models::{location::Coordinates, route::Stop};

pub const ROUTE_ZOOM: u8 = 12;
pub const DESTINATION_ZOOM: u8 = 15;
pub const FIT_PADDING: [u32; 2] = [50, 50];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileLayer {
    pub url_template: String,
    pub attribution: String,
}

impl Default for TileLayer {
    fn default() -> Self {
        Self {
            url_template: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".into(),
            attribution: "&copy; OpenStreetMap contributors".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MapView {
    pub center: [f64; 2],
    pub zoom: u8,
    pub tile_url: String,
    pub attribution: String,
    pub markers: Vec<Marker>,
    /// Polyline through the markers; empty for single-point maps.
    pub path: Vec<[f64; 2]>,
    pub fit: Option<FitBounds>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub position: [f64; 2],
    pub popup: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitBounds {
    /// `[[south, west], [north, east]]`
    pub bounds: [[f64; 2]; 2],
    pub padding: [u32; 2],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    pub fn around<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Coordinates>,
    {
        points.into_iter().fold(None, |bounds, point| {
            Some(match bounds {
                None => Bounds {
                    south: point.latitude,
                    west: point.longitude,
                    north: point.latitude,
                    east: point.longitude,
                },
                Some(b) => Bounds {
                    south: b.south.min(point.latitude),
                    west: b.west.min(point.longitude),
                    north: b.north.max(point.latitude),
                    east: b.east.max(point.longitude),
                },
            })
        })
    }

    pub fn contains(&self, point: Coordinates) -> bool {
        (self.south..=self.north).contains(&point.latitude)
            && (self.west..=self.east).contains(&point.longitude)
    }
}

impl MapView {
    /// Itinerary map: one marker per stop and a polyline, both in visiting order.
    pub fn route(tiles: &TileLayer, center: Coordinates, stops: &[Stop]) -> Self {
        let markers = stops
            .iter()
            .map(|stop| Marker {
                position: stop.coordinates().as_lat_lng(),
                popup: stop.name.clone(),
            })
            .collect();
        let path = stops
            .iter()
            .map(|stop| stop.coordinates().as_lat_lng())
            .collect();
        let fit = Bounds::around(stops.iter().map(Stop::coordinates)).map(|b| FitBounds {
            bounds: [[b.south, b.west], [b.north, b.east]],
            padding: FIT_PADDING,
        });

        Self {
            center: center.as_lat_lng(),
            zoom: ROUTE_ZOOM,
            tile_url: tiles.url_template.clone(),
            attribution: tiles.attribution.clone(),
            markers,
            path,
            fit,
        }
    }

    pub fn single(tiles: &TileLayer, position: Coordinates, popup: impl Into<String>) -> Self {
        Self {
            center: position.as_lat_lng(),
            zoom: DESTINATION_ZOOM,
            tile_url: tiles.url_template.clone(),
            attribution: tiles.attribution.clone(),
            markers: vec![Marker {
                position: position.as_lat_lng(),
                popup: popup.into(),
            }],
            path: Vec::new(),
            fit: None,
        }
    }

    pub fn fit_bounds(&self) -> Option<Bounds> {
        self.fit.as_ref().map(|fit| Bounds {
            south: fit.bounds[0][0],
            west: fit.bounds[0][1],
            north: fit.bounds[1][0],
            east: fit.bounds[1][1],
        })
    }

    /// JSON for a `<script type="application/json">` island. `<`, `>` and `&`
    /// are escaped so a stop name can never close the script element.
    pub fn to_script_json(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_string(self)?;
        Ok(json
            .replace('<', "\\u003c")
            .replace('>', "\\u003e")
            .replace('&', "\\u0026"))
    }
}
