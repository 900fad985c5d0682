use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr, PickFirst};

use crate::models::location::Coordinates;

/// Detail record served by `GET /destinations/{name}`.
///
/// Older backend revisions send numbers as strings, so numeric fields accept both.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationDetail {
    pub destination_name: String,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub destination_rating: f64,
    #[serde(default)]
    pub destination_address: String,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub destination_fare: i64,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub destination_staytime: u32,
    #[serde(default)]
    pub destination_area: Option<String>,
    #[serde(default)]
    pub destination_category: Option<String>,
    #[serde(default)]
    pub destination_description: String,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub destination_latitude: f64,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub destination_longitude: f64,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl DestinationDetail {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.destination_latitude, self.destination_longitude)
    }

    /// Header line, e.g. `清水寺（4.6）`.
    pub fn heading(&self) -> String {
        format!("{}（{}）", self.destination_name, self.destination_rating)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_numeric_strings_and_missing_optionals() {
        let raw = r#"{
            "destination_id": 7,
            "destination_name": "清水寺",
            "destination_rating": "4.6",
            "destination_address": "京都府京都市東山区清水1丁目294",
            "destination_fare": 500,
            "destination_staytime": "60",
            "destination_description": "木造の舞台で知られる寺院",
            "destination_latitude": 34.994856,
            "destination_longitude": 135.785046,
            "image_url": null
        }"#;
        let detail: DestinationDetail = serde_json::from_str(raw).unwrap();
        assert_eq!(detail.destination_rating, 4.6);
        assert_eq!(detail.destination_staytime, 60);
        assert_eq!(detail.destination_area, None);
        assert_eq!(detail.image_url, None);
        assert_eq!(detail.heading(), "清水寺（4.6）");
    }
}
