//! Pin placement for the "near me" view.
//!
//! There is no geolocation: each listing gets a stable pseudo-position
//! derived from its id, expressed as percentages of the map area and kept
//! inside the 20..80 band so pins never touch the edges.

use serde::Serialize;

use crate::listing::FoodItem;

const BAND_START_PCT: u32 = 20;
const BAND_WIDTH_PCT: u32 = 60;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapPin {
    pub item_id: String,
    pub title: String,
    pub top_pct: u32,
    pub left_pct: u32,
    pub ai_verified: bool,
}

/// `(top, left)` in percent for a listing id.
pub fn pin_position(id: &str) -> (u32, u32) {
    let mut units = id.encode_utf16();
    let hash = units.next().map(u32::from).unwrap_or(0) + units.next().map(u32::from).unwrap_or(0);
    let top = BAND_START_PCT + hash % BAND_WIDTH_PCT;
    let left = BAND_START_PCT + (hash * 2) % BAND_WIDTH_PCT;
    (top, left)
}

pub fn place_pins<'a, I>(items: I) -> Vec<MapPin>
where
    I: IntoIterator<Item = &'a FoodItem>,
{
    items
        .into_iter()
        .map(|item| {
            let (top_pct, left_pct) = pin_position(&item.id);
            MapPin {
                item_id: item.id.clone(),
                title: item.title.clone(),
                top_pct,
                left_pct,
                ai_verified: item.ai_verified,
            }
        })
        .collect()
}
