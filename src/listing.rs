//! Food listings: the post-food draft, listing records, and the in-memory
//! catalog recipients browse and claim from.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::classify::ClassificationResult;
use crate::new_id;

pub const AI_VERIFIED_TAG: &str = "AI Verified";
pub const PLACEHOLDER_IMAGE_URL: &str = "https://picsum.photos/400/300";
/// Distance shown for a listing the current user just posted.
const OWN_LISTING_DISTANCE_KM: f32 = 0.1;
const HOUR_MS: u64 = 60 * 60 * 1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Donor,
    Recipient,
    Both,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactStats {
    pub meals_saved: u32,
    /// Kilograms.
    pub co2_reduced: f32,
    pub meals_received: u32,
    pub money_saved: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub avatar: String,
    pub role: UserRole,
    pub rating: f32,
    pub badges: Vec<String>,
    pub stats: ImpactStats,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListingStatus {
    Available,
    Claimed,
    PickedUp,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodItem {
    pub id: String,
    pub donor_id: String,
    pub donor_name: String,
    pub donor_avatar: String,
    pub donor_rating: f32,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub quantity: String,
    pub category: String,
    pub is_halal: bool,
    pub is_veg: bool,
    pub prepared_at_ms: u64,
    pub expires_at_ms: u64,
    pub pickup_location: String,
    pub distance_km: f32,
    pub status: ListingStatus,
    pub tags: Vec<String>,
    pub ai_verified: bool,
}

impl FoodItem {
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at_ms
    }
}

/// How long a posted item stays up for pickup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupWindow {
    OneHour,
    #[default]
    TwoHours,
    FourHours,
    TwelveHours,
    TwentyFourHours,
}

impl PickupWindow {
    pub const ALL: [PickupWindow; 5] = [
        PickupWindow::OneHour,
        PickupWindow::TwoHours,
        PickupWindow::FourHours,
        PickupWindow::TwelveHours,
        PickupWindow::TwentyFourHours,
    ];

    pub fn from_hours(hours: u32) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|window| window.hours() == hours)
            .ok_or_else(|| anyhow!("pickup window must be one of 1, 2, 4, 12 or 24 hours"))
    }

    pub fn hours(self) -> u32 {
        match self {
            PickupWindow::OneHour => 1,
            PickupWindow::TwoHours => 2,
            PickupWindow::FourHours => 4,
            PickupWindow::TwelveHours => 12,
            PickupWindow::TwentyFourHours => 24,
        }
    }

    pub fn as_millis(self) -> u64 {
        self.hours() as u64 * HOUR_MS
    }
}

/// What the classifier said about the photo, kept next to the form fields.
#[derive(Clone, Debug, PartialEq)]
pub struct AiAssessment {
    pub freshness_score: f64,
    pub verified: bool,
}

/// In-progress post-food form.
#[derive(Clone, Debug, PartialEq)]
pub struct ListingDraft {
    pub title: String,
    pub description: String,
    pub quantity: String,
    pub category: String,
    pub is_halal: bool,
    pub is_veg: bool,
    pub pickup_location: String,
    pub pickup_window: PickupWindow,
    pub safety_confirmed: bool,
    pub image_url: Option<String>,
    pub assessment: Option<AiAssessment>,
}

impl Default for ListingDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            quantity: "1 Portion".to_string(),
            category: "General".to_string(),
            is_halal: false,
            is_veg: false,
            pickup_location: "My Current Location".to_string(),
            pickup_window: PickupWindow::default(),
            safety_confirmed: false,
            image_url: None,
            assessment: None,
        }
    }
}

impl ListingDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefill the form from a classification. Every field stays editable;
    /// the classification is advisory.
    pub fn apply_classification(&mut self, result: &ClassificationResult) {
        self.title = result.title.clone();
        self.description = result.description.clone();
        self.category = result.category.clone();
        self.is_halal = result.is_halal;
        self.is_veg = result.is_veg;
        self.assessment = Some(AiAssessment {
            freshness_score: result.freshness_score,
            verified: result.safety_check,
        });
    }

    pub fn ai_verified(&self) -> bool {
        self.assessment
            .as_ref()
            .is_some_and(|assessment| assessment.verified)
    }

    /// Turn the draft into an available listing owned by `donor`.
    pub fn submit(self, donor: &User, now_ms: u64) -> Result<FoodItem> {
        if !self.safety_confirmed {
            return Err(anyhow!("donor must confirm the food is safe to eat"));
        }
        let title = self.title.trim();
        if title.is_empty() {
            return Err(anyhow!("listing title must not be empty"));
        }
        let ai_verified = self.ai_verified();
        let tags = if ai_verified {
            vec![AI_VERIFIED_TAG.to_string()]
        } else {
            Vec::new()
        };
        Ok(FoodItem {
            id: new_id(),
            donor_id: donor.id.clone(),
            donor_name: donor.name.clone(),
            donor_avatar: donor.avatar.clone(),
            donor_rating: donor.rating,
            title: title.to_string(),
            description: self.description,
            image_url: self
                .image_url
                .unwrap_or_else(|| PLACEHOLDER_IMAGE_URL.to_string()),
            quantity: self.quantity,
            category: self.category,
            is_halal: self.is_halal,
            is_veg: self.is_veg,
            prepared_at_ms: now_ms,
            expires_at_ms: now_ms + self.pickup_window.as_millis(),
            pickup_location: self.pickup_location,
            distance_km: OWN_LISTING_DISTANCE_KM,
            status: ListingStatus::Available,
            tags,
            ai_verified,
        })
    }
}

/// Browse filter chips.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ListingFilter {
    #[default]
    All,
    Veg,
    Halal,
    /// Matches the category or any tag exactly.
    Label(String),
}

impl ListingFilter {
    pub fn parse(label: &str) -> Self {
        match label.trim() {
            "" | "All" => ListingFilter::All,
            "Veg" => ListingFilter::Veg,
            "Halal" => ListingFilter::Halal,
            other => ListingFilter::Label(other.to_string()),
        }
    }

    pub fn matches(&self, item: &FoodItem) -> bool {
        match self {
            ListingFilter::All => true,
            ListingFilter::Veg => item.is_veg,
            ListingFilter::Halal => item.is_halal,
            ListingFilter::Label(label) => {
                item.category == *label || item.tags.iter().any(|tag| tag == label)
            }
        }
    }
}

/// In-memory listing store, newest first.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    items: Vec<FoodItem>,
}

impl Catalog {
    pub fn new(items: Vec<FoodItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[FoodItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&FoodItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn post(&mut self, item: FoodItem) -> Result<()> {
        if self.get(&item.id).is_some() {
            return Err(anyhow!("listing '{}' already posted", item.id));
        }
        log::info!("listing posted: {} ({})", item.title, item.id);
        self.items.insert(0, item);
        Ok(())
    }

    pub fn claim(&mut self, id: &str, claimant_id: &str) -> Result<&FoodItem> {
        let item = self.get_mut(id)?;
        if item.donor_id == claimant_id {
            return Err(anyhow!("donor cannot claim their own listing '{}'", id));
        }
        if item.status != ListingStatus::Available {
            return Err(anyhow!("listing '{}' is not available ({:?})", id, item.status));
        }
        item.status = ListingStatus::Claimed;
        log::info!("listing claimed: {} by {}", id, claimant_id);
        Ok(item)
    }

    pub fn mark_picked_up(&mut self, id: &str) -> Result<&FoodItem> {
        let item = self.get_mut(id)?;
        if item.status != ListingStatus::Claimed {
            return Err(anyhow!("listing '{}' must be claimed before pickup", id));
        }
        item.status = ListingStatus::PickedUp;
        Ok(item)
    }

    pub fn filtered(&self, filter: &ListingFilter) -> Vec<&FoodItem> {
        self.items.iter().filter(|item| filter.matches(item)).collect()
    }

    pub fn available(&self, now_ms: u64) -> Vec<&FoodItem> {
        self.items
            .iter()
            .filter(|item| item.status == ListingStatus::Available && !item.is_expired(now_ms))
            .collect()
    }

    /// Listings that are both claimable right now and match `filter`.
    pub fn available_filtered(&self, filter: &ListingFilter, now_ms: u64) -> Vec<&FoodItem> {
        self.available(now_ms)
            .into_iter()
            .filter(|item| filter.matches(item))
            .collect()
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut FoodItem> {
        self.items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| anyhow!("unknown listing '{}'", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    const NOW: u64 = 1_700_000_000_000;

    fn classified(verified: bool) -> ClassificationResult {
        ClassificationResult {
            title: "Fruit Bowl".to_string(),
            description: "Apples and pears".to_string(),
            category: "Fruit".to_string(),
            is_halal: true,
            is_veg: true,
            freshness_score: 9.0,
            safety_check: verified,
            tags: vec!["Fresh".to_string()],
        }
    }

    #[test]
    fn draft_defaults() {
        let draft = ListingDraft::new();
        assert_eq!(draft.quantity, "1 Portion");
        assert_eq!(draft.category, "General");
        assert_eq!(draft.pickup_location, "My Current Location");
        assert_eq!(draft.pickup_window.hours(), 2);
        assert!(!draft.safety_confirmed);
    }

    #[test]
    fn classification_prefills_draft() {
        let mut draft = ListingDraft::new();
        draft.apply_classification(&classified(true));
        assert_eq!(draft.title, "Fruit Bowl");
        assert_eq!(draft.category, "Fruit");
        assert!(draft.is_veg && draft.is_halal);
        assert_eq!(draft.quantity, "1 Portion");
        assert!(draft.ai_verified());
        assert_eq!(draft.assessment.as_ref().unwrap().freshness_score, 9.0);
    }

    #[test]
    fn submit_requires_safety_confirmation_and_title() {
        let donor = seed::current_user();
        let mut draft = ListingDraft::new();
        draft.title = "Soup".to_string();
        assert!(draft.clone().submit(&donor, NOW).is_err());

        draft.safety_confirmed = true;
        draft.title = "   ".to_string();
        assert!(draft.submit(&donor, NOW).is_err());
    }

    #[test]
    fn submit_builds_available_listing() {
        let donor = seed::current_user();
        let mut draft = ListingDraft::new();
        draft.apply_classification(&classified(true));
        draft.pickup_window = PickupWindow::from_hours(4).unwrap();
        draft.safety_confirmed = true;

        let item = draft.submit(&donor, NOW).unwrap();
        assert_eq!(item.status, ListingStatus::Available);
        assert_eq!(item.donor_id, donor.id);
        assert_eq!(item.expires_at_ms, NOW + 4 * HOUR_MS);
        assert_eq!(item.tags, vec![AI_VERIFIED_TAG.to_string()]);
        assert!(item.ai_verified);
        assert_eq!(item.image_url, PLACEHOLDER_IMAGE_URL);
        assert_eq!(item.distance_km, 0.1);
    }

    #[test]
    fn unverified_listing_has_no_tags() {
        let mut draft = ListingDraft::new();
        draft.apply_classification(&classified(false));
        draft.safety_confirmed = true;
        draft.image_url = Some("data:image/jpeg;base64,AA==".to_string());
        let item = draft.submit(&seed::current_user(), NOW).unwrap();
        assert!(item.tags.is_empty());
        assert!(!item.ai_verified);
        assert_eq!(item.image_url, "data:image/jpeg;base64,AA==");
    }

    #[test]
    fn pickup_window_rejects_unlisted_hours() {
        assert!(PickupWindow::from_hours(3).is_err());
        assert_eq!(PickupWindow::from_hours(24).unwrap(), PickupWindow::TwentyFourHours);
    }

    #[test]
    fn post_prepends() {
        let mut catalog = Catalog::new(seed::mock_items(NOW));
        let mut draft = ListingDraft::new();
        draft.title = "Rice".to_string();
        draft.safety_confirmed = true;
        let item = draft.submit(&seed::current_user(), NOW).unwrap();
        let id = item.id.clone();
        catalog.post(item.clone()).unwrap();
        assert_eq!(catalog.items()[0].id, id);
        assert_eq!(catalog.len(), 4);
        assert!(catalog.post(item).is_err());
    }

    #[test]
    fn claim_and_pickup_transitions() {
        let mut catalog = Catalog::new(seed::mock_items(NOW));
        let user = seed::current_user();

        assert!(catalog.mark_picked_up("f1").is_err());
        assert_eq!(catalog.claim("f1", &user.id).unwrap().status, ListingStatus::Claimed);
        assert!(catalog.claim("f1", &user.id).is_err());
        assert_eq!(catalog.mark_picked_up("f1").unwrap().status, ListingStatus::PickedUp);
        assert!(catalog.claim("missing", &user.id).is_err());
        assert!(catalog.claim("f2", "d2").is_err());
        assert_eq!(catalog.available(NOW).len(), 2);
    }

    #[test]
    fn filters_by_chip() {
        let catalog = Catalog::new(seed::mock_items(NOW));
        assert_eq!(catalog.filtered(&ListingFilter::parse("All")).len(), 3);
        assert_eq!(catalog.filtered(&ListingFilter::parse("Veg")).len(), 2);
        assert_eq!(catalog.filtered(&ListingFilter::parse("Halal")).len(), 2);

        let bakery = catalog.filtered(&ListingFilter::parse("Bakery"));
        assert_eq!(bakery.len(), 1);
        assert_eq!(bakery[0].id, "f2");

        let homemade = catalog.filtered(&ListingFilter::parse("Homemade"));
        assert_eq!(homemade.len(), 1);
        assert_eq!(homemade[0].id, "f1");

        assert!(catalog.filtered(&ListingFilter::parse("Meat")).is_empty());
    }

    #[test]
    fn expired_items_are_not_available() {
        let catalog = Catalog::new(seed::mock_items(NOW));
        let far_future = NOW + 31 * 24 * HOUR_MS;
        assert!(catalog.available(far_future).is_empty());
    }

    #[test]
    fn available_filter_skips_claimed_listings() {
        let mut catalog = Catalog::new(seed::mock_items(NOW));
        let veg = ListingFilter::parse("Veg");
        assert_eq!(catalog.available_filtered(&veg, NOW).len(), 2);

        catalog.claim("f1", &seed::current_user().id).unwrap();
        let remaining = catalog.available_filtered(&veg, NOW);
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, "f2");
        assert_eq!(catalog.filtered(&veg).len(), 2);

        let far_future = NOW + 31 * 24 * HOUR_MS;
        assert!(catalog
            .available_filtered(&ListingFilter::parse("All"), far_future)
            .is_empty());
    }
}
