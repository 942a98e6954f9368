//! Demo data: the signed-in user and a handful of nearby listings.

use crate::listing::{FoodItem, ImpactStats, ListingStatus, User, UserRole};

const HOUR_MS: u64 = 60 * 60 * 1000;

pub fn current_user() -> User {
    User {
        id: "u1".to_string(),
        name: "Alex Johnson".to_string(),
        avatar: "https://picsum.photos/100/100".to_string(),
        role: UserRole::Both,
        rating: 4.8,
        badges: vec![
            "Eco Hero".to_string(),
            "Top Donor".to_string(),
            "Verified Neighbor".to_string(),
        ],
        stats: ImpactStats {
            meals_saved: 12,
            co2_reduced: 5.4,
            meals_received: 8,
            money_saved: 52.5,
        },
    }
}

/// Mock listings with preparation and expiry times relative to `now_ms`.
pub fn mock_items(now_ms: u64) -> Vec<FoodItem> {
    vec![
        FoodItem {
            id: "f1".to_string(),
            donor_id: "d1".to_string(),
            donor_name: "Sarah M.".to_string(),
            donor_avatar: "https://picsum.photos/101/101".to_string(),
            donor_rating: 4.9,
            title: "Homemade Vegetable Lasagna".to_string(),
            description:
                "Made too much for dinner. Fresh and still warm! Contains cheese and spinach."
                    .to_string(),
            image_url: "https://picsum.photos/400/300?random=1".to_string(),
            quantity: "2 Servings".to_string(),
            category: "Pasta".to_string(),
            is_halal: true,
            is_veg: true,
            prepared_at_ms: now_ms.saturating_sub(HOUR_MS),
            expires_at_ms: now_ms + 12 * HOUR_MS,
            pickup_location: "Downtown Apt 4B".to_string(),
            distance_km: 0.5,
            status: ListingStatus::Available,
            tags: tags(&["Homemade", "Vegetarian", "Hot"]),
            ai_verified: true,
        },
        FoodItem {
            id: "f2".to_string(),
            donor_id: "d2".to_string(),
            donor_name: "Bakery Delight".to_string(),
            donor_avatar: "https://picsum.photos/102/102".to_string(),
            donor_rating: 4.5,
            title: "Assorted Bagels & Pastries".to_string(),
            description:
                "End of day leftover bagels. Perfectly safe to eat, just not sold today."
                    .to_string(),
            image_url: "https://picsum.photos/400/300?random=2".to_string(),
            quantity: "Box of 6".to_string(),
            category: "Bakery".to_string(),
            is_halal: true,
            is_veg: true,
            prepared_at_ms: now_ms.saturating_sub(8 * HOUR_MS),
            expires_at_ms: now_ms + 24 * HOUR_MS,
            pickup_location: "Main St Bakery".to_string(),
            distance_km: 1.2,
            status: ListingStatus::Available,
            tags: tags(&["Bakery", "Sweet", "Grab & Go"]),
            ai_verified: false,
        },
        FoodItem {
            id: "f3".to_string(),
            donor_id: "d3".to_string(),
            donor_name: "Mike T.".to_string(),
            donor_avatar: "https://picsum.photos/103/103".to_string(),
            donor_rating: 4.2,
            title: "Unopened Canned Soup".to_string(),
            description: "Cleaning out pantry. Moving out soon. Tomato and Chicken Noodle."
                .to_string(),
            image_url: "https://picsum.photos/400/300?random=3".to_string(),
            quantity: "3 Cans".to_string(),
            category: "Pantry".to_string(),
            is_halal: false,
            is_veg: false,
            prepared_at_ms: now_ms,
            expires_at_ms: now_ms + 30 * 24 * HOUR_MS,
            pickup_location: "Westside Dorms".to_string(),
            distance_km: 2.5,
            status: ListingStatus::Available,
            tags: tags(&["Sealed", "Long-life"]),
            ai_verified: true,
        },
    ]
}

fn tags(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}
