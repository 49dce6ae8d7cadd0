//! Static gift card catalog.
//!
//! A read-only lookup used by the HTTP layer to render cards and to fill in
//! the display fields of a cart addition. The cart service never consults it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Category name that matches every card
pub const ALL_CATEGORIES: &str = "All";

/// A purchasable gift card brand
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftCard {
    pub id: i32,
    pub name: &'static str,
    pub category: &'static str,
    pub image: &'static str,
    pub min_value: u32,
    pub max_value: u32,
    pub featured: bool,
    pub description: &'static str,
}

impl GiftCard {
    /// Whether `amount` lies within the card's purchasable range
    pub fn accepts_amount(&self, amount: Decimal) -> bool {
        amount >= Decimal::from(self.min_value) && amount <= Decimal::from(self.max_value)
    }
}

static GIFT_CARDS: [GiftCard; 12] = [
    GiftCard {
        id: 1,
        name: "Amazon",
        category: "Shopping",
        image: "🛒",
        min_value: 10,
        max_value: 500,
        featured: true,
        description: "Shop for millions of products on Amazon with this digital gift card. Perfect for any occasion!",
    },
    GiftCard {
        id: 2,
        name: "Netflix",
        category: "Entertainment",
        image: "🎬",
        min_value: 15,
        max_value: 100,
        featured: true,
        description: "Stream unlimited movies and TV shows with a Netflix gift card. Entertainment at your fingertips!",
    },
    GiftCard {
        id: 3,
        name: "Spotify",
        category: "Music",
        image: "🎵",
        min_value: 10,
        max_value: 100,
        featured: true,
        description: "Enjoy millions of songs and podcasts with Spotify Premium. Music for every mood!",
    },
    GiftCard {
        id: 4,
        name: "Starbucks",
        category: "Food & Dining",
        image: "☕",
        min_value: 5,
        max_value: 200,
        featured: true,
        description: "Get your favorite coffee and treats at Starbucks. The perfect gift for coffee lovers!",
    },
    GiftCard {
        id: 5,
        name: "Steam",
        category: "Gaming",
        image: "🎮",
        min_value: 10,
        max_value: 100,
        featured: true,
        description: "Buy games, software, and more on Steam. The ultimate gaming platform!",
    },
    GiftCard {
        id: 6,
        name: "iTunes",
        category: "Entertainment",
        image: "🎧",
        min_value: 10,
        max_value: 200,
        featured: true,
        description: "Purchase music, movies, apps, and more from the iTunes Store.",
    },
    GiftCard {
        id: 7,
        name: "Google Play",
        category: "Apps & Games",
        image: "📱",
        min_value: 10,
        max_value: 200,
        featured: true,
        description: "Get apps, games, movies, and more from Google Play Store.",
    },
    GiftCard {
        id: 8,
        name: "Uber",
        category: "Transportation",
        image: "🚗",
        min_value: 15,
        max_value: 200,
        featured: true,
        description: "Ride with Uber or get food delivered with Uber Eats.",
    },
    GiftCard {
        id: 9,
        name: "Target",
        category: "Shopping",
        image: "🎯",
        min_value: 10,
        max_value: 500,
        featured: false,
        description: "Shop for everything you need at Target stores or online.",
    },
    GiftCard {
        id: 10,
        name: "Walmart",
        category: "Shopping",
        image: "🏪",
        min_value: 10,
        max_value: 500,
        featured: false,
        description: "Save money and live better with a Walmart gift card.",
    },
    GiftCard {
        id: 11,
        name: "PlayStation",
        category: "Gaming",
        image: "🕹️",
        min_value: 10,
        max_value: 100,
        featured: false,
        description: "Buy the latest games and add-ons for your PlayStation console.",
    },
    GiftCard {
        id: 12,
        name: "Xbox",
        category: "Gaming",
        image: "🎯",
        min_value: 10,
        max_value: 100,
        featured: false,
        description: "Purchase games, movies, and more for your Xbox console.",
    },
];

static CATEGORIES: [&str; 8] = [
    ALL_CATEGORIES,
    "Shopping",
    "Entertainment",
    "Gaming",
    "Food & Dining",
    "Music",
    "Apps & Games",
    "Transportation",
];

/// Filters for [`search`]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogQuery {
    /// Exact category name; `None` or "All" matches every category
    pub category: Option<String>,
    /// Case-insensitive substring of the card name
    #[serde(rename = "q")]
    pub term: Option<String>,
    /// Restrict to featured cards when `Some(true)`
    pub featured: Option<bool>,
}

/// Every card, in catalog order
pub fn all() -> &'static [GiftCard] {
    &GIFT_CARDS
}

pub fn find(id: i32) -> Option<&'static GiftCard> {
    GIFT_CARDS.iter().find(|card| card.id == id)
}

/// Category filter options, "All" first
pub fn categories() -> &'static [&'static str] {
    &CATEGORIES
}

pub fn search(query: &CatalogQuery) -> Vec<&'static GiftCard> {
    let category = query
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty() && *c != ALL_CATEGORIES);
    let term = query
        .term
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase);

    GIFT_CARDS
        .iter()
        .filter(|card| category.map_or(true, |c| card.category == c))
        .filter(|card| {
            term.as_deref()
                .map_or(true, |t| card.name.to_lowercase().contains(t))
        })
        .filter(|card| query.featured != Some(true) || card.featured)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn ids_are_unique() {
        let mut ids: Vec<i32> = all().iter().map(|c| c.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), all().len());
    }

    #[test]
    fn every_card_category_is_listed() {
        for card in all() {
            assert!(categories().contains(&card.category), "{}", card.name);
        }
        assert_eq!(categories()[0], ALL_CATEGORIES);
    }

    #[test]
    fn find_by_id() {
        assert_eq!(find(5).map(|c| c.name), Some("Steam"));
        assert!(find(0).is_none());
        assert!(find(13).is_none());
    }

    #[test]
    fn featured_filter() {
        let featured = search(&CatalogQuery {
            featured: Some(true),
            ..Default::default()
        });
        assert_eq!(featured.len(), 8);
        assert!(featured.iter().all(|card| card.featured));

        let unfiltered = search(&CatalogQuery {
            featured: Some(false),
            ..Default::default()
        });
        assert_eq!(unfiltered.len(), 12);
    }

    #[test]
    fn search_by_category_and_term() {
        let all_gaming = search(&CatalogQuery {
            category: Some("Gaming".into()),
            ..Default::default()
        });
        assert_eq!(all_gaming.len(), 3);

        let everything = search(&CatalogQuery {
            category: Some(ALL_CATEGORIES.into()),
            ..Default::default()
        });
        assert_eq!(everything.len(), 12);

        let play = search(&CatalogQuery {
            term: Some("PLAY".into()),
            ..Default::default()
        });
        let names: Vec<_> = play.iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Google Play", "PlayStation"]);

        let featured_gaming = search(&CatalogQuery {
            category: Some("Gaming".into()),
            featured: Some(true),
            ..Default::default()
        });
        assert_eq!(featured_gaming.len(), 1);
    }

    #[test]
    fn amount_range_is_inclusive() {
        let netflix = find(2).unwrap();
        assert!(netflix.accepts_amount(dec!(15)));
        assert!(netflix.accepts_amount(dec!(100.00)));
        assert!(!netflix.accepts_amount(dec!(14.99)));
        assert!(!netflix.accepts_amount(dec!(100.01)));
    }
}
