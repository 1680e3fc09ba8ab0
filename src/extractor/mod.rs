//! Record extraction from raw listing data
//!
//! Search pages embed each home as a nested JSON object. This module turns one
//! such object into a [`Listing`], reading every field through a two-level
//! lookup that tolerates missing keys, nulls and unexpected shapes.
//!
//! Extraction never fails: anything absent becomes the [`UNKNOWN`] sentinel
//! (or `None` for availability).

mod listing;

pub use listing::{Listing, UNKNOWN};

use serde_json::Value;

/// Builds a typed listing from one raw home object
///
/// # Field Map
///
/// | Listing field | Source path |
/// |---------------|-------------|
/// | address | `location.streetAddress` |
/// | city | `location.city` |
/// | state | `location.stateCode` |
/// | zip_code | `location.zipCode` |
/// | link | `url` |
/// | description | `description.value` |
/// | beds | `bedrooms.formattedValue` |
/// | baths | `bathrooms.formattedValue` |
/// | sqft | `floorSpace.formattedDimension` |
/// | price | `price.price` |
/// | front_pic | `media.heroImage.url` (`medium` size when sized) |
/// | available | `currentStatus.isActiveForSale` |
///
/// # Example
///
/// ```
/// use homes_harvest::extractor::{extract_listing, UNKNOWN};
/// use serde_json::json;
///
/// let raw = json!({ "location": { "streetAddress": "123 Main St" } });
/// let listing = extract_listing(&raw);
/// assert_eq!(listing.address, "123 Main St");
/// assert_eq!(listing.link, UNKNOWN);
/// ```
pub fn extract_listing(raw: &Value) -> Listing {
    Listing {
        address: text_at(raw, "location", "streetAddress"),
        city: text_at(raw, "location", "city"),
        state: text_at(raw, "location", "stateCode"),
        zip_code: text_at(raw, "location", "zipCode"),
        link: raw.get("url").and_then(scalar_text).unwrap_or_else(unknown),
        description: text_at(raw, "description", "value"),
        beds: text_at(raw, "bedrooms", "formattedValue"),
        baths: text_at(raw, "bathrooms", "formattedValue"),
        sqft: text_at(raw, "floorSpace", "formattedDimension"),
        price: text_at(raw, "price", "price"),
        front_pic: hero_image(raw).unwrap_or_else(unknown),
        available: safe_get(raw, "currentStatus", "isActiveForSale").and_then(Value::as_bool),
        score: 0,
    }
}

/// Extracts every home in a payload, preserving page order
pub fn extract_all(homes: &[Value]) -> Vec<Listing> {
    homes.iter().map(extract_listing).collect()
}

/// Looks up `raw[outer][inner]`, treating a missing level or a JSON null as absent
pub fn safe_get<'a>(raw: &'a Value, outer: &str, inner: &str) -> Option<&'a Value> {
    raw.get(outer)?.get(inner).filter(|value| !value.is_null())
}

fn text_at(raw: &Value, outer: &str, inner: &str) -> String {
    safe_get(raw, outer, inner)
        .and_then(scalar_text)
        .unwrap_or_else(unknown)
}

/// Renders a JSON scalar as opaque text; containers and nulls have no text form
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn hero_image(raw: &Value) -> Option<String> {
    let url = safe_get(raw, "media", "heroImage")?.get("url")?;

    match url {
        Value::Object(sizes) => sizes.get("medium").and_then(scalar_text),
        other => scalar_text(other),
    }
}

fn unknown() -> String {
    UNKNOWN.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_home() -> Value {
        json!({
            "url": "/p/ca/san-jose/123-main-st-san-jose-ca-95112--2000000001",
            "location": {
                "streetAddress": "123 Main St",
                "city": "San Jose",
                "stateCode": "CA",
                "zipCode": "95112"
            },
            "description": { "value": "Charming single family home" },
            "bedrooms": { "formattedValue": "3bd" },
            "bathrooms": { "formattedValue": "2ba" },
            "floorSpace": { "formattedDimension": "1,450 sqft" },
            "price": { "price": 1250000, "formattedPrice": "$1,250,000" },
            "media": {
                "heroImage": {
                    "url": {
                        "small": "https://img.example/s.jpg",
                        "medium": "https://img.example/m.jpg"
                    }
                }
            },
            "currentStatus": { "isActiveForSale": true }
        })
    }

    #[test]
    fn test_extract_full_listing() {
        let listing = extract_listing(&full_home());

        assert_eq!(listing.address, "123 Main St");
        assert_eq!(listing.city, "San Jose");
        assert_eq!(listing.state, "CA");
        assert_eq!(listing.zip_code, "95112");
        assert_eq!(
            listing.link,
            "/p/ca/san-jose/123-main-st-san-jose-ca-95112--2000000001"
        );
        assert_eq!(listing.description, "Charming single family home");
        assert_eq!(listing.beds, "3bd");
        assert_eq!(listing.baths, "2ba");
        assert_eq!(listing.sqft, "1,450 sqft");
        assert_eq!(listing.price, "1250000");
        assert_eq!(listing.front_pic, "https://img.example/m.jpg");
        assert_eq!(listing.available, Some(true));
        assert_eq!(listing.score, 0);
        assert!(!listing.is_partial());
    }

    #[test]
    fn test_city_and_state_are_not_swapped() {
        let listing = extract_listing(&full_home());
        assert_eq!(listing.city, "San Jose");
        assert_eq!(listing.state, "CA");
    }

    #[test]
    fn test_empty_object_is_all_sentinels() {
        let listing = extract_listing(&json!({}));

        assert_eq!(listing.address, UNKNOWN);
        assert_eq!(listing.city, UNKNOWN);
        assert_eq!(listing.state, UNKNOWN);
        assert_eq!(listing.zip_code, UNKNOWN);
        assert_eq!(listing.link, UNKNOWN);
        assert_eq!(listing.description, UNKNOWN);
        assert_eq!(listing.beds, UNKNOWN);
        assert_eq!(listing.baths, UNKNOWN);
        assert_eq!(listing.sqft, UNKNOWN);
        assert_eq!(listing.price, UNKNOWN);
        assert_eq!(listing.front_pic, UNKNOWN);
        assert_eq!(listing.available, None);
    }

    #[test]
    fn test_missing_inner_keys() {
        let raw = json!({
            "location": {},
            "bedrooms": {},
            "currentStatus": {}
        });
        let listing = extract_listing(&raw);

        assert_eq!(listing.address, UNKNOWN);
        assert_eq!(listing.beds, UNKNOWN);
        assert_eq!(listing.available, None);
    }

    #[test]
    fn test_null_and_wrong_shapes_fall_back() {
        let raw = json!({
            "url": null,
            "location": null,
            "description": "not an object",
            "bedrooms": [1, 2],
            "bathrooms": { "formattedValue": null },
            "price": { "price": { "nested": 1 } },
            "media": { "heroImage": null },
            "currentStatus": { "isActiveForSale": "yes" }
        });
        let listing = extract_listing(&raw);

        assert_eq!(listing.link, UNKNOWN);
        assert_eq!(listing.address, UNKNOWN);
        assert_eq!(listing.description, UNKNOWN);
        assert_eq!(listing.beds, UNKNOWN);
        assert_eq!(listing.baths, UNKNOWN);
        assert_eq!(listing.price, UNKNOWN);
        assert_eq!(listing.front_pic, UNKNOWN);
        assert_eq!(listing.available, None);
    }

    #[test]
    fn test_non_object_payload_entries() {
        for raw in [json!(null), json!(42), json!("home"), json!([])] {
            let listing = extract_listing(&raw);
            assert_eq!(listing.address, UNKNOWN);
            assert_eq!(listing.link, UNKNOWN);
        }
    }

    #[test]
    fn test_string_hero_image_url() {
        let raw = json!({ "media": { "heroImage": { "url": "https://img.example/x.jpg" } } });
        assert_eq!(extract_listing(&raw).front_pic, "https://img.example/x.jpg");
    }

    #[test]
    fn test_sized_hero_image_without_medium() {
        let raw = json!({ "media": { "heroImage": { "url": { "small": "s.jpg" } } } });
        assert_eq!(extract_listing(&raw).front_pic, UNKNOWN);
    }

    #[test]
    fn test_display_strings_kept_verbatim() {
        let raw = json!({
            "bedrooms": { "formattedValue": "Studio" },
            "price": { "price": "$425,000+" }
        });
        let listing = extract_listing(&raw);

        assert_eq!(listing.beds, "Studio");
        assert_eq!(listing.price, "$425,000+");
    }

    #[test]
    fn test_unavailable_listing() {
        let raw = json!({ "currentStatus": { "isActiveForSale": false } });
        assert_eq!(extract_listing(&raw).available, Some(false));
    }

    #[test]
    fn test_safe_get() {
        let raw = json!({ "a": { "b": 1, "n": null } });

        assert_eq!(safe_get(&raw, "a", "b"), Some(&json!(1)));
        assert_eq!(safe_get(&raw, "a", "n"), None);
        assert_eq!(safe_get(&raw, "a", "missing"), None);
        assert_eq!(safe_get(&raw, "missing", "b"), None);
    }

    #[test]
    fn test_extract_all_preserves_order() {
        let homes = vec![
            json!({ "location": { "streetAddress": "1 First St" } }),
            json!({ "location": { "streetAddress": "2 Second St" } }),
        ];
        let listings = extract_all(&homes);

        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].address, "1 First St");
        assert_eq!(listings[1].address, "2 Second St");
    }
}
