// Utils module tests that combine several helpers.

use super::*;

#[test]
fn test_slug_round_trip_loses_only_punctuation() {
    let slug = slugify("Joe's Pizza & Pasta");
    assert_eq!(deslugify(&slug), "joe s pizza pasta");
}

#[test]
fn test_snake_case_field_names_slugify_cleanly() {
    let field = camel_to_snake_case("userRatingCount");
    assert_eq!(slugify(&field), "user-rating-count");
}

#[test]
fn test_ring_renders_as_yaml_list() {
    let ring = calc_surrounding_coords(0.0, 0.0, 0.0);
    let yaml = to_indented_yaml(&ring, 4).unwrap();
    assert_eq!(yaml.matches("- latitude: 0.0").count(), 6);
    assert!(yaml.lines().all(|line| line.is_empty() || line.starts_with("    ")));
}

#[test]
fn test_truncated_slug_stays_within_limit() {
    let slug = slugify("An Extremely Long Restaurant Name That Keeps Going");
    let short = truncate(&slug, 20, false);
    assert_eq!(short.chars().count(), 20);
    assert!(slug.starts_with(&short));
}
