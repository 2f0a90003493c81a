/*!
 * Tests for the masking pass
 */

use anonymizer::entities::COMPANY_LABEL;
use anonymizer::{EntityMap, EntitySource, Gazetteer, Masker, SubstitutionOrder};

fn map_of(entries: &[(&str, &str)]) -> EntityMap {
    let mut map = EntityMap::new();
    for (key, label) in entries {
        map.insert(key, *label, EntitySource::Statistical);
    }
    map
}

#[test]
fn test_mask_withDigitsEverywhere_shouldLeaveNone() {
    let masker = Masker::default();
    let output = masker
        .mask("Call 555-0199 before 12.03.2024, room 4B.", &EntityMap::new())
        .unwrap();

    assert_eq!(output, "call XXX-XXXX before XX.XX.XXXX, room Xb.");
    assert!(!output.chars().any(|c| c.is_ascii_digit()));
}

#[test]
fn test_mask_withGazetteerEntry_shouldReplaceAnyCasing() {
    let mut map = EntityMap::new();
    Gazetteer::from_names(["acme corp"]).apply(&mut map);
    let masker = Masker::default();

    for text in ["ACME CORP signed.", "Acme Corp signed.", "acme corp signed."] {
        assert_eq!(masker.mask(text, &map).unwrap(), "COMP signed.");
    }
}

#[test]
fn test_substitute_appliedTwice_shouldBeIdempotent() {
    let map = map_of(&[("john smith", "PERSON"), ("tallinn", "GPE"), ("acme", COMPANY_LABEL)]);
    let masker = Masker::default();
    let text = "john smith moved from tallinn to acme in 2020.";

    let once = masker.substitute(text, &map).unwrap();
    let twice = masker.substitute(&once, &map).unwrap();

    assert_eq!(once, "PERSON moved from GPE to COMP in 2020.");
    assert_eq!(once, twice);
}

#[test]
fn test_substitute_orderMatters_forOverlappingKeys() {
    let mut map = EntityMap::new();
    map.insert("new", "MISC", EntitySource::RuleBased);
    map.insert("new york", "GPE", EntitySource::Neural);
    let text = "a new office in new york";

    let longest = Masker::new(SubstitutionOrder::LongestFirst, "X").substitute(text, &map).unwrap();
    let insertion = Masker::new(SubstitutionOrder::Insertion, "X").substitute(text, &map).unwrap();

    assert_eq!(longest, "a MISC office in GPE");
    assert_eq!(insertion, "a MISC office in MISC york");
}

#[test]
fn test_substitute_withPunctuatedKey_shouldStillMatch() {
    let map = map_of(&[("acme inc.", "ORG"), ("c++", "MISC")]);
    let output = Masker::default().substitute("acme inc. uses c++ daily", &map).unwrap();
    assert_eq!(output, "ORG uses MISC daily");
}

#[test]
fn test_substitute_shouldNotTouchPartialWords() {
    let map = map_of(&[("ann", "PERSON")]);
    let output = Masker::default().substitute("ann planned the annual plan", &map).unwrap();
    assert_eq!(output, "PERSON planned the annual plan");
}
