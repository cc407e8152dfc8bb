//! Country name reconciliation between the boundary dataset and the store
//!
//! The table is partial. A boundary label that is missing here
//! and spelled differently in `countries_real` simply finds no coverage row
//! and is drawn as no-data.

/// Boundary dataset label and the store spelling it joins on
const NAME_CORRECTIONS: &[(&str, &str)] = &[
    // Americas
    ("United States of America", "United States"),
    ("United States", "United States"),
    ("Brazil", "Brazil"),
    ("Canada", "Canada"),
    ("Mexico", "Mexico"),
    ("Argentina", "Argentina"),
    ("Colombia", "Colombia"),
    // Asia
    ("India", "India"),
    ("China", "China"),
    ("Indonesia", "Indonesia"),
    ("Pakistan", "Pakistan"),
    ("Bangladesh", "Bangladesh"),
    ("Japan", "Japan"),
    ("Republic of Korea", "South Korea"),
    ("South Korea", "South Korea"),
    ("Saudi Arabia", "Saudi Arabia"),
    ("Turkey", "Turkey"),
    // Europe
    ("Germany", "Germany"),
    ("France", "France"),
    ("United Kingdom", "United Kingdom"),
    ("Spain", "Spain"),
    ("Italy", "Italy"),
    ("Poland", "Poland"),
    ("Sweden", "Sweden"),
    ("Norway", "Norway"),
    ("Russia", "Russia"),
    ("Russian Federation", "Russia"),
    // Africa
    ("South Africa", "South Africa"),
    ("Nigeria", "Nigeria"),
    ("Egypt", "Egypt"),
    ("Kenya", "Kenya"),
    ("Ethiopia", "Ethiopia"),
    // Oceania
    ("Australia", "Australia"),
];

/// Store spelling for a boundary label; unknown labels pass through unchanged
pub fn canonicalize(raw_name: &str) -> &str {
    NAME_CORRECTIONS
        .iter()
        .find(|(alias, _)| *alias == raw_name)
        .map_or(raw_name, |&(_, canonical)| canonical)
}
