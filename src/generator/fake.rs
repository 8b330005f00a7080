//! Small fake-data helpers for client names, cities and reference numbers.

use rand::seq::SliceRandom;
use rand::Rng;

const FIRST_NAMES: &[&str] = &[
    "Anna", "Aram", "Lilit", "Davit", "Mariam", "Tigran", "Nare", "Hayk", "Elena", "Samvel",
    "Sofia", "Gor", "Kristine", "Armen", "Lucy", "Michael", "Olga", "Robert",
];

const LAST_NAMES: &[&str] = &[
    "Petrosyan",
    "Hakobyan",
    "Sargsyan",
    "Grigoryan",
    "Harutyunyan",
    "Mkrtchyan",
    "Karapetyan",
    "Smith",
    "Johnson",
    "Ivanova",
    "Muller",
    "Rossi",
];

const CITIES: &[&str] = &[
    "Yerevan",
    "Gyumri",
    "Vanadzor",
    "Dilijan",
    "Vagharshapat",
    "Abovyan",
    "Kapan",
    "Tbilisi",
    "Moscow",
    "Istanbul",
    "Berlin",
    "Amsterdam",
    "Port Elizabeth",
    "North Jessicaborough",
    "Lake Christopherton",
];

/// A random "First Last" person name.
pub(crate) fn name<R: Rng>(rng: &mut R) -> String {
    format!(
        "{} {}",
        FIRST_NAMES.choose(rng).unwrap_or(&"Anna"),
        LAST_NAMES.choose(rng).unwrap_or(&"Petrosyan")
    )
}

/// A random city name.
pub(crate) fn city<R: Rng>(rng: &mut R) -> &'static str {
    CITIES.choose(rng).copied().unwrap_or("Yerevan")
}

/// A string of `n` random decimal digits.
pub(crate) fn digits<R: Rng>(rng: &mut R, n: usize) -> String {
    (0..n)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

/// Replaces every `?` with a random uppercase letter and every `#` with a random digit.
pub(crate) fn bothify<R: Rng>(rng: &mut R, pattern: &str) -> String {
    pattern
        .chars()
        .map(|c| match c {
            '?' => char::from(b'A' + rng.gen_range(0..26u8)),
            '#' => char::from(b'0' + rng.gen_range(0..10u8)),
            other => other,
        })
        .collect()
}

/// The first `n` characters of `s`.
pub(crate) fn prefix(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}
