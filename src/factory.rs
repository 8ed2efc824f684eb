//! Random demo records for the "Fill with Factory Data" action and the seeder.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::{
    ConferenceInput, ConferenceStatus, EnumChoice, Qualification, Region, SpeakerInput, TalkInput,
    TalkLength, VenueInput,
};

const FIRST_NAMES: &[&str] = &[
    "Ada", "Grace", "Linus", "Margaret", "Ken", "Barbara", "Dennis", "Frances", "Alan", "Radia",
    "José", "Zoë", "Søren", "Anaïs",
];

const LAST_NAMES: &[&str] = &[
    "Lovelace", "Hopper", "Torvalds", "Hamilton", "Thompson", "Liskov", "Ritchie", "Allen",
    "Kay", "Perlman", "Núñez", "Brontë",
];

const WORDS: &[&str] = &[
    "async", "ownership", "lifetimes", "traits", "macros", "embedded", "compilers", "databases",
    "testing", "performance", "safety", "tooling", "networking", "wasm", "concurrency", "types",
];

const CITIES: &[(&str, &str, Region)] = &[
    ("Austin", "United States", Region::Us),
    ("Portland", "United States", Region::Us),
    ("Berlin", "Germany", Region::Eu),
    ("Amsterdam", "Netherlands", Region::Eu),
    ("Sydney", "Australia", Region::Australia),
    ("Melbourne", "Australia", Region::Australia),
    ("Bengaluru", "India", Region::India),
    ("Pune", "India", Region::India),
];

fn pick<'a, R: Rng + ?Sized>(rng: &mut R, items: &'a [&'a str]) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}

fn sentence<R: Rng + ?Sized>(rng: &mut R, words: usize) -> String {
    let mut text = (0..words).map(|_| pick(rng, WORDS)).collect::<Vec<_>>().join(" ");
    if let Some(first) = text.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    text
}

fn person<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("{} {}", pick(rng, FIRST_NAMES), pick(rng, LAST_NAMES))
}

pub fn venue<R: Rng + ?Sized>(rng: &mut R) -> VenueInput {
    let (city, country, region) = CITIES
        .choose(rng)
        .copied()
        .unwrap_or(("Remote", "Internet", Region::Online));
    let kind = pick(rng, &["Convention Center", "Hall", "Arena", "Expo"]);
    VenueInput {
        name: format!("{city} {kind}"),
        city: city.to_string(),
        country: country.to_string(),
        postal_code: Some(format!("{:05}", rng.gen_range(10000..99999))),
        region,
    }
}

pub fn speaker<R: Rng + ?Sized>(rng: &mut R) -> SpeakerInput {
    let name = person(rng);
    let handle: String = name
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_lowercase();
    let count = rng.gen_range(0..4);
    let qualifications = Qualification::ALL
        .choose_multiple(rng, count)
        .copied()
        .collect();
    SpeakerInput {
        email: format!("{handle}{}@example.com", rng.gen_range(1..1000)),
        twitter_handle: rng.gen_bool(0.7).then(|| handle.clone()),
        bio: Some(format!("<p>{}.</p>", sentence(rng, 12))),
        name,
        qualifications,
    }
}

pub fn talk<R: Rng + ?Sized>(rng: &mut R, speaker_id: i64) -> TalkInput {
    let words = rng.gen_range(3..7);
    TalkInput {
        title: sentence(rng, words),
        abstract_text: format!("<p>{}.</p><p>{}.</p>", sentence(rng, 14), sentence(rng, 10)),
        speaker_id,
        length: TalkLength::ALL.choose(rng).copied().unwrap_or_default(),
        new_talk: rng.gen_bool(0.5),
    }
}

/// Conference without a venue or speakers; callers attach those.
pub fn conference<R: Rng + ?Sized>(rng: &mut R) -> ConferenceInput {
    let start = random_start(rng);
    ConferenceInput {
        name: format!("{} Conf {}", pick(rng, WORDS).to_uppercase(), start.format("%Y")),
        description: format!("<p>{}.</p>", sentence(rng, 16)),
        start_date: start,
        end_date: start + Duration::days(rng.gen_range(1..4)),
        status: ConferenceStatus::ALL.choose(rng).copied().unwrap_or(ConferenceStatus::Draft),
        region: Region::ALL.choose(rng).copied().unwrap_or(Region::Online),
        is_published: rng.gen_bool(0.5),
        venue_id: None,
        speakers: Vec::new(),
        talks: None,
    }
}

fn random_start<R: Rng + ?Sized>(rng: &mut R) -> NaiveDateTime {
    let base = NaiveDate::from_ymd_opt(2025, 1, 1)
        .and_then(|d| d.and_hms_opt(9, 0, 0))
        .unwrap_or_default();
    base + Duration::days(rng.gen_range(0..730))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_conference_dates_are_ordered() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let conference = conference(&mut rng);
            assert!(conference.end_date > conference.start_date);
            assert!(conference.name.chars().count() <= 60);
        }
    }

    #[test]
    fn test_speaker_is_valid() {
        let mut rng = StdRng::seed_from_u64(1);
        let speaker = speaker(&mut rng);
        assert!(speaker.email.contains('@'));
        assert!(speaker.qualifications.len() < 4);
    }

    #[test]
    fn test_venue_region_matches_city() {
        let mut rng = StdRng::seed_from_u64(3);
        let venue = venue(&mut rng);
        let (_, _, region) = CITIES.iter().find(|(city, _, _)| *city == venue.city).unwrap();
        assert_eq!(*region, venue.region);
    }
}
