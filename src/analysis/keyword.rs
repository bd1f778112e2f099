//! Offline keyword matcher.
//!
//! Maps memory text onto a fixed catalogue of location [`Profile`]s using
//! ordered keyword rules. A rule is a list of keyword groups; it matches when
//! every group has at least one keyword contained in the lower-cased text.
//! The first matching rule wins and [`DEFAULT_PROFILE`] covers everything else.
//!
//! Pure and deterministic: the emotion only changes the story wording, never
//! which profile is chosen. Profile weights are integers summing to 100 so
//! the preset distribution is already normalized.

use super::types::{AnalysisResult, Candidate, EmotionTag, MemoryInput, SourceMethod};

#[derive(Debug)]
pub struct Place {
    pub name: &'static str,
    pub region: &'static str,
    pub description: &'static str,
    pub weight: f64,
    pub lat: f64,
    pub lng: f64,
}

impl Place {
    fn to_candidate(&self, description: String) -> Candidate {
        Candidate::new(self.name, self.weight, description, self.region)
            .with_coordinates(self.lat, self.lng)
    }
}

/// A location profile: one primary place, a story template and 2-4 alternates.
#[derive(Debug)]
pub struct Profile {
    pub id: &'static str,
    pub primary: Place,
    /// Story text; `{emotion}` is replaced with the emotion phrase.
    pub story: &'static str,
    pub secondary: &'static [Place],
}

impl Profile {
    pub fn to_result(&self, emotion: &EmotionTag) -> AnalysisResult {
        let story = self.story.replace("{emotion}", &emotion.phrase());
        AnalysisResult {
            primary: self.primary.to_candidate(story),
            secondary: self
                .secondary
                .iter()
                .map(|p| p.to_candidate(p.description.to_string()))
                .collect(),
            source_method: SourceMethod::KeywordFallback,
        }
    }
}

struct Rule {
    groups: &'static [&'static [&'static str]],
    profile: &'static Profile,
}

impl Rule {
    fn matches(&self, haystack: &str) -> bool {
        self.groups
            .iter()
            .all(|group| group.iter().any(|kw| contains_keyword(haystack, kw)))
    }
}

/// Whole-word keyword test on lower-case text.
///
/// ASCII keywords must start on a word boundary and end on one, optionally
/// after a plural `s` or an `ing`, so "sea" does not match "season" and "uk"
/// does not match "fukuoka". Other keywords (Japanese, accented) match as
/// plain substrings.
pub fn contains_keyword(haystack: &str, keyword: &str) -> bool {
    if !keyword.is_ascii() {
        return haystack.contains(keyword);
    }

    let is_word = |c: char| c.is_ascii_alphanumeric();
    haystack.match_indices(keyword).any(|(start, _)| {
        let starts_word = haystack[..start].chars().next_back().map_or(true, |c| !is_word(c));
        let rest = &haystack[start + keyword.len()..];
        starts_word
            && ["", "s", "ing"].iter().any(|suffix| {
                rest.strip_prefix(suffix)
                    .is_some_and(|tail| tail.chars().next().map_or(true, |c| !is_word(c)))
            })
    })
}

const SNOW: &[&str] = &["snow", "雪", "吹雪"];
const MOUNTAIN: &[&str] = &["mountain", "ski", "slope", "山", "スキー", "ゲレンデ"];
const SEA: &[&str] = &["sea", "beach", "beaches", "ocean", "shore", "海", "浜", "砂浜", "海岸"];
const SUNSET: &[&str] = &["sunset", "dusk", "夕日", "夕焼け", "夕暮れ"];
const ISLAND: &[&str] = &["island", "coral", "島", "珊瑚"];
const EUROPE: &[&str] = &[
    "paris", "eiffel", "europe", "cobblestone", "church", "churches", "cathedral", "café", "cafe",
    "パリ", "ヨーロッパ", "石畳", "教会", "カフェ", "エッフェル塔",
];
const TEMPLE: &[&str] = &["temple", "shrine", "torii", "寺", "神社", "鳥居", "石段"];
const BLOSSOM: &[&str] = &["cherry blossom", "sakura", "桜", "花見"];
const CITY_NIGHT: &[&str] = &["neon", "skyscraper", "crossing", "ネオン", "夜景", "高層ビル", "交差点"];
const COUNTRYSIDE: &[&str] = &["rice field", "farm", "village", "thatched", "田んぼ", "田舎", "村", "茅葺"];
const LAKE: &[&str] = &["lake", "湖", "fuji", "富士"];

pub static SNOW_MOUNTAIN: Profile = Profile {
    id: "snow_mountain",
    primary: Place {
        name: "Hakuba Valley",
        region: "Nagano, Japan",
        description: "",
        weight: 55.0,
        lat: 36.6982,
        lng: 137.8619,
    },
    story: "Powder snow settling on the peaks of the Northern Alps, breath turning white in the cold air. \
            The memory returns carrying {emotion}, the silence of the slopes before the first lift of the morning.",
    secondary: &[
        Place {
            name: "Niseko",
            region: "Hokkaido, Japan",
            description: "Deep powder beneath the cone of Mount Yotei.",
            weight: 20.0,
            lat: 42.8048,
            lng: 140.6874,
        },
        Place {
            name: "Zermatt",
            region: "Switzerland",
            description: "A car-free village in the shadow of the Matterhorn.",
            weight: 15.0,
            lat: 46.0207,
            lng: 7.7491,
        },
        Place {
            name: "Zao Onsen",
            region: "Yamagata, Japan",
            description: "Snow monsters of frozen trees and steaming hot springs.",
            weight: 10.0,
            lat: 38.1680,
            lng: 140.3963,
        },
    ],
};

pub static SEASIDE_SUNSET: Profile = Profile {
    id: "seaside_sunset",
    primary: Place {
        name: "Enoshima",
        region: "Kanagawa, Japan",
        description: "",
        weight: 50.0,
        lat: 35.2991,
        lng: 139.4800,
    },
    story: "The sun sinking behind the silhouette of Mount Fuji, the sea turning to copper around a small island. \
            The tide carries back {emotion} with every wave.",
    secondary: &[
        Place {
            name: "Shichirigahama Beach",
            region: "Kanagawa, Japan",
            description: "A long shore where the evening light lingers.",
            weight: 25.0,
            lat: 35.3066,
            lng: 139.5097,
        },
        Place {
            name: "Shimanami Kaido",
            region: "Ehime, Japan",
            description: "Bridges across the Seto Inland Sea at dusk.",
            weight: 15.0,
            lat: 34.2500,
            lng: 133.0830,
        },
        Place {
            name: "Santorini",
            region: "Greece",
            description: "White walls glowing above the caldera at sunset.",
            weight: 10.0,
            lat: 36.3932,
            lng: 25.4615,
        },
    ],
};

pub static ISLAND_SHORE: Profile = Profile {
    id: "island_shore",
    primary: Place {
        name: "Okinawa Emerald Beach",
        region: "Okinawa, Japan",
        description: "",
        weight: 50.0,
        lat: 26.6944,
        lng: 127.8778,
    },
    story: "White sand, coral shallows and water so clear it seems to glow. \
            The warm sea wind brings back {emotion}, as if no time had passed at all.",
    secondary: &[
        Place {
            name: "Naoshima",
            region: "Kagawa, Japan",
            description: "An art island floating in the Seto Inland Sea.",
            weight: 30.0,
            lat: 34.4604,
            lng: 133.9953,
        },
        Place {
            name: "Ishigaki Island",
            region: "Okinawa, Japan",
            description: "Kabira Bay and its shifting shades of blue.",
            weight: 20.0,
            lat: 24.4064,
            lng: 124.1754,
        },
    ],
};

pub static EUROPEAN_STREET: Profile = Profile {
    id: "european_street",
    primary: Place {
        name: "Montmartre",
        region: "Paris, France",
        description: "",
        weight: 50.0,
        lat: 48.8867,
        lng: 2.3431,
    },
    story: "Cobblestones climbing toward a white basilica, the smell of coffee drifting from a corner café. \
            Church bells ring somewhere below, and the city hands back {emotion}.",
    secondary: &[
        Place {
            name: "Le Marais",
            region: "Paris, France",
            description: "Narrow medieval lanes and hidden courtyards.",
            weight: 20.0,
            lat: 48.8590,
            lng: 2.3620,
        },
        Place {
            name: "Trastevere",
            region: "Rome, Italy",
            description: "Ivy-covered walls and piazzas lit by lanterns.",
            weight: 18.0,
            lat: 41.8896,
            lng: 12.4695,
        },
        Place {
            name: "Old Town Prague",
            region: "Czech Republic",
            description: "Spires and cobbled squares beside the Vltava.",
            weight: 12.0,
            lat: 50.0875,
            lng: 14.4213,
        },
    ],
};

pub static TEMPLE_STEPS: Profile = Profile {
    id: "temple_steps",
    primary: Place {
        name: "Hasedera",
        region: "Kamakura, Japan",
        description: "",
        weight: 45.0,
        lat: 35.3125,
        lng: 139.5331,
    },
    story: "Worn stone steps rising between moss and bamboo toward a quiet temple hall. \
            Incense hangs in the air and the stillness holds {emotion}.",
    secondary: &[
        Place {
            name: "Fushimi Inari Taisha",
            region: "Kyoto, Japan",
            description: "Thousands of vermilion torii winding up the mountain.",
            weight: 25.0,
            lat: 34.9671,
            lng: 135.7727,
        },
        Place {
            name: "Kiyomizu-dera",
            region: "Kyoto, Japan",
            description: "A wooden stage hanging over the treetops.",
            weight: 20.0,
            lat: 34.9949,
            lng: 135.7850,
        },
        Place {
            name: "Todai-ji",
            region: "Nara, Japan",
            description: "The Great Buddha hall among wandering deer.",
            weight: 10.0,
            lat: 34.6890,
            lng: 135.8398,
        },
    ],
};

pub static CHERRY_BLOSSOM: Profile = Profile {
    id: "cherry_blossom",
    primary: Place {
        name: "Philosopher's Path",
        region: "Kyoto, Japan",
        description: "",
        weight: 50.0,
        lat: 35.0268,
        lng: 135.7944,
    },
    story: "Petals drifting onto a narrow canal, a path lined with cherry trees in full bloom. \
            Each falling blossom returns a fragment of {emotion}.",
    secondary: &[
        Place {
            name: "Chidorigafuchi",
            region: "Tokyo, Japan",
            description: "Boats gliding beneath an arch of blossoms.",
            weight: 30.0,
            lat: 35.6903,
            lng: 139.7454,
        },
        Place {
            name: "Hirosaki Castle Park",
            region: "Aomori, Japan",
            description: "A moat carpeted in pink petals.",
            weight: 20.0,
            lat: 40.6076,
            lng: 140.4637,
        },
    ],
};

pub static CITY_LIGHTS: Profile = Profile {
    id: "city_lights",
    primary: Place {
        name: "Shibuya Crossing",
        region: "Tokyo, Japan",
        description: "",
        weight: 45.0,
        lat: 35.6595,
        lng: 139.7005,
    },
    story: "Neon reflected on wet asphalt as a thousand strangers cross at once. \
            In the middle of the crowd you find {emotion} waiting for you.",
    secondary: &[
        Place {
            name: "Shinjuku Omoide Yokocho",
            region: "Tokyo, Japan",
            description: "Red lanterns in a narrow alley of smoke and chatter.",
            weight: 25.0,
            lat: 35.6931,
            lng: 139.6995,
        },
        Place {
            name: "Dotonbori",
            region: "Osaka, Japan",
            description: "Glowing signs mirrored in the canal.",
            weight: 20.0,
            lat: 34.6687,
            lng: 135.5013,
        },
        Place {
            name: "Times Square",
            region: "New York, USA",
            description: "Screens that turn night into day.",
            weight: 10.0,
            lat: 40.7580,
            lng: -73.9855,
        },
    ],
};

pub static COUNTRYSIDE_VILLAGE: Profile = Profile {
    id: "countryside_village",
    primary: Place {
        name: "Shirakawa-go",
        region: "Gifu, Japan",
        description: "",
        weight: 50.0,
        lat: 36.2578,
        lng: 136.9063,
    },
    story: "Thatched roofs above flooded rice fields, frogs singing in the evening. \
            The village keeps {emotion} the way it keeps its old farmhouses.",
    secondary: &[
        Place {
            name: "Ouchi-juku",
            region: "Fukushima, Japan",
            description: "A post town of thatched inns along a single street.",
            weight: 30.0,
            lat: 37.3361,
            lng: 139.8614,
        },
        Place {
            name: "Miyama",
            region: "Kyoto, Japan",
            description: "A quiet valley of kayabuki farmhouses.",
            weight: 20.0,
            lat: 35.2939,
            lng: 135.6353,
        },
    ],
};

pub static LAKESIDE_FUJI: Profile = Profile {
    id: "lakeside_fuji",
    primary: Place {
        name: "Lake Kawaguchi",
        region: "Yamanashi, Japan",
        description: "",
        weight: 50.0,
        lat: 35.5167,
        lng: 138.7500,
    },
    story: "Mount Fuji mirrored on still water, clouds sliding over the summit. \
            The reflection trembles and gives back {emotion}.",
    secondary: &[
        Place {
            name: "Lake Ashi",
            region: "Kanagawa, Japan",
            description: "A red torii standing in the lake at Hakone.",
            weight: 30.0,
            lat: 35.2040,
            lng: 139.0250,
        },
        Place {
            name: "Lake Biwa",
            region: "Shiga, Japan",
            description: "Japan's largest lake, calm under a wide sky.",
            weight: 20.0,
            lat: 35.2500,
            lng: 136.0833,
        },
    ],
};

pub static DEFAULT_PROFILE: Profile = Profile {
    id: "default",
    primary: Place {
        name: "Kamakura",
        region: "Kanagawa, Japan",
        description: "",
        weight: 40.0,
        lat: 35.3192,
        lng: 139.5467,
    },
    story: "An old town between the hills and the sea, where temple bells and ocean wind meet. \
            Even a faint fragment of memory finds its way back here, wrapped in {emotion}.",
    secondary: &[
        Place {
            name: "Gion",
            region: "Kyoto, Japan",
            description: "Lantern-lit teahouse streets of old Kyoto.",
            weight: 25.0,
            lat: 35.0037,
            lng: 135.7788,
        },
        Place {
            name: "Nara Park",
            region: "Nara, Japan",
            description: "Deer resting beneath ancient trees.",
            weight: 20.0,
            lat: 34.6851,
            lng: 135.8430,
        },
        Place {
            name: "Otaru Canal",
            region: "Hokkaido, Japan",
            description: "Stone warehouses along a gas-lit canal.",
            weight: 15.0,
            lat: 43.1994,
            lng: 140.9942,
        },
    ],
};

static RULES: &[Rule] = &[
    Rule { groups: &[SNOW, MOUNTAIN], profile: &SNOW_MOUNTAIN },
    Rule { groups: &[SEA, SUNSET], profile: &SEASIDE_SUNSET },
    Rule { groups: &[SEA], profile: &ISLAND_SHORE },
    Rule { groups: &[ISLAND], profile: &ISLAND_SHORE },
    Rule { groups: &[EUROPE], profile: &EUROPEAN_STREET },
    Rule { groups: &[BLOSSOM], profile: &CHERRY_BLOSSOM },
    Rule { groups: &[TEMPLE], profile: &TEMPLE_STEPS },
    Rule { groups: &[CITY_NIGHT], profile: &CITY_LIGHTS },
    Rule { groups: &[LAKE], profile: &LAKESIDE_FUJI },
    Rule { groups: &[COUNTRYSIDE], profile: &COUNTRYSIDE_VILLAGE },
    Rule { groups: &[SNOW], profile: &SNOW_MOUNTAIN },
];

/// Pick the profile for `text`. Never fails; unmatched text gets [`DEFAULT_PROFILE`].
pub fn match_profile(text: &str) -> &'static Profile {
    let haystack = text.to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.matches(&haystack))
        .map(|rule| rule.profile)
        .unwrap_or(&DEFAULT_PROFILE)
}

/// Resolve a memory to the matching profile's preset result.
pub fn resolve(input: &MemoryInput) -> AnalysisResult {
    let profile = match_profile(input.text());
    tracing::debug!(profile = profile.id, "keyword profile matched");
    profile.to_result(input.emotion())
}
