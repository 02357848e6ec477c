//! Keyword scoring over filenames and free-text hints.

use crate::pipeline::types::{CategoryVote, ClothingCategory, SignalSource};
use indexmap::IndexMap;
use std::path::Path;

const PRIMARY_POINTS: u32 = 3;
const SECONDARY_POINTS: u32 = 2;
const BRAND_POINTS: u32 = 1;
const WORD_BOUNDARY_BONUS: u32 = 1;
const MIN_SCORE: u32 = 3;
/// Shorter keywords only match whole words ("top" must not match "laptop",
/// "ring" must not match "spring").
const MIN_SUBSTRING_LEN: usize = 5;

struct KeywordTable {
    category: ClothingCategory,
    primary: &'static [&'static str],
    secondary: &'static [&'static str],
    brand: &'static [&'static str],
}

const TABLES: &[KeywordTable] = &[
    KeywordTable {
        category: ClothingCategory::Tops,
        primary: &[
            "shirt", "tshirt", "tee", "blouse", "top", "tank", "camisole", "polo", "sweater",
            "hoodie", "sweatshirt", "jumper",
        ],
        secondary: &["henley", "crop", "tunic", "knit", "pullover", "turtleneck", "cardigan"],
        brand: &["hanes", "gildan"],
    },
    KeywordTable {
        category: ClothingCategory::Bottoms,
        primary: &[
            "jean", "pants", "trousers", "shorts", "skirt", "leggings", "chinos", "joggers",
        ],
        secondary: &["denim", "slacks", "culottes", "capri", "cargo", "sweatpants"],
        brand: &["levis", "wrangler"],
    },
    KeywordTable {
        category: ClothingCategory::Dresses,
        primary: &["dress", "gown", "sundress", "jumpsuit", "romper"],
        secondary: &["maxi", "midi", "frock", "sheath"],
        brand: &["reformation"],
    },
    KeywordTable {
        category: ClothingCategory::Outerwear,
        primary: &[
            "jacket", "coat", "blazer", "parka", "trench", "raincoat", "windbreaker",
        ],
        secondary: &["vest", "puffer", "anorak", "poncho", "bomber", "overcoat"],
        brand: &["patagonia", "barbour", "northface"],
    },
    KeywordTable {
        category: ClothingCategory::Shoes,
        primary: &[
            "shoe", "sneaker", "boot", "sandal", "heel", "loafer", "trainer", "pump", "slipper",
        ],
        secondary: &["oxford", "mule", "flats", "espadrille", "clog", "footwear"],
        brand: &["nike", "adidas", "converse", "vans", "birkenstock"],
    },
    KeywordTable {
        category: ClothingCategory::Accessories,
        primary: &[
            "hat", "bag", "belt", "scarf", "watch", "necklace", "bracelet", "earring",
            "sunglasses", "purse", "handbag", "backpack", "cap", "wallet",
        ],
        secondary: &["tote", "clutch", "beanie", "tie", "glove", "ring", "jewelry", "jewellery"],
        brand: &["rolex", "fossil"],
    },
];

/// Lowercased alphanumeric words of `text`.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// Filename without directory or extension.
pub fn file_stem(filename: &str) -> &str {
    Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename)
}

fn is_word_match(word: &str, keyword: &str) -> bool {
    word == keyword
        || word
            .strip_prefix(keyword)
            .is_some_and(|rest| rest == "s" || rest == "es")
}

fn keyword_points(words: &[String], joined: &str, keyword: &str, points: u32) -> u32 {
    if words.iter().any(|w| is_word_match(w, keyword)) {
        points + WORD_BOUNDARY_BONUS
    } else if keyword.len() >= MIN_SUBSTRING_LEN && joined.contains(keyword) {
        points
    } else {
        0
    }
}

/// Keyword score per wearable category, in tie-break order.
pub fn score_keywords(text: &str) -> IndexMap<ClothingCategory, u32> {
    let words = tokenize(text);
    let joined = words.concat();

    TABLES
        .iter()
        .map(|table| {
            let tiers = [
                (table.primary, PRIMARY_POINTS),
                (table.secondary, SECONDARY_POINTS),
                (table.brand, BRAND_POINTS),
            ];
            let score = tiers
                .iter()
                .flat_map(|(keywords, points)| keywords.iter().map(move |k| (*k, *points)))
                .map(|(keyword, points)| keyword_points(&words, &joined, keyword, points))
                .sum::<u32>();
            (table.category, score)
        })
        .collect()
}

/// Best-scoring category for `text`, if it clears the minimum score.
pub fn keyword_vote(text: &str, source: SignalSource) -> Option<CategoryVote> {
    let scores = score_keywords(text);
    let (category, score) = scores
        .iter()
        .fold(None, |best: Option<(ClothingCategory, u32)>, (&c, &s)| match best {
            Some((_, top)) if top >= s => best,
            _ => Some((c, s)),
        })?;

    if score < MIN_SCORE {
        return None;
    }
    let confidence = (0.5 + 0.1 * score as f32).min(0.95);
    Some(CategoryVote::new(
        source,
        category,
        confidence,
        format!("'{}' scored {} for {}", text, score, category),
    ))
}

pub fn filename_vote(filename: &str) -> Option<CategoryVote> {
    keyword_vote(file_stem(filename), SignalSource::Filename)
}

/// A hint naming a category outright wins; otherwise it is keyword scored.
pub fn context_hint_vote(hint: &str) -> Option<CategoryVote> {
    if let Some(category) = ClothingCategory::parse(hint).filter(|c| *c != ClothingCategory::Other)
    {
        return Some(CategoryVote::new(
            SignalSource::ContextHint,
            category,
            0.9,
            format!("context names {}", category),
        ));
    }
    keyword_vote(hint, SignalSource::ContextHint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_filename_match() {
        let vote = filename_vote("blue_denim_jeans.jpg").unwrap();
        assert_eq!(vote.category, ClothingCategory::Bottoms);
        assert!(vote.confidence >= 0.7);
        assert_eq!(vote.source, SignalSource::Filename);
    }

    #[test]
    fn test_camera_filenames_have_no_vote() {
        assert!(filename_vote("img_0231.jpg").is_none());
        assert!(filename_vote("DSC00042.JPG").is_none());
    }

    #[test]
    fn test_short_keywords_need_word_boundaries() {
        assert_eq!(score_keywords("laptop")[&ClothingCategory::Tops], 0);
        assert_eq!(score_keywords("red top")[&ClothingCategory::Tops], 4);
        // Substring match without the boundary bonus.
        assert_eq!(score_keywords("mysneakerpic")[&ClothingCategory::Shoes], 3);
    }

    #[test]
    fn test_four_letter_keywords_ignore_longer_words() {
        let spring = score_keywords("spring_jacket");
        assert_eq!(spring[&ClothingCategory::Accessories], 0);
        assert_eq!(spring[&ClothingCategory::Outerwear], 4);
        assert_eq!(score_keywords("herringbone")[&ClothingCategory::Accessories], 0);
        assert_eq!(score_keywords("harvest")[&ClothingCategory::Outerwear], 0);
        assert_eq!(score_keywords("wheel")[&ClothingCategory::Shoes], 0);
        assert_eq!(score_keywords("high_heels")[&ClothingCategory::Shoes], 4);
        assert_eq!(score_keywords("gold ring")[&ClothingCategory::Accessories], 3);
    }

    #[test]
    fn test_plurals_get_the_boundary_bonus() {
        assert_eq!(score_keywords("boots")[&ClothingCategory::Shoes], 4);
        assert_eq!(score_keywords("dresses")[&ClothingCategory::Dresses], 4);
    }

    #[test]
    fn test_brand_alone_is_below_threshold() {
        assert!(keyword_vote("nike", SignalSource::Filename).is_none());
        let vote = keyword_vote("nike_running_sneakers", SignalSource::Filename).unwrap();
        assert_eq!(vote.category, ClothingCategory::Shoes);
    }

    #[test]
    fn test_context_hint() {
        let vote = context_hint_vote("Outerwear").unwrap();
        assert_eq!(vote.category, ClothingCategory::Outerwear);
        assert_eq!(vote.confidence, 0.9);
        assert_eq!(
            context_hint_vote("a linen summer dress").unwrap().category,
            ClothingCategory::Dresses
        );
        assert!(context_hint_vote("something nice").is_none());
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("/uploads/red_dress.png"), "red_dress");
        assert_eq!(file_stem("noext"), "noext");
    }
}
