use super::rules::{self, season_palette};
use crate::pipeline::services::color::{resolve_color, rgb_to_hsl, NamedColor};
use crate::pipeline::types::{ColorFamily, ColorHarmonyResult, HarmonyType, RgbColor, Season};
use chrono::{Datelike, Local};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct HarmonyConfig {
    /// Pins the seasonal palette. When unset the current month decides.
    pub season: Option<Season>,
}

#[derive(Debug, Clone, PartialEq)]
struct HarmonyMatch {
    harmony_type: HarmonyType,
    confidence: f32,
    reasoning: String,
}

impl HarmonyMatch {
    fn new(harmony_type: HarmonyType, confidence: f32, reasoning: String) -> Self {
        Self {
            harmony_type,
            confidence,
            reasoning,
        }
    }
}

fn is_neutral(color: &NamedColor) -> bool {
    color.family == ColorFamily::Neutral || matches!(color.name, "navy" | "denim")
}

fn resolve(value: &str) -> Option<NamedColor> {
    if value.trim().eq_ignore_ascii_case("neutral") {
        return Some(NamedColor {
            name: "neutral",
            rgb: RgbColor::new(128, 128, 128),
            family: ColorFamily::Neutral,
        });
    }
    resolve_color(value)
}

pub struct HarmonyEngine {
    config: HarmonyConfig,
}

impl HarmonyEngine {
    pub fn new(config: HarmonyConfig) -> Self {
        Self { config }
    }

    /// Season used when the caller does not supply one.
    pub fn current_season(&self) -> Season {
        self.config
            .season
            .unwrap_or_else(|| Season::from_month(Local::now().month()))
    }

    pub fn analyze_harmony<S: AsRef<str>>(
        &self,
        colors_a: &[S],
        colors_b: &[S],
    ) -> ColorHarmonyResult {
        self.analyze_harmony_in_season(colors_a, colors_b, self.current_season())
    }

    /// Best harmony between any color of `colors_a` and any color of `colors_b`.
    pub fn analyze_harmony_in_season<S: AsRef<str>>(
        &self,
        colors_a: &[S],
        colors_b: &[S],
        season: Season,
    ) -> ColorHarmonyResult {
        let a: Vec<NamedColor> = colors_a.iter().filter_map(|c| resolve(c.as_ref())).collect();
        let b: Vec<NamedColor> = colors_b.iter().filter_map(|c| resolve(c.as_ref())).collect();

        if a.is_empty() || b.is_empty() {
            return no_harmony("No recognizable colors to compare".to_string());
        }

        let mut best: Option<HarmonyMatch> = None;
        for x in &a {
            for y in &b {
                best = pick(best, evaluate_pair(x, y, season));
            }
        }
        let union: Vec<NamedColor> = a.iter().chain(&b).copied().collect();
        best = pick(best, evaluate_triad(&union));

        finish(best, &a, &b)
    }

    pub fn find_best_harmony<S: AsRef<str>>(&self, colors: &[S]) -> ColorHarmonyResult {
        self.find_best_harmony_in_season(colors, self.current_season())
    }

    /// Best harmony among all pairs of `colors`.
    pub fn find_best_harmony_in_season<S: AsRef<str>>(
        &self,
        colors: &[S],
        season: Season,
    ) -> ColorHarmonyResult {
        let resolved: Vec<NamedColor> = colors.iter().filter_map(|c| resolve(c.as_ref())).collect();

        match resolved.as_slice() {
            [] => no_harmony("No recognizable colors to compare".to_string()),
            [only] => {
                let harmony_type = if is_neutral(only) {
                    HarmonyType::Neutral
                } else {
                    HarmonyType::Monochromatic
                };
                ColorHarmonyResult {
                    is_harmonious: true,
                    harmony_type,
                    confidence: 0.6,
                    reasoning: format!("Single-color look in {}", only.name),
                }
            }
            _ => {
                let mut best = None;
                for (i, x) in resolved.iter().enumerate() {
                    for y in &resolved[i + 1..] {
                        best = pick(best, evaluate_pair(x, y, season));
                    }
                }
                best = pick(best, evaluate_triad(&resolved));
                finish(best, &resolved, &[])
            }
        }
    }
}

impl Default for HarmonyEngine {
    fn default() -> Self {
        Self::new(HarmonyConfig::default())
    }
}

/// Keeps the higher-confidence match; on a tie the earlier rule stays.
fn pick(current: Option<HarmonyMatch>, candidate: Option<HarmonyMatch>) -> Option<HarmonyMatch> {
    match (current, candidate) {
        (Some(c), Some(n)) if n.confidence > c.confidence => Some(n),
        (Some(c), _) => Some(c),
        (None, n) => n,
    }
}

fn finish(best: Option<HarmonyMatch>, a: &[NamedColor], b: &[NamedColor]) -> ColorHarmonyResult {
    match best {
        Some(m) => {
            debug!("Harmony {:?} at {:.2}: {}", m.harmony_type, m.confidence, m.reasoning);
            ColorHarmonyResult {
                is_harmonious: true,
                harmony_type: m.harmony_type,
                confidence: m.confidence,
                reasoning: m.reasoning,
            }
        }
        None => {
            let names: Vec<&str> = a.iter().chain(b).map(|c| c.name).collect();
            no_harmony(format!(
                "No established harmony between {}",
                names.join(", ")
            ))
        }
    }
}

fn no_harmony(reasoning: String) -> ColorHarmonyResult {
    ColorHarmonyResult {
        is_harmonious: false,
        harmony_type: HarmonyType::None,
        confidence: rules::NO_HARMONY_CONFIDENCE,
        reasoning,
    }
}

/// Ordered cascade for one pair; the best positive rule is returned.
fn evaluate_pair(a: &NamedColor, b: &NamedColor, season: Season) -> Option<HarmonyMatch> {
    let checks = [
        check_neutral(a, b),
        check_modern(a, b),
        check_complementary(a, b),
        check_analogous(a, b),
        check_triadic(a, b),
        check_seasonal(a, b, season),
        check_monochromatic(a, b),
    ];
    checks.into_iter().fold(None, pick)
}

fn check_neutral(a: &NamedColor, b: &NamedColor) -> Option<HarmonyMatch> {
    let neutral = [a, b].into_iter().find(|c| is_neutral(c))?;
    let other = if std::ptr::eq(neutral, a) { b } else { a };
    Some(HarmonyMatch::new(
        HarmonyType::Neutral,
        rules::NEUTRAL_CONFIDENCE,
        format!("{} is a neutral and pairs with {}", neutral.name, other.name),
    ))
}

fn check_modern(a: &NamedColor, b: &NamedColor) -> Option<HarmonyMatch> {
    let confidence = rules::modern_combination(a.name, b.name)?;
    Some(HarmonyMatch::new(
        HarmonyType::Modern,
        confidence,
        format!("{} and {} is a curated modern combination", a.name, b.name),
    ))
}

fn hue(color: &NamedColor) -> f32 {
    rgb_to_hsl(color.rgb).h
}

fn chromatic(a: &NamedColor, b: &NamedColor) -> bool {
    !is_neutral(a) && !is_neutral(b) && a.family != b.family
}

fn check_complementary(a: &NamedColor, b: &NamedColor) -> Option<HarmonyMatch> {
    if rules::are_complementary(a.family, b.family) {
        return Some(HarmonyMatch::new(
            HarmonyType::Complementary,
            rules::COMPLEMENTARY_CONFIDENCE,
            format!(
                "{} and {} sit opposite on the color wheel",
                a.family.as_str(),
                b.family.as_str()
            ),
        ));
    }
    let distance = rules::hue_distance(hue(a), hue(b));
    (chromatic(a, b) && (150.0..=180.0).contains(&distance)).then(|| {
        HarmonyMatch::new(
            HarmonyType::Complementary,
            rules::HUE_COMPLEMENTARY_CONFIDENCE,
            format!("{} and {} are {:.0} degrees apart", a.name, b.name, distance),
        )
    })
}

fn check_analogous(a: &NamedColor, b: &NamedColor) -> Option<HarmonyMatch> {
    if rules::are_analogous(a.family, b.family) {
        return Some(HarmonyMatch::new(
            HarmonyType::Analogous,
            rules::ANALOGOUS_CONFIDENCE,
            format!(
                "{} and {} are neighbours on the color wheel",
                a.family.as_str(),
                b.family.as_str()
            ),
        ));
    }
    let distance = rules::hue_distance(hue(a), hue(b));
    (chromatic(a, b) && distance <= 40.0).then(|| {
        HarmonyMatch::new(
            HarmonyType::Analogous,
            rules::HUE_ANALOGOUS_CONFIDENCE,
            format!("{} and {} have close hues", a.name, b.name),
        )
    })
}

fn check_triadic(a: &NamedColor, b: &NamedColor) -> Option<HarmonyMatch> {
    if rules::in_same_triad(a.family, b.family) {
        return Some(HarmonyMatch::new(
            HarmonyType::Triadic,
            rules::TRIADIC_CONFIDENCE,
            format!(
                "{} and {} belong to the same triad",
                a.family.as_str(),
                b.family.as_str()
            ),
        ));
    }
    let distance = rules::hue_distance(hue(a), hue(b));
    (chromatic(a, b) && (100.0..=140.0).contains(&distance)).then(|| {
        HarmonyMatch::new(
            HarmonyType::Triadic,
            rules::HUE_TRIADIC_CONFIDENCE,
            format!("{} and {} are roughly a third of the wheel apart", a.name, b.name),
        )
    })
}

/// Whole-set check: three distinct families forming a triad.
fn evaluate_triad(colors: &[NamedColor]) -> Option<HarmonyMatch> {
    rules::TRIADS.iter().find_map(|triad| {
        triad
            .iter()
            .all(|f| colors.iter().any(|c| c.family == *f))
            .then(|| {
                HarmonyMatch::new(
                    HarmonyType::Triadic,
                    rules::TRIADIC_CONFIDENCE + 0.05,
                    format!(
                        "Full triad of {}, {} and {}",
                        triad[0].as_str(),
                        triad[1].as_str(),
                        triad[2].as_str()
                    ),
                )
            })
    })
}

fn check_seasonal(a: &NamedColor, b: &NamedColor, season: Season) -> Option<HarmonyMatch> {
    let palette = season_palette(season);
    (palette.contains(&a.name) && palette.contains(&b.name)).then(|| {
        HarmonyMatch::new(
            HarmonyType::Seasonal,
            rules::SEASONAL_CONFIDENCE,
            format!(
                "{} and {} are both in the {} palette",
                a.name,
                b.name,
                season.as_str()
            ),
        )
    })
}

fn check_monochromatic(a: &NamedColor, b: &NamedColor) -> Option<HarmonyMatch> {
    (a.family == b.family && a.family != ColorFamily::Neutral).then(|| {
        HarmonyMatch::new(
            HarmonyType::Monochromatic,
            rules::MONOCHROMATIC_CONFIDENCE,
            format!("{} and {} share the {} family", a.name, b.name, a.family.as_str()),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> HarmonyEngine {
        HarmonyEngine::new(HarmonyConfig {
            season: Some(Season::Summer),
        })
    }

    #[test]
    fn test_neutral_wins() {
        let result = engine().analyze_harmony(&["black"], &["coral"]);
        assert!(result.is_harmonious);
        assert_eq!(result.harmony_type, HarmonyType::Neutral);
        assert!(result.confidence >= 0.85);
    }

    #[test]
    fn test_neutral_beats_modern_combo() {
        let result = engine().analyze_harmony(&["teal", "white"], &["coral"]);
        assert_eq!(result.harmony_type, HarmonyType::Neutral);
    }

    #[test]
    fn test_modern_combo() {
        let result = engine().analyze_harmony(&["rust"], &["teal"]);
        assert_eq!(result.harmony_type, HarmonyType::Modern);
        assert_eq!(result.confidence, 0.87);
    }

    #[test]
    fn test_complementary_families() {
        let result = engine().analyze_harmony(&["red"], &["green"]);
        assert_eq!(result.harmony_type, HarmonyType::Complementary);
        assert_eq!(result.confidence, rules::COMPLEMENTARY_CONFIDENCE);
    }

    #[test]
    fn test_analogous_families() {
        let result = engine().analyze_harmony(&["orange"], &["yellow"]);
        assert_eq!(result.harmony_type, HarmonyType::Analogous);
    }

    #[test]
    fn test_seasonal_palette_depends_on_season() {
        let e = engine();
        let summer = e.analyze_harmony_in_season(&["mint"], &["sky blue"], Season::Summer);
        assert!(summer.is_harmonious);
        assert!(summer.confidence >= rules::SEASONAL_CONFIDENCE);
    }

    #[test]
    fn test_monochromatic() {
        let result = engine().analyze_harmony_in_season(&["blush"], &["magenta"], Season::Autumn);
        assert_eq!(result.harmony_type, HarmonyType::Monochromatic);
    }

    #[test]
    fn test_hex_inputs_are_classified() {
        let result = engine().analyze_harmony(&["#000000"], &["#FF7F50"]);
        assert_eq!(result.harmony_type, HarmonyType::Neutral);
    }

    #[test]
    fn test_result_serializes_with_camel_case_keys() {
        let result = engine().analyze_harmony(&["black"], &["coral"]);
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["isHarmonious"], true);
        assert_eq!(value["harmonyType"], "neutral");
        assert!(value.get("confidence").is_some());
        assert!(value.get("reasoning").is_some());
        assert!(value.get("is_harmonious").is_none());
        assert!(value.get("harmony_type").is_none());
    }

    #[test]
    fn test_unknown_colors() {
        let result = engine().analyze_harmony(&["sparkly"], &["coral"]);
        assert!(!result.is_harmonious);
        assert_eq!(result.harmony_type, HarmonyType::None);
        assert_eq!(result.confidence, 0.1);
    }

    #[test]
    fn test_find_best_harmony_full_triad() {
        let result =
            engine().find_best_harmony_in_season(&["red", "yellow", "blue"], Season::Autumn);
        assert_eq!(result.harmony_type, HarmonyType::Triadic);
        assert!(result.confidence > rules::TRIADIC_CONFIDENCE);
    }

    #[test]
    fn test_find_best_harmony_degenerate_inputs() {
        let empty: [&str; 0] = [];
        assert!(!engine().find_best_harmony(&empty).is_harmonious);
        let single = engine().find_best_harmony(&["plum"]);
        assert!(single.is_harmonious);
        assert_eq!(single.harmony_type, HarmonyType::Monochromatic);
    }

    #[test]
    fn test_confidence_bounds() {
        let names: Vec<&str> = crate::pipeline::services::color::NAMED_COLORS
            .iter()
            .map(|c| c.name)
            .collect();
        let e = engine();
        for a in &names {
            for b in &names {
                let r = e.analyze_harmony(&[*a], &[*b]);
                assert!((0.0..=1.0).contains(&r.confidence));
            }
        }
    }
}
