#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryTag {
    Clothing,
    Beauty,
    Tech,
    Home,
    Sport,
    Work,
    Generic,
}

/// Keyword rules, checked in order against the lower-cased category. The
/// first rule with any matching keyword wins.
const RULES: &[(CategoryTag, &[&str])] = &[
    (
        CategoryTag::Clothing,
        &["cloth", "fashion", "wear", "shirt", "pant", "dress", "outfit"],
    ),
    (
        CategoryTag::Beauty,
        &["cosmetic", "beauty", "skin", "makeup", "hair"],
    ),
    (
        CategoryTag::Tech,
        &["tech", "phone", "electronic", "laptop", "gadget"],
    ),
    (CategoryTag::Home, &["home", "decor", "furniture", "kitchen"]),
    (CategoryTag::Sport, &["sport", "fitness", "gym"]),
    (CategoryTag::Work, &["work", "office", "business"]),
];

impl CategoryTag {
    pub fn for_category(category: &str) -> Self {
        let lower = category.to_lowercase();
        RULES
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
            .map(|(tag, _)| *tag)
            .unwrap_or(CategoryTag::Generic)
    }

    pub fn icon(self) -> &'static str {
        match self {
            CategoryTag::Clothing => "👕",
            CategoryTag::Beauty => "✨",
            CategoryTag::Tech => "📱",
            CategoryTag::Home => "🏠",
            CategoryTag::Sport => "🏃",
            CategoryTag::Work => "💼",
            CategoryTag::Generic => "🏷",
        }
    }
}
