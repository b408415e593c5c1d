use lazy_static::lazy_static;
use std::collections::HashMap;

lazy_static! {
    /// Slovak → English ingredient names, so storefront searches and the
    /// frontend both get clean English. A closed table, not a translation
    /// service: anything unknown passes through title-cased.
    static ref ENGLISH_NAMES: HashMap<&'static str, &'static str> = HashMap::from([
        // Meats
        ("hovädzie mäso", "beef"),
        ("hovädzie", "beef"),
        ("bravčové mäso", "pork"),
        ("kuracie mäso", "chicken"),
        ("morčacie mäso", "turkey"),
        ("klobása", "sausage"),
        ("slanina", "bacon"),
        ("údené mäso", "smoked meat"),
        // Dairy & Eggs
        ("bryndza", "bryndza cheese"),
        ("syrové halušky", "cheese dumplings"),
        ("smotana", "cooking cream"),
        ("kyslá smotana", "sour cream"),
        ("mlieko", "milk"),
        ("maslo", "butter"),
        ("vajcia", "eggs"),
        ("vajíčka", "eggs"),
        ("syrov", "cheese"),
        // Vegetables
        ("zemiaky", "potatoes"),
        ("koreňová zelenina", "root vegetables"),
        ("mrkva", "carrots"),
        ("mrkev", "carrots"),
        ("petržlen", "parsley root"),
        ("celer", "celery"),
        ("cibuľa", "onion"),
        ("cesnak", "garlic"),
        ("kapusta", "cabbage"),
        ("kyslá kapusta", "sauerkraut"),
        ("paradajky", "tomatoes"),
        ("paprika", "bell pepper"),
        // Grains & Flour
        ("múka", "flour"),
        ("hladká múka", "all-purpose flour"),
        ("ryža", "rice"),
        // Other
        ("soľ", "salt"),
        ("korenie", "black pepper"),
        ("olej", "oil"),
        ("cukor", "sugar"),
        ("ocot", "vinegar"),
        // Full dishes (for recognition)
        ("bryndzové halušky", "bryndza dumplings"),
        ("kapustnica", "sauerkraut soup"),
        ("sviečková na smotane", "beef sirloin in cream sauce"),
        ("guláš", "goulash"),
        ("rezne", "schnitzel"),
        ("cesnačka", "garlic soup"),
    ]);
}

/// Map a Slovak ingredient name to English. Unmapped names are passed through
/// with capitalization normalized only.
pub fn to_english(name: &str) -> String {
    let key = name.trim().to_lowercase();
    match ENGLISH_NAMES.get(key.as_str()) {
        Some(english) => (*english).to_string(),
        None => title_case(&key),
    }
}

fn title_case(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_names_translate() {
        assert_eq!(to_english("zemiaky"), "potatoes");
        assert_eq!(to_english("bryndza"), "bryndza cheese");
        assert_eq!(to_english("kyslá kapusta"), "sauerkraut");
    }

    #[test]
    fn lookup_ignores_case_and_whitespace() {
        assert_eq!(to_english("  Zemiaky "), "potatoes");
        assert_eq!(to_english("MLIEKO"), "milk");
    }

    #[test]
    fn unknown_names_are_title_cased() {
        assert_eq!(to_english("kuskus extra jemný"), "Kuskus Extra Jemný");
        assert_eq!(to_english("tofu"), "Tofu");
    }

    #[test]
    fn empty_name_stays_empty() {
        assert_eq!(to_english(""), "");
    }
}
