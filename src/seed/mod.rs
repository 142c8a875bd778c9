use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::SeedProfile;
use crate::models::ProduceItem;

static VARIETIES: &[&str] = &[
    "Organic", "Heirloom", "Baby", "Red", "Green", "Golden", "Purple", "Wild",
    "Sweet", "Seedless", "Dwarf", "Giant", "Early", "Late", "Local", "Imported",
    "Fresh", "Ripe", "Crisp", "Winter",
];

static PRODUCE: &[&str] = &[
    "Apple", "Pear", "Peach", "Plum", "Cherry", "Grape", "Lettuce", "Spinach",
    "Kale", "Carrot", "Beet", "Radish", "Onion", "Leek", "Pepper", "Tomato",
    "Cucumber", "Squash", "Melon", "Berry", "Lemon", "Lime", "Orange", "Mango",
    "Potato", "Yam", "Celery", "Fennel", "Turnip", "Cabbage",
];

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// The items a fresh store starts with.
pub fn initial_items(profile: SeedProfile) -> Vec<ProduceItem> {
    let apple_code = match profile {
        SeedProfile::Default => "TQ4C-VV6T-75ZX-1RMR",
        SeedProfile::Testing => "2222-2222-2222-2222",
        SeedProfile::Empty => return Vec::new(),
    };
    vec![
        ProduceItem::new("A12T-4GH7-QPL9-3N4M", "Lettuce", "$3.46"),
        ProduceItem::new("E5T6-9UI3-TH15-QR88", "Peach", "$2.99"),
        ProduceItem::new("YRT6-72AS-K736-L4AR", "Green Pepper", "$0.79"),
        ProduceItem::new(apple_code, "Gala Apple", "$3.59"),
    ]
}

/// Random `XXXX-XXXX-XXXX-XXXX` code over upper-case alphanumerics.
pub fn random_code(rng: &mut impl Rng) -> String {
    let mut code = String::with_capacity(19);
    for group in 0..4 {
        if group > 0 {
            code.push('-');
        }
        for _ in 0..4 {
            code.push(CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char);
        }
    }
    code
}

/// Formats cents as `$1,234.56`.
pub fn format_price(cents: u64) -> String {
    let dollars = (cents / 100).to_string();
    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, ch) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("${}.{:02}", grouped, cents % 100)
}

pub fn random_item(rng: &mut impl Rng) -> ProduceItem {
    let variety = VARIETIES.choose(rng).unwrap_or(&"Fresh");
    let produce = PRODUCE.choose(rng).unwrap_or(&"Apple");
    ProduceItem::new(
        random_code(rng),
        format!("{} {}", variety, produce),
        format_price(rng.gen_range(9..=999_999)), // $0.09 to $9,999.99
    )
}

/// Generate `count` random items. Codes may collide; the store decides.
pub fn random_items(rng: &mut impl Rng, count: usize) -> Vec<ProduceItem> {
    (0..count).map(|_| random_item(rng)).collect()
}
