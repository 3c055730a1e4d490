//! Label tables for the locales the catalog ships translations for.
//!
//! Only Korean (`ko`) has tables; every other locale gets the upstream
//! English identifiers back unchanged.

/// Creature types that can be used as a category filter.
pub const CATEGORIES: [&str; 18] = [
    "normal", "fire", "water", "electric", "grass", "ice", "fighting", "poison", "ground",
    "flying", "psychic", "bug", "rock", "ghost", "dragon", "dark", "steel", "fairy",
];

pub const DEFAULT_LOCALE: &str = "ko";

pub fn is_known_category(name: &str) -> bool {
    CATEGORIES.contains(&name)
}

pub fn type_label<'a>(locale: &str, type_name: &'a str) -> &'a str {
    if locale != "ko" {
        return type_name;
    }
    match type_name {
        "normal" => "노말",
        "fire" => "불꽃",
        "water" => "물",
        "electric" => "전기",
        "grass" => "풀",
        "ice" => "얼음",
        "fighting" => "격투",
        "poison" => "독",
        "ground" => "땅",
        "flying" => "비행",
        "psychic" => "에스퍼",
        "bug" => "벌레",
        "rock" => "바위",
        "ghost" => "고스트",
        "dragon" => "드래곤",
        "dark" => "어둠",
        "steel" => "강철",
        "fairy" => "페어리",
        other => other,
    }
}

pub fn stat_label<'a>(locale: &str, stat_name: &'a str) -> &'a str {
    if locale != "ko" {
        return stat_name;
    }
    match stat_name {
        "hp" => "HP",
        "attack" => "공격",
        "defense" => "방어",
        "special-attack" => "특수공격",
        "special-defense" => "특수방어",
        "speed" => "스피드",
        other => other,
    }
}

pub fn generation_label<'a>(locale: &str, generation: &'a str) -> &'a str {
    if locale != "ko" {
        return generation;
    }
    match generation {
        "generation-i" => "1세대",
        "generation-ii" => "2세대",
        "generation-iii" => "3세대",
        "generation-iv" => "4세대",
        "generation-v" => "5세대",
        "generation-vi" => "6세대",
        "generation-vii" => "7세대",
        "generation-viii" => "8세대",
        "generation-ix" => "9세대",
        other => other,
    }
}
