//! Fixed sample catalog served whenever a live call fails.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde_json::Value;

use crate::models::Game;

static OFFLINE_CATALOG: Lazy<Vec<Game>> = Lazy::new(|| {
    vec![
        sample(
            78135,
            "Demeo",
            "demeo",
            "A virtual reality dungeon-crawling board game where players work together to defeat monsters and complete quests.",
            "https://media.forgecdn.net/avatars/468/250/637751406649699690.png",
            "https://media.forgecdn.net/game-covers/78135_b8970d8d-91f4-4353-8e67-2aa5f3e499bb.webp",
            "RPG",
            "2022-11-28T12:07:33.87Z",
        ),
        sample(
            432,
            "Minecraft",
            "minecraft",
            "A sandbox adventure game where you can build and explore infinite worlds.",
            "https://media.forgecdn.net/avatars/thumbnails/1/100/64/64/635292862241129938.png",
            "https://media.forgecdn.net/game-covers/432_cover.jpg",
            "Sandbox",
            "2011-11-18T00:00:00Z",
        ),
        sample(
            1,
            "World of Warcraft",
            "wow",
            "Massively multiplayer online role-playing game set in the Warcraft universe.",
            "https://media.forgecdn.net/avatars/thumbnails/2/100/64/64/635292862398848929.png",
            "https://media.forgecdn.net/game-covers/1_cover.jpg",
            "MMORPG",
            "2004-11-23T00:00:00Z",
        ),
        sample(
            2,
            "The Elder Scrolls V: Skyrim",
            "skyrim",
            "Epic fantasy role-playing game where you battle dragons and explore a vast world.",
            "https://media.forgecdn.net/avatars/thumbnails/3/100/64/64/635292862518848929.png",
            "https://media.forgecdn.net/game-covers/2_cover.jpg",
            "RPG",
            "2011-11-11T00:00:00Z",
        ),
        sample(
            3,
            "Cyberpunk 2077",
            "cyberpunk-2077",
            "Open-world, action-adventure RPG set in the dystopian Night City.",
            "https://media.forgecdn.net/avatars/thumbnails/4/100/64/64/635292862638848929.png",
            "https://media.forgecdn.net/game-covers/3_cover.jpg",
            "RPG",
            "2020-12-10T00:00:00Z",
        ),
        sample(
            4,
            "Grand Theft Auto V",
            "gta-v",
            "Action-adventure game set in the fictional state of San Andreas.",
            "https://media.forgecdn.net/avatars/thumbnails/5/100/64/64/635292862758848929.png",
            "https://media.forgecdn.net/game-covers/4_cover.jpg",
            "Action",
            "2013-09-17T00:00:00Z",
        ),
    ]
});

#[allow(clippy::too_many_arguments)]
fn sample(
    id: i64,
    name: &str,
    slug: &str,
    summary: &str,
    logo_url: &str,
    cover_url: &str,
    category: &str,
    created_at: &str,
) -> Game {
    Game {
        id,
        name: name.to_string(),
        slug: slug.to_string(),
        summary: summary.to_string(),
        logo_url: logo_url.to_string(),
        cover_url: cover_url.to_string(),
        category: category.to_string(),
        created_at: DateTime::parse_from_rfc3339(created_at)
            .expect("invalid offline catalog timestamp")
            .with_timezone(&Utc),
        website_url: format!("https://www.curseforge.com/{slug}"),
        status: 6,
        api_status: 2,
        raw: Value::Null,
    }
}

/// Clone of the offline sample catalog.
pub fn offline_catalog() -> Vec<Game> {
    OFFLINE_CATALOG.clone()
}
