//! MediaWiki response builders for wiremock-backed tests.

use filmfeed_core::Language;
use serde_json::{Value, json};
use wiremock::MockServer;

pub const API_PATH: &str = "/w/api.php";

/// An English-style edition whose endpoint is the mock server.
pub fn mock_language(server: &MockServer, id: &str) -> Language {
    Language::custom(
        id,
        "Mock",
        format!("{}{API_PATH}", server.uri()),
        "Category:{year} films",
    )
}

/// One acceptable film page, thumbnail served from `image_base`.
pub fn film_page(id: u64, title: &str, image_base: &str) -> Value {
    json!({
        "pageid": id,
        "ns": 0,
        "title": title,
        "extract": format!(
            "{title} is a film that premiered at a festival and went on to a wide theatrical \
             release, earning several awards for its direction and cast."
        ),
        "thumbnail": {
            "source": format!("{image_base}/img/{id}.jpg"),
            "width": 800,
            "height": 1200
        },
        "canonicalurl": format!("https://en.wikipedia.org/wiki/{}", title.replace(' ', "_")),
        "fullurl": format!("https://en.wikipedia.org/wiki/{}", title.replace(' ', "_")),
        "categories": [{ "ns": 14, "title": "Category:Drama films" }]
    })
}

/// A page that passes acceptance but has nothing to do with film.
pub fn rock_page(id: u64) -> Value {
    json!({
        "pageid": id,
        "ns": 0,
        "title": "Basalt",
        "extract": "Basalt is an aphanitic extrusive igneous rock formed from the rapid cooling of \
                    low-viscosity lava rich in magnesium and iron exposed at or very near the surface.",
        "thumbnail": { "source": "https://upload.wikimedia.org/basalt.jpg", "width": 800, "height": 600 },
        "canonicalurl": "https://en.wikipedia.org/wiki/Basalt",
        "categories": [{ "ns": 14, "title": "Category:Volcanic rocks" }]
    })
}

pub fn pages_body(pages: Vec<Value>) -> Value {
    json!({ "batchcomplete": true, "query": { "pages": pages } })
}

pub fn members_body(members: &[(u64, &str)]) -> Value {
    let members: Vec<Value> = members
        .iter()
        .map(|(id, title)| json!({ "pageid": id, "ns": 0, "title": title }))
        .collect();
    json!({ "batchcomplete": true, "query": { "categorymembers": members } })
}
