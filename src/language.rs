//! Wikipedia editions the feed can read from.
//!
//! A [`Language`] carries the `api.php` endpoint of one Wikipedia edition, the
//! language or variant code sent as `variant=` on wikis that render several
//! scripts, and the naming pattern of that edition's per-year film category.

/// Placeholder replaced by the release year in [`Language::category_pattern`].
const YEAR_PLACEHOLDER: &str = "{year}";

/// One Wikipedia edition (or script variant of an edition).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Language {
    /// Language or variant code (`en`, `zh-tw`, ...).
    pub id: String,
    /// Human-readable name shown by `--list-languages`.
    pub name: String,
    /// Full `api.php` endpoint.
    pub api: String,
    /// Category title pattern, `{year}` is substituted.
    pub category_pattern: String,
}

struct BuiltinLanguage {
    id: &'static str,
    name: &'static str,
    api: &'static str,
    category_pattern: &'static str,
}

const BUILTIN_LANGUAGES: &[BuiltinLanguage] = &[
    BuiltinLanguage {
        id: "en",
        name: "English",
        api: "https://en.wikipedia.org/w/api.php",
        category_pattern: "Category:{year} films",
    },
    BuiltinLanguage {
        id: "de",
        name: "Deutsch",
        api: "https://de.wikipedia.org/w/api.php",
        category_pattern: "Kategorie:Filmtitel {year}",
    },
    BuiltinLanguage {
        id: "fr",
        name: "Français",
        api: "https://fr.wikipedia.org/w/api.php",
        category_pattern: "Catégorie:Film sorti en {year}",
    },
    BuiltinLanguage {
        id: "ja",
        name: "日本語",
        api: "https://ja.wikipedia.org/w/api.php",
        category_pattern: "Category:{year}年の映画",
    },
    BuiltinLanguage {
        id: "zh-cn",
        name: "中文（简体）",
        api: "https://zh.wikipedia.org/w/api.php",
        category_pattern: "Category:{year}年电影",
    },
    BuiltinLanguage {
        id: "zh-tw",
        name: "中文（台灣）",
        api: "https://zh.wikipedia.org/w/api.php",
        category_pattern: "Category:{year}年电影",
    },
    BuiltinLanguage {
        id: "zh-hk",
        name: "中文（香港）",
        api: "https://zh.wikipedia.org/w/api.php",
        category_pattern: "Category:{year}年电影",
    },
];

impl BuiltinLanguage {
    fn to_language(&self) -> Language {
        Language::custom(self.id, self.name, self.api, self.category_pattern)
    }
}

impl Default for Language {
    fn default() -> Self {
        BUILTIN_LANGUAGES[0].to_language()
    }
}

impl Language {
    /// Creates a language for an arbitrary MediaWiki endpoint.
    pub fn custom(
        id: impl Into<String>,
        name: impl Into<String>,
        api: impl Into<String>,
        category_pattern: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            api: api.into(),
            category_pattern: category_pattern.into(),
        }
    }

    /// Looks up a built-in language by id (case-insensitive).
    #[must_use]
    pub fn find(id: &str) -> Option<Self> {
        let id = id.trim();
        BUILTIN_LANGUAGES
            .iter()
            .find(|lang| lang.id.eq_ignore_ascii_case(id))
            .map(BuiltinLanguage::to_language)
    }

    /// Returns every built-in language in display order.
    #[must_use]
    pub fn builtin() -> Vec<Self> {
        BUILTIN_LANGUAGES
            .iter()
            .map(BuiltinLanguage::to_language)
            .collect()
    }

    /// Title of the film category for `year`.
    #[must_use]
    pub fn category_for_year(&self, year: i32) -> String {
        self.category_pattern
            .replace(YEAR_PLACEHOLDER, &year.to_string())
    }

    /// Variant code to send upstream, if this edition renders script variants.
    ///
    /// Only ids of the form `<lang>-<variant>` carry one.
    #[must_use]
    pub fn variant(&self) -> Option<&str> {
        self.id.contains('-').then_some(self.id.as_str())
    }
}
