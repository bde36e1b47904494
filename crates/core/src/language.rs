use std::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TargetLanguage {
    #[default]
    English,
    French,
    Spanish,
    German,
    Italian,
    Portuguese,
    Russian,
    Ukrainian,
    Arabic,
    Hindi,
    Chinese,
    Japanese,
    Korean,
    Turkish,
    Dutch,
    Polish,
    Indonesian,
    Swahili,
}

// (language, English name, ISO 639-1 code)
const LANGUAGES: [(TargetLanguage, &str, &str); 18] = [
    (TargetLanguage::English, "English", "en"),
    (TargetLanguage::French, "French", "fr"),
    (TargetLanguage::Spanish, "Spanish", "es"),
    (TargetLanguage::German, "German", "de"),
    (TargetLanguage::Italian, "Italian", "it"),
    (TargetLanguage::Portuguese, "Portuguese", "pt"),
    (TargetLanguage::Russian, "Russian", "ru"),
    (TargetLanguage::Ukrainian, "Ukrainian", "uk"),
    (TargetLanguage::Arabic, "Arabic", "ar"),
    (TargetLanguage::Hindi, "Hindi", "hi"),
    (TargetLanguage::Chinese, "Chinese", "zh"),
    (TargetLanguage::Japanese, "Japanese", "ja"),
    (TargetLanguage::Korean, "Korean", "ko"),
    (TargetLanguage::Turkish, "Turkish", "tr"),
    (TargetLanguage::Dutch, "Dutch", "nl"),
    (TargetLanguage::Polish, "Polish", "pl"),
    (TargetLanguage::Indonesian, "Indonesian", "id"),
    (TargetLanguage::Swahili, "Swahili", "sw"),
];

impl TargetLanguage {
    pub fn all() -> impl Iterator<Item = TargetLanguage> {
        LANGUAGES.iter().map(|(lang, _, _)| *lang)
    }

    fn entry(&self) -> &'static (TargetLanguage, &'static str, &'static str) {
        LANGUAGES
            .iter()
            .find(|(lang, _, _)| lang == self)
            .unwrap_or(&LANGUAGES[0])
    }

    pub fn name(&self) -> &'static str {
        self.entry().1
    }

    pub fn code(&self) -> &'static str {
        self.entry().2
    }

    pub fn is_default(&self) -> bool {
        *self == TargetLanguage::default()
    }

    /// Accepts an English language name or an ISO 639-1 code, in any case.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        LANGUAGES
            .iter()
            .find(|(_, name, code)| {
                name.eq_ignore_ascii_case(value) || code.eq_ignore_ascii_case(value)
            })
            .map(|(lang, _, _)| *lang)
    }
}

impl fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
