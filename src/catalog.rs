//! Language-to-model mappings for recognition and synthesis.
//!
//! Fallbacks are deliberate, documented behavior rather than a silent
//! code-level default: a language with no dedicated model maps to the
//! multilingual synthesis model (or the English recognition reader) and the
//! conversion still succeeds. The registry resolves through these functions,
//! so every unsupported language shares one cached fallback instance.

/// Languages with a dedicated recognition reader.
pub const RECOGNITION_LANGUAGES: &[&str] = &[
    "bn", "ja", "zh-cn", "zh-tw", "ko", "ru", "bg", "be", "uk", "cs", "pl", "sk", "da", "no",
    "sv", "nl", "de", "fr", "it", "es", "pt", "en",
];

/// Fallback recognition key for unsupported languages.
pub const DEFAULT_RECOGNITION_LANGUAGE: &str = "en";

/// Resolve a requested language to a recognition cache key.
pub fn recognition_key(language: &str) -> &str {
    if RECOGNITION_LANGUAGES.contains(&language) {
        language
    } else {
        DEFAULT_RECOGNITION_LANGUAGE
    }
}

/// Reader language list for a resolved recognition key.
///
/// Non-English readers are paired with English so mixed-language documents
/// (very common in practice) still recognize the Latin-script parts.
///
/// # Example
///
/// A recognition loader resolves through [`recognition_key`] and builds its
/// reader over this list:
///
/// ```rust,no_run
/// use doc2audio::catalog::{recognition_key, recognition_languages};
/// use doc2audio::{ModelError, ModelLoader, TextRecognizer};
///
/// struct OcrLoader;
///
/// impl ModelLoader<dyn TextRecognizer> for OcrLoader {
///     fn resolve(&self, language: &str) -> String {
///         recognition_key(language).to_string()
///     }
///
///     fn load(&self, key: &str) -> Result<Box<dyn TextRecognizer>, ModelError> {
///         // e.g. ["ja", "en"] for Japanese documents
///         let readers = recognition_languages(key);
///         # let _ = readers;
///         todo!("construct the engine over `readers`")
///     }
/// }
/// ```
pub fn recognition_languages(key: &str) -> Vec<String> {
    if key == "en" {
        vec!["en".to_string()]
    } else {
        vec![key.to_string(), "en".to_string()]
    }
}

/// The multilingual synthesis model used for any language without a
/// dedicated entry in [`synthesis_model`].
pub const FALLBACK_SYNTHESIS_MODEL: &str = "tts_models/multilingual/multi-dataset/your_tts";

/// Map a language code to its synthesis model id.
///
/// Returns [`FALLBACK_SYNTHESIS_MODEL`] for unsupported languages.
pub fn synthesis_model(language: &str) -> &'static str {
    match language {
        "en" => "tts_models/en/ljspeech/fast_pitch",
        "fr" => "tts_models/fr/mai/tacotron2-DDC",
        "de" => "tts_models/de/thorsten/tacotron2-DDC",
        "es" => "tts_models/es/mai/tacotron2-DDC",
        "it" => "tts_models/it/mai_female/glow-tts",
        "nl" => "tts_models/nl/mai/tacotron2-DDC",
        "pt" => "tts_models/pt/cv/vits",
        "pl" => "tts_models/pl/mai_female/vits",
        "tr" => "tts_models/tr/common-voice/glow-tts",
        "ja" => "tts_models/ja/kokoro/tacotron2-DDC",
        "zh-cn" => "tts_models/zh-CN/baker/tacotron2-DDC-GST",
        "bn" => "tts_models/bn/custom/vits-male",
        "bg" => "tts_models/bg/cv/vits",
        "cs" => "tts_models/cs/cv/vits",
        "da" => "tts_models/da/cv/vits",
        "et" => "tts_models/et/cv/vits",
        "ga" => "tts_models/ga/cv/vits",
        "el" => "tts_models/el/cv/vits",
        "fi" => "tts_models/fi/css10/vits",
        "hr" => "tts_models/hr/cv/vits",
        "hu" => "tts_models/hu/css10/vits",
        "lt" => "tts_models/lt/cv/vits",
        "lv" => "tts_models/lv/cv/vits",
        "mt" => "tts_models/mt/cv/vits",
        "ro" => "tts_models/ro/cv/vits",
        "sk" => "tts_models/sk/cv/vits",
        "sl" => "tts_models/sl/cv/vits",
        "sv" => "tts_models/sv/cv/vits",
        "uk" => "tts_models/uk/mai/vits",
        "ca" => "tts_models/ca/custom/vits",
        "fa" => "tts_models/fa/custom/glow-tts",
        "be" => "tts_models/be/common-voice/glow-tts",
        _ => FALLBACK_SYNTHESIS_MODEL,
    }
}

/// Whether a language has a dedicated (non-fallback) synthesis model.
pub fn is_synthesis_supported(language: &str) -> bool {
    synthesis_model(language) != FALLBACK_SYNTHESIS_MODEL
}
