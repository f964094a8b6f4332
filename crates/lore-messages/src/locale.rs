//! Locale values and fallback chains.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use unic_langid::{LanguageIdentifier, LanguageIdentifierError};

/// A (language, country, variant) triple identifying a message locale.
///
/// Country and variant are optional. Equality, hashing, and fallback depend
/// only on the triple; display names play no role. The empty triple is the
/// language-neutral [`Locale::ROOT`], which maps to the suffix-less bundle
/// resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locale {
    language: String,
    country: Option<String>,
    variant: Option<String>,
}

impl Locale {
    /// The language-neutral root locale.
    pub const ROOT: Locale = Locale {
        language: String::new(),
        country: None,
        variant: None,
    };

    /// Create a language-only locale, e.g. `en`.
    pub fn new(language: &str) -> Self {
        Self {
            language: language.to_ascii_lowercase(),
            country: None,
            variant: None,
        }
    }

    /// Create a language+country locale, e.g. `pt-BR`.
    pub fn with_country(language: &str, country: &str) -> Self {
        Self {
            language: language.to_ascii_lowercase(),
            country: Some(country.to_ascii_uppercase()),
            variant: None,
        }
    }

    /// Create a fully-specified locale, e.g. `de-DE-bavarian`.
    pub fn with_variant(language: &str, country: &str, variant: &str) -> Self {
        Self {
            language: language.to_ascii_lowercase(),
            country: Some(country.to_ascii_uppercase()),
            variant: Some(variant.to_string()),
        }
    }

    /// The language subtag, empty for [`Locale::ROOT`].
    pub fn language(&self) -> &str {
        &self.language
    }

    /// The country subtag, if any.
    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    /// The variant subtag, if any.
    pub fn variant(&self) -> Option<&str> {
        self.variant.as_deref()
    }

    /// Whether this is the language-neutral root locale.
    pub fn is_root(&self) -> bool {
        self.language.is_empty()
    }

    /// The resource-name suffix for this locale.
    ///
    /// `_pt_BR_polite` for (pt, BR, polite), `_pt_BR` for (pt, BR), `_pt`
    /// for (pt), and the empty string for the root locale.
    pub fn suffix(&self) -> String {
        if self.is_root() {
            return String::new();
        }
        let mut suffix = format!("_{}", self.language);
        if let Some(country) = &self.country {
            suffix.push('_');
            suffix.push_str(country);
        }
        if let Some(variant) = &self.variant {
            suffix.push('_');
            suffix.push_str(variant);
        }
        suffix
    }

    /// The next less specific locale: variant dropped first, then country,
    /// then language. Returns `None` for the root locale.
    pub fn parent(&self) -> Option<Locale> {
        if self.variant.is_some() {
            Some(Locale {
                language: self.language.clone(),
                country: self.country.clone(),
                variant: None,
            })
        } else if self.country.is_some() {
            Some(Locale {
                language: self.language.clone(),
                country: None,
                variant: None,
            })
        } else if !self.is_root() {
            Some(Locale::ROOT)
        } else {
            None
        }
    }
}

impl FromStr for Locale {
    type Err = LanguageIdentifierError;

    /// Parse `en`, `pt-BR`, `pt_BR`, or `de-DE-bavarian` shaped strings.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.is_empty() {
            return Ok(Locale::ROOT);
        }
        let id: LanguageIdentifier = value.replace('_', "-").parse()?;
        let variant = id
            .variants()
            .next()
            .map(|variant| variant.as_str().to_string());
        Ok(Locale {
            language: id.language.as_str().to_ascii_lowercase(),
            country: id.region.map(|region| region.as_str().to_string()),
            variant,
        })
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return f.write_str("root");
        }
        f.write_str(&self.language)?;
        if let Some(country) = &self.country {
            write!(f, "-{}", country)?;
        }
        if let Some(variant) = &self.variant {
            write!(f, "-{}", variant)?;
        }
        Ok(())
    }
}

/// Candidate locales for a lookup, most specific first.
///
/// The requested locale is expanded by dropping one level of specificity at
/// a time, then the default locale is expanded the same way, and the chain
/// terminates in [`Locale::ROOT`]. Duplicates are removed preserving first
/// occurrence, so `fallback_chain(en, en)` collapses to `[en, root]`. The
/// result is never empty and the function has no error conditions.
pub fn fallback_chain(locale: &Locale, default_locale: &Locale) -> Vec<Locale> {
    let mut chain = Vec::with_capacity(7);
    push_expansion(&mut chain, locale);
    push_expansion(&mut chain, default_locale);
    push_unique(&mut chain, Locale::ROOT);
    chain
}

fn push_expansion(chain: &mut Vec<Locale>, locale: &Locale) {
    let mut cursor = locale.clone();
    while !cursor.is_root() {
        let parent = cursor.parent();
        push_unique(chain, cursor);
        match parent {
            Some(next) => cursor = next,
            None => break,
        }
    }
}

fn push_unique(chain: &mut Vec<Locale>, locale: Locale) {
    if !chain.contains(&locale) {
        chain.push(locale);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_language_only() {
        let locale: Locale = "en".parse().unwrap();
        assert_eq!(locale, Locale::new("en"));
        assert_eq!(locale.suffix(), "_en");
    }

    #[test]
    fn parses_language_and_country_in_both_spellings() {
        let dashed: Locale = "pt-BR".parse().unwrap();
        let underscored: Locale = "pt_BR".parse().unwrap();
        assert_eq!(dashed, underscored);
        assert_eq!(dashed, Locale::with_country("pt", "BR"));
        assert_eq!(dashed.suffix(), "_pt_BR");
    }

    #[test]
    fn parses_variants() {
        let locale: Locale = "de-DE-bavarian".parse().unwrap();
        assert_eq!(locale.language(), "de");
        assert_eq!(locale.country(), Some("DE"));
        assert_eq!(locale.variant(), Some("bavarian"));
        assert_eq!(locale.suffix(), "_de_DE_bavarian");
    }

    #[test]
    fn normalizes_casing() {
        assert_eq!(Locale::with_country("PT", "br"), Locale::with_country("pt", "BR"));
    }

    #[test]
    fn root_has_an_empty_suffix() {
        assert!(Locale::ROOT.is_root());
        assert_eq!(Locale::ROOT.suffix(), "");
        assert_eq!(Locale::ROOT.parent(), None);
    }

    #[test]
    fn parent_drops_one_level_at_a_time() {
        let full = Locale::with_variant("de", "DE", "bavarian");
        let country = full.parent().unwrap();
        assert_eq!(country, Locale::with_country("de", "DE"));
        let language = country.parent().unwrap();
        assert_eq!(language, Locale::new("de"));
        assert_eq!(language.parent(), Some(Locale::ROOT));
    }

    #[test]
    fn chain_expands_requested_then_default_then_root() {
        let chain = fallback_chain(
            &Locale::with_variant("pt", "BR", "polite"),
            &Locale::new("en"),
        );
        assert_eq!(
            chain,
            vec![
                Locale::with_variant("pt", "BR", "polite"),
                Locale::with_country("pt", "BR"),
                Locale::new("pt"),
                Locale::new("en"),
                Locale::ROOT,
            ]
        );
    }

    #[test]
    fn chain_collapses_when_locale_equals_default() {
        let chain = fallback_chain(&Locale::new("en"), &Locale::new("en"));
        assert_eq!(chain, vec![Locale::new("en"), Locale::ROOT]);
    }

    #[test]
    fn chain_deduplicates_overlapping_expansions() {
        let chain = fallback_chain(&Locale::with_country("en", "GB"), &Locale::new("en"));
        assert_eq!(
            chain,
            vec![
                Locale::with_country("en", "GB"),
                Locale::new("en"),
                Locale::ROOT,
            ]
        );
    }

    #[test]
    fn chain_for_root_is_just_root() {
        let chain = fallback_chain(&Locale::ROOT, &Locale::ROOT);
        assert_eq!(chain, vec![Locale::ROOT]);
    }

    #[test]
    fn displays_as_dashed_triple() {
        assert_eq!(Locale::with_country("pt", "BR").to_string(), "pt-BR");
        assert_eq!(Locale::ROOT.to_string(), "root");
    }
}
