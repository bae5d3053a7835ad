// src/common/i18n.rs

use std::collections::HashMap;
use std::sync::LazyLock;

// Catálogos embutidos no binário (não dependem do diretório de execução)
const EMBEDDED_CATALOGS: [(&str, &str); 2] = [
    ("pt", include_str!("../../locales/pt.json")),
    ("en", include_str!("../../locales/en.json")),
];

pub const DEFAULT_LANG: &str = "pt";

static FALLBACK: LazyLock<I18nStore> =
    LazyLock::new(|| I18nStore::from_embedded().unwrap_or_default());

/// Mensagens traduzidas, indexadas por idioma e depois por chave.
#[derive(Debug, Default, Clone)]
pub struct I18nStore {
    catalogs: HashMap<String, HashMap<String, String>>,
}

impl I18nStore {
    pub fn from_embedded() -> anyhow::Result<Self> {
        let mut catalogs = HashMap::new();
        for (lang, raw) in EMBEDDED_CATALOGS {
            let messages: HashMap<String, String> = serde_json::from_str(raw)?;
            catalogs.insert(lang.to_string(), messages);
        }
        Ok(Self { catalogs })
    }

    /// Store usado quando não há AppState à mão (ex.: rejeições de middleware).
    pub fn fallback() -> &'static I18nStore {
        &FALLBACK
    }

    pub fn supports(&self, lang: &str) -> bool {
        self.catalogs.contains_key(lang)
    }

    /// Traduz `key` para `lang`, caindo para o português e, por fim, para a própria chave.
    /// Parâmetros no formato `{nome}` são substituídos.
    pub fn translate(&self, lang: &str, key: &str, params: &[(&str, String)]) -> String {
        let template = self
            .catalogs
            .get(lang)
            .and_then(|c| c.get(key))
            .or_else(|| self.catalogs.get(DEFAULT_LANG).and_then(|c| c.get(key)))
            .cloned()
            .unwrap_or_else(|| key.to_string());

        params.iter().fold(template, |acc, (name, value)| {
            acc.replace(&format!("{{{}}}", name), value)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_with_params_in_requested_language() {
        let store = I18nStore::from_embedded().unwrap();
        let msg = store.translate("en", "rack_name_exists", &[("name", "R-01".into())]);
        assert_eq!(msg, "A rack named 'R-01' already exists.");
    }

    #[test]
    fn unknown_language_falls_back_to_portuguese() {
        let store = I18nStore::from_embedded().unwrap();
        let msg = store.translate("de", "user_not_found", &[]);
        assert_eq!(msg, "Usuário não encontrado.");
    }

    #[test]
    fn unknown_key_is_returned_verbatim() {
        let store = I18nStore::from_embedded().unwrap();
        assert_eq!(store.translate("pt", "nope", &[]), "nope");
    }
}
