use serde::{Deserialize, Serialize};

/// Literals and messages used by the validators.
///
/// Deserializes from partial objects; missing fields keep the English defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Locale {
    pub yes: String,
    pub no: String,
    pub required: String,
    pub expected_text: String,
    pub text_required: String,
    pub yes_no: String,
    pub select_option: String,
    pub expected_list: String,
    pub select_at_least_one: String,
    pub expected_number: String,
    pub integer: String,
    pub two_decimals: String,
}

impl Default for Locale {
    fn default() -> Self {
        Self::english()
    }
}

impl Locale {
    pub fn english() -> Self {
        Self {
            yes: "Yes".into(),
            no: "No".into(),
            required: "This question is required".into(),
            expected_text: "Expected a text answer".into(),
            text_required: "An answer is required".into(),
            yes_no: "Select Yes or No".into(),
            select_option: "Select an option".into(),
            expected_list: "Expected a list of options".into(),
            select_at_least_one: "Select at least one option".into(),
            expected_number: "Expected a number".into(),
            integer: "Must be a whole number".into(),
            two_decimals: "Must have at most 2 decimal places".into(),
        }
    }

    pub fn portuguese() -> Self {
        Self {
            yes: "Sim".into(),
            no: "Não".into(),
            required: "Esta pergunta é obrigatória".into(),
            expected_text: "Esperava uma resposta em texto".into(),
            text_required: "Resposta é obrigatória".into(),
            yes_no: "Selecione Sim ou Não".into(),
            select_option: "Selecione uma opção".into(),
            expected_list: "Esperava uma lista de opções".into(),
            select_at_least_one: "Selecione pelo menos uma opção".into(),
            expected_number: "Esperava um número".into(),
            integer: "Deve ser um número inteiro".into(),
            two_decimals: "Deve ter no máximo 2 casas decimais".into(),
        }
    }

    /// Looks up a bundled locale by language tag (`en`, `pt`, `pt-BR`, ...).
    pub fn preset(tag: &str) -> Option<Self> {
        let language = tag
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match language.as_str() {
            "en" => Some(Self::english()),
            "pt" => Some(Self::portuguese()),
            _ => None,
        }
    }
}
