//! Keyword-containment intent classifier.

use super::intent::{Intent, IntentClassifier, Stage};

/// Trigger words for each intent. Matching is lowercase substring containment.
#[derive(Debug, Clone)]
pub struct Lexicon {
    pub add_account: Vec<String>,
    pub browse: Vec<String>,
    pub show_cart: Vec<String>,
    pub finish: Vec<String>,
    pub add_item: Vec<String>,
    pub confirm: Vec<String>,
    pub deny: Vec<String>,
}

impl Default for Lexicon {
    fn default() -> Self {
        fn words(list: &[&str]) -> Vec<String> {
            list.iter().map(|w| (*w).to_string()).collect()
        }

        Self {
            add_account: words(&["новый"]),
            browse: words(&["новинки"]),
            show_cart: words(&["заказ"]),
            finish: words(&["достаточно", "нет", "все", "всё"]),
            add_item: words(&["добавь", "закажи"]),
            confirm: words(&["да"]),
            deny: words(&["нет"]),
        }
    }
}

fn mentions(text: &str, words: &[String]) -> bool {
    words.iter().any(|w| text.contains(w.as_str()))
}

/// Classifies by the first matching keyword group, in a fixed order per stage.
#[derive(Debug, Clone, Default)]
pub struct KeywordClassifier {
    lexicon: Lexicon,
}

impl KeywordClassifier {
    #[must_use]
    pub const fn new(lexicon: Lexicon) -> Self {
        Self { lexicon }
    }
}

impl IntentClassifier for KeywordClassifier {
    fn classify(&self, utterance: &str, stage: Stage) -> Intent {
        let raw = utterance.trim();
        let text = raw.to_lowercase();
        let lex = &self.lexicon;

        match stage {
            Stage::Enrollment | Stage::SignIn | Stage::CodeEntry
                if mentions(&text, &lex.add_account) =>
            {
                Intent::AddAccount
            }
            Stage::Enrollment => Intent::Unknown,
            Stage::SignIn => Intent::SelectUser(raw.to_string()),
            Stage::CodeEntry => Intent::SubmitCode(raw.to_string()),
            Stage::Shopping => {
                if mentions(&text, &lex.browse) {
                    Intent::Browse
                } else if mentions(&text, &lex.show_cart) {
                    Intent::ShowCart
                } else if mentions(&text, &lex.finish) {
                    Intent::Finish
                } else if mentions(&text, &lex.add_item) {
                    Intent::AddItem(text)
                } else {
                    Intent::Unknown
                }
            }
            // "да" wins over "нет" when both appear
            Stage::Confirmation => {
                if mentions(&text, &lex.confirm) {
                    Intent::Confirm
                } else if mentions(&text, &lex.deny) {
                    Intent::Deny
                } else {
                    Intent::Unknown
                }
            }
        }
    }
}
