//! Embedder-backed spell checking.

use crate::value::{BindingValue, EmbedderObject};
use framekit_core::{FrameObserver, NativeFrame, TextCheckClient};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tracing::{debug, warn};

/// Spell-check client backed by an embedder provider object.
///
/// The provider's `spellCheck(word)` returns a truthy value for correctly
/// spelled words. The client lives as long as the frame that installed it:
/// once that frame is destroyed the provider is released and the client is
/// removed from every frame it was installed on.
pub struct SpellCheckClient {
    language: String,
    provider: RefCell<Option<Rc<EmbedderObject>>>,
    installed: RefCell<Vec<Weak<NativeFrame>>>,
}

impl SpellCheckClient {
    pub fn new(language: impl Into<String>, provider: Rc<EmbedderObject>) -> Rc<Self> {
        Rc::new(Self {
            language: language.into(),
            provider: RefCell::new(Some(provider)),
            installed: RefCell::new(Vec::new()),
        })
    }

    /// Install on `frame` as its text-check client.
    pub fn install(self: &Rc<Self>, frame: &Rc<NativeFrame>) {
        let client: Rc<dyn TextCheckClient> = self.clone();
        frame.set_text_check_client(Some(client));
        self.installed.borrow_mut().push(Rc::downgrade(frame));
    }

    /// Release the provider when `owner` is destroyed.
    pub fn bind_lifetime(self: &Rc<Self>, owner: &NativeFrame) {
        let observer: Rc<dyn FrameObserver> = self.clone();
        owner.add_observer(Rc::downgrade(&observer));
    }

    pub fn is_active(&self) -> bool {
        self.provider.borrow().is_some()
    }

    fn is_self(&self, client: &Rc<dyn TextCheckClient>) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(client), self as *const Self)
    }
}

impl TextCheckClient for SpellCheckClient {
    fn language(&self) -> &str {
        &self.language
    }

    fn check_words(&self, words: &[String]) -> Vec<String> {
        let Some(provider) = self.provider.borrow().clone() else {
            return Vec::new();
        };

        words
            .iter()
            .filter(|word| {
                match provider.call_method("spellCheck", &[BindingValue::from(word.as_str())]) {
                    Ok(correct) => !correct.is_truthy(),
                    Err(e) => {
                        warn!(error = %e, "Spell check provider failed");
                        false
                    }
                }
            })
            .cloned()
            .collect()
    }
}

impl FrameObserver for SpellCheckClient {
    fn on_destruct(&self) {
        debug!(language = %self.language, "Releasing spell check provider");
        self.provider.borrow_mut().take();

        let installed = std::mem::take(&mut *self.installed.borrow_mut());
        for frame in installed.iter().filter_map(Weak::upgrade) {
            if frame.text_check_client().is_some_and(|c| self.is_self(&c)) {
                frame.set_text_check_client(None);
            }
            if frame
                .spell_check_panel_host_client()
                .is_some_and(|c| self.is_self(&c))
            {
                frame.set_spell_check_panel_host_client(None);
            }
        }
    }
}

impl std::fmt::Debug for SpellCheckClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpellCheckClient")
            .field("language", &self.language)
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use framekit_core::FrameRegistry;

    fn provider() -> Rc<EmbedderObject> {
        Rc::new(EmbedderObject::new().with_method("spellCheck", |args| {
            BindingValue::Bool(args[0].as_str() != Some("teh"))
        }))
    }

    #[test]
    fn test_reports_misspelled_words() {
        let client = SpellCheckClient::new("en-US", provider());
        let words = vec!["the".to_string(), "teh".to_string(), "cat".to_string()];
        assert_eq!(client.check_words(&words), vec!["teh".to_string()]);
        assert_eq!(client.language(), "en-US");
    }

    #[test]
    fn test_released_with_owner() {
        let registry = FrameRegistry::new();
        let main = registry.create_main_frame("main");
        let other = registry.create_main_frame("other");

        let client = SpellCheckClient::new("en-US", provider());
        client.install(&main);
        client.install(&other);
        client.bind_lifetime(&main);

        registry.remove_frame(&main);
        assert!(!client.is_active());
        assert!(other.text_check_client().is_none());
        assert!(client.check_words(&["teh".to_string()]).is_empty());
    }
}
