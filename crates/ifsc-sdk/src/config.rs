//! Shortcode options
//!
//! Options come from host option storage through [`OptionStore`] and are
//! read once, on first use, by [`OptionsCache`].

use once_cell::unsync::OnceCell;
use serde::{Deserialize, Serialize};

/// Default primary tag name
pub const DEFAULT_NAME: &str = "if";

/// Default companion tag name
pub const DEFAULT_ELSE_NAME: &str = "else";

/// Shortest arbitrary attribute name accepted by default
pub const DEFAULT_ARBITRARY_ATT_MIN_LENGTH: usize = 3;

/// Options as stored by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShortcodeOptions {
    /// Primary tag name (`if`)
    pub name: String,

    /// Companion tag name (`else`)
    pub else_name: String,

    /// Allow `php=""`
    pub enable_php_att: bool,

    /// Allow `_for_blog=""`
    pub enable_for_blog_att: bool,

    /// Allow attributes outside the built-in set
    pub enable_arbitrary_atts: bool,

    /// Whitespace or comma separated attribute names
    pub whitelisted_arbitrary_atts: String,

    /// `_debug` value used when the tag does not set one
    pub debug_att_default: String,

    /// Minimum length of an arbitrary attribute name
    pub arbitrary_att_min_length: usize,
}

impl Default for ShortcodeOptions {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            else_name: DEFAULT_ELSE_NAME.to_string(),
            enable_php_att: false,
            enable_for_blog_att: false,
            enable_arbitrary_atts: false,
            whitelisted_arbitrary_atts: String::new(),
            debug_att_default: "0".to_string(),
            arbitrary_att_min_length: DEFAULT_ARBITRARY_ATT_MIN_LENGTH,
        }
    }
}

impl ShortcodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enable_php_att(mut self, enable: bool) -> Self {
        self.enable_php_att = enable;
        self
    }

    pub fn enable_for_blog_att(mut self, enable: bool) -> Self {
        self.enable_for_blog_att = enable;
        self
    }

    pub fn enable_arbitrary_atts(mut self, enable: bool) -> Self {
        self.enable_arbitrary_atts = enable;
        self
    }

    pub fn with_whitelist(mut self, whitelist: impl Into<String>) -> Self {
        self.whitelisted_arbitrary_atts = whitelist.into();
        self
    }

    pub fn with_debug_default(mut self, debug: impl Into<String>) -> Self {
        self.debug_att_default = debug.into();
        self
    }

    /// Whitelisted names; empty unless arbitrary attributes are enabled
    pub fn whitelist(&self) -> Vec<String> {
        if !self.enable_arbitrary_atts {
            return Vec::new();
        }
        self.whitelisted_arbitrary_atts
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Host option storage
pub trait OptionStore {
    fn load_options(&self) -> ShortcodeOptions;
}

impl OptionStore for ShortcodeOptions {
    fn load_options(&self) -> ShortcodeOptions {
        self.clone()
    }
}

/// Options plus values derived from them once
#[derive(Debug, Clone)]
pub struct ResolvedOptions {
    pub options: ShortcodeOptions,
    pub whitelist: Vec<String>,
}

impl ResolvedOptions {
    pub fn new(options: ShortcodeOptions) -> Self {
        let whitelist = options.whitelist();
        Self { options, whitelist }
    }

    pub fn is_whitelisted(&self, name: &str) -> bool {
        self.whitelist.is_empty() || self.whitelist.iter().any(|w| w == name)
    }
}

/// Reads options from the store on first access and keeps them
pub struct OptionsCache {
    store: Box<dyn OptionStore>,
    resolved: OnceCell<ResolvedOptions>,
}

impl OptionsCache {
    pub fn new(store: impl OptionStore + 'static) -> Self {
        Self {
            store: Box::new(store),
            resolved: OnceCell::new(),
        }
    }

    pub fn get(&self) -> &ResolvedOptions {
        self.resolved.get_or_init(|| {
            let options = self.store.load_options();
            tracing::debug!("Loaded shortcode options: {:?}", options);
            ResolvedOptions::new(options)
        })
    }

    pub fn is_loaded(&self) -> bool {
        self.resolved.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_defaults() {
        let options = ShortcodeOptions::default();
        assert_eq!(options.name, "if");
        assert_eq!(options.else_name, "else");
        assert!(!options.enable_php_att);
        assert_eq!(options.arbitrary_att_min_length, 3);
    }

    #[test]
    fn test_whitelist_parsing() {
        let options = ShortcodeOptions::new()
            .enable_arbitrary_atts(true)
            .with_whitelist(" is_vip, has_trial\n\tis_member ,,");
        assert_eq!(options.whitelist(), vec!["is_vip", "has_trial", "is_member"]);

        let disabled = options.clone().enable_arbitrary_atts(false);
        assert!(disabled.whitelist().is_empty());
    }

    #[test]
    fn test_deserialize_partial_options() {
        let options: ShortcodeOptions =
            serde_json::from_str(r#"{"enable_php_att": true, "name": "when"}"#).unwrap();
        assert!(options.enable_php_att);
        assert_eq!(options.name, "when");
        assert_eq!(options.else_name, "else");
    }

    struct CountingStore(Rc<Cell<usize>>);

    impl OptionStore for CountingStore {
        fn load_options(&self) -> ShortcodeOptions {
            self.0.set(self.0.get() + 1);
            ShortcodeOptions::default()
        }
    }

    #[test]
    fn test_options_loaded_once() {
        let loads = Rc::new(Cell::new(0));
        let cache = OptionsCache::new(CountingStore(loads.clone()));
        assert!(!cache.is_loaded());

        cache.get();
        cache.get();
        assert!(cache.is_loaded());
        assert_eq!(loads.get(), 1);
    }
}
