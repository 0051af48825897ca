//! Ordered credential lookup for the Groq API key.
//!
//! Sources are tried in sequence: process environment, then the on-disk
//! config file, then a masked interactive prompt. The first non-empty value
//! wins and later sources are never consulted.

use colored::*;
use dialoguer::{Password, theme::ColorfulTheme};

use crate::config::Config;

pub const API_KEY_VAR: &str = "GROQ_API_KEY";
pub const SIGNUP_URL: &str = "https://console.groq.com";

/// A resolved API key and the name of the source that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub value: String,
    pub source: &'static str,
}

/// One place an API key can come from.
pub trait CredentialSource {
    fn name(&self) -> &'static str;
    fn resolve(&self) -> Option<String>;
}

/// Source (1): the process environment.
pub struct EnvSource;

impl CredentialSource for EnvSource {
    fn name(&self) -> &'static str {
        "env"
    }

    fn resolve(&self) -> Option<String> {
        std::env::var(API_KEY_VAR)
            .ok()
            .filter(|v| !v.trim().is_empty())
    }
}

/// Source (2): the config file.
pub struct ConfigSource;

impl CredentialSource for ConfigSource {
    fn name(&self) -> &'static str {
        "config"
    }

    fn resolve(&self) -> Option<String> {
        // A missing or unreadable config file resolves the same as an
        // absent key.
        Config::load()
            .ok()
            .and_then(|c| c.api_key)
            .filter(|v| !v.trim().is_empty())
    }
}

/// Source (3): a masked prompt on the terminal, offered only when the
/// earlier sources came up empty and before any network call is made.
pub struct PromptSource;

impl CredentialSource for PromptSource {
    fn name(&self) -> &'static str {
        "prompt"
    }

    fn resolve(&self) -> Option<String> {
        eprintln!(
            "{}",
            format!("No API key found in ${} or the config file.", API_KEY_VAR).yellow()
        );
        eprintln!("Get a free key at {}", SIGNUP_URL);

        let entered = Password::with_theme(&ColorfulTheme::default())
            .with_prompt("Groq API key")
            .allow_empty_password(true)
            .interact()
            .ok()?;

        let entered = entered.trim().to_string();
        if entered.is_empty() { None } else { Some(entered) }
    }
}

/// Try each source in order; the first non-empty value wins.
pub fn resolve_chain(sources: &[&dyn CredentialSource]) -> Option<Credential> {
    for source in sources {
        if let Some(value) = source.resolve() {
            return Some(Credential {
                value,
                source: source.name(),
            });
        }
    }
    None
}

/// The production chain. A key typed at the prompt is written back to the
/// config file so the next run finds it there; that write is best-effort.
pub fn resolve() -> Option<Credential> {
    let credential = resolve_chain(&[&EnvSource, &ConfigSource, &PromptSource])?;

    if credential.source == "prompt" {
        if let Err(e) = Config::save_api_key(&credential.value) {
            eprintln!("{} {}", "Could not save API key to config:".yellow(), e);
        }
    }

    Some(credential)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct FakeSource<'a> {
        name: &'static str,
        value: Option<&'static str>,
        consulted: &'a Cell<bool>,
    }

    impl CredentialSource for FakeSource<'_> {
        fn name(&self) -> &'static str {
            self.name
        }

        fn resolve(&self) -> Option<String> {
            self.consulted.set(true);
            self.value.map(str::to_string)
        }
    }

    #[test]
    fn first_source_short_circuits_the_rest() {
        let (first, second, third) = (Cell::new(false), Cell::new(false), Cell::new(false));
        let env = FakeSource {
            name: "env",
            value: Some("key-from-env"),
            consulted: &first,
        };
        let config = FakeSource {
            name: "config",
            value: Some("key-from-config"),
            consulted: &second,
        };
        let prompt = FakeSource {
            name: "prompt",
            value: Some("key-from-prompt"),
            consulted: &third,
        };

        let credential = resolve_chain(&[&env, &config, &prompt]).unwrap();
        assert_eq!(credential.value, "key-from-env");
        assert_eq!(credential.source, "env");
        assert!(first.get());
        assert!(!second.get());
        assert!(!third.get());
    }

    #[test]
    fn chain_falls_through_to_later_sources() {
        let (first, second, third) = (Cell::new(false), Cell::new(false), Cell::new(false));
        let env = FakeSource {
            name: "env",
            value: None,
            consulted: &first,
        };
        let config = FakeSource {
            name: "config",
            value: None,
            consulted: &second,
        };
        let prompt = FakeSource {
            name: "prompt",
            value: Some("key-from-prompt"),
            consulted: &third,
        };

        let credential = resolve_chain(&[&env, &config, &prompt]).unwrap();
        assert_eq!(credential.value, "key-from-prompt");
        assert_eq!(credential.source, "prompt");
        assert!(first.get() && second.get() && third.get());
    }

    #[test]
    fn all_sources_empty_resolves_nothing() {
        let consulted = Cell::new(false);
        let source = FakeSource {
            name: "env",
            value: None,
            consulted: &consulted,
        };

        assert!(resolve_chain(&[&source]).is_none());
        assert!(consulted.get());
    }
}
