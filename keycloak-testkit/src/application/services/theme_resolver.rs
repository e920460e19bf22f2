use crate::{
    application::ports::ThemeProvider,
    domain::{
        entities::{RealmThemes, Theme, ThemeType},
        errors::DomainResult,
    },
};
use std::sync::Arc;
use tracing::debug;

/// Resolve the theme a realm uses for `theme_type`: the configured theme name,
/// served by the first provider that has it.
pub fn find_theme(
    realm_themes: &RealmThemes,
    providers: &[Arc<dyn ThemeProvider>],
    theme_type: ThemeType,
) -> DomainResult<Option<Theme>> {
    let Some(name) = realm_themes.name_for(theme_type) else {
        return Ok(None);
    };

    match providers.iter().find(|p| p.has_theme(name, theme_type)) {
        Some(provider) => provider.get_theme(name, theme_type),
        None => {
            debug!("No provider has {} theme '{}'", theme_type, name);
            Ok(None)
        }
    }
}

/// Theme lookup bound to a fixed set of providers
pub struct ThemeResolver {
    providers: Vec<Arc<dyn ThemeProvider>>,
}

impl ThemeResolver {
    pub fn new(providers: Vec<Arc<dyn ThemeProvider>>) -> Self {
        Self { providers }
    }

    pub fn find_theme(
        &self,
        realm_themes: &RealmThemes,
        theme_type: ThemeType,
    ) -> DomainResult<Option<Theme>> {
        find_theme(realm_themes, &self.providers, theme_type)
    }
}
