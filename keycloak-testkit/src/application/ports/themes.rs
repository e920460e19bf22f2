use crate::domain::entities::{Theme, ThemeType};
use crate::domain::errors::DomainResult;

/// A source of themes (themes directory, classpath bundle, ...)
pub trait ThemeProvider: Send + Sync {
    fn has_theme(&self, name: &str, theme_type: ThemeType) -> bool;

    fn get_theme(&self, name: &str, theme_type: ThemeType) -> DomainResult<Option<Theme>>;
}
