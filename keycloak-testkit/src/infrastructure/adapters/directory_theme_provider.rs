use std::path::{Path, PathBuf};

use crate::application::ports::ThemeProvider;
use crate::domain::entities::{Theme, ThemeType};
use crate::domain::errors::DomainResult;

/// Themes laid out like Keycloak's `themes` folder:
/// `<root>/<theme name>/<type>/theme.properties`
pub struct DirectoryThemeProvider {
    root: PathBuf,
}

impl DirectoryThemeProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn properties_path(&self, name: &str, theme_type: ThemeType) -> PathBuf {
        self.root
            .join(name)
            .join(theme_type.as_str())
            .join("theme.properties")
    }
}

impl ThemeProvider for DirectoryThemeProvider {
    fn has_theme(&self, name: &str, theme_type: ThemeType) -> bool {
        // Reject names that would leave the themes folder
        if name.is_empty() || name.contains(['/', '\\']) || name == ".." {
            return false;
        }
        self.properties_path(name, theme_type).is_file()
    }

    fn get_theme(&self, name: &str, theme_type: ThemeType) -> DomainResult<Option<Theme>> {
        if !self.has_theme(name, theme_type) {
            return Ok(None);
        }
        Ok(Some(Theme {
            name: name.to_string(),
            theme_type,
        }))
    }
}
