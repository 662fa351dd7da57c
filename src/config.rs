//! TOML-backed conversion configuration.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Deployment credential that must never appear in logs.
///
/// Debug output is redacted so a config dump cannot leak tokens; the
/// raw value is only reachable through [`reveal`](Secret::reveal) at
/// the process-spawning call sites.
#[derive(Clone, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    /// Wraps a raw credential value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw credential for passing to a subprocess.
    pub fn reveal(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[redacted]")
    }
}

/// Netlify deployment settings.
#[derive(Debug, Clone, Deserialize)]
pub struct NetlifyConfig {
    /// Site id passed to `netlify deploy --site`.
    pub site: String,
    /// Personal access token.
    pub token: Secret,
}

/// Vercel deployment settings.
#[derive(Debug, Clone, Deserialize)]
pub struct VercelConfig {
    /// Deployment token.
    pub token: Secret,
    /// Project id written into `.vercel/project.json`.
    pub project_id: String,
    /// Organization id written into `.vercel/project.json`.
    pub org_id: String,
}

/// Conversion configuration, loaded once and passed by reference.
///
/// The `content` and `public` paths resolve against the Hugo site root
/// when given as relative paths, mirroring how Hugo itself lays out a
/// site directory.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Obsidian vault root.
    pub vault: PathBuf,

    /// Hugo site root (working directory for the hugo binary).
    pub hugo: PathBuf,

    /// Content output root, cleared and rebuilt on every full conversion.
    #[serde(default = "default_content")]
    pub content: PathBuf,

    /// Hugo's build output, used as the deployment directory.
    #[serde(default = "default_public")]
    pub public: PathBuf,

    /// Permit raw inline HTML in rewritten documents.
    #[serde(default)]
    pub unsafe_render: bool,

    /// Resize oversized raster images during conversion.
    #[serde(default)]
    pub image_resize: bool,

    /// Maximum output image width in pixels.
    #[serde(default = "default_max_dimension")]
    pub image_max_width: u32,

    /// Maximum output image height in pixels.
    #[serde(default = "default_max_dimension")]
    pub image_max_height: u32,

    /// Netlify deployment settings, required only by the netlify action.
    pub netlify: Option<NetlifyConfig>,

    /// Vercel deployment settings, required only by the vercel action.
    pub vercel: Option<VercelConfig>,
}

fn default_content() -> PathBuf {
    PathBuf::from("content")
}

fn default_public() -> PathBuf {
    PathBuf::from("public")
}

fn default_max_dimension() -> u32 {
    1280
}

impl Config {
    /// Loads and resolves configuration from a TOML file.
    ///
    /// # Arguments
    ///
    /// * `path`: Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration: {}", path.display()))?;

        let mut config: Config = toml::from_str(&text)
            .with_context(|| format!("failed to parse configuration: {}", path.display()))?;

        config.content = resolve_against(&config.hugo, &config.content);
        config.public = resolve_against(&config.hugo, &config.public);

        Ok(config)
    }

    /// Validates configuration before any conversion.
    ///
    /// # Errors
    ///
    /// Returns error if the vault root does not exist.
    pub fn validate(&self) -> Result<()> {
        if !self.vault.exists() {
            bail!("vault does not exist: {}", self.vault.display());
        }

        Ok(())
    }

    /// Minimal configuration for unit tests.
    #[doc(hidden)]
    pub fn for_tests() -> Self {
        Self {
            vault: PathBuf::from("."),
            hugo: PathBuf::from("."),
            content: PathBuf::from("content"),
            public: PathBuf::from("public"),
            unsafe_render: false,
            image_resize: false,
            image_max_width: default_max_dimension(),
            image_max_height: default_max_dimension(),
            netlify: None,
            vercel: None,
        }
    }
}

/// Resolves a possibly relative path against a base directory.
fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_resolves_relative_paths() {
        // Arrange
        let dir = tempfile::TempDir::new().expect("Should create temp dir");
        let config_path = dir.path().join("obsigo.toml");
        fs::write(
            &config_path,
            "vault = \"/vault\"\nhugo = \"/site\"\ncontent = \"content\"\npublic = \"public\"\n",
        )
        .expect("Should write config");

        // Act
        let config = Config::load(&config_path).expect("Should load config");

        // Assert
        assert_eq!(config.content, PathBuf::from("/site/content"));
        assert_eq!(config.public, PathBuf::from("/site/public"));
    }

    #[test]
    fn test_load_keeps_absolute_paths() {
        // Arrange
        let dir = tempfile::TempDir::new().expect("Should create temp dir");
        let config_path = dir.path().join("obsigo.toml");
        fs::write(
            &config_path,
            "vault = \"/vault\"\nhugo = \"/site\"\ncontent = \"/elsewhere/content\"\n",
        )
        .expect("Should write config");

        // Act
        let config = Config::load(&config_path).expect("Should load config");

        // Assert
        assert_eq!(config.content, PathBuf::from("/elsewhere/content"));
    }

    #[test]
    fn test_load_applies_defaults() {
        // Arrange
        let dir = tempfile::TempDir::new().expect("Should create temp dir");
        let config_path = dir.path().join("obsigo.toml");
        fs::write(&config_path, "vault = \"/vault\"\nhugo = \"/site\"\n")
            .expect("Should write config");

        // Act
        let config = Config::load(&config_path).expect("Should load config");

        // Assert
        assert!(!config.unsafe_render, "Unsafe render defaults off");
        assert!(!config.image_resize, "Image resize defaults off");
        assert_eq!(config.image_max_width, 1280);
        assert_eq!(config.image_max_height, 1280);
        assert!(config.netlify.is_none());
        assert!(config.vercel.is_none());
    }

    #[test]
    fn test_load_parses_deploy_sections() {
        // Arrange
        let dir = tempfile::TempDir::new().expect("Should create temp dir");
        let config_path = dir.path().join("obsigo.toml");
        fs::write(
            &config_path,
            "vault = \"/vault\"\nhugo = \"/site\"\n\n\
             [netlify]\nsite = \"my-site\"\ntoken = \"hunter2\"\n\n\
             [vercel]\ntoken = \"hunter3\"\nproject_id = \"prj_1\"\norg_id = \"org_1\"\n",
        )
        .expect("Should write config");

        // Act
        let config = Config::load(&config_path).expect("Should load config");

        // Assert
        let netlify = config.netlify.expect("Should parse netlify section");
        assert_eq!(netlify.site, "my-site");
        assert_eq!(netlify.token.reveal(), "hunter2");

        let vercel = config.vercel.expect("Should parse vercel section");
        assert_eq!(vercel.project_id, "prj_1");
        assert_eq!(vercel.org_id, "org_1");
    }

    #[test]
    fn test_secret_debug_is_redacted() {
        // Arrange
        let secret = Secret::new("hunter2");

        // Act
        let debug = format!("{:?}", secret);

        // Assert
        assert_eq!(debug, "[redacted]");
        assert!(!debug.contains("hunter2"), "Credentials must never leak into Debug output");
    }

    #[test]
    fn test_config_debug_redacts_credentials() {
        // Arrange
        let mut config = Config::for_tests();
        config.netlify = Some(NetlifyConfig {
            site: "my-site".to_string(),
            token: Secret::new("hunter2"),
        });

        // Act
        let debug = format!("{:?}", config);

        // Assert
        assert!(debug.contains("my-site"), "Non-secret fields stay visible");
        assert!(!debug.contains("hunter2"), "Tokens must be redacted in Debug output");
    }

    #[test]
    fn test_validate_missing_vault_fails() {
        // Arrange
        let mut config = Config::for_tests();
        config.vault = PathBuf::from("/nonexistent/vault");

        // Act
        let result = config.validate();

        // Assert
        assert!(result.is_err(), "Missing vault should fail validation");
    }
}
