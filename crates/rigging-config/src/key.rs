//! The closed set of configuration keys the capabilities read.

use std::fmt;

/// A namespaced configuration value consumed by one or more capabilities.
///
/// Every key maps to exactly one project property name. Keys with a
/// [`default_value`](Self::default_value) are cosmetic and fall back
/// silently; all others must be supplied by the project or an override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigurationKey {
    RepositoryHost,
    RepositoryJarPort,
    RepositoryImagePort,
    RepositoryUsername,
    RepositoryPassword,
    ReleaseGitRemote,
    ServerBootstrapLocation,
    ClientBootstrapLocation,
    ContainerBaseImage,
    DocsBackend,
    DocsDoctype,
    ReleaseRequireBranch,
    ReleaseVersionBranch,
    /// GitHub owner used for SCM metadata. Optional: no SCM block without it.
    ScmOwner,
}

impl ConfigurationKey {
    /// Every key, in declaration order.
    pub const ALL: [ConfigurationKey; 14] = [
        Self::RepositoryHost,
        Self::RepositoryJarPort,
        Self::RepositoryImagePort,
        Self::RepositoryUsername,
        Self::RepositoryPassword,
        Self::ReleaseGitRemote,
        Self::ServerBootstrapLocation,
        Self::ClientBootstrapLocation,
        Self::ContainerBaseImage,
        Self::DocsBackend,
        Self::DocsDoctype,
        Self::ReleaseRequireBranch,
        Self::ReleaseVersionBranch,
        Self::ScmOwner,
    ];

    /// The project property name backing this key.
    pub fn property(self) -> &'static str {
        match self {
            Self::RepositoryHost => "nexus.host",
            Self::RepositoryJarPort => "nexus.port.jar",
            Self::RepositoryImagePort => "nexus.port.image",
            Self::RepositoryUsername => "nexus.user",
            Self::RepositoryPassword => "nexus.password",
            Self::ReleaseGitRemote => "release.git.remote",
            Self::ServerBootstrapLocation => "bootstrap.location.cloud-server",
            Self::ClientBootstrapLocation => "bootstrap.location.cloud-client",
            Self::ContainerBaseImage => "container.base.image",
            Self::DocsBackend => "docs.backend",
            Self::DocsDoctype => "docs.doctype",
            Self::ReleaseRequireBranch => "release.require.branch",
            Self::ReleaseVersionBranch => "release.version.branch",
            Self::ScmOwner => "scm.owner",
        }
    }

    /// The fallback used when neither an override nor a project property
    /// supplies a value. Hosts, ports and credentials never have one.
    pub fn default_value(self) -> Option<&'static str> {
        match self {
            Self::ContainerBaseImage => Some("openjdk:8-jdk-alpine"),
            Self::DocsBackend => Some("html"),
            Self::DocsDoctype => Some("book"),
            Self::ReleaseRequireBranch => Some("develop"),
            Self::ReleaseVersionBranch => Some("master"),
            _ => None,
        }
    }

    /// Whether the value is a secret and must never be echoed.
    pub fn is_secret(self) -> bool {
        matches!(self, Self::RepositoryPassword)
    }

    /// Look up a key by its property name.
    pub fn from_property(property: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.property() == property)
    }
}

impl fmt::Display for ConfigurationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.property())
    }
}
