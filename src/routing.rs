use crate::types::Role;

/// A path prefix gated by a set of front-end roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleRule {
    pub prefix: String,
    pub roles: Vec<Role>,
}

/// Static route configuration consumed by the route guard.
///
/// Prefixes match whole path segments: `/saler` covers `/saler` and
/// `/saler/orders` but not `/salesforce`. The root path `/` only ever
/// matches itself.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct RouteTable {
    pub(crate) public: Vec<String>,
    pub(crate) rules: Vec<RoleRule>,
    pub(crate) login_path: String,
    pub(crate) landing_path: String,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new()
            .with_public(["/", "/auth", "/privacy-policy", "/terms-of-service", "/user-pre"])
            .with_rule("/saler", [Role::Saler, Role::Supervisor])
            .with_rule("/buyer", [Role::Buyer])
            .with_rule("/super", [Role::Supervisor])
            .with_rule("/notallow", [Role::NotAllow])
    }
}

impl RouteTable {
    /// Empty table with `/auth/login` as login page and `/home` as landing page.
    #[must_use]
    pub fn new() -> Self {
        Self {
            public: Vec::new(),
            rules: Vec::new(),
            login_path: "/auth/login".into(),
            landing_path: "/home".into(),
        }
    }

    #[must_use]
    pub fn with_public<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.public.extend(paths.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_rule<I>(mut self, prefix: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = Role>,
    {
        self.rules.push(RoleRule {
            prefix: prefix.into(),
            roles: roles.into_iter().collect(),
        });
        self
    }

    #[must_use]
    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    /// Tenant-selection landing page; also the target of authorization redirects.
    #[must_use]
    pub fn with_landing_path(mut self, path: impl Into<String>) -> Self {
        self.landing_path = path.into();
        self
    }

    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    #[must_use]
    pub fn landing_path(&self) -> &str {
        &self.landing_path
    }

    #[must_use]
    pub fn is_public(&self, path: &str) -> bool {
        self.public.iter().any(|p| matches_prefix(path, p))
    }

    #[must_use]
    pub fn is_login(&self, path: &str) -> bool {
        path == self.login_path
    }

    /// Role rule covering `path`; the longest matching prefix wins.
    #[must_use]
    pub fn rule_for(&self, path: &str) -> Option<&RoleRule> {
        self.rules
            .iter()
            .filter(|r| matches_prefix(path, &r.prefix))
            .max_by_key(|r| r.prefix.len())
    }

    /// Whether serving `path` needs a bound tenant instance.
    ///
    /// Everything under the landing page and every role-gated prefix does;
    /// the landing page itself does not, since that is where the instance is picked.
    #[must_use]
    pub fn requires_tenant(&self, path: &str) -> bool {
        if path == self.landing_path {
            return false;
        }
        matches_prefix(path, &self.landing_path) || self.rule_for(path).is_some()
    }
}

/// Whether `role` satisfies `required`. A missing role never does.
#[must_use]
pub fn has_required_role(role: Option<&Role>, required: &[Role]) -> bool {
    role.is_some_and(|r| required.contains(r))
}

fn matches_prefix(path: &str, prefix: &str) -> bool {
    if prefix == "/" {
        return path == "/";
    }
    let prefix = prefix.trim_end_matches('/');
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}
