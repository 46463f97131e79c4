/// Requirement
///
/// The outcome of evaluating the access rule table for a request path.
/// `Bypass` and `AllowAll` both let the request through, but they are not
/// the same thing: bypassed paths (static assets, generated API docs) skip
/// the gate without the session store ever being consulted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Requirement {
    /// The gate ignores this path completely (static-asset prefixes).
    Bypass,
    /// Any client may access this path, session or not.
    AllowAll,
    /// A valid session is required; anonymous requests are redirected to
    /// the login page.
    RequireAuth,
}

/// AccessRule
///
/// One (path pattern, requirement) row. Patterns are either exact paths or
/// a prefix ending in `**`:
///   - `/css/**` matches `/css` and anything below `/css/`
///   - `/logout**` matches any path beginning with `/logout`
///   - `/` matches only the root path
#[derive(Clone, Debug)]
pub struct AccessRule {
    pub pattern: String,
    pub requirement: Requirement,
}

impl AccessRule {
    pub fn new(pattern: impl Into<String>, requirement: Requirement) -> Self {
        Self {
            pattern: pattern.into(),
            requirement,
        }
    }

    /// Whether `path` falls under this rule's pattern.
    fn matches(&self, path: &str) -> bool {
        match self.pattern.strip_suffix("**") {
            Some(prefix) => match prefix.strip_suffix('/') {
                // "/css/**": the bare directory and everything below it,
                // but not sibling paths such as "/cssx".
                Some(base) => path == base || path.starts_with(prefix),
                // "/logout**": plain prefix match.
                None => path.starts_with(prefix),
            },
            None => path == self.pattern,
        }
    }
}

/// AccessRuleTable
///
/// The declarative authorization model: an ordered list of rules evaluated
/// top-down for every incoming request path. The rule set is data, not
/// code, so the complete table is reviewable in one place and testable in
/// isolation from the HTTP layer. The table holds no other state and
/// `decide` has no side effects.
#[derive(Clone, Debug)]
pub struct AccessRuleTable {
    rules: Vec<AccessRule>,
}

impl AccessRuleTable {
    pub fn new(rules: Vec<AccessRule>) -> Self {
        Self { rules }
    }

    /// decide
    ///
    /// Walks the rules in declared order and returns the requirement of the
    /// first pattern matching `path`. Paths matched by no rule require
    /// authentication: the table fails closed, so a newly added route is
    /// protected until someone deliberately opens it.
    pub fn decide(&self, path: &str) -> Requirement {
        self.rules
            .iter()
            .find(|rule| rule.matches(path))
            .map(|rule| rule.requirement)
            .unwrap_or(Requirement::RequireAuth)
    }
}

impl Default for AccessRuleTable {
    /// The application's fixed rule set.
    ///
    /// Static-asset prefixes and the generated API documentation bypass the
    /// gate. The login page, the login/logout processing paths, and member
    /// registration are open to anonymous clients. Everything else,
    /// including paths that resolve to no route at all, requires a session.
    fn default() -> Self {
        use Requirement::{AllowAll, Bypass};

        Self::new(vec![
            AccessRule::new("/css/**", Bypass),
            AccessRule::new("/img/**", Bypass),
            AccessRule::new("/js/**", Bypass),
            AccessRule::new("/fonts/**", Bypass),
            AccessRule::new("/swagger-ui**", Bypass),
            AccessRule::new("/api-docs/**", Bypass),
            AccessRule::new("/", AllowAll),
            AccessRule::new("/login", AllowAll),
            AccessRule::new("/logout**", AllowAll),
            AccessRule::new("/member/form", AllowAll),
            AccessRule::new("/member/create", AllowAll),
        ])
    }
}
