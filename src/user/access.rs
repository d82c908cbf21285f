//! Access decisions for a single page.
//!
//! The session layer answers three questions through [`Subject`]: is the
//! identity authenticated, does it hold a permission, does it hold a set of
//! roles. [`is_accessible`] combines the answers with the page's
//! [`AccessMode`]:
//!
//! ```text
//! public         always
//! authenticated  authenticated
//! guest-only     not authenticated
//! permission     authenticated && permitted("page:view:<uri with / as :>")
//! role           authenticated && has every role of the page
//! ```

use crate::AccessMode;
use std::collections::BTreeSet;
use std::fmt;

/// Authorization queries about the current identity.
pub trait Subject: Send + Sync {
    fn is_authenticated(&self) -> bool;

    /// `permission` is a `:`-separated permission string such as `page:view:home:about`.
    fn is_permitted(&self, permission: &str) -> bool;

    fn has_all_roles(&self, roles: &BTreeSet<String>) -> bool;
}

/// Permission required to view the page at a URI.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PagePermission(String);

impl PagePermission {
    pub const PREFIX: &'static str = "page:view:";

    pub fn for_uri(uri: &str) -> Self {
        PagePermission(format!("{}{}", Self::PREFIX, uri.replace('/', ":")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PagePermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn is_accessible(access: AccessMode, uri: &str, roles: &BTreeSet<String>, subject: &dyn Subject) -> bool {
    match access {
        AccessMode::Public => true,
        AccessMode::Authenticated => subject.is_authenticated(),
        AccessMode::GuestOnly => !subject.is_authenticated(),
        AccessMode::Permission => {
            subject.is_authenticated() && subject.is_permitted(PagePermission::for_uri(uri).as_str())
        }
        AccessMode::Role => subject.is_authenticated() && subject.has_all_roles(roles),
    }
}

// --- Wildcard permissions ----------------------------------------------------

/// A granted permission with `*` wildcards and `,` alternatives per part.
///
/// ```text
/// granted            requested             implied?
/// page:view:*        page:view:home        yes
/// page:view          page:view:home:about  yes (missing parts imply everything)
/// page:view:home,faq page:view:faq         yes
/// page:*:home:team   page:view:home        no  (extra part must be '*')
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WildcardPermission {
    parts: Vec<BTreeSet<String>>,
}

impl WildcardPermission {
    const WILDCARD: &'static str = "*";

    pub fn new(text: &str) -> Self {
        let parts = text
            .split(':')
            .map(|part| part.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect())
            .collect();
        WildcardPermission { parts }
    }

    pub fn implies(&self, requested: &WildcardPermission) -> bool {
        for (idx, wanted) in requested.parts.iter().enumerate() {
            let Some(granted) = self.parts.get(idx) else {
                return true;
            };
            if !granted.contains(Self::WILDCARD) && !wanted.is_subset(granted) {
                return false;
            }
        }
        self.parts.iter().skip(requested.parts.len()).all(|part| part.contains(Self::WILDCARD))
    }
}

/// Fixed identity, useful for tools and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticSubject {
    authenticated: bool,
    roles: BTreeSet<String>,
    permissions: Vec<WildcardPermission>,
}

impl StaticSubject {
    pub fn guest() -> Self {
        Self::default()
    }

    pub fn authenticated() -> Self {
        StaticSubject { authenticated: true, ..Default::default() }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.insert(role.into());
        self
    }

    pub fn with_permission(mut self, permission: &str) -> Self {
        self.permissions.push(WildcardPermission::new(permission));
        self
    }
}

impl Subject for StaticSubject {
    fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    fn is_permitted(&self, permission: &str) -> bool {
        let requested = WildcardPermission::new(permission);
        self.permissions.iter().any(|granted| granted.implies(&requested))
    }

    fn has_all_roles(&self, roles: &BTreeSet<String>) -> bool {
        roles.is_subset(&self.roles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn page_permission_replaces_slashes() {
        assert_eq!(PagePermission::for_uri("home/about/team").as_str(), "page:view:home:about:team");
    }

    #[test]
    fn wildcard_implication() {
        let granted = WildcardPermission::new;
        let wanted = WildcardPermission::new;

        assert!(granted("page:view:*").implies(&wanted("page:view:home")));
        assert!(granted("page:view").implies(&wanted("page:view:home:about")));
        assert!(granted("page:view:home,faq").implies(&wanted("page:view:faq")));
        assert!(granted("page:view:home:*").implies(&wanted("page:view:home")));
        assert!(!granted("page:*:home:team").implies(&wanted("page:view:home")));
        assert!(!granted("page:view:home").implies(&wanted("page:view:shop")));
        assert!(!granted("page:edit").implies(&wanted("page:view:home")));
    }

    #[test]
    fn decision_per_mode() {
        let guest = StaticSubject::guest();
        let user = StaticSubject::authenticated().with_role("clerk").with_permission("page:view:shop:*");
        let none = roles(&[]);

        assert!(is_accessible(AccessMode::Public, "x", &none, &guest));
        assert!(is_accessible(AccessMode::GuestOnly, "x", &none, &guest));
        assert!(!is_accessible(AccessMode::GuestOnly, "x", &none, &user));
        assert!(!is_accessible(AccessMode::Authenticated, "x", &none, &guest));
        assert!(is_accessible(AccessMode::Authenticated, "x", &none, &user));

        assert!(is_accessible(AccessMode::Permission, "shop/cart", &none, &user));
        assert!(!is_accessible(AccessMode::Permission, "admin", &none, &user));

        assert!(is_accessible(AccessMode::Role, "x", &roles(&["clerk"]), &user));
        assert!(!is_accessible(AccessMode::Role, "x", &roles(&["clerk", "admin"]), &user));
        assert!(!is_accessible(AccessMode::Role, "x", &none, &guest));
    }

    #[test]
    fn permission_mode_requires_authentication() {
        let anonymous = StaticSubject::guest().with_permission("*");
        assert!(!is_accessible(AccessMode::Permission, "home", &BTreeSet::new(), &anonymous));
    }
}
