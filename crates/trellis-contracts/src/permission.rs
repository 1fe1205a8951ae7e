//! The permission read contract and the stock `GenericPermission`.
//!
//! Collections and entities never construct permissions themselves. They only
//! read the action, resource and allow flag, compare permissions with
//! [`Permission::is_equal_to`], and ask each instance for its own wildcard
//! tokens through [`WildcardAware`]. Wildcard strings are therefore a property
//! of the concrete permission type, not of the collection holding it.
//!
//! All action, resource and ID comparisons are case-insensitive.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An additional caller-supplied check run after a permission matches.
///
/// The slice carries whatever arguments the caller passed alongside the
/// predicate. Returning `false` denies the request even when the matching
/// permission allows it.
pub type Assertion<'a> = dyn Fn(&[Value]) -> bool + 'a;

/// Compare two strings without regard to case.
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// Exposes the sentinel strings that mean "any action" and "any resource"
/// for a concrete permission type.
pub trait WildcardAware {
    /// The action value that matches every action.
    fn all_actions_token(&self) -> &str;

    /// The resource value that matches every resource.
    fn all_resources_token(&self) -> &str;
}

/// The read contract every permission stored in a collection must satisfy.
///
/// Implementations are immutable values. Equality is implementer-defined via
/// [`Permission::is_equal_to`]; collections use it for deduplication.
pub trait Permission: WildcardAware + Clone + fmt::Debug {
    /// The action this permission governs (e.g. `"read"`).
    fn action(&self) -> &str;

    /// The resource this permission governs (e.g. `"invoices"`).
    fn resource(&self) -> &str;

    /// Whether the action is allowed (`true`) or denied (`false`) on the resource.
    fn allows(&self) -> bool;

    /// Return true if `other` should be treated as the same permission.
    fn is_equal_to(&self, other: &Self) -> bool;

    /// Return true if this permission structurally applies to `action` on
    /// `resource`, honouring this type's wildcard tokens.
    fn matches(&self, action: &str, resource: &str) -> bool {
        let action_matches = eq_ignore_case(self.action(), action)
            || eq_ignore_case(self.action(), self.all_actions_token());
        let resource_matches = eq_ignore_case(self.resource(), resource)
            || eq_ignore_case(self.resource(), self.all_resources_token());
        action_matches && resource_matches
    }

    /// Return true if this permission matches, allows the action, and the
    /// optional `assertion` also passes when called with `args`.
    fn is_allowed(
        &self,
        action: &str,
        resource: &str,
        assertion: Option<&Assertion<'_>>,
        args: &[Value],
    ) -> bool {
        self.matches(action, resource)
            && self.allows()
            && assertion.map_or(true, |check| check(args))
    }
}

/// The stock permission: an `(action, resource, allow)` triple whose wildcard
/// token is `"*"` for both actions and resources.
///
/// Two `GenericPermission`s are equal when their actions and resources match
/// case-insensitively and their allow flags are identical.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenericPermission {
    action: String,
    resource: String,
    allow: bool,
}

impl GenericPermission {
    /// Matches every action.
    pub const ALL_ACTIONS: &'static str = "*";

    /// Matches every resource.
    pub const ALL_RESOURCES: &'static str = "*";

    /// Construct a permission for `action` on `resource`.
    pub fn new(action: impl Into<String>, resource: impl Into<String>, allow: bool) -> Self {
        Self {
            action: action.into(),
            resource: resource.into(),
            allow,
        }
    }
}

impl WildcardAware for GenericPermission {
    fn all_actions_token(&self) -> &str {
        Self::ALL_ACTIONS
    }

    fn all_resources_token(&self) -> &str {
        Self::ALL_RESOURCES
    }
}

impl Permission for GenericPermission {
    fn action(&self) -> &str {
        &self.action
    }

    fn resource(&self) -> &str {
        &self.resource
    }

    fn allows(&self) -> bool {
        self.allow
    }

    fn is_equal_to(&self, other: &Self) -> bool {
        self.allow == other.allow
            && eq_ignore_case(&self.action, &other.action)
            && eq_ignore_case(&self.resource, &other.resource)
    }
}

impl PartialEq for GenericPermission {
    fn eq(&self, other: &Self) -> bool {
        self.is_equal_to(other)
    }
}

impl Eq for GenericPermission {}

impl fmt::Display for GenericPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.allow { "allow" } else { "deny" };
        write!(f, "{} {} on {}", verdict, self.action, self.resource)
    }
}
