//! Cache key builders for the resource families the platform caches.
//!
//! Keys follow a `family:component` shape so substring invalidation can
//! target a whole family (`"campaign:"`) or a single resource.

/// Session data for a user.
pub fn user_session(user_id: &str) -> String {
    format!("session:user:{user_id}")
}

/// Profile data for a user.
pub fn user_profile(user_id: &str) -> String {
    format!("profile:user:{user_id}")
}

/// Tenant-scoped data.
pub fn tenant_data(tenant_id: &str) -> String {
    format!("tenant:{tenant_id}")
}

/// AI usage rollup for a user on a given date (`YYYY-MM-DD`).
pub fn ai_usage(user_id: &str, date: &str) -> String {
    format!("ai:usage:{user_id}:{date}")
}

/// A campaign and its derived views.
pub fn campaign(campaign_id: &str) -> String {
    format!("campaign:{campaign_id}")
}

/// An analytics aggregate of the given kind.
pub fn analytics(kind: &str, id: &str) -> String {
    format!("analytics:{kind}:{id}")
}

/// A proxied API response, keyed by endpoint and serialized parameters.
pub fn api_response(endpoint: &str, params: &str) -> String {
    format!("api:{endpoint}:{params}")
}

/// Rate-limit marker for a user action.
pub fn rate_limit(user_id: &str, action: &str) -> String {
    format!("rate:{action}:{user_id}")
}

/// Scheduled/published posts for a social account.
pub fn social_posts(platform: &str, account_id: &str) -> String {
    format!("social:{platform}:{account_id}")
}

/// Email templates for a tenant.
pub fn email_templates(tenant_id: &str) -> String {
    format!("email:templates:{tenant_id}")
}

/// Search results for a query.
pub fn search_results(query: &str) -> String {
    format!("search:{query}")
}

/// Feature flags for a tenant.
pub fn feature_flags(tenant_id: &str) -> String {
    format!("features:{tenant_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_family_prefixed() {
        assert_eq!(user_session("u1"), "session:user:u1");
        assert_eq!(ai_usage("u1", "2025-06-15"), "ai:usage:u1:2025-06-15");
        assert_eq!(campaign("42"), "campaign:42");
        assert_eq!(rate_limit("u1", "generate"), "rate:generate:u1");
    }

    #[test]
    fn test_family_is_a_substring_of_every_member() {
        for key in [campaign("1"), campaign("2"), campaign("42")] {
            assert!(key.contains("campaign:"));
        }
    }
}
