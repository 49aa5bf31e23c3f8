//! Cache keys shared by every view, so mutations invalidate exactly what
//! the list views read.

use station_cache::QueryKey;

/// All projects visible to the credential.
pub fn projects() -> QueryKey {
    QueryKey::from(["projects"])
}

/// One project with its environments and services.
pub fn project(id: &str) -> QueryKey {
    QueryKey::from(["project", id])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_keys_do_not_overlap_the_list() {
        assert!(project("p1").starts_with(&QueryKey::from(["project"])));
        assert!(!projects().starts_with(&QueryKey::from(["project"])));
    }
}
